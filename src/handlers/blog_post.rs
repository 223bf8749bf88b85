use super::read_response;
use crate::models::*;
use crate::services::BlogPostService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

fn can_see_drafts(caller: &Option<AuthenticatedUser>) -> bool {
    caller.as_ref().is_some_and(AuthenticatedUser::is_admin)
}

#[utoipa::path(
    get,
    path = "/blog-posts",
    tag = "blog",
    params(
        ("category" = Option<String>, Query, description = "文章分类名称"),
        ("include_drafts" = Option<bool>, Query, description = "包含草稿（仅管理员生效）"),
        ("page" = Option<u32>, Query, description = "页码"),
        ("per_page" = Option<u32>, Query, description = "每页数量")
    ),
    responses(
        (status = 200, description = "文章列表，默认只含已发布")
    )
)]
pub async fn list_blog_posts(
    blog_post_service: web::Data<BlogPostService>,
    caller: Option<AuthenticatedUser>,
    query: web::Query<BlogPostQuery>,
) -> Result<HttpResponse> {
    let mut query = query.into_inner();
    if !can_see_drafts(&caller) {
        query.include_drafts = None;
    }
    Ok(read_response(blog_post_service.list(&query).await))
}

#[utoipa::path(
    get,
    path = "/blog-posts/{id}",
    tag = "blog",
    params(
        ("id" = i64, Path, description = "文章 ID")
    ),
    responses(
        (status = 200, description = "文章详情"),
        (status = 404, description = "文章不存在或未发布")
    )
)]
pub async fn get_blog_post(
    blog_post_service: web::Data<BlogPostService>,
    caller: Option<AuthenticatedUser>,
    id: web::Path<i64>,
) -> Result<HttpResponse> {
    match blog_post_service
        .get(id.into_inner(), can_see_drafts(&caller))
        .await
    {
        Ok(post) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": post
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/blog-posts",
    tag = "blog",
    request_body = CreateBlogPostRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "创建成功，未提供摘要时从正文截取"),
        (status = 400, description = "参数错误")
    )
)]
pub async fn create_blog_post(
    blog_post_service: web::Data<BlogPostService>,
    caller: AuthenticatedUser,
    req: web::Json<CreateBlogPostRequest>,
) -> Result<HttpResponse> {
    match blog_post_service.create(&caller, req.into_inner()).await {
        Ok(post) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": post
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/blog-posts/{id}",
    tag = "blog",
    params(
        ("id" = i64, Path, description = "文章 ID")
    ),
    request_body = UpdateBlogPostRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "更新成功"),
        (status = 403, description = "非作者或管理员"),
        (status = 404, description = "文章不存在")
    )
)]
pub async fn update_blog_post(
    blog_post_service: web::Data<BlogPostService>,
    caller: AuthenticatedUser,
    id: web::Path<i64>,
    req: web::Json<UpdateBlogPostRequest>,
) -> Result<HttpResponse> {
    match blog_post_service
        .update(&caller, id.into_inner(), req.into_inner())
        .await
    {
        Ok(post) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": post
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/blog-posts/{id}",
    tag = "blog",
    params(
        ("id" = i64, Path, description = "文章 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "删除成功"),
        (status = 403, description = "非作者或管理员"),
        (status = 404, description = "文章不存在")
    )
)]
pub async fn delete_blog_post(
    blog_post_service: web::Data<BlogPostService>,
    caller: AuthenticatedUser,
    id: web::Path<i64>,
) -> Result<HttpResponse> {
    match blog_post_service.delete(&caller, id.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Blog post deleted"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/blog-posts/{id}/publish",
    tag = "blog",
    params(
        ("id" = i64, Path, description = "文章 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "已发布"),
        (status = 403, description = "非作者或管理员"),
        (status = 404, description = "文章不存在")
    )
)]
pub async fn publish_blog_post(
    blog_post_service: web::Data<BlogPostService>,
    caller: AuthenticatedUser,
    id: web::Path<i64>,
) -> Result<HttpResponse> {
    match blog_post_service.publish(&caller, id.into_inner()).await {
        Ok(post) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": post
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn blog_post_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/blog-posts")
            .route("", web::get().to(list_blog_posts))
            .route("", web::post().to(create_blog_post))
            .route("/{id}", web::get().to(get_blog_post))
            .route("/{id}", web::put().to(update_blog_post))
            .route("/{id}", web::delete().to(delete_blog_post))
            .route("/{id}/publish", web::post().to(publish_blog_post)),
    );
}
