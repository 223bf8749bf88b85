use super::read_response;
use crate::models::*;
use crate::services::EventService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/events",
    tag = "event",
    params(
        ("upcoming_only" = Option<bool>, Query, description = "只返回尚未开始的活动"),
        ("category" = Option<String>, Query, description = "活动分类名称"),
        ("page" = Option<u32>, Query, description = "页码"),
        ("per_page" = Option<u32>, Query, description = "每页数量")
    ),
    responses(
        (status = 200, description = "活动列表")
    )
)]
pub async fn list_events(
    event_service: web::Data<EventService>,
    query: web::Query<EventQuery>,
) -> Result<HttpResponse> {
    Ok(read_response(event_service.list(&query).await))
}

#[utoipa::path(
    get,
    path = "/events/{id}",
    tag = "event",
    params(
        ("id" = i64, Path, description = "活动 ID")
    ),
    responses(
        (status = 200, description = "活动详情，含地址与剩余名额"),
        (status = 404, description = "活动不存在")
    )
)]
pub async fn get_event(
    event_service: web::Data<EventService>,
    id: web::Path<i64>,
) -> Result<HttpResponse> {
    match event_service.get(id.into_inner()).await {
        Ok(event) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": event
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/events",
    tag = "event",
    request_body = CreateEventRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "创建成功"),
        (status = 400, description = "参数错误"),
        (status = 403, description = "需要管理员权限")
    )
)]
pub async fn create_event(
    event_service: web::Data<EventService>,
    caller: AuthenticatedUser,
    req: web::Json<CreateEventRequest>,
) -> Result<HttpResponse> {
    match event_service.create(&caller, req.into_inner()).await {
        Ok(event) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": event
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/events/{id}",
    tag = "event",
    params(
        ("id" = i64, Path, description = "活动 ID")
    ),
    request_body = UpdateEventRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "更新成功"),
        (status = 403, description = "需要管理员权限"),
        (status = 404, description = "活动不存在")
    )
)]
pub async fn update_event(
    event_service: web::Data<EventService>,
    caller: AuthenticatedUser,
    id: web::Path<i64>,
    req: web::Json<UpdateEventRequest>,
) -> Result<HttpResponse> {
    match event_service
        .update(&caller, id.into_inner(), req.into_inner())
        .await
    {
        Ok(event) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": event
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/events/{id}",
    tag = "event",
    params(
        ("id" = i64, Path, description = "活动 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "删除成功"),
        (status = 403, description = "需要管理员权限"),
        (status = 404, description = "活动不存在")
    )
)]
pub async fn delete_event(
    event_service: web::Data<EventService>,
    caller: AuthenticatedUser,
    id: web::Path<i64>,
) -> Result<HttpResponse> {
    match event_service.delete(&caller, id.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Event deleted"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/events/{id}/register",
    tag = "event",
    params(
        ("id" = i64, Path, description = "活动 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "报名成功"),
        (status = 404, description = "活动不存在"),
        (status = 409, description = "名额已满、报名截止或重复报名")
    )
)]
pub async fn register_for_event(
    event_service: web::Data<EventService>,
    caller: AuthenticatedUser,
    id: web::Path<i64>,
) -> Result<HttpResponse> {
    match event_service.register(&caller, id.into_inner()).await {
        Ok(registration) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": registration
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/events/{id}/register",
    tag = "event",
    params(
        ("id" = i64, Path, description = "活动 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "已取消报名并释放名额"),
        (status = 404, description = "未找到有效报名")
    )
)]
pub async fn cancel_registration(
    event_service: web::Data<EventService>,
    caller: AuthenticatedUser,
    id: web::Path<i64>,
) -> Result<HttpResponse> {
    match event_service
        .cancel_registration(&caller, id.into_inner())
        .await
    {
        Ok(registration) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": registration
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/events/{id}/registrations",
    tag = "event",
    params(
        ("id" = i64, Path, description = "活动 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "报名列表"),
        (status = 401, description = "未授权")
    )
)]
pub async fn list_registrations(
    event_service: web::Data<EventService>,
    _caller: AuthenticatedUser,
    id: web::Path<i64>,
) -> Result<HttpResponse> {
    Ok(read_response(
        event_service.registrations(id.into_inner()).await,
    ))
}

pub fn event_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/events")
            .route("", web::get().to(list_events))
            .route("", web::post().to(create_event))
            .route("/{id}", web::get().to(get_event))
            .route("/{id}", web::put().to(update_event))
            .route("/{id}", web::delete().to(delete_event))
            .route("/{id}/register", web::post().to(register_for_event))
            .route("/{id}/register", web::delete().to(cancel_registration))
            .route("/{id}/registrations", web::get().to(list_registrations)),
    );
}
