use super::read_response;
use crate::models::*;
use crate::services::CampaignService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/campaigns",
    tag = "campaign",
    params(
        ("status" = Option<String>, Query, description = "状态名称，如 active"),
        ("category" = Option<String>, Query, description = "分类名称"),
        ("urgency" = Option<String>, Query, description = "紧急程度名称"),
        ("search" = Option<String>, Query, description = "标题关键字"),
        ("page" = Option<u32>, Query, description = "页码"),
        ("per_page" = Option<u32>, Query, description = "每页数量")
    ),
    responses(
        (status = 200, description = "募捐活动列表（含统计）")
    )
)]
pub async fn list_campaigns(
    campaign_service: web::Data<CampaignService>,
    query: web::Query<CampaignQuery>,
) -> Result<HttpResponse> {
    Ok(read_response(campaign_service.list(&query).await))
}

#[utoipa::path(
    get,
    path = "/campaigns/{id}",
    tag = "campaign",
    params(
        ("id" = i64, Path, description = "募捐活动 ID")
    ),
    responses(
        (status = 200, description = "活动详情，含统计与最近捐款"),
        (status = 404, description = "活动不存在")
    )
)]
pub async fn get_campaign(
    campaign_service: web::Data<CampaignService>,
    id: web::Path<i64>,
) -> Result<HttpResponse> {
    match campaign_service.get(id.into_inner()).await {
        Ok(detail) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": detail
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/campaigns/{id}/statistics",
    tag = "campaign",
    params(
        ("id" = i64, Path, description = "募捐活动 ID")
    ),
    responses(
        (status = 200, description = "活动统计"),
        (status = 404, description = "活动不存在")
    )
)]
pub async fn get_campaign_statistics(
    campaign_service: web::Data<CampaignService>,
    id: web::Path<i64>,
) -> Result<HttpResponse> {
    match campaign_service.statistics(id.into_inner()).await {
        Ok(stats) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": stats
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/campaigns",
    tag = "campaign",
    request_body = CreateCampaignRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "创建成功"),
        (status = 400, description = "参数错误"),
        (status = 401, description = "未授权")
    )
)]
pub async fn create_campaign(
    campaign_service: web::Data<CampaignService>,
    caller: AuthenticatedUser,
    req: web::Json<CreateCampaignRequest>,
) -> Result<HttpResponse> {
    match campaign_service.create(&caller, req.into_inner()).await {
        Ok(detail) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": detail
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/campaigns/{id}",
    tag = "campaign",
    params(
        ("id" = i64, Path, description = "募捐活动 ID")
    ),
    request_body = UpdateCampaignRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "更新成功"),
        (status = 403, description = "非创建者或管理员"),
        (status = 404, description = "活动不存在")
    )
)]
pub async fn update_campaign(
    campaign_service: web::Data<CampaignService>,
    caller: AuthenticatedUser,
    id: web::Path<i64>,
    req: web::Json<UpdateCampaignRequest>,
) -> Result<HttpResponse> {
    match campaign_service
        .update(&caller, id.into_inner(), req.into_inner())
        .await
    {
        Ok(detail) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": detail
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/campaigns/{id}",
    tag = "campaign",
    params(
        ("id" = i64, Path, description = "募捐活动 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "删除成功，已有捐款保留但不再关联活动"),
        (status = 403, description = "非创建者或管理员"),
        (status = 404, description = "活动不存在")
    )
)]
pub async fn delete_campaign(
    campaign_service: web::Data<CampaignService>,
    caller: AuthenticatedUser,
    id: web::Path<i64>,
) -> Result<HttpResponse> {
    match campaign_service.delete(&caller, id.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Campaign deleted"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn campaign_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/campaigns")
            .route("", web::get().to(list_campaigns))
            .route("", web::post().to(create_campaign))
            .route("/{id}", web::get().to(get_campaign))
            .route("/{id}", web::put().to(update_campaign))
            .route("/{id}", web::delete().to(delete_campaign))
            .route("/{id}/statistics", web::get().to(get_campaign_statistics)),
    );
}
