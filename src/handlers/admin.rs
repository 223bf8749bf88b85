use crate::database::seed_reference_data;
use crate::models::AuthenticatedUser;
use crate::services::CampaignService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use sea_orm::DatabaseConnection;
use serde_json::json;

#[utoipa::path(
    post,
    path = "/admin/seed",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "参考数据已补齐，已存在的行保持不变"),
        (status = 403, description = "需要管理员权限")
    )
)]
pub async fn reseed(
    pool: web::Data<DatabaseConnection>,
    caller: AuthenticatedUser,
) -> Result<HttpResponse> {
    if let Err(e) = caller.require_admin() {
        return Ok(e.error_response());
    }
    match seed_reference_data(pool.get_ref()).await {
        Ok(report) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": report,
            "message": "Reference data seeded"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/statistics/reconcile",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "全部募捐活动统计已按捐款记录重算"),
        (status = 403, description = "需要管理员权限")
    )
)]
pub async fn reconcile_all(
    campaign_service: web::Data<CampaignService>,
    caller: AuthenticatedUser,
) -> Result<HttpResponse> {
    if let Err(e) = caller.require_admin() {
        return Ok(e.error_response());
    }
    match campaign_service.reconcile_all().await {
        Ok(report) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": report
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/campaigns/{id}/reconcile",
    tag = "admin",
    params(
        ("id" = i64, Path, description = "募捐活动 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "该活动统计已重算"),
        (status = 403, description = "需要管理员权限"),
        (status = 404, description = "活动不存在")
    )
)]
pub async fn reconcile_campaign(
    campaign_service: web::Data<CampaignService>,
    caller: AuthenticatedUser,
    id: web::Path<i64>,
) -> Result<HttpResponse> {
    if let Err(e) = caller.require_admin() {
        return Ok(e.error_response());
    }
    match campaign_service.reconcile(id.into_inner()).await {
        Ok(stats) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": stats
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn admin_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .route("/seed", web::post().to(reseed))
            .route("/statistics/reconcile", web::post().to(reconcile_all))
            .route("/campaigns/{id}/reconcile", web::post().to(reconcile_campaign)),
    );
}
