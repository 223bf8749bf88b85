use super::read_response;
use crate::models::AuthenticatedUser;
use crate::services::DashboardService;
use actix_web::{HttpResponse, Result, web};

#[utoipa::path(
    get,
    path = "/dashboard/summary",
    tag = "dashboard",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "当前用户的捐赠与志愿服务汇总"),
        (status = 401, description = "未授权")
    )
)]
pub async fn get_summary(
    dashboard_service: web::Data<DashboardService>,
    caller: AuthenticatedUser,
) -> Result<HttpResponse> {
    Ok(read_response(dashboard_service.summary(&caller).await))
}

#[utoipa::path(
    get,
    path = "/dashboard/overview",
    tag = "dashboard",
    responses(
        (status = 200, description = "平台公开概览")
    )
)]
pub async fn get_overview(dashboard_service: web::Data<DashboardService>) -> Result<HttpResponse> {
    Ok(read_response(dashboard_service.overview().await))
}

pub fn dashboard_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/dashboard")
            .route("/summary", web::get().to(get_summary))
            .route("/overview", web::get().to(get_overview)),
    );
}
