use super::read_response;
use crate::models::*;
use crate::services::DonationService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/donations",
    tag = "donation",
    params(
        ("campaign_id" = Option<i64>, Query, description = "按募捐活动过滤"),
        ("page" = Option<u32>, Query, description = "页码"),
        ("per_page" = Option<u32>, Query, description = "每页数量")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "捐款列表，匿名捐款不显示捐赠人"),
        (status = 401, description = "未授权")
    )
)]
pub async fn list_donations(
    donation_service: web::Data<DonationService>,
    _caller: AuthenticatedUser,
    query: web::Query<DonationQuery>,
) -> Result<HttpResponse> {
    Ok(read_response(donation_service.list(&query).await))
}

#[utoipa::path(
    get,
    path = "/donations/mine",
    tag = "donation",
    params(
        ("page" = Option<u32>, Query, description = "页码"),
        ("per_page" = Option<u32>, Query, description = "每页数量")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "当前用户的捐款记录"),
        (status = 401, description = "未授权")
    )
)]
pub async fn list_my_donations(
    donation_service: web::Data<DonationService>,
    caller: AuthenticatedUser,
    query: web::Query<DonationQuery>,
) -> Result<HttpResponse> {
    Ok(read_response(donation_service.list_mine(&caller, &query).await))
}

#[utoipa::path(
    get,
    path = "/donations/{id}",
    tag = "donation",
    params(
        ("id" = i64, Path, description = "捐款 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "捐款详情"),
        (status = 404, description = "捐款不存在")
    )
)]
pub async fn get_donation(
    donation_service: web::Data<DonationService>,
    _caller: AuthenticatedUser,
    id: web::Path<i64>,
) -> Result<HttpResponse> {
    match donation_service.get(id.into_inner()).await {
        Ok(donation) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": donation
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/donations",
    tag = "donation",
    request_body = CreateDonationRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "捐款已记录并计入活动统计"),
        (status = 400, description = "参数错误"),
        (status = 404, description = "募捐活动不存在")
    )
)]
pub async fn create_donation(
    donation_service: web::Data<DonationService>,
    caller: AuthenticatedUser,
    req: web::Json<CreateDonationRequest>,
) -> Result<HttpResponse> {
    match donation_service.create(&caller, req.into_inner()).await {
        Ok(donation) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": donation
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/donations/{id}",
    tag = "donation",
    params(
        ("id" = i64, Path, description = "捐款 ID")
    ),
    request_body = UpdateDonationRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "更新成功，金额差额同步到活动统计"),
        (status = 403, description = "非捐赠人或管理员"),
        (status = 404, description = "捐款不存在")
    )
)]
pub async fn update_donation(
    donation_service: web::Data<DonationService>,
    caller: AuthenticatedUser,
    id: web::Path<i64>,
    req: web::Json<UpdateDonationRequest>,
) -> Result<HttpResponse> {
    match donation_service
        .update(&caller, id.into_inner(), req.into_inner())
        .await
    {
        Ok(donation) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": donation
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/donations/{id}",
    tag = "donation",
    params(
        ("id" = i64, Path, description = "捐款 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "删除成功，活动统计同步扣减"),
        (status = 403, description = "非捐赠人或管理员"),
        (status = 404, description = "捐款不存在")
    )
)]
pub async fn delete_donation(
    donation_service: web::Data<DonationService>,
    caller: AuthenticatedUser,
    id: web::Path<i64>,
) -> Result<HttpResponse> {
    match donation_service.delete(&caller, id.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Donation deleted"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/donations/preferences",
    tag = "donation",
    request_body = DonorPreferencesRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "捐赠人偏好已更新"),
        (status = 401, description = "未授权")
    )
)]
pub async fn update_donor_preferences(
    donation_service: web::Data<DonationService>,
    caller: AuthenticatedUser,
    req: web::Json<DonorPreferencesRequest>,
) -> Result<HttpResponse> {
    match donation_service
        .update_donor_preferences(&caller, req.into_inner())
        .await
    {
        Ok(donor) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": donor
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn donation_config(cfg: &mut web::ServiceConfig) {
    // 固定路径需在 /{id} 之前注册
    cfg.service(
        web::scope("/donations")
            .route("", web::get().to(list_donations))
            .route("", web::post().to(create_donation))
            .route("/mine", web::get().to(list_my_donations))
            .route("/preferences", web::put().to(update_donor_preferences))
            .route("/{id}", web::get().to(get_donation))
            .route("/{id}", web::put().to(update_donation))
            .route("/{id}", web::delete().to(delete_donation)),
    );
}
