use crate::models::PartnershipInquiry;
use crate::services::PartnershipService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/partnership",
    tag = "partnership",
    request_body = PartnershipInquiry,
    responses(
        (status = 202, description = "咨询已受理，返回参考编号"),
        (status = 400, description = "参数错误"),
        (status = 500, description = "未配置收件人")
    )
)]
pub async fn submit_inquiry(
    partnership_service: web::Data<PartnershipService>,
    req: web::Json<PartnershipInquiry>,
) -> Result<HttpResponse> {
    match partnership_service.submit(req.into_inner()) {
        Ok(receipt) => Ok(HttpResponse::Accepted().json(json!({
            "success": true,
            "data": receipt,
            "message": "Thank you, our partnerships team will be in touch"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn partnership_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/partnership", web::post().to(submit_inquiry));
}
