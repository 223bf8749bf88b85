use super::read_response;
use crate::error::AppError;
use crate::models::LookupKind;
use crate::services::LookupService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use std::str::FromStr;

#[utoipa::path(
    get,
    path = "/lookups/{kind}",
    tag = "lookup",
    params(
        ("kind" = String, Path, description = "词表类型，如 campaign_category、payment_status")
    ),
    responses(
        (status = 200, description = "按 sort_order 排序的启用项"),
        (status = 400, description = "未知的词表类型")
    )
)]
pub async fn list_lookups(
    lookup_service: web::Data<LookupService>,
    kind: web::Path<String>,
) -> Result<HttpResponse> {
    let kind = match LookupKind::from_str(&kind) {
        Ok(kind) => kind,
        Err(msg) => return Ok(AppError::invalid("kind", msg).error_response()),
    };
    Ok(read_response(lookup_service.list(kind).await))
}

pub fn lookup_config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/lookups").route("/{kind}", web::get().to(list_lookups)));
}
