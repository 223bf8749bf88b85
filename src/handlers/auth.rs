use crate::models::AuthenticatedUser;
use crate::services::UserService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "当前用户资料，首次访问时同步到本地"),
        (status = 401, description = "未授权")
    )
)]
pub async fn me(
    user_service: web::Data<UserService>,
    caller: AuthenticatedUser,
) -> Result<HttpResponse> {
    match user_service.me(&caller).await {
        Ok(user) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": user
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn auth_config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/auth").route("/me", web::get().to(me)));
}
