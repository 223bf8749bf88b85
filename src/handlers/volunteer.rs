use super::read_response;
use crate::models::*;
use crate::services::VolunteerService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/volunteers",
    tag = "volunteer",
    params(
        ("status" = Option<String>, Query, description = "志愿者状态名称"),
        ("page" = Option<u32>, Query, description = "页码"),
        ("per_page" = Option<u32>, Query, description = "每页数量")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "志愿者列表"),
        (status = 401, description = "未授权")
    )
)]
pub async fn list_volunteers(
    volunteer_service: web::Data<VolunteerService>,
    _caller: AuthenticatedUser,
    query: web::Query<VolunteerQuery>,
) -> Result<HttpResponse> {
    Ok(read_response(volunteer_service.list(&query).await))
}

#[utoipa::path(
    get,
    path = "/volunteers/{id}",
    tag = "volunteer",
    params(
        ("id" = i64, Path, description = "志愿者 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "志愿者详情，含统计"),
        (status = 404, description = "志愿者不存在")
    )
)]
pub async fn get_volunteer(
    volunteer_service: web::Data<VolunteerService>,
    _caller: AuthenticatedUser,
    id: web::Path<i64>,
) -> Result<HttpResponse> {
    match volunteer_service.get(id.into_inner()).await {
        Ok(volunteer) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": volunteer
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/volunteers",
    tag = "volunteer",
    request_body = CreateVolunteerRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "注册为志愿者"),
        (status = 400, description = "参数错误"),
        (status = 409, description = "已是志愿者")
    )
)]
pub async fn create_volunteer(
    volunteer_service: web::Data<VolunteerService>,
    caller: AuthenticatedUser,
    req: web::Json<CreateVolunteerRequest>,
) -> Result<HttpResponse> {
    match volunteer_service.create(&caller, req.into_inner()).await {
        Ok(volunteer) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": volunteer
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/volunteers/{id}",
    tag = "volunteer",
    params(
        ("id" = i64, Path, description = "志愿者 ID")
    ),
    request_body = UpdateVolunteerRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "更新成功"),
        (status = 403, description = "非本人或管理员"),
        (status = 404, description = "志愿者不存在")
    )
)]
pub async fn update_volunteer(
    volunteer_service: web::Data<VolunteerService>,
    caller: AuthenticatedUser,
    id: web::Path<i64>,
    req: web::Json<UpdateVolunteerRequest>,
) -> Result<HttpResponse> {
    match volunteer_service
        .update(&caller, id.into_inner(), req.into_inner())
        .await
    {
        Ok(volunteer) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": volunteer
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/volunteers/{id}",
    tag = "volunteer",
    params(
        ("id" = i64, Path, description = "志愿者 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "删除成功"),
        (status = 403, description = "非本人或管理员"),
        (status = 404, description = "志愿者不存在")
    )
)]
pub async fn delete_volunteer(
    volunteer_service: web::Data<VolunteerService>,
    caller: AuthenticatedUser,
    id: web::Path<i64>,
) -> Result<HttpResponse> {
    match volunteer_service.delete(&caller, id.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Volunteer deleted"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/volunteers/{id}/statistics",
    tag = "volunteer",
    params(
        ("id" = i64, Path, description = "志愿者 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "志愿服务统计"),
        (status = 404, description = "志愿者不存在")
    )
)]
pub async fn get_volunteer_statistics(
    volunteer_service: web::Data<VolunteerService>,
    _caller: AuthenticatedUser,
    id: web::Path<i64>,
) -> Result<HttpResponse> {
    match volunteer_service.statistics(id.into_inner()).await {
        Ok(stats) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": stats
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/volunteers/{id}/activities",
    tag = "volunteer",
    params(
        ("id" = i64, Path, description = "志愿者 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "服务记录，按日期倒序")
    )
)]
pub async fn list_activities(
    volunteer_service: web::Data<VolunteerService>,
    _caller: AuthenticatedUser,
    id: web::Path<i64>,
) -> Result<HttpResponse> {
    Ok(read_response(
        volunteer_service.activities(id.into_inner()).await,
    ))
}

#[utoipa::path(
    post,
    path = "/volunteers/{id}/activities",
    tag = "volunteer",
    params(
        ("id" = i64, Path, description = "志愿者 ID")
    ),
    request_body = LogActivityRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "记录成功，统计同步累加"),
        (status = 400, description = "时长不在 (0, 24] 内或关联项目/活动不存在"),
        (status = 403, description = "非本人或管理员")
    )
)]
pub async fn log_activity(
    volunteer_service: web::Data<VolunteerService>,
    caller: AuthenticatedUser,
    id: web::Path<i64>,
    req: web::Json<LogActivityRequest>,
) -> Result<HttpResponse> {
    match volunteer_service
        .log_activity(&caller, id.into_inner(), req.into_inner())
        .await
    {
        Ok(activity) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": activity
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/volunteer-activities/{id}",
    tag = "volunteer",
    params(
        ("id" = i64, Path, description = "服务记录 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "删除成功，统计同步扣减"),
        (status = 403, description = "非本人或管理员"),
        (status = 404, description = "记录不存在")
    )
)]
pub async fn delete_activity(
    volunteer_service: web::Data<VolunteerService>,
    caller: AuthenticatedUser,
    id: web::Path<i64>,
) -> Result<HttpResponse> {
    match volunteer_service
        .delete_activity(&caller, id.into_inner())
        .await
    {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Activity deleted"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn volunteer_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/volunteers")
            .route("", web::get().to(list_volunteers))
            .route("", web::post().to(create_volunteer))
            .route("/{id}", web::get().to(get_volunteer))
            .route("/{id}", web::put().to(update_volunteer))
            .route("/{id}", web::delete().to(delete_volunteer))
            .route("/{id}/statistics", web::get().to(get_volunteer_statistics))
            .route("/{id}/activities", web::get().to(list_activities))
            .route("/{id}/activities", web::post().to(log_activity)),
    )
    .service(
        web::scope("/volunteer-activities").route("/{id}", web::delete().to(delete_activity)),
    );
}
