use super::read_response;
use crate::models::*;
use crate::services::TeamService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/teams",
    tag = "team",
    params(
        ("category" = Option<String>, Query, description = "团队分类名称"),
        ("status" = Option<String>, Query, description = "团队状态名称"),
        ("page" = Option<u32>, Query, description = "页码"),
        ("per_page" = Option<u32>, Query, description = "每页数量")
    ),
    responses(
        (status = 200, description = "团队列表")
    )
)]
pub async fn list_teams(
    team_service: web::Data<TeamService>,
    query: web::Query<TeamQuery>,
) -> Result<HttpResponse> {
    Ok(read_response(team_service.list(&query).await))
}

#[utoipa::path(
    get,
    path = "/teams/{id}",
    tag = "team",
    params(
        ("id" = i64, Path, description = "团队 ID")
    ),
    responses(
        (status = 200, description = "团队详情，含成员与项目"),
        (status = 404, description = "团队不存在")
    )
)]
pub async fn get_team(
    team_service: web::Data<TeamService>,
    id: web::Path<i64>,
) -> Result<HttpResponse> {
    match team_service.get(id.into_inner()).await {
        Ok(team) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": team
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/teams",
    tag = "team",
    request_body = CreateTeamRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "创建成功，创建者为队长并自动加入"),
        (status = 400, description = "参数错误")
    )
)]
pub async fn create_team(
    team_service: web::Data<TeamService>,
    caller: AuthenticatedUser,
    req: web::Json<CreateTeamRequest>,
) -> Result<HttpResponse> {
    match team_service.create(&caller, req.into_inner()).await {
        Ok(team) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": team
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/teams/{id}",
    tag = "team",
    params(
        ("id" = i64, Path, description = "团队 ID")
    ),
    request_body = UpdateTeamRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "更新成功"),
        (status = 403, description = "非队长或管理员"),
        (status = 404, description = "团队不存在")
    )
)]
pub async fn update_team(
    team_service: web::Data<TeamService>,
    caller: AuthenticatedUser,
    id: web::Path<i64>,
    req: web::Json<UpdateTeamRequest>,
) -> Result<HttpResponse> {
    match team_service
        .update(&caller, id.into_inner(), req.into_inner())
        .await
    {
        Ok(team) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": team
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/teams/{id}",
    tag = "team",
    params(
        ("id" = i64, Path, description = "团队 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "删除成功"),
        (status = 403, description = "非队长或管理员"),
        (status = 404, description = "团队不存在")
    )
)]
pub async fn delete_team(
    team_service: web::Data<TeamService>,
    caller: AuthenticatedUser,
    id: web::Path<i64>,
) -> Result<HttpResponse> {
    match team_service.delete(&caller, id.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Team deleted"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/teams/{id}/join",
    tag = "team",
    params(
        ("id" = i64, Path, description = "团队 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "加入成功"),
        (status = 409, description = "团队已满或已是成员")
    )
)]
pub async fn join_team(
    team_service: web::Data<TeamService>,
    caller: AuthenticatedUser,
    id: web::Path<i64>,
) -> Result<HttpResponse> {
    match team_service.join(&caller, id.into_inner()).await {
        Ok(team) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": team
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/teams/{id}/leave",
    tag = "team",
    params(
        ("id" = i64, Path, description = "团队 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "已退出团队"),
        (status = 404, description = "不是该团队成员"),
        (status = 409, description = "队长不能退出")
    )
)]
pub async fn leave_team(
    team_service: web::Data<TeamService>,
    caller: AuthenticatedUser,
    id: web::Path<i64>,
) -> Result<HttpResponse> {
    match team_service.leave(&caller, id.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Left team"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/teams/{id}/projects",
    tag = "team",
    params(
        ("id" = i64, Path, description = "团队 ID")
    ),
    responses(
        (status = 200, description = "团队项目列表")
    )
)]
pub async fn list_projects(
    team_service: web::Data<TeamService>,
    id: web::Path<i64>,
) -> Result<HttpResponse> {
    Ok(read_response(team_service.projects(id.into_inner()).await))
}

#[utoipa::path(
    post,
    path = "/teams/{id}/projects",
    tag = "team",
    params(
        ("id" = i64, Path, description = "团队 ID")
    ),
    request_body = CreateProjectRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "项目已创建"),
        (status = 403, description = "非队长或管理员")
    )
)]
pub async fn create_project(
    team_service: web::Data<TeamService>,
    caller: AuthenticatedUser,
    id: web::Path<i64>,
    req: web::Json<CreateProjectRequest>,
) -> Result<HttpResponse> {
    match team_service
        .create_project(&caller, id.into_inner(), req.into_inner())
        .await
    {
        Ok(project) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": project
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn team_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/teams")
            .route("", web::get().to(list_teams))
            .route("", web::post().to(create_team))
            .route("/{id}", web::get().to(get_team))
            .route("/{id}", web::put().to(update_team))
            .route("/{id}", web::delete().to(delete_team))
            .route("/{id}/join", web::post().to(join_team))
            .route("/{id}/leave", web::post().to(leave_team))
            .route("/{id}/projects", web::get().to(list_projects))
            .route("/{id}/projects", web::post().to(create_project)),
    );
}
