use crate::error::AppResult;
use crate::models::{ApiResponse, ReadOutcome};
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;

pub mod admin;
pub mod auth;
pub mod blog_post;
pub mod campaign;
pub mod dashboard;
pub mod donation;
pub mod event;
pub mod lookup;
pub mod partnership;
pub mod team;
pub mod volunteer;

pub use admin::admin_config;
pub use auth::auth_config;
pub use blog_post::blog_post_config;
pub use campaign::campaign_config;
pub use dashboard::dashboard_config;
pub use donation::donation_config;
pub use event::event_config;
pub use lookup::lookup_config;
pub use partnership::partnership_config;
pub use team::team_config;
pub use volunteer::volunteer_config;

/// 读接口统一出口：降级结果带 `degraded` 与错误码，但仍是 200
pub(crate) fn read_response<T: Serialize>(result: AppResult<ReadOutcome<T>>) -> HttpResponse {
    match result {
        Ok(outcome) => HttpResponse::Ok().json(ApiResponse::from_outcome(outcome)),
        Err(e) => e.error_response(),
    }
}
