use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::DonationResponse;

/// 个人面板展示的最近捐款条数
pub const DASHBOARD_RECENT_DONATIONS: u64 = 5;

/// 当前用户的捐赠/志愿汇总
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct DashboardSummary {
    /// 累计捐款（美分）
    pub total_donated: i64,
    pub donations_count: i64,
    pub campaigns_supported: i64,
    pub volunteer_hours: f64,
    pub volunteer_activities: i64,
    pub upcoming_registrations: Vec<UpcomingRegistration>,
    pub recent_donations: Vec<DonationResponse>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UpcomingRegistration {
    pub event_id: i64,
    pub title: String,
    pub starts_at: DateTime<Utc>,
}

/// 平台公开概览
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct PlatformOverview {
    /// 累计筹款（美分）
    pub total_raised: i64,
    pub active_campaigns: u64,
    pub total_donations: u64,
    pub total_volunteers: u64,
    pub upcoming_events: u64,
}
