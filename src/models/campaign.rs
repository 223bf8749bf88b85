use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{DonationResponse, LookupLabels, LookupRef};
use crate::entities::{campaign_entity, campaign_statistics_entity};
use crate::error::AppResult;
use crate::utils::{
    Validate, optional_text, require_positive, require_text, validate_date_order, validate_url,
};

/// 详情页展示的最近捐款条数
pub const RECENT_DONATIONS_LIMIT: u64 = 10;

/// 募捐活动列表查询参数，status/category/urgency 使用词表名称
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct CampaignQuery {
    pub status: Option<String>,
    pub category: Option<String>,
    pub urgency: Option<String>,
    /// 标题模糊搜索
    pub search: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct CreateCampaignRequest {
    pub title: String,
    pub description: String,
    /// 目标金额（美分）
    pub goal_amount: i64,
    pub category_id: i64,
    /// 默认 usd
    pub currency_id: Option<i64>,
    /// 默认 draft
    pub status_id: Option<i64>,
    pub urgency_level_id: Option<i64>,
    /// 默认当天
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub target_beneficiaries: Option<i32>,
    pub image_url: Option<String>,
}

impl Validate for CreateCampaignRequest {
    fn validate(&self) -> AppResult<()> {
        require_text("title", &self.title, 3, 200)?;
        require_text("description", &self.description, 1, 10_000)?;
        require_positive("goal_amount", self.goal_amount)?;
        if let Some(n) = self.target_beneficiaries {
            require_positive("target_beneficiaries", n as i64)?;
        }
        let start = self.start_date.or_else(|| Some(Utc::now().date_naive()));
        validate_date_order("end_date", start, self.end_date)?;
        validate_url("image_url", self.image_url.as_deref())
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateCampaignRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub goal_amount: Option<i64>,
    pub category_id: Option<i64>,
    pub currency_id: Option<i64>,
    pub status_id: Option<i64>,
    pub urgency_level_id: Option<i64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub target_beneficiaries: Option<i32>,
    pub image_url: Option<String>,
}

impl Validate for UpdateCampaignRequest {
    fn validate(&self) -> AppResult<()> {
        if let Some(title) = &self.title {
            require_text("title", title, 3, 200)?;
        }
        if let Some(description) = &self.description {
            require_text("description", description, 1, 10_000)?;
        }
        if let Some(goal) = self.goal_amount {
            require_positive("goal_amount", goal)?;
        }
        optional_text("image_url", self.image_url.as_deref(), 2048)?;
        validate_url("image_url", self.image_url.as_deref())
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CampaignStatisticsResponse {
    pub campaign_id: i64,
    /// 已筹金额（美分）
    pub current_amount: i64,
    pub donations_count: i64,
    pub unique_donors_count: i64,
    pub average_donation: i64,
    pub completion_percentage: f64,
    pub last_donation_at: Option<DateTime<Utc>>,
}

impl CampaignStatisticsResponse {
    /// 尚无捐款时的零值
    pub fn empty(campaign_id: i64) -> Self {
        CampaignStatisticsResponse {
            campaign_id,
            current_amount: 0,
            donations_count: 0,
            unique_donors_count: 0,
            average_donation: 0,
            completion_percentage: 0.0,
            last_donation_at: None,
        }
    }

    pub fn from_row(campaign_id: i64, row: Option<&campaign_statistics_entity::Model>) -> Self {
        match row {
            Some(s) => CampaignStatisticsResponse {
                campaign_id,
                current_amount: s.current_amount,
                donations_count: s.donations_count,
                unique_donors_count: s.unique_donors_count,
                average_donation: s.average_donation,
                completion_percentage: s.completion_percentage,
                last_donation_at: s.last_donation_at,
            },
            None => Self::empty(campaign_id),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CampaignSummary {
    pub id: i64,
    pub title: String,
    pub goal_amount: i64,
    pub current_amount: i64,
    pub donations_count: i64,
    pub completion_percentage: f64,
    pub currency: Option<LookupRef>,
    pub category: Option<LookupRef>,
    pub status: Option<LookupRef>,
    pub urgency_level: Option<LookupRef>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub image_url: Option<String>,
}

impl CampaignSummary {
    pub fn build(
        m: campaign_entity::Model,
        stats: Option<&campaign_statistics_entity::Model>,
        labels: &LookupLabels,
    ) -> Self {
        let stats = CampaignStatisticsResponse::from_row(m.id, stats);
        CampaignSummary {
            id: m.id,
            title: m.title,
            goal_amount: m.goal_amount,
            current_amount: stats.current_amount,
            donations_count: stats.donations_count,
            completion_percentage: stats.completion_percentage,
            currency: labels.get(Some(m.currency_id)),
            category: labels.get(Some(m.category_id)),
            status: labels.get(Some(m.status_id)),
            urgency_level: labels.get(m.urgency_level_id),
            start_date: m.start_date,
            end_date: m.end_date,
            image_url: m.image_url,
        }
    }

    pub fn lookup_ids(m: &campaign_entity::Model) -> [Option<i64>; 4] {
        [
            Some(m.currency_id),
            Some(m.category_id),
            Some(m.status_id),
            m.urgency_level_id,
        ]
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CampaignDetail {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub goal_amount: i64,
    pub currency: Option<LookupRef>,
    pub category: Option<LookupRef>,
    pub status: Option<LookupRef>,
    pub urgency_level: Option<LookupRef>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub target_beneficiaries: Option<i32>,
    pub image_url: Option<String>,
    pub created_by: Option<i64>,
    pub statistics: CampaignStatisticsResponse,
    /// 最近的捐款，匿名捐款已脱敏
    pub recent_donations: Vec<DonationResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CampaignDetail {
    pub fn build(
        m: campaign_entity::Model,
        stats: Option<&campaign_statistics_entity::Model>,
        recent_donations: Vec<DonationResponse>,
        labels: &LookupLabels,
    ) -> Self {
        CampaignDetail {
            statistics: CampaignStatisticsResponse::from_row(m.id, stats),
            currency: labels.get(Some(m.currency_id)),
            category: labels.get(Some(m.category_id)),
            status: labels.get(Some(m.status_id)),
            urgency_level: labels.get(m.urgency_level_id),
            id: m.id,
            title: m.title,
            description: m.description,
            goal_amount: m.goal_amount,
            start_date: m.start_date,
            end_date: m.end_date,
            target_beneficiaries: m.target_beneficiaries,
            image_url: m.image_url,
            created_by: m.created_by,
            recent_donations,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_validation() {
        let mut req = CreateCampaignRequest {
            title: "Clean water for Kibera".into(),
            description: "Wells and filters".into(),
            goal_amount: 1_000_000,
            category_id: 1,
            start_date: NaiveDate::from_ymd_opt(2025, 3, 1),
            end_date: NaiveDate::from_ymd_opt(2025, 6, 1),
            ..Default::default()
        };
        assert!(req.validate().is_ok());

        req.goal_amount = 0;
        assert!(req.validate().is_err());

        req.goal_amount = 100;
        req.end_date = NaiveDate::from_ymd_opt(2025, 2, 1);
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_statistics_default_when_missing() {
        let stats = CampaignStatisticsResponse::from_row(5, None);
        assert_eq!(stats.campaign_id, 5);
        assert_eq!(stats.current_amount, 0);
        assert_eq!(stats.completion_percentage, 0.0);
    }
}
