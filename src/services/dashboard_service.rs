use crate::entities::{
    campaign_entity as campaigns, campaign_statistics_entity as campaign_stats,
    donation_entity as donations, donor_entity as donors, event_entity as events,
    event_registration_entity as registrations, volunteer_entity as volunteers,
    volunteer_statistics_entity as volunteer_stats,
};
use crate::error::AppResult;
use crate::models::{
    AuthenticatedUser, DASHBOARD_RECENT_DONATIONS, DashboardSummary, LookupKind, PlatformOverview,
    ReadOutcome, UpcomingRegistration, names,
};
use crate::services::{DonationService, LookupService, UserService, VolunteerService};
use chrono::Utc;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};

#[derive(Clone)]
pub struct DashboardService {
    pool: DatabaseConnection,
}

impl DashboardService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 当前用户的捐赠与志愿服务汇总
    pub async fn summary(
        &self,
        caller: &AuthenticatedUser,
    ) -> AppResult<ReadOutcome<DashboardSummary>> {
        let result = self.build_summary(caller).await;
        ReadOutcome::recover("dashboard.summary", result)
    }

    async fn build_summary(&self, caller: &AuthenticatedUser) -> AppResult<DashboardSummary> {
        let Some(user) = UserService::find_local(&self.pool, caller).await? else {
            return Ok(DashboardSummary::default());
        };
        let mut summary = DashboardSummary::default();

        let donor = donors::Entity::find()
            .filter(donors::Column::UserId.eq(user.id))
            .one(&self.pool)
            .await?;
        if let Some(donor) = donor {
            let amounts: Vec<(i64, Option<i64>)> = donations::Entity::find()
                .select_only()
                .column(donations::Column::Amount)
                .column(donations::Column::CampaignId)
                .filter(donations::Column::DonorId.eq(donor.id))
                .into_tuple()
                .all(&self.pool)
                .await?;
            summary.total_donated = amounts.iter().map(|(a, _)| a).sum();
            summary.donations_count = amounts.len() as i64;
            let mut supported: Vec<i64> = amounts.iter().filter_map(|(_, c)| *c).collect();
            supported.sort_unstable();
            supported.dedup();
            summary.campaigns_supported = supported.len() as i64;

            let recent = donations::Entity::find()
                .filter(donations::Column::DonorId.eq(donor.id))
                .find_also_related(donors::Entity)
                .order_by_desc(donations::Column::DonatedAt)
                .order_by_desc(donations::Column::Id)
                .limit(DASHBOARD_RECENT_DONATIONS)
                .all(&self.pool)
                .await?;
            summary.recent_donations = DonationService::shape(&self.pool, recent).await?;
        }

        if let Some(volunteer) = VolunteerService::find_by_user(&self.pool, user.id).await? {
            let stats = volunteer_stats::Entity::find()
                .filter(volunteer_stats::Column::VolunteerId.eq(volunteer.id))
                .one(&self.pool)
                .await?;
            if let Some(stats) = stats {
                summary.volunteer_hours = stats.total_hours;
                summary.volunteer_activities = stats.activities_count;
            }
        }

        let now = Utc::now();
        let upcoming = registrations::Entity::find()
            .filter(registrations::Column::UserId.eq(user.id))
            .filter(registrations::Column::CancelledAt.is_null())
            .find_also_related(events::Entity)
            .filter(events::Column::StartsAt.gt(now))
            .order_by_asc(events::Column::StartsAt)
            .all(&self.pool)
            .await?;
        summary.upcoming_registrations = upcoming
            .into_iter()
            .filter_map(|(_, event)| event)
            .map(|e| UpcomingRegistration {
                event_id: e.id,
                title: e.title,
                starts_at: e.starts_at,
            })
            .collect();

        Ok(summary)
    }

    /// 平台公开概览
    pub async fn overview(&self) -> AppResult<ReadOutcome<PlatformOverview>> {
        let result = self.build_overview().await;
        ReadOutcome::recover("dashboard.overview", result)
    }

    async fn build_overview(&self) -> AppResult<PlatformOverview> {
        let raised: Vec<i64> = campaign_stats::Entity::find()
            .select_only()
            .column(campaign_stats::Column::CurrentAmount)
            .into_tuple()
            .all(&self.pool)
            .await?;

        let active_campaigns =
            match LookupService::find_by_name(&self.pool, LookupKind::CampaignStatus, names::CAMPAIGN_ACTIVE)
                .await?
            {
                Some(active) => {
                    campaigns::Entity::find()
                        .filter(campaigns::Column::StatusId.eq(active.id))
                        .count(&self.pool)
                        .await?
                }
                None => 0,
            };

        Ok(PlatformOverview {
            total_raised: raised.iter().sum(),
            active_campaigns,
            total_donations: donations::Entity::find().count(&self.pool).await?,
            total_volunteers: volunteers::Entity::find().count(&self.pool).await?,
            upcoming_events: events::Entity::find()
                .filter(events::Column::StartsAt.gt(Utc::now()))
                .count(&self.pool)
                .await?,
        })
    }
}
