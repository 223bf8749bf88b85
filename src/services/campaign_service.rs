use crate::entities::{
    campaign_entity as campaigns, campaign_statistics_entity as stats,
    donation_entity as donations, donor_entity as donors,
};
use crate::error::{AppError, AppResult};
use crate::models::{
    AuthenticatedUser, CampaignDetail, CampaignQuery, CampaignStatisticsResponse, CampaignSummary,
    CreateCampaignRequest, DonationResponse, LookupKind, PaginatedResponse, PaginationParams,
    RECENT_DONATIONS_LIMIT, ReadOutcome, UpdateCampaignRequest, names,
};
use crate::services::{LookupService, UserService};
use crate::utils::{Validate, validate_date_order};
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::Serialize;
use std::collections::HashMap;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReconcileReport {
    /// 重算统计的募捐活动数量
    pub campaigns: u64,
}

/// 平均捐款（四舍五入到分）与完成百分比（保留两位小数）
pub fn derived_figures(current_amount: i64, donations_count: i64, goal_amount: i64) -> (i64, f64) {
    let average = if donations_count > 0 {
        (current_amount as f64 / donations_count as f64).round() as i64
    } else {
        0
    };
    let completion = if goal_amount > 0 {
        (current_amount as f64 * 10_000.0 / goal_amount as f64).round() / 100.0
    } else {
        0.0
    };
    (average, completion)
}

#[derive(Clone)]
pub struct CampaignService {
    pool: DatabaseConnection,
}

impl CampaignService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 分页获取募捐活动；存储失败时降级为空页
    pub async fn list(
        &self,
        query: &CampaignQuery,
    ) -> AppResult<ReadOutcome<PaginatedResponse<CampaignSummary>>> {
        let params = PaginationParams::new(query.page, query.per_page);
        let result = self.fetch_page(query, &params).await;
        ReadOutcome::recover_with("campaigns.list", result, || PaginatedResponse::empty(&params))
    }

    async fn fetch_page(
        &self,
        query: &CampaignQuery,
        params: &PaginationParams,
    ) -> AppResult<PaginatedResponse<CampaignSummary>> {
        let mut select = campaigns::Entity::find();

        let filters = [
            (LookupKind::CampaignStatus, query.status.as_deref(), campaigns::Column::StatusId),
            (LookupKind::CampaignCategory, query.category.as_deref(), campaigns::Column::CategoryId),
            (LookupKind::UrgencyLevel, query.urgency.as_deref(), campaigns::Column::UrgencyLevelId),
        ];
        for (kind, name, column) in filters {
            let Some(name) = name else { continue };
            match LookupService::find_by_name(&self.pool, kind, name).await? {
                Some(row) => select = select.filter(column.eq(row.id)),
                // 未知的筛选值不会匹配任何活动
                None => return Ok(PaginatedResponse::empty(params)),
            }
        }
        if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            select = select.filter(campaigns::Column::Title.contains(search));
        }

        let total = select.clone().count(&self.pool).await?;
        let rows = select
            .order_by_desc(campaigns::Column::CreatedAt)
            .order_by_desc(campaigns::Column::Id)
            .limit(params.get_limit())
            .offset(params.get_offset())
            .all(&self.pool)
            .await?;

        let ids: Vec<i64> = rows.iter().map(|c| c.id).collect();
        let stats_by_campaign: HashMap<i64, stats::Model> = stats::Entity::find()
            .filter(stats::Column::CampaignId.is_in(ids))
            .all(&self.pool)
            .await?
            .into_iter()
            .map(|s| (s.campaign_id, s))
            .collect();
        let labels =
            LookupService::labels(&self.pool, rows.iter().flat_map(CampaignSummary::lookup_ids))
                .await?;

        let items = rows
            .into_iter()
            .map(|c| {
                let s = stats_by_campaign.get(&c.id);
                CampaignSummary::build(c, s, &labels)
            })
            .collect();
        Ok(PaginatedResponse::new(items, params, total))
    }

    /// 活动详情：参考数据、统计与最近捐款（匿名已脱敏）
    pub async fn get(&self, id: i64) -> AppResult<CampaignDetail> {
        let campaign = self.find(id).await?;
        let statistics = stats::Entity::find()
            .filter(stats::Column::CampaignId.eq(id))
            .one(&self.pool)
            .await?;

        let recent = donations::Entity::find()
            .filter(donations::Column::CampaignId.eq(id))
            .find_also_related(donors::Entity)
            .order_by_desc(donations::Column::DonatedAt)
            .order_by_desc(donations::Column::Id)
            .limit(RECENT_DONATIONS_LIMIT)
            .all(&self.pool)
            .await?;

        let lookup_ids = CampaignSummary::lookup_ids(&campaign)
            .into_iter()
            .chain(recent.iter().flat_map(|(d, _)| DonationResponse::lookup_ids(d)));
        let labels = LookupService::labels(&self.pool, lookup_ids).await?;

        let recent_donations = recent
            .into_iter()
            .map(|(d, donor)| {
                DonationResponse::build(d, donor.as_ref(), Some(campaign.title.clone()), &labels)
            })
            .collect();

        Ok(CampaignDetail::build(
            campaign,
            statistics.as_ref(),
            recent_donations,
            &labels,
        ))
    }

    pub async fn create(
        &self,
        caller: &AuthenticatedUser,
        req: CreateCampaignRequest,
    ) -> AppResult<CampaignDetail> {
        req.validate()?;
        let creator = UserService::ensure(&self.pool, caller).await?;

        let txn = self.pool.begin().await?;
        let category =
            LookupService::require(&txn, "category_id", LookupKind::CampaignCategory, req.category_id)
                .await?;
        let currency = LookupService::require_or_default(
            &txn,
            "currency_id",
            LookupKind::Currency,
            req.currency_id,
            names::CURRENCY_USD,
        )
        .await?;
        let status = LookupService::require_or_default(
            &txn,
            "status_id",
            LookupKind::CampaignStatus,
            req.status_id,
            names::CAMPAIGN_DRAFT,
        )
        .await?;
        let urgency = LookupService::require_optional(
            &txn,
            "urgency_level_id",
            LookupKind::UrgencyLevel,
            req.urgency_level_id,
        )
        .await?;

        let now = Utc::now();
        let created = campaigns::ActiveModel {
            title: Set(req.title.trim().to_string()),
            description: Set(req.description),
            goal_amount: Set(req.goal_amount),
            currency_id: Set(currency.id),
            category_id: Set(category.id),
            status_id: Set(status.id),
            urgency_level_id: Set(urgency.map(|u| u.id)),
            start_date: Set(req.start_date.unwrap_or_else(|| now.date_naive())),
            end_date: Set(req.end_date),
            target_beneficiaries: Set(req.target_beneficiaries),
            image_url: Set(req.image_url),
            created_by: Set(Some(creator.id)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;

        log::info!("Campaign {} created by user {}", created.id, creator.id);
        self.get(created.id).await
    }

    pub async fn update(
        &self,
        caller: &AuthenticatedUser,
        id: i64,
        req: UpdateCampaignRequest,
    ) -> AppResult<CampaignDetail> {
        req.validate()?;
        let caller_id = UserService::find_local(&self.pool, caller).await?.map(|u| u.id);

        let txn = self.pool.begin().await?;
        let campaign = campaigns::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::not_found("Campaign", id))?;
        UserService::authorize_owner(caller, caller_id, campaign.created_by)?;

        let start = req.start_date.unwrap_or(campaign.start_date);
        let end = req.end_date.or(campaign.end_date);
        validate_date_order("end_date", Some(start), end)?;

        let goal_changed = req.goal_amount.is_some_and(|g| g != campaign.goal_amount);
        let mut am = campaign.into_active_model();
        if let Some(title) = req.title {
            am.title = Set(title.trim().to_string());
        }
        if let Some(description) = req.description {
            am.description = Set(description);
        }
        if let Some(goal) = req.goal_amount {
            am.goal_amount = Set(goal);
        }
        if let Some(category_id) = req.category_id {
            LookupService::require(&txn, "category_id", LookupKind::CampaignCategory, category_id)
                .await?;
            am.category_id = Set(category_id);
        }
        if let Some(currency_id) = req.currency_id {
            LookupService::require(&txn, "currency_id", LookupKind::Currency, currency_id).await?;
            am.currency_id = Set(currency_id);
        }
        if let Some(status_id) = req.status_id {
            LookupService::require(&txn, "status_id", LookupKind::CampaignStatus, status_id).await?;
            am.status_id = Set(status_id);
        }
        if let Some(urgency_id) = req.urgency_level_id {
            LookupService::require(&txn, "urgency_level_id", LookupKind::UrgencyLevel, urgency_id)
                .await?;
            am.urgency_level_id = Set(Some(urgency_id));
        }
        if req.start_date.is_some() {
            am.start_date = Set(start);
        }
        if req.end_date.is_some() {
            am.end_date = Set(end);
        }
        if let Some(n) = req.target_beneficiaries {
            am.target_beneficiaries = Set(Some(n));
        }
        if let Some(url) = req.image_url {
            am.image_url = Set(Some(url));
        }
        am.updated_at = Set(Utc::now());
        am.update(&txn).await?;

        if goal_changed {
            Self::refresh_derived(&txn, id).await?;
        }
        txn.commit().await?;
        self.get(id).await
    }

    /// 删除活动；其捐款转入通用基金
    pub async fn delete(&self, caller: &AuthenticatedUser, id: i64) -> AppResult<()> {
        let caller_id = UserService::find_local(&self.pool, caller).await?.map(|u| u.id);
        let txn = self.pool.begin().await?;
        let campaign = campaigns::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::not_found("Campaign", id))?;
        UserService::authorize_owner(caller, caller_id, campaign.created_by)?;

        let moved = donations::Entity::update_many()
            .col_expr(donations::Column::CampaignId, Expr::value(Option::<i64>::None))
            .filter(donations::Column::CampaignId.eq(id))
            .exec(&txn)
            .await?;
        stats::Entity::delete_many()
            .filter(stats::Column::CampaignId.eq(id))
            .exec(&txn)
            .await?;
        campaigns::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;

        log::info!(
            "Campaign {id} deleted, {} donations moved to the general fund",
            moved.rows_affected
        );
        Ok(())
    }

    pub async fn statistics(&self, id: i64) -> AppResult<CampaignStatisticsResponse> {
        self.find(id).await?;
        let row = stats::Entity::find()
            .filter(stats::Column::CampaignId.eq(id))
            .one(&self.pool)
            .await?;
        Ok(CampaignStatisticsResponse::from_row(id, row.as_ref()))
    }

    /// 以捐款记录为准重建单个活动的统计
    pub async fn reconcile(&self, id: i64) -> AppResult<CampaignStatisticsResponse> {
        self.find(id).await?;
        let txn = self.pool.begin().await?;
        Self::rebuild_statistics(&txn, id).await?;
        txn.commit().await?;
        self.statistics(id).await
    }

    pub async fn reconcile_all(&self) -> AppResult<ReconcileReport> {
        let ids: Vec<i64> = campaigns::Entity::find()
            .select_only()
            .column(campaigns::Column::Id)
            .into_tuple()
            .all(&self.pool)
            .await?;

        let mut reconciled = 0u64;
        for id in ids {
            // 每个活动独立事务，单个失败不影响其它活动
            let txn = self.pool.begin().await?;
            match Self::rebuild_statistics(&txn, id).await {
                Ok(()) => {
                    txn.commit().await?;
                    reconciled += 1;
                }
                Err(e) => {
                    log::error!("Failed to reconcile statistics of campaign {id}: {e}");
                    txn.rollback().await?;
                }
            }
        }
        Ok(ReconcileReport {
            campaigns: reconciled,
        })
    }

    async fn find(&self, id: i64) -> AppResult<campaigns::Model> {
        campaigns::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::not_found("Campaign", id))
    }

    // -----------------------------
    // 统计维护（需在调用方事务内执行）
    // -----------------------------

    /// 统计行不存在则插入零值行
    async fn ensure_statistics_row<C: ConnectionTrait>(db: &C, campaign_id: i64) -> AppResult<()> {
        let row = stats::ActiveModel {
            campaign_id: Set(campaign_id),
            current_amount: Set(0),
            donations_count: Set(0),
            unique_donors_count: Set(0),
            average_donation: Set(0),
            completion_percentage: Set(0.0),
            last_donation_at: Set(None),
            updated_at: Set(Utc::now()),
            ..Default::default()
        };
        stats::Entity::insert(row)
            .on_conflict(
                OnConflict::column(stats::Column::CampaignId)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await?;
        Ok(())
    }

    /// 捐款增删改后调整统计：金额与笔数原子增减，再重算派生字段
    pub async fn apply_donation_delta<C: ConnectionTrait>(
        db: &C,
        campaign_id: i64,
        amount_delta: i64,
        count_delta: i64,
    ) -> AppResult<()> {
        Self::ensure_statistics_row(db, campaign_id).await?;
        stats::Entity::update_many()
            .col_expr(
                stats::Column::CurrentAmount,
                Expr::col(stats::Column::CurrentAmount).add(amount_delta),
            )
            .col_expr(
                stats::Column::DonationsCount,
                Expr::col(stats::Column::DonationsCount).add(count_delta),
            )
            .filter(stats::Column::CampaignId.eq(campaign_id))
            .exec(db)
            .await?;
        Self::refresh_derived(db, campaign_id).await
    }

    /// 重算去重捐赠人数、平均值、完成度与最后捐款时间
    async fn refresh_derived<C: ConnectionTrait>(db: &C, campaign_id: i64) -> AppResult<()> {
        let Some(row) = stats::Entity::find()
            .filter(stats::Column::CampaignId.eq(campaign_id))
            .one(db)
            .await?
        else {
            return Ok(());
        };
        let goal = campaigns::Entity::find_by_id(campaign_id)
            .one(db)
            .await?
            .map(|c| c.goal_amount)
            .unwrap_or(0);

        let unique_donors = Self::unique_donors(db, campaign_id).await?;
        let last_donation_at = Self::last_donation_at(db, campaign_id).await?;
        let (average, completion) = derived_figures(row.current_amount, row.donations_count, goal);

        let mut am = row.into_active_model();
        am.unique_donors_count = Set(unique_donors);
        am.average_donation = Set(average);
        am.completion_percentage = Set(completion);
        am.last_donation_at = Set(last_donation_at);
        am.updated_at = Set(Utc::now());
        am.update(db).await?;
        Ok(())
    }

    async fn rebuild_statistics<C: ConnectionTrait>(db: &C, campaign_id: i64) -> AppResult<()> {
        let amounts: Vec<i64> = donations::Entity::find()
            .select_only()
            .column(donations::Column::Amount)
            .filter(donations::Column::CampaignId.eq(campaign_id))
            .into_tuple()
            .all(db)
            .await?;
        let current_amount: i64 = amounts.iter().sum();
        let donations_count = amounts.len() as i64;

        Self::ensure_statistics_row(db, campaign_id).await?;
        stats::Entity::update_many()
            .col_expr(stats::Column::CurrentAmount, Expr::value(current_amount))
            .col_expr(stats::Column::DonationsCount, Expr::value(donations_count))
            .filter(stats::Column::CampaignId.eq(campaign_id))
            .exec(db)
            .await?;
        Self::refresh_derived(db, campaign_id).await
    }

    async fn unique_donors<C: ConnectionTrait>(db: &C, campaign_id: i64) -> AppResult<i64> {
        let count = donations::Entity::find()
            .select_only()
            .column(donations::Column::DonorId)
            .distinct()
            .filter(donations::Column::CampaignId.eq(campaign_id))
            .count(db)
            .await?;
        Ok(count as i64)
    }

    async fn last_donation_at<C: ConnectionTrait>(
        db: &C,
        campaign_id: i64,
    ) -> AppResult<Option<DateTime<Utc>>> {
        let latest = donations::Entity::find()
            .filter(donations::Column::CampaignId.eq(campaign_id))
            .order_by_desc(donations::Column::DonatedAt)
            .one(db)
            .await?;
        Ok(latest.map(|d| d.donated_at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_figures() {
        assert_eq!(derived_figures(8000, 2, 10_000), (4000, 80.0));
        assert_eq!(derived_figures(0, 0, 10_000), (0, 0.0));
        // 1/3 = 33.333...%
        assert_eq!(derived_figures(100, 3, 300), (33, 33.33));
        // 超额完成
        assert_eq!(derived_figures(15_000, 1, 10_000).1, 150.0);
    }
}
