use crate::entities::{
    campaign_entity as campaigns, donation_entity as donations, donor_entity as donors,
    user_entity as users,
};
use crate::error::{AppError, AppResult};
use crate::models::{
    AuthenticatedUser, CreateDonationRequest, DonationQuery, DonationResponse,
    DonorPreferencesRequest, DonorResponse, LookupKind, PaginatedResponse, PaginationParams,
    ReadOutcome, UpdateDonationRequest, names,
};
use crate::services::{CampaignService, LookupService, UserService};
use crate::utils::{Validate, compute_processing_fee};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set,
    TransactionTrait,
};
use std::collections::HashMap;

#[derive(Clone)]
pub struct DonationService {
    pool: DatabaseConnection,
}

impl DonationService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 捐款列表（可按活动筛选）
    pub async fn list(
        &self,
        query: &DonationQuery,
    ) -> AppResult<ReadOutcome<PaginatedResponse<DonationResponse>>> {
        let params = PaginationParams::new(query.page, query.per_page);
        let mut select = donations::Entity::find();
        if let Some(campaign_id) = query.campaign_id {
            select = select.filter(donations::Column::CampaignId.eq(campaign_id));
        }
        let result = self.fetch_page(select, &params).await;
        ReadOutcome::recover_with("donations.list", result, || PaginatedResponse::empty(&params))
    }

    /// 当前用户自己的捐款
    pub async fn list_mine(
        &self,
        caller: &AuthenticatedUser,
        query: &DonationQuery,
    ) -> AppResult<ReadOutcome<PaginatedResponse<DonationResponse>>> {
        let params = PaginationParams::new(query.page, query.per_page);
        let result = self.fetch_mine(caller, query, &params).await;
        ReadOutcome::recover_with("donations.list_mine", result, || {
            PaginatedResponse::empty(&params)
        })
    }

    async fn fetch_mine(
        &self,
        caller: &AuthenticatedUser,
        query: &DonationQuery,
        params: &PaginationParams,
    ) -> AppResult<PaginatedResponse<DonationResponse>> {
        let Some(donor) = self.find_donor_of(caller).await? else {
            return Ok(PaginatedResponse::empty(params));
        };
        let mut select = donations::Entity::find().filter(donations::Column::DonorId.eq(donor.id));
        if let Some(campaign_id) = query.campaign_id {
            select = select.filter(donations::Column::CampaignId.eq(campaign_id));
        }
        self.fetch_page(select, params).await
    }

    async fn fetch_page(
        &self,
        select: Select<donations::Entity>,
        params: &PaginationParams,
    ) -> AppResult<PaginatedResponse<DonationResponse>> {
        let total = select.clone().count(&self.pool).await?;
        let rows = select
            .find_also_related(donors::Entity)
            .order_by_desc(donations::Column::DonatedAt)
            .order_by_desc(donations::Column::Id)
            .limit(params.get_limit())
            .offset(params.get_offset())
            .all(&self.pool)
            .await?;
        let items = Self::shape(&self.pool, rows).await?;
        Ok(PaginatedResponse::new(items, params, total))
    }

    /// 行转换为响应：批量取活动标题与参考数据
    pub(crate) async fn shape<C: ConnectionTrait>(
        db: &C,
        rows: Vec<(donations::Model, Option<donors::Model>)>,
    ) -> AppResult<Vec<DonationResponse>> {
        let campaign_ids: Vec<i64> = rows.iter().filter_map(|(d, _)| d.campaign_id).collect();
        let titles: HashMap<i64, String> = if campaign_ids.is_empty() {
            HashMap::new()
        } else {
            campaigns::Entity::find()
                .filter(campaigns::Column::Id.is_in(campaign_ids))
                .all(db)
                .await?
                .into_iter()
                .map(|c| (c.id, c.title))
                .collect()
        };
        let labels =
            LookupService::labels(db, rows.iter().flat_map(|(d, _)| DonationResponse::lookup_ids(d)))
                .await?;

        Ok(rows
            .into_iter()
            .map(|(d, donor)| {
                let title = d.campaign_id.and_then(|id| titles.get(&id).cloned());
                DonationResponse::build(d, donor.as_ref(), title, &labels)
            })
            .collect())
    }

    pub async fn get(&self, id: i64) -> AppResult<DonationResponse> {
        let row = donations::Entity::find_by_id(id)
            .find_also_related(donors::Entity)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::not_found("Donation", id))?;
        Self::shape(&self.pool, vec![row])
            .await?
            .pop()
            .ok_or_else(|| AppError::not_found("Donation", id))
    }

    /// 创建捐款
    ///
    /// 1. 校验金额与参考数据
    /// 2. upsert 当前用户对应的捐赠人
    /// 3. 计算手续费与净额后写入捐款
    /// 4. 同一事务内更新活动统计
    pub async fn create(
        &self,
        caller: &AuthenticatedUser,
        req: CreateDonationRequest,
    ) -> AppResult<DonationResponse> {
        req.validate()?;
        let user = UserService::ensure(&self.pool, caller).await?;

        let txn = self.pool.begin().await?;
        if let Some(campaign_id) = req.campaign_id
            && campaigns::Entity::find_by_id(campaign_id).one(&txn).await?.is_none()
        {
            return Err(AppError::not_found("Campaign", campaign_id));
        }
        let currency = LookupService::require_or_default(
            &txn,
            "currency_id",
            LookupKind::Currency,
            req.currency_id,
            names::CURRENCY_USD,
        )
        .await?;
        let method = LookupService::require_or_default(
            &txn,
            "payment_method_id",
            LookupKind::PaymentMethod,
            req.payment_method_id,
            names::PAYMENT_CARD,
        )
        .await?;
        let status = LookupService::require_or_default(
            &txn,
            "payment_status_id",
            LookupKind::PaymentStatus,
            req.payment_status_id,
            names::PAYMENT_PENDING,
        )
        .await?;
        let frequency = LookupService::require_optional(
            &txn,
            "frequency_id",
            LookupKind::DonationFrequency,
            req.frequency_id,
        )
        .await?;

        let donor = Self::ensure_donor(&txn, &user).await?;
        let fee = compute_processing_fee(req.amount);
        let now = Utc::now();

        let donation = donations::ActiveModel {
            amount: Set(req.amount),
            currency_id: Set(currency.id),
            donor_id: Set(donor.id),
            campaign_id: Set(req.campaign_id),
            payment_method_id: Set(method.id),
            payment_status_id: Set(status.id),
            is_anonymous: Set(req.is_anonymous),
            is_recurring: Set(req.is_recurring),
            frequency_id: Set(frequency.map(|f| f.id)),
            processing_fee: Set(fee.processing_fee),
            net_amount: Set(fee.net_amount),
            message: Set(req.message),
            donated_at: Set(now),
            processed_at: Set((status.name == names::PAYMENT_COMPLETED).then_some(now)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        if let Some(campaign_id) = donation.campaign_id {
            CampaignService::apply_donation_delta(&txn, campaign_id, donation.amount, 1).await?;
        }
        txn.commit().await?;

        log::info!(
            "Donation {} of {} cents recorded for campaign {:?}",
            donation.id,
            donation.amount,
            donation.campaign_id
        );
        self.get(donation.id).await
    }

    /// 修改捐款；金额变化按差值调整活动统计
    pub async fn update(
        &self,
        caller: &AuthenticatedUser,
        id: i64,
        req: UpdateDonationRequest,
    ) -> AppResult<DonationResponse> {
        req.validate()?;
        let caller_id = UserService::find_local(&self.pool, caller).await?.map(|u| u.id);

        let txn = self.pool.begin().await?;
        let (donation, donor) = Self::find_with_donor(&txn, id).await?;
        UserService::authorize_owner(caller, caller_id, donor.as_ref().and_then(|d| d.user_id))?;

        let old_amount = donation.amount;
        let campaign_id = donation.campaign_id;
        let already_processed = donation.processed_at.is_some();
        let mut am = donation.into_active_model();
        let now = Utc::now();

        if let Some(amount) = req.amount {
            let fee = compute_processing_fee(amount);
            am.amount = Set(amount);
            am.processing_fee = Set(fee.processing_fee);
            am.net_amount = Set(fee.net_amount);
        }
        if let Some(status_id) = req.payment_status_id {
            let status =
                LookupService::require(&txn, "payment_status_id", LookupKind::PaymentStatus, status_id)
                    .await?;
            am.payment_status_id = Set(status.id);
            if status.name == names::PAYMENT_COMPLETED && !already_processed {
                am.processed_at = Set(Some(now));
            }
        }
        if let Some(anonymous) = req.is_anonymous {
            am.is_anonymous = Set(anonymous);
        }
        if let Some(message) = req.message {
            am.message = Set(Some(message));
        }
        am.updated_at = Set(now);
        let updated = am.update(&txn).await?;

        let delta = updated.amount - old_amount;
        if let Some(campaign_id) = campaign_id
            && delta != 0
        {
            CampaignService::apply_donation_delta(&txn, campaign_id, delta, 0).await?;
        }
        txn.commit().await?;
        self.get(id).await
    }

    /// 删除捐款并对称扣减活动统计
    pub async fn delete(&self, caller: &AuthenticatedUser, id: i64) -> AppResult<()> {
        let caller_id = UserService::find_local(&self.pool, caller).await?.map(|u| u.id);

        let txn = self.pool.begin().await?;
        let (donation, donor) = Self::find_with_donor(&txn, id).await?;
        UserService::authorize_owner(caller, caller_id, donor.as_ref().and_then(|d| d.user_id))?;

        donations::Entity::delete_by_id(id).exec(&txn).await?;
        if let Some(campaign_id) = donation.campaign_id {
            CampaignService::apply_donation_delta(&txn, campaign_id, -donation.amount, -1).await?;
        }
        txn.commit().await?;
        log::info!("Donation {id} deleted");
        Ok(())
    }

    /// 更新捐赠人的匿名偏好与展示名
    pub async fn update_donor_preferences(
        &self,
        caller: &AuthenticatedUser,
        req: DonorPreferencesRequest,
    ) -> AppResult<DonorResponse> {
        req.validate()?;
        let user = UserService::ensure(&self.pool, caller).await?;
        let txn = self.pool.begin().await?;
        let donor = Self::ensure_donor(&txn, &user).await?;

        let mut am = donor.into_active_model();
        if let Some(anonymous) = req.is_anonymous {
            am.is_anonymous = Set(anonymous);
        }
        if let Some(name) = req.display_name {
            am.display_name = Set(name.trim().to_string());
        }
        am.updated_at = Set(Utc::now());
        let updated = am.update(&txn).await?;
        txn.commit().await?;
        Ok(updated.into())
    }

    async fn find_with_donor<C: ConnectionTrait>(
        db: &C,
        id: i64,
    ) -> AppResult<(donations::Model, Option<donors::Model>)> {
        donations::Entity::find_by_id(id)
            .find_also_related(donors::Entity)
            .one(db)
            .await?
            .ok_or_else(|| AppError::not_found("Donation", id))
    }

    async fn find_donor_of(&self, caller: &AuthenticatedUser) -> AppResult<Option<donors::Model>> {
        let Some(user) = UserService::find_local(&self.pool, caller).await? else {
            return Ok(None);
        };
        let donor = donors::Entity::find()
            .filter(donors::Column::UserId.eq(user.id))
            .one(&self.pool)
            .await?;
        Ok(donor)
    }

    /// 用户对应的捐赠人，不存在则创建
    pub(crate) async fn ensure_donor<C: ConnectionTrait>(
        db: &C,
        user: &users::Model,
    ) -> AppResult<donors::Model> {
        if let Some(donor) = donors::Entity::find()
            .filter(donors::Column::UserId.eq(user.id))
            .one(db)
            .await?
        {
            return Ok(donor);
        }
        let now = Utc::now();
        let donor = donors::ActiveModel {
            user_id: Set(Some(user.id)),
            display_name: Set(user.display_name()),
            email: Set(user.email.clone()),
            is_anonymous: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await?;
        Ok(donor)
    }
}
