use crate::entities::{
    address_entity as addresses, event_entity as events, event_registration_entity as registrations,
    user_entity as users,
};
use crate::error::{AppError, AppResult};
use crate::models::{
    AddressInput, AuthenticatedUser, CreateEventRequest, EventQuery, EventResponse, LookupKind,
    PaginatedResponse, PaginationParams, ReadOutcome, RegistrationResponse, UpdateEventRequest,
    names,
};
use crate::services::{ActivityLink, LookupService, UserService, VolunteerService};
use crate::utils::Validate;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Condition, Expr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use std::collections::HashMap;

pub const EVENT_FULL: &str = "Event is at full capacity";
pub const DEADLINE_PASSED: &str = "Registration deadline has passed";
pub const ALREADY_REGISTERED: &str = "Already registered for this event";

#[derive(Clone)]
pub struct EventService {
    pool: DatabaseConnection,
}

impl EventService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn list(
        &self,
        query: &EventQuery,
    ) -> AppResult<ReadOutcome<PaginatedResponse<EventResponse>>> {
        let params = PaginationParams::new(query.page, query.per_page);
        let result = self.fetch_page(query, &params).await;
        ReadOutcome::recover_with("events.list", result, || PaginatedResponse::empty(&params))
    }

    async fn fetch_page(
        &self,
        query: &EventQuery,
        params: &PaginationParams,
    ) -> AppResult<PaginatedResponse<EventResponse>> {
        let mut select = events::Entity::find();
        if query.upcoming_only.unwrap_or(false) {
            select = select.filter(events::Column::StartsAt.gt(Utc::now()));
        }
        if let Some(category) = query.category.as_deref() {
            match LookupService::find_by_name(&self.pool, LookupKind::EventCategory, category)
                .await?
            {
                Some(row) => select = select.filter(events::Column::CategoryId.eq(row.id)),
                None => return Ok(PaginatedResponse::empty(params)),
            }
        }

        let total = select.clone().count(&self.pool).await?;
        let rows = select
            .order_by_asc(events::Column::StartsAt)
            .order_by_asc(events::Column::Id)
            .limit(params.get_limit())
            .offset(params.get_offset())
            .all(&self.pool)
            .await?;

        let address_ids: Vec<i64> = rows.iter().filter_map(|e| e.address_id).collect();
        let address_map: HashMap<i64, addresses::Model> = if address_ids.is_empty() {
            HashMap::new()
        } else {
            addresses::Entity::find()
                .filter(addresses::Column::Id.is_in(address_ids))
                .all(&self.pool)
                .await?
                .into_iter()
                .map(|a| (a.id, a))
                .collect()
        };
        let labels =
            LookupService::labels(&self.pool, rows.iter().flat_map(EventResponse::lookup_ids))
                .await?;

        let items = rows
            .into_iter()
            .map(|e| {
                let address = e.address_id.and_then(|id| address_map.get(&id).cloned());
                EventResponse::build(e, address, &labels)
            })
            .collect();
        Ok(PaginatedResponse::new(items, params, total))
    }

    pub async fn get(&self, id: i64) -> AppResult<EventResponse> {
        let event = Self::find(&self.pool, id).await?;
        let address = match event.address_id {
            Some(address_id) => addresses::Entity::find_by_id(address_id).one(&self.pool).await?,
            None => None,
        };
        let labels = LookupService::labels(&self.pool, EventResponse::lookup_ids(&event)).await?;
        Ok(EventResponse::build(event, address, &labels))
    }

    pub async fn create(
        &self,
        caller: &AuthenticatedUser,
        req: CreateEventRequest,
    ) -> AppResult<EventResponse> {
        caller.require_admin()?;
        req.validate()?;

        let txn = self.pool.begin().await?;
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
            LookupKind::EventStatus,
            req.status_id,
            names::EVENT_SCHEDULED,
        )
        .await?;
        let category = LookupService::require_optional(
            &txn,
            "category_id",
            LookupKind::EventCategory,
            req.category_id,
        )
        .await?;
        let address_id = match req.address {
            Some(address) => Some(Self::insert_address(&txn, address).await?.id),
            None => None,
        };

        let now = Utc::now();
        let event = events::ActiveModel {
            title: Set(req.title.trim().to_string()),
            description: Set(req.description),
            starts_at: Set(req.starts_at),
            ends_at: Set(req.ends_at),
            capacity: Set(req.capacity),
            registrations_count: Set(0),
            ticket_price: Set(req.ticket_price.unwrap_or(0)),
            currency_id: Set(currency.id),
            category_id: Set(category.map(|c| c.id)),
            status_id: Set(status.id),
            address_id: Set(address_id),
            registration_deadline: Set(req.registration_deadline),
            image_url: Set(req.image_url),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;

        log::info!("Event {} created", event.id);
        self.get(event.id).await
    }

    pub async fn update(
        &self,
        caller: &AuthenticatedUser,
        id: i64,
        req: UpdateEventRequest,
    ) -> AppResult<EventResponse> {
        caller.require_admin()?;
        req.validate()?;

        let txn = self.pool.begin().await?;
        let event = Self::find(&txn, id).await?;

        let starts_at = req.starts_at.unwrap_or(event.starts_at);
        if let Some(ends_at) = req.ends_at.or(event.ends_at)
            && ends_at < starts_at
        {
            return Err(AppError::invalid("ends_at", "must not be before starts_at"));
        }
        if let Some(deadline) = req.registration_deadline.or(event.registration_deadline)
            && deadline > starts_at
        {
            return Err(AppError::invalid(
                "registration_deadline",
                "must not be after the event starts",
            ));
        }
        if let Some(capacity) = req.capacity
            && capacity < event.registrations_count
        {
            return Err(AppError::BusinessRule(
                "Capacity cannot be lower than the current number of registrations".to_string(),
            ));
        }

        let existing_address = event.address_id;
        let mut am = event.into_active_model();
        if let Some(title) = req.title {
            am.title = Set(title.trim().to_string());
        }
        if let Some(description) = req.description {
            am.description = Set(description);
        }
        if req.starts_at.is_some() {
            am.starts_at = Set(starts_at);
        }
        if let Some(ends_at) = req.ends_at {
            am.ends_at = Set(Some(ends_at));
        }
        if let Some(capacity) = req.capacity {
            am.capacity = Set(Some(capacity));
        }
        if let Some(price) = req.ticket_price {
            am.ticket_price = Set(price);
        }
        if let Some(currency_id) = req.currency_id {
            LookupService::require(&txn, "currency_id", LookupKind::Currency, currency_id).await?;
            am.currency_id = Set(currency_id);
        }
        if let Some(category_id) = req.category_id {
            LookupService::require(&txn, "category_id", LookupKind::EventCategory, category_id)
                .await?;
            am.category_id = Set(Some(category_id));
        }
        if let Some(status_id) = req.status_id {
            LookupService::require(&txn, "status_id", LookupKind::EventStatus, status_id).await?;
            am.status_id = Set(status_id);
        }
        if let Some(deadline) = req.registration_deadline {
            am.registration_deadline = Set(Some(deadline));
        }
        if let Some(url) = req.image_url {
            am.image_url = Set(Some(url));
        }
        if let Some(address) = req.address {
            match existing_address {
                Some(address_id) => Self::update_address(&txn, address_id, address).await?,
                None => {
                    let inserted = Self::insert_address(&txn, address).await?;
                    am.address_id = Set(Some(inserted.id));
                }
            }
        }
        am.updated_at = Set(Utc::now());
        am.update(&txn).await?;
        txn.commit().await?;
        self.get(id).await
    }

    pub async fn delete(&self, caller: &AuthenticatedUser, id: i64) -> AppResult<()> {
        caller.require_admin()?;
        let txn = self.pool.begin().await?;
        let event = Self::find(&txn, id).await?;
        VolunteerService::detach_activities(&txn, ActivityLink::Event, vec![id]).await?;
        registrations::Entity::delete_many()
            .filter(registrations::Column::EventId.eq(id))
            .exec(&txn)
            .await?;
        events::Entity::delete_by_id(id).exec(&txn).await?;
        if let Some(address_id) = event.address_id {
            addresses::Entity::delete_by_id(address_id).exec(&txn).await?;
        }
        txn.commit().await?;
        log::info!("Event {id} deleted");
        Ok(())
    }

    pub async fn register(
        &self,
        caller: &AuthenticatedUser,
        event_id: i64,
    ) -> AppResult<RegistrationResponse> {
        self.register_at(caller, event_id, Utc::now()).await
    }

    /// 活动报名
    ///
    /// 1. 名额已满 -> "Event is at full capacity"
    /// 2. 已过报名截止时间 -> "Registration deadline has passed"
    /// 3. 已有有效报名 -> "Already registered for this event"
    /// 4. 条件递增报名人数 (registrations_count < capacity)，0 行受影响视为已满
    /// 5. 写入报名（已取消的报名重新激活）
    pub async fn register_at(
        &self,
        caller: &AuthenticatedUser,
        event_id: i64,
        now: DateTime<Utc>,
    ) -> AppResult<RegistrationResponse> {
        let user = UserService::ensure(&self.pool, caller).await?;

        let txn = self.pool.begin().await?;
        let event = Self::find(&txn, event_id).await?;
        if event.is_full() {
            return Err(AppError::BusinessRule(EVENT_FULL.to_string()));
        }
        if event.registration_closed_at(now) {
            return Err(AppError::BusinessRule(DEADLINE_PASSED.to_string()));
        }

        let existing = registrations::Entity::find()
            .filter(registrations::Column::EventId.eq(event_id))
            .filter(registrations::Column::UserId.eq(user.id))
            .one(&txn)
            .await?;
        if existing.as_ref().is_some_and(|r| r.is_active()) {
            return Err(AppError::BusinessRule(ALREADY_REGISTERED.to_string()));
        }

        let confirmed =
            LookupService::resolve(&txn, LookupKind::RegistrationStatus, names::REGISTRATION_CONFIRMED)
                .await?;
        let pending =
            LookupService::resolve(&txn, LookupKind::PaymentStatus, names::PAYMENT_PENDING).await?;

        // 乐观条件更新，防止并发报名超卖
        if !Self::claim_spot(&txn, event_id).await? {
            return Err(AppError::BusinessRule(EVENT_FULL.to_string()));
        }

        let registration = match existing {
            Some(cancelled) => {
                let mut am = cancelled.into_active_model();
                am.status_id = Set(confirmed.id);
                am.payment_status_id = Set(pending.id);
                am.registered_at = Set(now);
                am.cancelled_at = Set(None);
                am.update(&txn).await?
            }
            None => {
                registrations::ActiveModel {
                    event_id: Set(event_id),
                    user_id: Set(user.id),
                    status_id: Set(confirmed.id),
                    payment_status_id: Set(pending.id),
                    registered_at: Set(now),
                    cancelled_at: Set(None),
                    ..Default::default()
                }
                .insert(&txn)
                .await?
            }
        };
        txn.commit().await?;

        log::info!("User {} registered for event {event_id}", user.id);
        let labels = LookupService::labels(
            &self.pool,
            [Some(registration.status_id), Some(registration.payment_status_id)],
        )
        .await?;
        Ok(RegistrationResponse::build(
            registration,
            Some(user.display_name()),
            &labels,
        ))
    }

    /// 取消报名并释放名额
    pub async fn cancel_registration(
        &self,
        caller: &AuthenticatedUser,
        event_id: i64,
    ) -> AppResult<RegistrationResponse> {
        let user_id = UserService::local_id(&self.pool, caller).await?;

        let txn = self.pool.begin().await?;
        let registration = registrations::Entity::find()
            .filter(registrations::Column::EventId.eq(event_id))
            .filter(registrations::Column::UserId.eq(user_id))
            .filter(registrations::Column::CancelledAt.is_null())
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Registration not found".to_string()))?;

        let cancelled =
            LookupService::resolve(&txn, LookupKind::RegistrationStatus, names::REGISTRATION_CANCELLED)
                .await?;
        let mut am = registration.into_active_model();
        am.status_id = Set(cancelled.id);
        am.cancelled_at = Set(Some(Utc::now()));
        let updated = am.update(&txn).await?;

        events::Entity::update_many()
            .col_expr(
                events::Column::RegistrationsCount,
                Expr::col(events::Column::RegistrationsCount).sub(1),
            )
            .filter(events::Column::Id.eq(event_id))
            .filter(events::Column::RegistrationsCount.gt(0))
            .exec(&txn)
            .await?;
        txn.commit().await?;

        log::info!("User {user_id} cancelled registration for event {event_id}");
        let labels = LookupService::labels(
            &self.pool,
            [Some(updated.status_id), Some(updated.payment_status_id)],
        )
        .await?;
        Ok(RegistrationResponse::build(updated, None, &labels))
    }

    /// 活动的报名列表
    pub async fn registrations(
        &self,
        event_id: i64,
    ) -> AppResult<ReadOutcome<Vec<RegistrationResponse>>> {
        let result = self.fetch_registrations(event_id).await;
        ReadOutcome::recover("events.registrations", result)
    }

    async fn fetch_registrations(&self, event_id: i64) -> AppResult<Vec<RegistrationResponse>> {
        Self::find(&self.pool, event_id).await?;
        let rows = registrations::Entity::find()
            .filter(registrations::Column::EventId.eq(event_id))
            .find_also_related(users::Entity)
            .order_by_asc(registrations::Column::RegisteredAt)
            .all(&self.pool)
            .await?;
        let labels = LookupService::labels(
            &self.pool,
            rows.iter()
                .flat_map(|(r, _)| [Some(r.status_id), Some(r.payment_status_id)]),
        )
        .await?;
        Ok(rows
            .into_iter()
            .map(|(r, user)| {
                RegistrationResponse::build(r, user.map(|u| u.display_name()), &labels)
            })
            .collect())
    }

    /// 条件递增报名人数（capacity 为空或 registrations_count < capacity），
    /// 返回 false 表示名额已被占满
    pub async fn claim_spot<C: ConnectionTrait>(db: &C, event_id: i64) -> AppResult<bool> {
        let claimed = events::Entity::update_many()
            .col_expr(
                events::Column::RegistrationsCount,
                Expr::col(events::Column::RegistrationsCount).add(1),
            )
            .filter(events::Column::Id.eq(event_id))
            .filter(
                Condition::any()
                    .add(events::Column::Capacity.is_null())
                    .add(
                        Expr::col(events::Column::RegistrationsCount)
                            .lt(Expr::col(events::Column::Capacity)),
                    ),
            )
            .exec(db)
            .await?;
        Ok(claimed.rows_affected > 0)
    }

    async fn find<C: ConnectionTrait>(db: &C, id: i64) -> AppResult<events::Model> {
        events::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::not_found("Event", id))
    }

    async fn insert_address<C: ConnectionTrait>(
        db: &C,
        input: AddressInput,
    ) -> AppResult<addresses::Model> {
        let address = addresses::ActiveModel {
            line1: Set(input.line1),
            line2: Set(input.line2),
            city: Set(input.city),
            region: Set(input.region),
            postal_code: Set(input.postal_code),
            country: Set(input.country.trim().to_uppercase()),
            ..Default::default()
        }
        .insert(db)
        .await?;
        Ok(address)
    }

    async fn update_address<C: ConnectionTrait>(
        db: &C,
        id: i64,
        input: AddressInput,
    ) -> AppResult<()> {
        addresses::ActiveModel {
            id: Set(id),
            line1: Set(input.line1),
            line2: Set(input.line2),
            city: Set(input.city),
            region: Set(input.region),
            postal_code: Set(input.postal_code),
            country: Set(input.country.trim().to_uppercase()),
        }
        .update(db)
        .await?;
        Ok(())
    }
}
