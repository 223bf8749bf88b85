use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// 线下/线上活动
/// - capacity: NULL 表示不限人数
/// - registrations_count: 当前有效报名数（报名时条件递增，取消时递减）
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "events")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub capacity: Option<i32>,
    pub registrations_count: i32,
    pub ticket_price: i64,
    pub currency_id: i64,
    pub category_id: Option<i64>,
    pub status_id: i64,
    pub address_id: Option<i64>,
    pub registration_deadline: Option<DateTime<Utc>>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Model {
    /// 剩余名额（不限人数时为 None）
    pub fn available_spots(&self) -> Option<i32> {
        self.capacity
            .map(|cap| (cap - self.registrations_count).max(0))
    }

    pub fn is_full(&self) -> bool {
        matches!(self.capacity, Some(cap) if self.registrations_count >= cap)
    }

    pub fn registration_closed_at(&self, now: DateTime<Utc>) -> bool {
        matches!(self.registration_deadline, Some(deadline) if now > deadline)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::addresses::Entity",
        from = "Column::AddressId",
        to = "super::addresses::Column::Id",
        on_delete = "SetNull"
    )]
    Address,
    #[sea_orm(has_many = "super::event_registrations::Entity")]
    Registrations,
}

impl Related<super::addresses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Address.def()
    }
}

impl Related<super::event_registrations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Registrations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
