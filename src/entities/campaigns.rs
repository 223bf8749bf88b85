use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;

/// 募捐活动
/// goal_amount 以最小货币单位（美分）存储
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "campaigns")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub goal_amount: i64,
    pub currency_id: i64,
    pub category_id: i64,
    pub status_id: i64,
    pub urgency_level_id: Option<i64>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub target_beneficiaries: Option<i32>,
    pub image_url: Option<String>,
    pub created_by: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::campaign_statistics::Entity")]
    Statistics,
    #[sea_orm(has_many = "super::donations::Entity")]
    Donations,
}

impl Related<super::campaign_statistics::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Statistics.def()
    }
}

impl Related<super::donations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Donations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
