use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// 活动募捐汇总
/// - current_amount / donations_count: 随捐款增删在同一事务内增减
/// - unique_donors_count / average_donation / completion_percentage: 每次变更后按明细重算
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "campaign_statistics")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub campaign_id: i64,
    pub current_amount: i64,
    pub donations_count: i64,
    pub unique_donors_count: i64,
    pub average_donation: i64,
    pub completion_percentage: f64,
    pub last_donation_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::campaigns::Entity",
        from = "Column::CampaignId",
        to = "super::campaigns::Column::Id",
        on_delete = "Cascade"
    )]
    Campaign,
}

impl Related<super::campaigns::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Campaign.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
