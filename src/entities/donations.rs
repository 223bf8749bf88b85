use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// 捐款记录
/// - amount / processing_fee / net_amount: 美分
/// - campaign_id 为空表示捐入通用基金
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "donations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub amount: i64,
    pub currency_id: i64,
    pub donor_id: i64,
    pub campaign_id: Option<i64>,
    pub payment_method_id: i64,
    pub payment_status_id: i64,
    pub is_anonymous: bool,
    pub is_recurring: bool,
    pub frequency_id: Option<i64>,
    pub processing_fee: i64,
    pub net_amount: i64,
    #[sea_orm(column_type = "Text", nullable)]
    pub message: Option<String>,
    pub donated_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::campaigns::Entity",
        from = "Column::CampaignId",
        to = "super::campaigns::Column::Id",
        on_delete = "SetNull"
    )]
    Campaign,
    #[sea_orm(
        belongs_to = "super::donors::Entity",
        from = "Column::DonorId",
        to = "super::donors::Column::Id"
    )]
    Donor,
}

impl Related<super::campaigns::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Campaign.def()
    }
}

impl Related<super::donors::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Donor.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
