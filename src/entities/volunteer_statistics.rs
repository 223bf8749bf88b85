use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "volunteer_statistics")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub volunteer_id: i64,
    pub total_hours: f64,
    pub activities_count: i64,
    pub projects_count: i64,
    pub events_count: i64,
    pub teams_count: i64,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::volunteers::Entity",
        from = "Column::VolunteerId",
        to = "super::volunteers::Column::Id",
        on_delete = "Cascade"
    )]
    Volunteer,
}

impl Related<super::volunteers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Volunteer.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
