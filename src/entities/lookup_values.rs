use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// 参考数据（状态、分类、币种、支付方式等）
/// - kind: 词表类型, 对应 `LookupKind::as_str()`
/// - name: 词表内唯一的机器名, 例如 "active" / "usd"
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "lookup_values")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub kind: String,
    pub name: String,
    pub label: String,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
