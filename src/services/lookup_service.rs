use crate::entities::lookup_entity as lookups;
use crate::error::{AppError, AppResult};
use crate::models::{LookupKind, LookupLabels, LookupResponse, ReadOutcome};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};
use std::collections::BTreeSet;

#[derive(Clone)]
pub struct LookupService {
    pool: DatabaseConnection,
}

impl LookupService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 某个词表的全部取值（按 sort_order）
    pub async fn list(&self, kind: LookupKind) -> AppResult<ReadOutcome<Vec<LookupResponse>>> {
        let result = lookups::Entity::find()
            .filter(lookups::Column::Kind.eq(kind.as_str()))
            .order_by_asc(lookups::Column::SortOrder)
            .all(&self.pool)
            .await
            .map(|rows| rows.into_iter().map(Into::into).collect())
            .map_err(AppError::from);
        ReadOutcome::recover("lookups.list", result)
    }

    pub async fn find_by_name<C: ConnectionTrait>(
        db: &C,
        kind: LookupKind,
        name: &str,
    ) -> AppResult<Option<lookups::Model>> {
        let row = lookups::Entity::find()
            .filter(lookups::Column::Kind.eq(kind.as_str()))
            .filter(lookups::Column::Name.eq(name))
            .one(db)
            .await?;
        Ok(row)
    }

    /// 按名称取参考数据；缺失说明种子数据未初始化
    pub async fn resolve<C: ConnectionTrait>(
        db: &C,
        kind: LookupKind,
        name: &str,
    ) -> AppResult<lookups::Model> {
        Self::find_by_name(db, kind, name).await?.ok_or_else(|| {
            AppError::InternalError(format!("Reference value {kind}/{name} has not been seeded"))
        })
    }

    /// 校验客户端传入的外键属于指定词表
    pub async fn require<C: ConnectionTrait>(
        db: &C,
        field: &str,
        kind: LookupKind,
        id: i64,
    ) -> AppResult<lookups::Model> {
        match lookups::Entity::find_by_id(id).one(db).await? {
            Some(row) if row.kind == kind.as_str() => Ok(row),
            _ => Err(AppError::invalid(
                field,
                format!("must reference an existing {kind}"),
            )),
        }
    }

    /// 传入了 id 就校验，否则取默认名称对应的行
    pub async fn require_or_default<C: ConnectionTrait>(
        db: &C,
        field: &str,
        kind: LookupKind,
        id: Option<i64>,
        default_name: &str,
    ) -> AppResult<lookups::Model> {
        match id {
            Some(id) => Self::require(db, field, kind, id).await,
            None => Self::resolve(db, kind, default_name).await,
        }
    }

    pub async fn require_optional<C: ConnectionTrait>(
        db: &C,
        field: &str,
        kind: LookupKind,
        id: Option<i64>,
    ) -> AppResult<Option<lookups::Model>> {
        match id {
            Some(id) => Self::require(db, field, kind, id).await.map(Some),
            None => Ok(None),
        }
    }

    /// 一次查询取出所有引用到的参考数据
    pub async fn labels<C: ConnectionTrait>(
        db: &C,
        ids: impl IntoIterator<Item = Option<i64>>,
    ) -> AppResult<LookupLabels> {
        let ids: BTreeSet<i64> = ids.into_iter().flatten().collect();
        if ids.is_empty() {
            return Ok(LookupLabels::default());
        }
        let rows = lookups::Entity::find()
            .filter(lookups::Column::Id.is_in(ids))
            .all(db)
            .await?;
        Ok(LookupLabels::from_models(rows))
    }
}
