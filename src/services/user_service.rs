use crate::entities::user_entity as users;
use crate::error::{AppError, AppResult};
use crate::models::{AuthenticatedUser, UserResponse};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, QueryFilter, Set,
};

#[derive(Clone)]
pub struct UserService {
    pool: DatabaseConnection,
}

impl UserService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 当前用户资料（首次调用时创建本地用户）
    pub async fn me(&self, caller: &AuthenticatedUser) -> AppResult<UserResponse> {
        let user = self.sync(caller).await?;
        Ok(UserResponse::new(user, caller))
    }

    pub async fn sync(&self, caller: &AuthenticatedUser) -> AppResult<users::Model> {
        Self::ensure(&self.pool, caller).await
    }

    /// 按身份提供方 ID 查找本地用户
    pub async fn find_local<C: ConnectionTrait>(
        db: &C,
        caller: &AuthenticatedUser,
    ) -> AppResult<Option<users::Model>> {
        let user = users::Entity::find()
            .filter(users::Column::ExternalId.eq(caller.subject.as_str()))
            .one(db)
            .await?;
        Ok(user)
    }

    /// 本地用户 ID，用户从未访问过需要写入的接口时返回 NotFound
    pub async fn local_id<C: ConnectionTrait>(db: &C, caller: &AuthenticatedUser) -> AppResult<i64> {
        Self::find_local(db, caller)
            .await?
            .map(|u| u.id)
            .ok_or_else(|| AppError::NotFound("User profile not found".to_string()))
    }

    /// 以 token 中的资料 upsert 本地用户
    pub async fn ensure<C: ConnectionTrait>(
        db: &C,
        caller: &AuthenticatedUser,
    ) -> AppResult<users::Model> {
        let now = Utc::now();
        if let Some(existing) = Self::find_local(db, caller).await? {
            let changed = (caller.email.is_some() && caller.email != existing.email)
                || (caller.first_name.is_some() && caller.first_name != existing.first_name)
                || (caller.last_name.is_some() && caller.last_name != existing.last_name)
                || (caller.image_url.is_some() && caller.image_url != existing.image_url);
            if !changed {
                return Ok(existing);
            }
            let mut am = existing.into_active_model();
            if caller.email.is_some() {
                am.email = Set(caller.email.clone());
            }
            if caller.first_name.is_some() {
                am.first_name = Set(caller.first_name.clone());
            }
            if caller.last_name.is_some() {
                am.last_name = Set(caller.last_name.clone());
            }
            if caller.image_url.is_some() {
                am.image_url = Set(caller.image_url.clone());
            }
            am.updated_at = Set(now);
            return Ok(am.update(db).await?);
        }

        let inserted = users::ActiveModel {
            external_id: Set(caller.subject.clone()),
            email: Set(caller.email.clone()),
            first_name: Set(caller.first_name.clone()),
            last_name: Set(caller.last_name.clone()),
            image_url: Set(caller.image_url.clone()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await;

        match inserted {
            Ok(user) => {
                log::info!("Created local user {} for {}", user.id, caller.subject);
                Ok(user)
            }
            // 并发首次请求可能同时插入，唯一索引冲突后重新读取
            Err(err) => match Self::find_local(db, caller).await? {
                Some(user) => Ok(user),
                None => Err(err.into()),
            },
        }
    }

    /// 资源所有者或管理员才能修改
    pub fn authorize_owner(
        caller: &AuthenticatedUser,
        caller_id: Option<i64>,
        owner_id: Option<i64>,
    ) -> AppResult<()> {
        if caller.is_admin() {
            return Ok(());
        }
        match (caller_id, owner_id) {
            (Some(me), Some(owner)) if me == owner => Ok(()),
            _ => Err(AppError::Forbidden),
        }
    }
}
