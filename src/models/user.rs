use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::user_entity;
use crate::error::{AppError, AppResult};
use crate::utils::{ADMIN_ROLE, Claims};

/// 鉴权中间件从 token 中解析出的调用方身份，放入请求扩展
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    /// 身份提供方用户 ID
    pub subject: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub image_url: Option<String>,
    pub role: Option<String>,
}

impl AuthenticatedUser {
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            email: None,
            first_name: None,
            last_name: None,
            image_url: None,
            role: None,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role.as_deref() == Some(ADMIN_ROLE)
    }

    pub fn require_admin(&self) -> AppResult<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }
}

impl From<Claims> for AuthenticatedUser {
    fn from(c: Claims) -> Self {
        AuthenticatedUser {
            subject: c.sub,
            email: c.email,
            first_name: c.given_name,
            last_name: c.family_name,
            image_url: c.picture,
            role: c.role,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: i64,
    pub external_id: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub display_name: String,
    pub image_url: Option<String>,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl UserResponse {
    pub fn new(m: user_entity::Model, caller: &AuthenticatedUser) -> Self {
        UserResponse {
            display_name: m.display_name(),
            id: m.id,
            external_id: m.external_id,
            email: m.email,
            first_name: m.first_name,
            last_name: m.last_name,
            image_url: m.image_url,
            is_admin: caller.is_admin(),
            created_at: m.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_claims() {
        let mut claims = Claims::new("user_42", 60);
        claims.given_name = Some("Grace".into());
        claims.role = Some(ADMIN_ROLE.into());
        let user = AuthenticatedUser::from(claims);
        assert_eq!(user.subject, "user_42");
        assert_eq!(user.first_name.as_deref(), Some("Grace"));
        assert!(user.is_admin());
        assert!(!AuthenticatedUser::new("user_43").is_admin());
    }
}
