use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppResult;
use crate::utils::{Validate, optional_text, require_text, validate_email};

/// 合作伙伴咨询表单
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct PartnershipInquiry {
    pub organization: String,
    pub contact_name: String,
    pub email: String,
    pub phone: Option<String>,
    /// 例如 corporate / foundation / community
    pub partnership_type: Option<String>,
    pub message: String,
}

impl Validate for PartnershipInquiry {
    fn validate(&self) -> AppResult<()> {
        require_text("organization", &self.organization, 2, 200)?;
        require_text("contact_name", &self.contact_name, 2, 120)?;
        validate_email("email", &self.email)?;
        optional_text("phone", self.phone.as_deref(), 32)?;
        optional_text("partnership_type", self.partnership_type.as_deref(), 60)?;
        require_text("message", &self.message, 10, 5000)
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PartnershipReceipt {
    /// 咨询编号
    pub reference: Uuid,
    pub received_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[test]
    fn test_invalid_email_names_field() {
        let inquiry = PartnershipInquiry {
            organization: "Acme Corp".into(),
            contact_name: "Wile E.".into(),
            email: "wile@acme".into(),
            message: "We would like to sponsor your next event.".into(),
            ..Default::default()
        };
        match inquiry.validate() {
            Err(AppError::ValidationError { field, .. }) => assert_eq!(field, "email"),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
