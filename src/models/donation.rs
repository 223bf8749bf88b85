use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{LookupLabels, LookupRef};
use crate::entities::{donation_entity, donor_entity};
use crate::error::AppResult;
use crate::utils::{
    MAX_DONATION_CENTS, Validate, optional_text, require_at_most, require_positive, require_text,
};

pub const ANONYMOUS_DONOR: &str = "Anonymous";

/// 捐款列表查询参数
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct DonationQuery {
    /// 只看某个募捐活动
    pub campaign_id: Option<i64>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// 创建捐款（金额单位：美分）
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct CreateDonationRequest {
    pub amount: i64,
    /// 为空则计入通用基金
    pub campaign_id: Option<i64>,
    /// 默认 usd
    pub currency_id: Option<i64>,
    /// 默认 card
    pub payment_method_id: Option<i64>,
    /// 默认 pending
    pub payment_status_id: Option<i64>,
    #[serde(default)]
    pub is_anonymous: bool,
    #[serde(default)]
    pub is_recurring: bool,
    pub frequency_id: Option<i64>,
    pub message: Option<String>,
}

impl Validate for CreateDonationRequest {
    fn validate(&self) -> AppResult<()> {
        require_positive("amount", self.amount)?;
        require_at_most("amount", self.amount, MAX_DONATION_CENTS)?;
        if self.is_recurring && self.frequency_id.is_none() {
            return Err(crate::error::AppError::invalid(
                "frequency_id",
                "is required for recurring donations",
            ));
        }
        optional_text("message", self.message.as_deref(), 1000)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateDonationRequest {
    pub amount: Option<i64>,
    pub payment_status_id: Option<i64>,
    pub is_anonymous: Option<bool>,
    pub message: Option<String>,
}

impl Validate for UpdateDonationRequest {
    fn validate(&self) -> AppResult<()> {
        if let Some(amount) = self.amount {
            require_positive("amount", amount)?;
            require_at_most("amount", amount, MAX_DONATION_CENTS)?;
        }
        optional_text("message", self.message.as_deref(), 1000)
    }
}

/// 捐赠人偏好（匿名展示、展示名）
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct DonorPreferencesRequest {
    pub is_anonymous: Option<bool>,
    pub display_name: Option<String>,
}

impl Validate for DonorPreferencesRequest {
    fn validate(&self) -> AppResult<()> {
        if let Some(name) = &self.display_name {
            require_text("display_name", name, 1, 120)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DonorResponse {
    pub id: i64,
    pub display_name: String,
    pub email: Option<String>,
    pub is_anonymous: bool,
}

impl From<donor_entity::Model> for DonorResponse {
    fn from(m: donor_entity::Model) -> Self {
        DonorResponse {
            id: m.id,
            display_name: m.display_name,
            email: m.email,
            is_anonymous: m.is_anonymous,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DonationResponse {
    pub id: i64,
    /// 捐款金额（美分）
    pub amount: i64,
    /// 支付手续费（美分）
    pub processing_fee: i64,
    /// 扣除手续费后的净额（美分）
    pub net_amount: i64,
    pub currency: Option<LookupRef>,
    /// 为空表示通用基金
    pub campaign_id: Option<i64>,
    pub campaign_title: Option<String>,
    /// 匿名时为 "Anonymous"
    pub donor_name: String,
    pub is_anonymous: bool,
    pub is_recurring: bool,
    pub frequency: Option<LookupRef>,
    pub payment_method: Option<LookupRef>,
    pub payment_status: Option<LookupRef>,
    pub message: Option<String>,
    pub donated_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}

/// 捐款本身或捐赠人任一标记匿名，都不暴露真实姓名
pub fn masked_donor_name(donation_anonymous: bool, donor: Option<&donor_entity::Model>) -> String {
    match donor {
        Some(d) if !donation_anonymous && !d.is_anonymous => d.display_name.clone(),
        _ => ANONYMOUS_DONOR.to_string(),
    }
}

impl DonationResponse {
    pub fn build(
        m: donation_entity::Model,
        donor: Option<&donor_entity::Model>,
        campaign_title: Option<String>,
        labels: &LookupLabels,
    ) -> Self {
        let hidden = m.is_anonymous || donor.is_some_and(|d| d.is_anonymous);
        DonationResponse {
            donor_name: masked_donor_name(m.is_anonymous, donor),
            is_anonymous: hidden,
            id: m.id,
            amount: m.amount,
            processing_fee: m.processing_fee,
            net_amount: m.net_amount,
            currency: labels.get(Some(m.currency_id)),
            campaign_id: m.campaign_id,
            campaign_title,
            is_recurring: m.is_recurring,
            frequency: labels.get(m.frequency_id),
            payment_method: labels.get(Some(m.payment_method_id)),
            payment_status: labels.get(Some(m.payment_status_id)),
            message: m.message,
            donated_at: m.donated_at,
            processed_at: m.processed_at,
        }
    }

    /// 所有引用这些 id 的 lookup
    pub fn lookup_ids(m: &donation_entity::Model) -> [Option<i64>; 4] {
        [
            Some(m.currency_id),
            Some(m.payment_method_id),
            Some(m.payment_status_id),
            m.frequency_id,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn donor(anonymous: bool) -> donor_entity::Model {
        donor_entity::Model {
            id: 1,
            user_id: Some(1),
            display_name: "Ada Lovelace".into(),
            email: None,
            is_anonymous: anonymous,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn donation(anonymous: bool) -> donation_entity::Model {
        donation_entity::Model {
            id: 9,
            amount: 5000,
            currency_id: 1,
            donor_id: 1,
            campaign_id: Some(3),
            payment_method_id: 2,
            payment_status_id: 3,
            is_anonymous: anonymous,
            is_recurring: false,
            frequency_id: None,
            processing_fee: 175,
            net_amount: 4825,
            message: None,
            donated_at: Utc::now(),
            processed_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_masking() {
        assert_eq!(masked_donor_name(false, Some(&donor(false))), "Ada Lovelace");
        assert_eq!(masked_donor_name(true, Some(&donor(false))), ANONYMOUS_DONOR);
        assert_eq!(masked_donor_name(false, Some(&donor(true))), ANONYMOUS_DONOR);
        assert_eq!(masked_donor_name(false, None), ANONYMOUS_DONOR);
    }

    #[test]
    fn test_donor_level_anonymity_is_reported() {
        let labels = LookupLabels::default();
        let response = DonationResponse::build(donation(false), Some(&donor(true)), None, &labels);
        assert!(response.is_anonymous);
        assert_eq!(response.donor_name, ANONYMOUS_DONOR);
        assert_eq!(response.net_amount, 4825);
    }

    #[test]
    fn test_recurring_requires_frequency() {
        let req = CreateDonationRequest {
            amount: 1000,
            is_recurring: true,
            ..Default::default()
        };
        assert!(req.validate().is_err());
        let zero = CreateDonationRequest::default();
        assert!(zero.validate().is_err());
    }

    #[test]
    fn test_amount_upper_bound() {
        let at_max = CreateDonationRequest {
            amount: MAX_DONATION_CENTS,
            ..Default::default()
        };
        assert!(at_max.validate().is_ok());

        let huge = CreateDonationRequest {
            amount: 100_000_000_000_000_000,
            ..Default::default()
        };
        assert!(matches!(
            huge.validate(),
            Err(crate::error::AppError::ValidationError { ref field, .. }) if field == "amount"
        ));

        let update = UpdateDonationRequest {
            amount: Some(MAX_DONATION_CENTS + 1),
            ..Default::default()
        };
        assert!(update.validate().is_err());
    }
}
