use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::entities::lookup_entity;

/// 参考数据词表类型，对应 `lookup_values.kind`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LookupKind {
    Currency,
    CampaignCategory,
    CampaignStatus,
    UrgencyLevel,
    PaymentMethod,
    PaymentStatus,
    DonationFrequency,
    EventCategory,
    EventStatus,
    RegistrationStatus,
    TeamCategory,
    TeamStatus,
    VolunteerStatus,
    BackgroundCheckStatus,
    BlogCategory,
    BlogStatus,
    Skill,
    ActivityType,
    NotificationType,
}

impl LookupKind {
    pub const ALL: [LookupKind; 19] = [
        LookupKind::Currency,
        LookupKind::CampaignCategory,
        LookupKind::CampaignStatus,
        LookupKind::UrgencyLevel,
        LookupKind::PaymentMethod,
        LookupKind::PaymentStatus,
        LookupKind::DonationFrequency,
        LookupKind::EventCategory,
        LookupKind::EventStatus,
        LookupKind::RegistrationStatus,
        LookupKind::TeamCategory,
        LookupKind::TeamStatus,
        LookupKind::VolunteerStatus,
        LookupKind::BackgroundCheckStatus,
        LookupKind::BlogCategory,
        LookupKind::BlogStatus,
        LookupKind::Skill,
        LookupKind::ActivityType,
        LookupKind::NotificationType,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LookupKind::Currency => "currency",
            LookupKind::CampaignCategory => "campaign_category",
            LookupKind::CampaignStatus => "campaign_status",
            LookupKind::UrgencyLevel => "urgency_level",
            LookupKind::PaymentMethod => "payment_method",
            LookupKind::PaymentStatus => "payment_status",
            LookupKind::DonationFrequency => "donation_frequency",
            LookupKind::EventCategory => "event_category",
            LookupKind::EventStatus => "event_status",
            LookupKind::RegistrationStatus => "registration_status",
            LookupKind::TeamCategory => "team_category",
            LookupKind::TeamStatus => "team_status",
            LookupKind::VolunteerStatus => "volunteer_status",
            LookupKind::BackgroundCheckStatus => "background_check_status",
            LookupKind::BlogCategory => "blog_category",
            LookupKind::BlogStatus => "blog_status",
            LookupKind::Skill => "skill",
            LookupKind::ActivityType => "activity_type",
            LookupKind::NotificationType => "notification_type",
        }
    }
}

impl fmt::Display for LookupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LookupKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LookupKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("Unknown lookup kind: {s}"))
    }
}

/// 各词表中业务代码直接引用的名称
pub mod names {
    pub const CAMPAIGN_DRAFT: &str = "draft";
    pub const CAMPAIGN_ACTIVE: &str = "active";
    pub const CURRENCY_USD: &str = "usd";
    pub const PAYMENT_PENDING: &str = "pending";
    pub const PAYMENT_COMPLETED: &str = "completed";
    pub const PAYMENT_CARD: &str = "card";
    pub const REGISTRATION_CONFIRMED: &str = "confirmed";
    pub const REGISTRATION_CANCELLED: &str = "cancelled";
    pub const EVENT_SCHEDULED: &str = "scheduled";
    pub const TEAM_ACTIVE: &str = "active";
    pub const VOLUNTEER_ACTIVE: &str = "active";
    pub const BLOG_DRAFT: &str = "draft";
    pub const BLOG_PUBLISHED: &str = "published";
}

/// 响应中内嵌的参考数据引用
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LookupRef {
    pub id: i64,
    pub name: String,
    pub label: String,
}

impl From<&lookup_entity::Model> for LookupRef {
    fn from(m: &lookup_entity::Model) -> Self {
        LookupRef {
            id: m.id,
            name: m.name.clone(),
            label: m.label.clone(),
        }
    }
}

/// 按 id 索引的参考数据，用于把外键列转换成响应里的 `LookupRef`
#[derive(Debug, Clone, Default)]
pub struct LookupLabels {
    by_id: HashMap<i64, LookupRef>,
}

impl LookupLabels {
    pub fn from_models(models: impl IntoIterator<Item = lookup_entity::Model>) -> Self {
        Self {
            by_id: models
                .into_iter()
                .map(|m| (m.id, LookupRef::from(&m)))
                .collect(),
        }
    }

    pub fn get(&self, id: Option<i64>) -> Option<LookupRef> {
        id.and_then(|id| self.by_id.get(&id).cloned())
    }

    pub fn name_of(&self, id: Option<i64>) -> Option<&str> {
        id.and_then(|id| self.by_id.get(&id))
            .map(|r| r.name.as_str())
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LookupResponse {
    pub id: i64,
    pub kind: String,
    pub name: String,
    pub label: String,
    pub sort_order: i32,
}

impl From<lookup_entity::Model> for LookupResponse {
    fn from(m: lookup_entity::Model) -> Self {
        LookupResponse {
            id: m.id,
            kind: m.kind,
            name: m.name,
            label: m.label,
            sort_order: m.sort_order,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trip_through_str() {
        for kind in LookupKind::ALL {
            assert_eq!(kind.as_str().parse::<LookupKind>().unwrap(), kind);
        }
        assert!("colour".parse::<LookupKind>().is_err());
    }

    #[test]
    fn test_labels_lookup() {
        let labels = LookupLabels::from_models(vec![lookup_entity::Model {
            id: 4,
            kind: "campaign_status".into(),
            name: "active".into(),
            label: "Active".into(),
            sort_order: 1,
            created_at: chrono::Utc::now(),
        }]);
        assert_eq!(labels.get(Some(4)).map(|r| r.label), Some("Active".to_string()));
        assert_eq!(labels.name_of(Some(4)), Some("active"));
        assert!(labels.get(Some(5)).is_none());
        assert!(labels.get(None).is_none());
    }

    #[test]
    fn test_kind_serde_matches_column_value() {
        let json = serde_json::to_string(&LookupKind::BackgroundCheckStatus).unwrap();
        assert_eq!(json, "\"background_check_status\"");
    }
}
