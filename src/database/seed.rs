//! 参考数据初始化
//!
//! 以 (kind, name) 唯一键插入，冲突时跳过，已存在的行不会被修改，可重复执行。

use crate::entities::lookup_entity;
use crate::error::AppResult;
use crate::models::LookupKind;
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait, Set, TransactionTrait};
use serde::Serialize;
use utoipa::ToSchema;

/// (kind, [(name, label)])，sort_order 按数组顺序
pub const REFERENCE_DATA: &[(LookupKind, &[(&str, &str)])] = &[
    (
        LookupKind::Currency,
        &[("usd", "US Dollar"), ("eur", "Euro"), ("gbp", "British Pound"), ("cad", "Canadian Dollar")],
    ),
    (
        LookupKind::CampaignCategory,
        &[
            ("education", "Education"),
            ("health", "Health"),
            ("environment", "Environment"),
            ("disaster_relief", "Disaster Relief"),
            ("community", "Community"),
            ("animal_welfare", "Animal Welfare"),
        ],
    ),
    (
        LookupKind::CampaignStatus,
        &[
            ("draft", "Draft"),
            ("active", "Active"),
            ("paused", "Paused"),
            ("completed", "Completed"),
            ("cancelled", "Cancelled"),
        ],
    ),
    (
        LookupKind::UrgencyLevel,
        &[("low", "Low"), ("medium", "Medium"), ("high", "High"), ("critical", "Critical")],
    ),
    (
        LookupKind::PaymentMethod,
        &[
            ("card", "Credit / Debit Card"),
            ("bank_transfer", "Bank Transfer"),
            ("paypal", "PayPal"),
            ("cash", "Cash"),
            ("check", "Check"),
        ],
    ),
    (
        LookupKind::PaymentStatus,
        &[
            ("pending", "Pending"),
            ("completed", "Completed"),
            ("failed", "Failed"),
            ("refunded", "Refunded"),
        ],
    ),
    (
        LookupKind::DonationFrequency,
        &[
            ("one_time", "One Time"),
            ("weekly", "Weekly"),
            ("monthly", "Monthly"),
            ("quarterly", "Quarterly"),
            ("yearly", "Yearly"),
        ],
    ),
    (
        LookupKind::EventCategory,
        &[
            ("fundraiser", "Fundraiser"),
            ("workshop", "Workshop"),
            ("volunteer_day", "Volunteer Day"),
            ("awareness", "Awareness"),
            ("gala", "Gala"),
        ],
    ),
    (
        LookupKind::EventStatus,
        &[
            ("scheduled", "Scheduled"),
            ("ongoing", "Ongoing"),
            ("completed", "Completed"),
            ("cancelled", "Cancelled"),
        ],
    ),
    (
        LookupKind::RegistrationStatus,
        &[
            ("confirmed", "Confirmed"),
            ("waitlisted", "Waitlisted"),
            ("cancelled", "Cancelled"),
            ("attended", "Attended"),
        ],
    ),
    (
        LookupKind::TeamCategory,
        &[
            ("outreach", "Outreach"),
            ("logistics", "Logistics"),
            ("fundraising", "Fundraising"),
            ("mentoring", "Mentoring"),
        ],
    ),
    (
        LookupKind::TeamStatus,
        &[("active", "Active"), ("inactive", "Inactive"), ("archived", "Archived")],
    ),
    (
        LookupKind::VolunteerStatus,
        &[
            ("pending", "Pending"),
            ("active", "Active"),
            ("inactive", "Inactive"),
            ("suspended", "Suspended"),
        ],
    ),
    (
        LookupKind::BackgroundCheckStatus,
        &[
            ("not_started", "Not Started"),
            ("pending", "Pending"),
            ("approved", "Approved"),
            ("rejected", "Rejected"),
            ("expired", "Expired"),
        ],
    ),
    (
        LookupKind::BlogCategory,
        &[
            ("news", "News"),
            ("stories", "Impact Stories"),
            ("updates", "Campaign Updates"),
            ("guides", "Guides"),
        ],
    ),
    (
        LookupKind::BlogStatus,
        &[("draft", "Draft"), ("published", "Published"), ("archived", "Archived")],
    ),
    (
        LookupKind::Skill,
        &[
            ("teaching", "Teaching"),
            ("first_aid", "First Aid"),
            ("driving", "Driving"),
            ("cooking", "Cooking"),
            ("fundraising", "Fundraising"),
            ("translation", "Translation"),
            ("it_support", "IT Support"),
        ],
    ),
    (
        LookupKind::ActivityType,
        &[
            ("event_support", "Event Support"),
            ("project_work", "Project Work"),
            ("training", "Training"),
            ("administration", "Administration"),
            ("outreach", "Outreach"),
        ],
    ),
    (
        LookupKind::NotificationType,
        &[
            ("donation_receipt", "Donation Receipt"),
            ("event_reminder", "Event Reminder"),
            ("campaign_update", "Campaign Update"),
            ("team_invitation", "Team Invitation"),
        ],
    ),
];

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SeedReport {
    /// 本次新插入的行数
    pub inserted: u64,
    /// 已存在而被跳过的行数
    pub existing: u64,
}

pub async fn seed_reference_data(db: &DatabaseConnection) -> AppResult<SeedReport> {
    let txn = db.begin().await?;
    let before = lookup_entity::Entity::find().count(&txn).await?;
    let now = Utc::now();
    let mut expected = 0u64;

    for (kind, values) in REFERENCE_DATA {
        for (order, (name, label)) in values.iter().enumerate() {
            expected += 1;
            let am = lookup_entity::ActiveModel {
                kind: Set(kind.as_str().to_string()),
                name: Set((*name).to_string()),
                label: Set((*label).to_string()),
                sort_order: Set(order as i32),
                created_at: Set(now),
                ..Default::default()
            };
            lookup_entity::Entity::insert(am)
                .on_conflict(
                    OnConflict::columns([
                        lookup_entity::Column::Kind,
                        lookup_entity::Column::Name,
                    ])
                    .do_nothing()
                    .to_owned(),
                )
                .exec_without_returning(&txn)
                .await?;
        }
    }

    let after = lookup_entity::Entity::find().count(&txn).await?;
    txn.commit().await?;

    let inserted = after.saturating_sub(before);
    let report = SeedReport {
        inserted,
        existing: expected.saturating_sub(inserted),
    };
    log::info!(
        "Reference data seeded: {} inserted, {} already present",
        report.inserted,
        report.existing
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_every_kind_has_values() {
        for kind in LookupKind::ALL {
            assert!(
                REFERENCE_DATA.iter().any(|(k, v)| *k == kind && !v.is_empty()),
                "no reference data for {kind}"
            );
        }
    }

    #[test]
    fn test_names_unique_within_kind() {
        for (kind, values) in REFERENCE_DATA {
            let names: HashSet<_> = values.iter().map(|(n, _)| *n).collect();
            assert_eq!(names.len(), values.len(), "duplicate name in {kind}");
        }
    }
}
