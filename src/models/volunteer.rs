use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{LookupLabels, LookupRef};
use crate::entities::{
    emergency_contact_entity, user_entity, volunteer_activity_entity, volunteer_entity,
    volunteer_statistics_entity,
};
use crate::error::AppResult;
use crate::utils::{Validate, optional_text, require_range_f64, require_text, validate_date_order};

/// 单条活动记录允许的最大时长
pub const MAX_ACTIVITY_HOURS: f64 = 24.0;

#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct VolunteerQuery {
    /// 志愿者状态名称
    pub status: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct EmergencyContactInput {
    pub name: String,
    pub phone: String,
    pub relationship: Option<String>,
}

impl Validate for EmergencyContactInput {
    fn validate(&self) -> AppResult<()> {
        require_text("emergency_contact.name", &self.name, 1, 120)?;
        require_text("emergency_contact.phone", &self.phone, 5, 32)?;
        optional_text(
            "emergency_contact.relationship",
            self.relationship.as_deref(),
            60,
        )
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EmergencyContactResponse {
    pub name: String,
    pub phone: String,
    pub relationship: Option<String>,
}

impl From<emergency_contact_entity::Model> for EmergencyContactResponse {
    fn from(m: emergency_contact_entity::Model) -> Self {
        EmergencyContactResponse {
            name: m.name,
            phone: m.phone,
            relationship: m.relationship,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct CreateVolunteerRequest {
    pub availability: Option<String>,
    pub emergency_contact: Option<EmergencyContactInput>,
    pub background_check_status_id: Option<i64>,
    pub background_check_date: Option<NaiveDate>,
    pub background_check_expires_on: Option<NaiveDate>,
    /// 默认 active
    pub status_id: Option<i64>,
}

impl Validate for CreateVolunteerRequest {
    fn validate(&self) -> AppResult<()> {
        optional_text("availability", self.availability.as_deref(), 2000)?;
        if let Some(contact) = &self.emergency_contact {
            contact.validate()?;
        }
        validate_date_order(
            "background_check_expires_on",
            self.background_check_date,
            self.background_check_expires_on,
        )
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateVolunteerRequest {
    pub availability: Option<String>,
    pub emergency_contact: Option<EmergencyContactInput>,
    pub background_check_status_id: Option<i64>,
    pub background_check_date: Option<NaiveDate>,
    pub background_check_expires_on: Option<NaiveDate>,
    pub status_id: Option<i64>,
}

impl Validate for UpdateVolunteerRequest {
    fn validate(&self) -> AppResult<()> {
        optional_text("availability", self.availability.as_deref(), 2000)?;
        if let Some(contact) = &self.emergency_contact {
            contact.validate()?;
        }
        validate_date_order(
            "background_check_expires_on",
            self.background_check_date,
            self.background_check_expires_on,
        )
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct VolunteerStatisticsResponse {
    pub volunteer_id: i64,
    pub total_hours: f64,
    pub activities_count: i64,
    pub projects_count: i64,
    pub events_count: i64,
    pub teams_count: i64,
}

impl VolunteerStatisticsResponse {
    pub fn from_row(volunteer_id: i64, row: Option<&volunteer_statistics_entity::Model>) -> Self {
        match row {
            Some(s) => VolunteerStatisticsResponse {
                volunteer_id,
                total_hours: s.total_hours,
                activities_count: s.activities_count,
                projects_count: s.projects_count,
                events_count: s.events_count,
                teams_count: s.teams_count,
            },
            None => VolunteerStatisticsResponse {
                volunteer_id,
                total_hours: 0.0,
                activities_count: 0,
                projects_count: 0,
                events_count: 0,
                teams_count: 0,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct VolunteerResponse {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub email: Option<String>,
    pub availability: Option<String>,
    pub emergency_contact: Option<EmergencyContactResponse>,
    pub background_check_status: Option<LookupRef>,
    pub background_check_date: Option<NaiveDate>,
    pub background_check_expires_on: Option<NaiveDate>,
    pub status: Option<LookupRef>,
    pub statistics: VolunteerStatisticsResponse,
    pub created_at: DateTime<Utc>,
}

impl VolunteerResponse {
    pub fn build(
        m: volunteer_entity::Model,
        user: Option<&user_entity::Model>,
        contact: Option<emergency_contact_entity::Model>,
        stats: Option<&volunteer_statistics_entity::Model>,
        labels: &LookupLabels,
    ) -> Self {
        VolunteerResponse {
            name: user
                .map(|u| u.display_name())
                .unwrap_or_else(|| "Volunteer".to_string()),
            email: user.and_then(|u| u.email.clone()),
            emergency_contact: contact.map(Into::into),
            background_check_status: labels.get(m.background_check_status_id),
            status: labels.get(Some(m.status_id)),
            statistics: VolunteerStatisticsResponse::from_row(m.id, stats),
            id: m.id,
            user_id: m.user_id,
            availability: m.availability,
            background_check_date: m.background_check_date,
            background_check_expires_on: m.background_check_expires_on,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct LogActivityRequest {
    pub activity_type_id: Option<i64>,
    /// 时长（小时），取值 (0, 24]
    pub hours: f64,
    /// 默认当天
    pub activity_date: Option<NaiveDate>,
    pub project_id: Option<i64>,
    pub event_id: Option<i64>,
    pub description: Option<String>,
}

impl Validate for LogActivityRequest {
    fn validate(&self) -> AppResult<()> {
        require_range_f64("hours", self.hours, 0.0, MAX_ACTIVITY_HOURS)?;
        optional_text("description", self.description.as_deref(), 2000)
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ActivityResponse {
    pub id: i64,
    pub volunteer_id: i64,
    pub activity_type: Option<LookupRef>,
    pub hours: f64,
    pub activity_date: NaiveDate,
    pub project_id: Option<i64>,
    pub event_id: Option<i64>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ActivityResponse {
    pub fn build(m: volunteer_activity_entity::Model, labels: &LookupLabels) -> Self {
        ActivityResponse {
            activity_type: labels.get(m.activity_type_id),
            id: m.id,
            volunteer_id: m.volunteer_id,
            hours: m.hours,
            activity_date: m.activity_date,
            project_id: m.project_id,
            event_id: m.event_id,
            description: m.description,
            created_at: m.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hours_range() {
        let mut req = LogActivityRequest {
            hours: 24.0,
            ..Default::default()
        };
        assert!(req.validate().is_ok());
        req.hours = 24.5;
        assert!(req.validate().is_err());
        req.hours = 0.0;
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_background_check_dates() {
        let req = CreateVolunteerRequest {
            background_check_date: NaiveDate::from_ymd_opt(2025, 5, 1),
            background_check_expires_on: NaiveDate::from_ymd_opt(2024, 5, 1),
            ..Default::default()
        };
        assert!(req.validate().is_err());
    }
}
