use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{LookupLabels, LookupRef};
use crate::entities::{address_entity, event_entity, event_registration_entity};
use crate::error::{AppError, AppResult};
use crate::utils::{
    Validate, optional_text, require_non_negative, require_positive, require_text, validate_url,
};

/// 活动列表查询参数
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct EventQuery {
    /// 只返回尚未开始的活动
    pub upcoming_only: Option<bool>,
    /// 活动分类名称
    pub category: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct AddressInput {
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub region: Option<String>,
    pub postal_code: Option<String>,
    /// ISO 3166-1 alpha-2
    pub country: String,
}

impl Validate for AddressInput {
    fn validate(&self) -> AppResult<()> {
        require_text("address.line1", &self.line1, 1, 200)?;
        require_text("address.city", &self.city, 1, 100)?;
        if self.country.trim().len() != 2 {
            return Err(AppError::invalid(
                "address.country",
                "must be a two-letter country code",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AddressResponse {
    pub id: i64,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub region: Option<String>,
    pub postal_code: Option<String>,
    pub country: String,
}

impl From<address_entity::Model> for AddressResponse {
    fn from(m: address_entity::Model) -> Self {
        AddressResponse {
            id: m.id,
            line1: m.line1,
            line2: m.line2,
            city: m.city,
            region: m.region,
            postal_code: m.postal_code,
            country: m.country,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct CreateEventRequest {
    pub title: String,
    pub description: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    /// 为空表示不限人数
    pub capacity: Option<i32>,
    /// 票价（美分），默认 0
    pub ticket_price: Option<i64>,
    pub currency_id: Option<i64>,
    pub category_id: Option<i64>,
    /// 默认 scheduled
    pub status_id: Option<i64>,
    pub address: Option<AddressInput>,
    pub registration_deadline: Option<DateTime<Utc>>,
    pub image_url: Option<String>,
}

impl Validate for CreateEventRequest {
    fn validate(&self) -> AppResult<()> {
        require_text("title", &self.title, 3, 200)?;
        require_text("description", &self.description, 1, 10_000)?;
        if let Some(capacity) = self.capacity {
            require_positive("capacity", capacity as i64)?;
        }
        require_non_negative("ticket_price", self.ticket_price.unwrap_or(0))?;
        if let Some(ends_at) = self.ends_at
            && ends_at < self.starts_at
        {
            return Err(AppError::invalid("ends_at", "must not be before starts_at"));
        }
        if let Some(deadline) = self.registration_deadline
            && deadline > self.starts_at
        {
            return Err(AppError::invalid(
                "registration_deadline",
                "must not be after the event starts",
            ));
        }
        if let Some(address) = &self.address {
            address.validate()?;
        }
        validate_url("image_url", self.image_url.as_deref())
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub capacity: Option<i32>,
    pub ticket_price: Option<i64>,
    pub currency_id: Option<i64>,
    pub category_id: Option<i64>,
    pub status_id: Option<i64>,
    pub address: Option<AddressInput>,
    pub registration_deadline: Option<DateTime<Utc>>,
    pub image_url: Option<String>,
}

impl Validate for UpdateEventRequest {
    fn validate(&self) -> AppResult<()> {
        if let Some(title) = &self.title {
            require_text("title", title, 3, 200)?;
        }
        if let Some(description) = &self.description {
            require_text("description", description, 1, 10_000)?;
        }
        if let Some(capacity) = self.capacity {
            require_positive("capacity", capacity as i64)?;
        }
        if let Some(price) = self.ticket_price {
            require_non_negative("ticket_price", price)?;
        }
        if let Some(address) = &self.address {
            address.validate()?;
        }
        optional_text("image_url", self.image_url.as_deref(), 2048)?;
        validate_url("image_url", self.image_url.as_deref())
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EventResponse {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub capacity: Option<i32>,
    pub registrations_count: i32,
    /// capacity - registrations_count，不限人数时为空
    pub available_spots: Option<i32>,
    pub ticket_price: i64,
    pub currency: Option<LookupRef>,
    pub category: Option<LookupRef>,
    pub status: Option<LookupRef>,
    pub address: Option<AddressResponse>,
    pub registration_deadline: Option<DateTime<Utc>>,
    pub image_url: Option<String>,
}

impl EventResponse {
    pub fn build(
        m: event_entity::Model,
        address: Option<address_entity::Model>,
        labels: &LookupLabels,
    ) -> Self {
        EventResponse {
            available_spots: m.available_spots(),
            currency: labels.get(Some(m.currency_id)),
            category: labels.get(m.category_id),
            status: labels.get(Some(m.status_id)),
            address: address.map(Into::into),
            id: m.id,
            title: m.title,
            description: m.description,
            starts_at: m.starts_at,
            ends_at: m.ends_at,
            capacity: m.capacity,
            registrations_count: m.registrations_count,
            ticket_price: m.ticket_price,
            registration_deadline: m.registration_deadline,
            image_url: m.image_url,
        }
    }

    pub fn lookup_ids(m: &event_entity::Model) -> [Option<i64>; 3] {
        [Some(m.currency_id), m.category_id, Some(m.status_id)]
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RegistrationResponse {
    pub id: i64,
    pub event_id: i64,
    pub user_id: i64,
    pub attendee_name: Option<String>,
    pub status: Option<LookupRef>,
    pub payment_status: Option<LookupRef>,
    pub registered_at: DateTime<Utc>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl RegistrationResponse {
    pub fn build(
        m: event_registration_entity::Model,
        attendee_name: Option<String>,
        labels: &LookupLabels,
    ) -> Self {
        RegistrationResponse {
            status: labels.get(Some(m.status_id)),
            payment_status: labels.get(Some(m.payment_status_id)),
            id: m.id,
            event_id: m.event_id,
            user_id: m.user_id,
            attendee_name,
            registered_at: m.registered_at,
            cancelled_at: m.cancelled_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn request() -> CreateEventRequest {
        let starts_at = Utc::now() + Duration::days(7);
        CreateEventRequest {
            title: "Charity run".into(),
            description: "5k around the park".into(),
            starts_at,
            capacity: Some(50),
            registration_deadline: Some(starts_at - Duration::days(1)),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_validation() {
        assert!(request().validate().is_ok());

        let mut zero = request();
        zero.capacity = Some(0);
        assert!(zero.validate().is_err());

        let mut late = request();
        late.registration_deadline = Some(late.starts_at + Duration::hours(1));
        assert!(late.validate().is_err());

        let mut bad_country = request();
        bad_country.address = Some(AddressInput {
            line1: "1 Main St".into(),
            city: "Springfield".into(),
            country: "USA".into(),
            ..Default::default()
        });
        assert!(bad_country.validate().is_err());
    }

    #[test]
    fn test_available_spots_in_response() {
        let now = Utc::now();
        let model = event_entity::Model {
            id: 1,
            title: "Gala".into(),
            description: "Annual gala".into(),
            starts_at: now,
            ends_at: None,
            capacity: Some(10),
            registrations_count: 7,
            ticket_price: 0,
            currency_id: 1,
            category_id: None,
            status_id: 2,
            address_id: None,
            registration_deadline: None,
            image_url: None,
            created_at: now,
            updated_at: now,
        };
        let response = EventResponse::build(model, None, &LookupLabels::default());
        assert_eq!(response.available_spots, Some(3));
    }
}
