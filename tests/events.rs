mod common;

use charity_backend::error::AppError;
use charity_backend::models::{AuthenticatedUser, CreateEventRequest};
use charity_backend::services::{ALREADY_REGISTERED, DEADLINE_PASSED, EVENT_FULL, EventService};
use chrono::{DateTime, Duration, Utc};
use sea_orm::DatabaseConnection;

async fn create_event(
    db: &DatabaseConnection,
    capacity: Option<i32>,
    deadline: Option<DateTime<Utc>>,
) -> i64 {
    let req = CreateEventRequest {
        title: "Riverside cleanup".to_string(),
        description: "Bring gloves".to_string(),
        starts_at: Utc::now() + Duration::days(7),
        capacity,
        registration_deadline: deadline,
        ..Default::default()
    };
    EventService::new(db.clone())
        .create(&common::admin("admin_1"), req)
        .await
        .unwrap()
        .id
}

fn business_message(err: AppError) -> String {
    match err {
        AppError::BusinessRule(msg) => msg,
        other => panic!("expected business rule rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn only_admins_create_events() {
    let db = common::setup().await;
    let req = CreateEventRequest {
        title: "Bake sale".to_string(),
        description: "Cakes".to_string(),
        starts_at: Utc::now() + Duration::days(1),
        ..Default::default()
    };
    let err = EventService::new(db.clone())
        .create(&common::user("u1", "Uma"), req)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));
}

#[tokio::test]
async fn last_spot_goes_to_exactly_one_registrant() {
    let db = common::setup().await;
    let event_id = create_event(&db, Some(1), None).await;
    let events = EventService::new(db.clone());

    let first = common::user("u1", "Uma");
    let second = common::user("u2", "Vic");
    events.register(&first, event_id).await.unwrap();

    let err = events.register(&second, event_id).await.unwrap_err();
    assert_eq!(business_message(err), EVENT_FULL);

    let event = events.get(event_id).await.unwrap();
    assert_eq!(event.registrations_count, 1);
    assert_eq!(event.available_spots, Some(0));
}

#[tokio::test]
async fn concurrent_registrations_never_exceed_capacity() {
    let db = common::setup().await;
    let event_id = create_event(&db, Some(1), None).await;
    let events = EventService::new(db.clone());

    let first = common::user("u1", "Uma");
    let second = common::user("u2", "Vic");
    let (a, b) = tokio::join!(
        events.register(&first, event_id),
        events.register(&second, event_id)
    );

    assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1);
    let rejected = if a.is_err() { a } else { b };
    assert_eq!(business_message(rejected.unwrap_err()), EVENT_FULL);
    assert_eq!(events.get(event_id).await.unwrap().registrations_count, 1);
}

#[tokio::test]
async fn spot_claim_is_refused_once_capacity_is_reached() {
    let db = common::setup().await;
    let event_id = create_event(&db, Some(2), None).await;
    let events = EventService::new(db.clone());
    events.register(&common::user("u1", "Uma"), event_id).await.unwrap();

    assert!(EventService::claim_spot(&db, event_id).await.unwrap());
    // registrations_count == capacity
    assert!(!EventService::claim_spot(&db, event_id).await.unwrap());
    let event = events.get(event_id).await.unwrap();
    assert_eq!(event.registrations_count, 2);
    assert_eq!(event.available_spots, Some(0));

    let open = create_event(&db, None, None).await;
    for _ in 0..3 {
        assert!(EventService::claim_spot(&db, open).await.unwrap());
    }
    assert_eq!(events.get(open).await.unwrap().registrations_count, 3);
}

#[tokio::test]
async fn deadline_is_inclusive() {
    let db = common::setup().await;
    let deadline = Utc::now() + Duration::days(3);
    let event_id = create_event(&db, None, Some(deadline)).await;
    let events = EventService::new(db.clone());

    let late = common::user("late", "Lou");
    let err = events
        .register_at(&late, event_id, deadline + Duration::seconds(1))
        .await
        .unwrap_err();
    assert_eq!(business_message(err), DEADLINE_PASSED);

    let early = common::user("early", "Eve");
    events
        .register_at(&early, event_id, deadline - Duration::seconds(1))
        .await
        .unwrap();
    events.register_at(&late, event_id, deadline).await.unwrap();
}

#[tokio::test]
async fn duplicate_registration_is_rejected_until_cancelled() {
    let db = common::setup().await;
    let event_id = create_event(&db, Some(5), None).await;
    let events = EventService::new(db.clone());
    let caller: AuthenticatedUser = common::user("u1", "Uma");

    let registration = events.register(&caller, event_id).await.unwrap();
    assert_eq!(registration.attendee_name.as_deref(), Some("Uma Tester"));
    assert_eq!(
        registration.status.map(|s| s.name).as_deref(),
        Some("confirmed")
    );

    let err = events.register(&caller, event_id).await.unwrap_err();
    assert_eq!(business_message(err), ALREADY_REGISTERED);

    let cancelled = events.cancel_registration(&caller, event_id).await.unwrap();
    assert!(cancelled.cancelled_at.is_some());
    assert_eq!(events.get(event_id).await.unwrap().registrations_count, 0);

    // 取消后可以重新报名
    events.register(&caller, event_id).await.unwrap();
    assert_eq!(events.get(event_id).await.unwrap().registrations_count, 1);

    let list = events.registrations(event_id).await.unwrap().into_data();
    assert_eq!(list.len(), 1);
    assert!(list[0].cancelled_at.is_none());
}

#[tokio::test]
async fn cancelling_frees_a_spot_for_someone_else() {
    let db = common::setup().await;
    let event_id = create_event(&db, Some(1), None).await;
    let events = EventService::new(db.clone());

    let first = common::user("u1", "Uma");
    let second = common::user("u2", "Vic");
    events.register(&first, event_id).await.unwrap();
    events.cancel_registration(&first, event_id).await.unwrap();
    events.register(&second, event_id).await.unwrap();

    assert_eq!(events.get(event_id).await.unwrap().available_spots, Some(0));
}
