mod common;

use charity_backend::database::{REFERENCE_DATA, seed_reference_data};
use charity_backend::error::AppError;
use charity_backend::models::LookupKind;
use charity_backend::services::LookupService;

#[tokio::test]
async fn seeding_twice_inserts_nothing_new() {
    let db = common::setup().await;
    let expected: usize = REFERENCE_DATA.iter().map(|(_, values)| values.len()).sum();

    let report = seed_reference_data(&db).await.unwrap();
    assert_eq!(report.inserted, 0);
    assert_eq!(report.existing as usize, expected);
}

#[tokio::test]
async fn every_kind_has_values_in_sort_order() {
    let db = common::setup().await;
    let service = LookupService::new(db.clone());

    for kind in LookupKind::ALL {
        let outcome = service.list(kind).await.unwrap();
        assert!(!outcome.is_fallback());
        assert!(!outcome.data.is_empty(), "no values for {kind}");
    }

    let statuses = service.list(LookupKind::PaymentStatus).await.unwrap().into_data();
    let names: Vec<&str> = statuses.iter().map(|l| l.name.as_str()).collect();
    assert_eq!(names, ["pending", "completed", "failed", "refunded"]);
}

#[tokio::test]
async fn require_rejects_id_from_another_vocabulary() {
    let db = common::setup().await;
    let currency = common::lookup_id(&db, LookupKind::Currency, "usd").await;

    let err = LookupService::require(&db, "category_id", LookupKind::CampaignCategory, currency)
        .await
        .unwrap_err();
    match err {
        AppError::ValidationError { field, .. } => assert_eq!(field, "category_id"),
        other => panic!("unexpected error: {other:?}"),
    }
}
