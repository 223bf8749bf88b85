mod common;

use charity_backend::models::{BlogPostQuery, CampaignQuery, LookupKind, ReadStatus};
use charity_backend::services::{BlogPostService, CampaignService, DashboardService, LookupService};
use sea_orm::ConnectionTrait;

#[tokio::test]
async fn list_reads_degrade_to_empty_when_storage_fails() {
    let db = common::setup().await;
    db.execute_unprepared("DROP TABLE blog_posts").await.unwrap();

    let outcome = BlogPostService::new(db.clone())
        .list(&BlogPostQuery::default())
        .await
        .unwrap();
    assert!(outcome.is_fallback());
    assert_eq!(outcome.data.total, 0);
    assert!(outcome.data.data.is_empty());
    assert!(matches!(outcome.status, ReadStatus::Fallback { .. }));
}

#[tokio::test]
async fn campaign_list_and_overview_fall_back() {
    let db = common::setup().await;
    db.execute_unprepared("DROP TABLE campaign_statistics").await.unwrap();

    let campaigns = CampaignService::new(db.clone())
        .list(&CampaignQuery::default())
        .await
        .unwrap();
    assert!(campaigns.is_fallback());
    assert_eq!(campaigns.data.total, 0);

    let overview = DashboardService::new(db.clone()).overview().await.unwrap();
    assert!(overview.is_fallback());
    assert_eq!(overview.data.total_raised, 0);
}

#[tokio::test]
async fn healthy_reads_are_marked_fresh() {
    let db = common::setup().await;
    let outcome = LookupService::new(db.clone())
        .list(LookupKind::Currency)
        .await
        .unwrap();
    assert_eq!(outcome.status, ReadStatus::Fresh);
}
