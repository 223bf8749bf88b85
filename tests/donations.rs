mod common;

use charity_backend::error::AppError;
use charity_backend::models::{
    ANONYMOUS_DONOR, CreateDonationRequest, DonationQuery, DonorPreferencesRequest, LookupKind,
    UpdateDonationRequest,
};
use charity_backend::services::{CampaignService, DonationService};

fn donation(campaign_id: i64, amount: i64) -> CreateDonationRequest {
    CreateDonationRequest {
        amount,
        campaign_id: Some(campaign_id),
        ..Default::default()
    }
}

#[tokio::test]
async fn statistics_follow_donation_create_and_delete() {
    let db = common::setup().await;
    let owner = common::user("owner_1", "Olive");
    let donor_a = common::user("donor_a", "Ada");
    let donor_b = common::user("donor_b", "Ben");
    let campaign_id = common::create_campaign(&db, &owner, 100_000).await;

    let donations = DonationService::new(db.clone());
    let campaigns = CampaignService::new(db.clone());

    let first = donations.create(&donor_a, donation(campaign_id, 5_000)).await.unwrap();
    donations.create(&donor_b, donation(campaign_id, 3_000)).await.unwrap();

    let stats = campaigns.statistics(campaign_id).await.unwrap();
    assert_eq!(stats.current_amount, 8_000);
    assert_eq!(stats.donations_count, 2);
    assert_eq!(stats.unique_donors_count, 2);
    assert_eq!(stats.average_donation, 4_000);
    assert_eq!(stats.completion_percentage, 8.0);
    assert!(stats.last_donation_at.is_some());

    donations.delete(&donor_a, first.id).await.unwrap();
    let stats = campaigns.statistics(campaign_id).await.unwrap();
    assert_eq!(stats.current_amount, 3_000);
    assert_eq!(stats.donations_count, 1);
    assert_eq!(stats.unique_donors_count, 1);
    assert_eq!(stats.average_donation, 3_000);
}

#[tokio::test]
async fn amount_change_adjusts_statistics_by_delta() {
    let db = common::setup().await;
    let owner = common::user("owner_1", "Olive");
    let donor = common::user("donor_a", "Ada");
    let campaign_id = common::create_campaign(&db, &owner, 10_000).await;

    let donations = DonationService::new(db.clone());
    let created = donations.create(&donor, donation(campaign_id, 2_000)).await.unwrap();
    let updated = donations
        .update(
            &donor,
            created.id,
            UpdateDonationRequest {
                amount: Some(2_500),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.amount, 2_500);
    assert_eq!(updated.processing_fee, 103);
    assert_eq!(updated.net_amount, 2_397);

    let stats = CampaignService::new(db.clone()).statistics(campaign_id).await.unwrap();
    assert_eq!(stats.current_amount, 2_500);
    assert_eq!(stats.donations_count, 1);
    assert_eq!(stats.completion_percentage, 25.0);
}

#[tokio::test]
async fn fee_and_processed_at_on_completed_payment() {
    let db = common::setup().await;
    let owner = common::user("owner_1", "Olive");
    let donor = common::user("donor_a", "Ada");
    let campaign_id = common::create_campaign(&db, &owner, 10_000).await;
    let completed = common::lookup_id(&db, LookupKind::PaymentStatus, "completed").await;

    let donations = DonationService::new(db.clone());
    let pending = donations.create(&donor, donation(campaign_id, 1_000)).await.unwrap();
    assert_eq!(pending.processing_fee, 59);
    assert_eq!(pending.net_amount, 941);
    assert!(pending.processed_at.is_none());

    let mut req = donation(campaign_id, 10);
    req.payment_status_id = Some(completed);
    let tiny = donations.create(&donor, req).await.unwrap();
    // 手续费不超过捐款金额
    assert_eq!(tiny.processing_fee, 10);
    assert_eq!(tiny.net_amount, 0);
    assert!(tiny.processed_at.is_some());
}

#[tokio::test]
async fn anonymous_donors_are_masked_everywhere() {
    let db = common::setup().await;
    let owner = common::user("owner_1", "Olive");
    let visible = common::user("donor_a", "Ada");
    let hidden = common::user("donor_b", "Ben");
    let shy = common::user("donor_c", "Cy");
    let campaign_id = common::create_campaign(&db, &owner, 50_000).await;

    let donations = DonationService::new(db.clone());
    donations.create(&visible, donation(campaign_id, 1_000)).await.unwrap();
    let mut req = donation(campaign_id, 2_000);
    req.is_anonymous = true;
    donations.create(&hidden, req).await.unwrap();

    // 捐赠人级别的匿名偏好同样生效
    donations.create(&shy, donation(campaign_id, 3_000)).await.unwrap();
    donations
        .update_donor_preferences(
            &shy,
            DonorPreferencesRequest {
                is_anonymous: Some(true),
                display_name: None,
            },
        )
        .await
        .unwrap();

    let query = DonationQuery {
        campaign_id: Some(campaign_id),
        ..Default::default()
    };
    let page = donations.list(&query).await.unwrap().into_data();
    assert_eq!(page.total, 3);
    let mut names: Vec<String> = page.data.iter().map(|d| d.donor_name.clone()).collect();
    names.sort();
    assert_eq!(names, [ANONYMOUS_DONOR, ANONYMOUS_DONOR, "Ada Tester"]);

    let detail = CampaignService::new(db.clone()).get(campaign_id).await.unwrap();
    assert_eq!(detail.recent_donations.len(), 3);
    assert!(
        detail
            .recent_donations
            .iter()
            .all(|d| d.donor_name != "Ben Tester" && d.donor_name != "Cy Tester")
    );
}

#[tokio::test]
async fn general_fund_donation_leaves_campaigns_untouched() {
    let db = common::setup().await;
    let owner = common::user("owner_1", "Olive");
    let donor = common::user("donor_a", "Ada");
    let campaign_id = common::create_campaign(&db, &owner, 10_000).await;

    let donations = DonationService::new(db.clone());
    let general = donations
        .create(
            &donor,
            CreateDonationRequest {
                amount: 700,
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(general.campaign_id.is_none());

    let stats = CampaignService::new(db.clone()).statistics(campaign_id).await.unwrap();
    assert_eq!(stats.current_amount, 0);
    assert_eq!(stats.donations_count, 0);
}

#[tokio::test]
async fn rejects_invalid_amount_and_unknown_campaign() {
    let db = common::setup().await;
    let donor = common::user("donor_a", "Ada");
    let donations = DonationService::new(db.clone());

    let err = donations.create(&donor, donation(1, 0)).await.unwrap_err();
    assert!(matches!(err, AppError::ValidationError { ref field, .. } if field == "amount"));

    let err = donations.create(&donor, donation(999, 500)).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn only_the_donor_or_an_admin_may_delete() {
    let db = common::setup().await;
    let owner = common::user("owner_1", "Olive");
    let donor = common::user("donor_a", "Ada");
    let stranger = common::user("stranger", "Sam");
    let campaign_id = common::create_campaign(&db, &owner, 10_000).await;

    let donations = DonationService::new(db.clone());
    let created = donations.create(&donor, donation(campaign_id, 1_000)).await.unwrap();
    // stranger 需要先有本地用户
    donations.create(&stranger, donation(campaign_id, 100)).await.unwrap();

    let err = donations.delete(&stranger, created.id).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    donations.delete(&common::admin("admin_1"), created.id).await.unwrap();
    let stats = CampaignService::new(db.clone()).statistics(campaign_id).await.unwrap();
    assert_eq!(stats.current_amount, 100);
}

#[tokio::test]
async fn reconcile_rebuilds_from_donation_rows() {
    let db = common::setup().await;
    let owner = common::user("owner_1", "Olive");
    let donor = common::user("donor_a", "Ada");
    let campaign_id = common::create_campaign(&db, &owner, 20_000).await;

    let donations = DonationService::new(db.clone());
    donations.create(&donor, donation(campaign_id, 4_000)).await.unwrap();
    donations.create(&donor, donation(campaign_id, 6_000)).await.unwrap();

    let campaigns = CampaignService::new(db.clone());
    let report = campaigns.reconcile_all().await.unwrap();
    assert_eq!(report.campaigns, 1);

    let stats = campaigns.reconcile(campaign_id).await.unwrap();
    assert_eq!(stats.current_amount, 10_000);
    assert_eq!(stats.donations_count, 2);
    assert_eq!(stats.unique_donors_count, 1);
    assert_eq!(stats.completion_percentage, 50.0);
}

#[tokio::test]
async fn deleting_a_campaign_moves_donations_to_general_fund() {
    let db = common::setup().await;
    let owner = common::user("owner_1", "Olive");
    let donor = common::user("donor_a", "Ada");
    let campaign_id = common::create_campaign(&db, &owner, 20_000).await;

    let donations = DonationService::new(db.clone());
    let created = donations.create(&donor, donation(campaign_id, 4_000)).await.unwrap();

    let campaigns = CampaignService::new(db.clone());
    let err = campaigns.delete(&donor, campaign_id).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden));
    campaigns.delete(&owner, campaign_id).await.unwrap();

    let kept = donations.get(created.id).await.unwrap();
    assert!(kept.campaign_id.is_none());
    assert!(matches!(
        campaigns.get(campaign_id).await.unwrap_err(),
        AppError::NotFound(_)
    ));
}
