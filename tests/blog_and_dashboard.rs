mod common;

use charity_backend::error::AppError;
use charity_backend::models::{
    BlogPostQuery, CreateBlogPostRequest, CreateDonationRequest, EXCERPT_LENGTH,
};
use charity_backend::services::{BlogPostService, DashboardService, DonationService};

#[tokio::test]
async fn drafts_stay_hidden_until_published() {
    let db = common::setup().await;
    let author = common::user("author_1", "Ann");
    let posts = BlogPostService::new(db.clone());

    let content = "Water ".repeat(100);
    let draft = posts
        .create(
            &author,
            CreateBlogPostRequest {
                title: "Wells in the valley".to_string(),
                content: content.clone(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(draft.published_at.is_none());
    assert_eq!(draft.excerpt.chars().count(), EXCERPT_LENGTH + 3);
    assert!(draft.excerpt.ends_with("..."));

    let public = posts.list(&BlogPostQuery::default()).await.unwrap().into_data();
    assert_eq!(public.total, 0);
    assert!(matches!(
        posts.get(draft.id, false).await.unwrap_err(),
        AppError::NotFound(_)
    ));

    let with_drafts = BlogPostQuery {
        include_drafts: Some(true),
        ..Default::default()
    };
    assert_eq!(posts.list(&with_drafts).await.unwrap().into_data().total, 1);

    let published = posts.publish(&author, draft.id).await.unwrap();
    assert!(published.published_at.is_some());
    assert_eq!(
        published.status.map(|s| s.name).as_deref(),
        Some("published")
    );
    let public = posts.list(&BlogPostQuery::default()).await.unwrap().into_data();
    assert_eq!(public.total, 1);
    assert_eq!(public.data[0].author_name.as_deref(), Some("Ann Tester"));
}

#[tokio::test]
async fn only_the_author_edits_a_post() {
    let db = common::setup().await;
    let author = common::user("author_1", "Ann");
    let other = common::user("other_1", "Otto");
    let posts = BlogPostService::new(db.clone());

    let post = posts
        .create(
            &author,
            CreateBlogPostRequest {
                title: "Volunteer spotlight".to_string(),
                content: "Short story".to_string(),
                publish: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(post.excerpt, "Short story");

    // other 先创建本地用户
    posts
        .create(
            &other,
            CreateBlogPostRequest {
                title: "Another".to_string(),
                content: "Text".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(matches!(
        posts.delete(&other, post.id).await.unwrap_err(),
        AppError::Forbidden
    ));
    posts.delete(&common::admin("admin_1"), post.id).await.unwrap();
}

#[tokio::test]
async fn dashboard_summarises_the_callers_giving() {
    let db = common::setup().await;
    let owner = common::user("owner_1", "Olive");
    let donor = common::user("donor_a", "Ada");
    let campaign_id = common::create_campaign(&db, &owner, 10_000).await;

    let dashboard = DashboardService::new(db.clone());
    // 尚未产生本地用户时返回零值
    let empty = dashboard.summary(&donor).await.unwrap();
    assert!(!empty.is_fallback());
    assert_eq!(empty.data.total_donated, 0);

    let donations = DonationService::new(db.clone());
    for amount in [1_000, 2_000] {
        donations
            .create(
                &donor,
                CreateDonationRequest {
                    amount,
                    campaign_id: Some(campaign_id),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
    }

    let summary = dashboard.summary(&donor).await.unwrap().into_data();
    assert_eq!(summary.total_donated, 3_000);
    assert_eq!(summary.donations_count, 2);
    assert_eq!(summary.campaigns_supported, 1);
    assert_eq!(summary.recent_donations.len(), 2);

    let overview = dashboard.overview().await.unwrap().into_data();
    assert_eq!(overview.total_raised, 3_000);
    assert_eq!(overview.total_donations, 2);
    // 新建活动默认为 draft
    assert_eq!(overview.active_campaigns, 0);
}
