#![allow(dead_code)]

use charity_backend::database::seed_reference_data;
use charity_backend::models::{AuthenticatedUser, CreateCampaignRequest, LookupKind};
use charity_backend::services::{CampaignService, LookupService};
use charity_backend::utils::ADMIN_ROLE;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

/// 每个测试一个独立的内存 SQLite，迁移并写入参考数据
pub async fn setup() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:".to_string());
    // 内存库随连接存在，固定为单连接
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options).await.expect("connect sqlite");
    Migrator::up(&db, None).await.expect("run migrations");
    seed_reference_data(&db).await.expect("seed reference data");
    db
}

pub fn user(subject: &str, first_name: &str) -> AuthenticatedUser {
    let mut user = AuthenticatedUser::new(subject);
    user.email = Some(format!("{subject}@example.org"));
    user.first_name = Some(first_name.to_string());
    user.last_name = Some("Tester".to_string());
    user
}

pub fn admin(subject: &str) -> AuthenticatedUser {
    let mut admin = user(subject, "Admin");
    admin.role = Some(ADMIN_ROLE.to_string());
    admin
}

pub async fn lookup_id(db: &DatabaseConnection, kind: LookupKind, name: &str) -> i64 {
    LookupService::resolve(db, kind, name)
        .await
        .expect("seeded lookup")
        .id
}

pub async fn create_campaign(db: &DatabaseConnection, owner: &AuthenticatedUser, goal: i64) -> i64 {
    let category_id = lookup_id(db, LookupKind::CampaignCategory, "education").await;
    let req = CreateCampaignRequest {
        title: "School supplies".to_string(),
        description: "Backpacks and books for the new term".to_string(),
        goal_amount: goal,
        category_id,
        ..Default::default()
    };
    CampaignService::new(db.clone())
        .create(owner, req)
        .await
        .expect("create campaign")
        .id
}
