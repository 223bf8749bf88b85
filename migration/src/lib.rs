pub use sea_orm_migration::prelude::*;

mod m20250901_000001_create_reference_tables;
mod m20250901_000002_create_campaigns_and_donations;
mod m20250901_000003_create_events;
mod m20250901_000004_create_volunteers_and_teams;
mod m20250901_000005_create_blog_posts;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250901_000001_create_reference_tables::Migration),
            Box::new(m20250901_000002_create_campaigns_and_donations::Migration),
            Box::new(m20250901_000003_create_events::Migration),
            Box::new(m20250901_000004_create_volunteers_and_teams::Migration),
            Box::new(m20250901_000005_create_blog_posts::Migration),
        ]
    }
}
