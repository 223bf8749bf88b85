use actix_web::{App, HttpServer, middleware::Logger, web};
use anyhow::Context;
use chrono::Local;
use env_logger::{Env, Target};
use std::io::Write;

use charity_backend::{
    config::Config,
    database::{create_pool, run_migrations, seed_reference_data},
    handlers,
    middlewares::{AuthMiddleware, create_cors},
    services::*,
    swagger::swagger_config,
    tasks,
    utils::TokenVerifier,
};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    // 加载配置
    let config =
        Config::load().map_err(|e| anyhow::anyhow!("Failed to load configuration: {e}"))?;

    // 创建数据库连接池
    let pool = create_pool(&config.database)
        .await
        .context("Failed to create database connection pool")?;

    // 运行数据库迁移
    run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;

    // 补齐参考数据
    let report = seed_reference_data(&pool)
        .await
        .context("Failed to seed reference data")?;
    log::info!(
        "Reference data ready: {} inserted, {} existing",
        report.inserted,
        report.existing
    );

    let verifier = TokenVerifier::new(&config.auth);

    // 创建服务
    let user_service = UserService::new(pool.clone());
    let lookup_service = LookupService::new(pool.clone());
    let campaign_service = CampaignService::new(pool.clone());
    let donation_service = DonationService::new(pool.clone());
    let event_service = EventService::new(pool.clone());
    let volunteer_service = VolunteerService::new(pool.clone());
    let team_service = TeamService::new(pool.clone());
    let blog_post_service = BlogPostService::new(pool.clone());
    let dashboard_service = DashboardService::new(pool.clone());
    let partnership_service = PartnershipService::new(config.notifications.clone());

    // 启动后台定时任务
    tasks::spawn_all(campaign_service.clone(), &config.tasks);

    // 启动HTTP服务器
    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    let server_config = config.server.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(AuthMiddleware::new(verifier.clone()))
            .wrap(create_cors(&server_config))
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(user_service.clone()))
            .app_data(web::Data::new(lookup_service.clone()))
            .app_data(web::Data::new(campaign_service.clone()))
            .app_data(web::Data::new(donation_service.clone()))
            .app_data(web::Data::new(event_service.clone()))
            .app_data(web::Data::new(volunteer_service.clone()))
            .app_data(web::Data::new(team_service.clone()))
            .app_data(web::Data::new(blog_post_service.clone()))
            .app_data(web::Data::new(dashboard_service.clone()))
            .app_data(web::Data::new(partnership_service.clone()))
            .configure(swagger_config)
            .service(
                web::scope("/api/v1")
                    .configure(handlers::auth_config)
                    .configure(handlers::lookup_config)
                    .configure(handlers::campaign_config)
                    .configure(handlers::donation_config)
                    .configure(handlers::event_config)
                    .configure(handlers::volunteer_config)
                    .configure(handlers::team_config)
                    .configure(handlers::blog_post_config)
                    .configure(handlers::dashboard_config)
                    .configure(handlers::partnership_config)
                    .configure(handlers::admin_config),
            )
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await?;

    Ok(())
}
