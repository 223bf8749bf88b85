mod common;

use actix_web::dev::Service;
use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use charity_backend::config::AuthConfig;
use charity_backend::handlers;
use charity_backend::middlewares::AuthMiddleware;
use charity_backend::models::LookupKind;
use charity_backend::services::*;
use charity_backend::utils::{ADMIN_ROLE, Claims, TokenVerifier};
use serde_json::{Value, json};

fn verifier() -> TokenVerifier {
    TokenVerifier::new(&AuthConfig {
        token_secret: "http-test-secret".to_string(),
        issuer: None,
        audience: None,
    })
}

fn bearer(subject: &str, role: Option<&str>) -> (&'static str, String) {
    let mut claims = Claims::new(subject, 600);
    claims.given_name = Some("Hana".to_string());
    claims.role = role.map(str::to_string);
    let token = verifier().issue(&claims).unwrap();
    ("Authorization", format!("Bearer {token}"))
}

macro_rules! app {
    ($db:expr) => {
        test::init_service(
            App::new()
                .wrap(AuthMiddleware::new(verifier()))
                .app_data(web::Data::new($db.clone()))
                .app_data(web::Data::new(LookupService::new($db.clone())))
                .app_data(web::Data::new(CampaignService::new($db.clone())))
                .app_data(web::Data::new(EventService::new($db.clone())))
                .service(
                    web::scope("/api/v1")
                        .configure(handlers::lookup_config)
                        .configure(handlers::campaign_config)
                        .configure(handlers::event_config)
                        .configure(handlers::admin_config),
                ),
        )
        .await
    };
}

#[actix_web::test]
async fn public_reads_need_no_token() {
    let db = common::setup().await;
    let app = app!(db);

    let req = test::TestRequest::get()
        .uri("/api/v1/lookups/currency")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"][0]["name"], "usd");
    assert!(body.get("degraded").is_none());

    let req = test::TestRequest::get()
        .uri("/api/v1/lookups/not_a_kind")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["field"], "kind");
}

#[actix_web::test]
async fn writes_require_a_valid_token() {
    let db = common::setup().await;
    let app = app!(db);

    let req = test::TestRequest::post()
        .uri("/api/v1/campaigns")
        .set_json(json!({"title": "Nope"}))
        .to_request();
    let err = app.call(req).await.err().expect("missing token is rejected");
    assert_eq!(err.as_response_error().status_code(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri("/api/v1/events/1/registrations")
        .insert_header(("Authorization", "Bearer garbage"))
        .to_request();
    let err = app.call(req).await.err().expect("bad token is rejected");
    assert_eq!(err.as_response_error().status_code(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn create_then_read_campaign_over_http() {
    let db = common::setup().await;
    let category = common::lookup_id(&db, LookupKind::CampaignCategory, "health").await;
    let app = app!(db);

    let req = test::TestRequest::post()
        .uri("/api/v1/campaigns")
        .insert_header(bearer("user_http", None))
        .set_json(json!({
            "title": "Clinic roof",
            "description": "Fix the roof before the rains",
            "goal_amount": 250000,
            "category_id": category
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    let id = body["data"]["id"].as_i64().unwrap();
    assert_eq!(body["data"]["status"]["name"], "draft");

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/campaigns/{id}"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["statistics"]["current_amount"], 0);
    assert_eq!(body["data"]["category"]["name"], "health");

    let req = test::TestRequest::post()
        .uri("/api/v1/campaigns")
        .insert_header(bearer("user_http", None))
        .set_json(json!({
            "title": "Clinic roof",
            "description": "Fix the roof",
            "goal_amount": 0,
            "category_id": category
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["field"], "goal_amount");
}

#[actix_web::test]
async fn admin_routes_check_role() {
    let db = common::setup().await;
    let app = app!(db);

    let req = test::TestRequest::post()
        .uri("/api/v1/admin/seed")
        .insert_header(bearer("plain_user", None))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::post()
        .uri("/api/v1/admin/seed")
        .insert_header(bearer("boss", Some(ADMIN_ROLE)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["inserted"], 0);
}
