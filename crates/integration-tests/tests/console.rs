//! Elf roster, dashboard, theme preference and health checks.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use serde_json::{Value, json};

use santas_workshop::config::{ElfBoostPolicy, WorkshopConfig};
use santas_workshop_integration_tests::{TestApp, TestClient};

async fn hire_elf(admin: &mut TestClient, name: &str, energy: i64) -> Value {
    let response = admin
        .post(
            "/api/elves",
            Some(json!({ "name": name, "role": "Toy Maker", "energy": energy })),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
    response.body
}

#[tokio::test]
async fn test_only_admins_hire_elves() {
    let app = TestApp::new();
    let mut visitor = app.client();

    let response = visitor
        .post(
            "/api/elves",
            Some(json!({ "name": "Buddy", "role": "Toy Maker", "energy": 50 })),
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let mut admin = app.admin_client("santa@northpole.org").await;
    let invalid = admin
        .post(
            "/api/elves",
            Some(json!({ "name": "Buddy", "role": "Toy Maker", "energy": 140 })),
        )
        .await;
    assert_eq!(invalid.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        invalid.body["errors"]["energy"],
        "Energy must be between 0 and 100"
    );

    let elf = hire_elf(&mut admin, "Buddy", 50).await;
    assert_eq!(elf["energy"], 50);
    assert_eq!(elf["band"], "medium");

    let roster = visitor.get("/api/elves").await;
    assert_eq!(roster.body["elves"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_preview_boost_is_not_stored() {
    let app = TestApp::new();
    let mut admin = app.admin_client("santa@northpole.org").await;
    let elf = hire_elf(&mut admin, "Jovie", 75).await;
    let uri = format!("/api/elves/{}", elf["id"].as_str().unwrap());

    let mut visitor = app.client();
    let boosted = visitor.post(&format!("{uri}/boost"), None).await;
    assert_eq!(boosted.status, StatusCode::OK);
    assert_eq!(boosted.body["energy"], 85);
    assert_eq!(boosted.body["band"], "high");

    let stored = visitor.get(&uri).await;
    assert_eq!(stored.body["energy"], 75);
}

#[tokio::test]
async fn test_persisted_boost_requires_admin_and_caps_at_full() {
    let app = TestApp::with_config(WorkshopConfig {
        elf_boost: ElfBoostPolicy::Persist,
        ..WorkshopConfig::default()
    });
    let mut admin = app.admin_client("santa@northpole.org").await;
    let elf = hire_elf(&mut admin, "Pepper", 95).await;
    let uri = format!("/api/elves/{}", elf["id"].as_str().unwrap());

    let mut visitor = app.client();
    let refused = visitor.post(&format!("{uri}/boost"), None).await;
    assert_eq!(refused.status, StatusCode::UNAUTHORIZED);

    let boosted = admin.post(&format!("{uri}/boost"), None).await;
    assert_eq!(boosted.status, StatusCode::OK);
    assert_eq!(boosted.body["energy"], 100);

    let stored = visitor.get(&uri).await;
    assert_eq!(stored.body["energy"], 100);
}

#[tokio::test]
async fn test_dashboard_counts_visible_records() {
    let app = TestApp::new();
    let mut admin = app.admin_client("santa@northpole.org").await;
    hire_elf(&mut admin, "Buddy", 0).await;
    hire_elf(&mut admin, "Jovie", 40).await;

    let mut visitor = app.client();
    visitor
        .post(
            "/api/toys",
            Some(json!({ "name": "Teddy", "category": "Plush", "difficulty": "Easy" })),
        )
        .await;
    visitor
        .post(
            "/api/orders",
            Some(json!({ "childName": "Lumi", "country": "Iceland", "toyId": "toy-teddy" })),
        )
        .await;

    let dashboard = visitor.get("/api/dashboard").await;

    assert_eq!(dashboard.status, StatusCode::OK);
    assert_eq!(
        dashboard.body["stats"],
        json!({
            "totalToys": 1,
            "totalOrders": 1,
            "pendingOrders": 1,
            "totalElves": 2,
            "activeElves": 1,
        })
    );
    assert_eq!(dashboard.body["notices"].as_array().unwrap().len(), 5);
    assert!(dashboard.body["countdown"]["days"].is_u64());

    let countdown = visitor.get("/api/countdown").await;
    assert_eq!(countdown.status, StatusCode::OK);
    assert!(countdown.body["seconds"].as_u64().unwrap() < 60);
}

#[tokio::test]
async fn test_theme_preference_persists_in_session() {
    let app = TestApp::new();
    let mut visitor = app.client();

    let initial = visitor.get("/api/preferences/theme").await;
    assert_eq!(initial.body, json!({ "theme": "light" }));

    let set = visitor
        .post("/api/preferences/theme", Some(json!({ "theme": "dark" })))
        .await;
    assert_eq!(set.body, json!({ "theme": "dark" }));
    assert_eq!(
        visitor.get("/api/preferences/theme").await.body,
        json!({ "theme": "dark" })
    );

    let toggled = visitor.post("/api/preferences/theme/toggle", None).await;
    assert_eq!(toggled.body, json!({ "theme": "light" }));

    let bogus = visitor
        .post("/api/preferences/theme", Some(json!({ "theme": "neon" })))
        .await;
    assert_eq!(bogus.status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_theme_survives_sign_in() {
    let app = TestApp::new();
    let mut visitor = app.client();
    visitor
        .post("/api/preferences/theme", Some(json!({ "theme": "dark" })))
        .await;

    visitor.register("twinkle@northpole.org", "stardust").await;

    assert_eq!(
        visitor.get("/api/preferences/theme").await.body,
        json!({ "theme": "dark" })
    );
}

#[tokio::test]
async fn test_health_and_readiness() {
    let app = TestApp::new();
    let mut client = app.client();

    let health = client.get("/health").await;
    assert_eq!(health.status, StatusCode::OK);
    assert_eq!(health.body, "ok");

    let ready = client.get("/health/ready").await;
    assert_eq!(ready.status, StatusCode::OK);
    assert_eq!(ready.body["store"], "ok");

    app.store().set_simulate_read_error(true);
    let down = client.get("/health/ready").await;
    assert_eq!(down.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(down.body["store"], "unavailable");
}
