mod common;

use axum::http::StatusCode;
use common::{create_test_app, create_test_app_with_rules, rule};
use jumpgate::domain::entities::RedirectKind;

#[tokio::test]
async fn test_health_endpoint_success() {
    let app = create_test_app_with_rules(
        None,
        vec![rule("a.com", "", "https://b.com", RedirectKind::Permanent)],
    )
    .await;

    let response = app.server.get("/health").await;

    response.assert_status_ok();

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["checks"]["rules"]["status"], "ok");
    assert_eq!(json["checks"]["rules"]["message"], "1 active rules");
    assert_eq!(json["checks"]["access_log"]["status"], "ok");
}

#[tokio::test]
async fn test_health_endpoint_structure() {
    let app = create_test_app(None).await;

    let response = app.server.get("/health").await;

    let json = response.json::<serde_json::Value>();

    assert!(json.get("status").is_some());
    assert!(json.get("version").is_some());
    assert!(json["checks"].get("rules").is_some());
    assert!(json["checks"].get("access_log").is_some());
}

#[tokio::test]
async fn test_health_degraded_after_logger_closed() {
    let app = create_test_app(None).await;

    app.state.access_logger.close().await.unwrap();

    let response = app.server.get("/health").await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["checks"]["access_log"]["status"], "error");
}

#[tokio::test]
async fn test_health_public_with_token() {
    let app = create_test_app(Some("s3cret")).await;

    app.server.get("/health").await.assert_status_ok();
}
