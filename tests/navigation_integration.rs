mod common;

use axum::http::{Method, StatusCode};
use common::{body_json, body_text, build_app, get, load_config, location, request};
use tower::ServiceExt;

const MAINTENANCE_CONFIG: &str = r#"
version: "1.0.0"
bind_address: 127.0.0.1:0
maintenance:
  enabled: true
  page: /maintenance
  exempt_prefixes: [/status]
access:
  public_prefixes: [/login, /status, /maintenance]
"#;

#[tokio::test]
async fn integration_maintenance_redirects() {
    let (router, app) = build_app(load_config(MAINTENANCE_CONFIG));
    app.initializer.run().await;

    let response = router.clone().oneshot(get("/dashboard")).await.unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/maintenance");

    let response = router.clone().oneshot(get("/status/db")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = router.oneshot(get("/maintenance")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn integration_maintenance_toggled_off() {
    let (router, app) = build_app(load_config(MAINTENANCE_CONFIG));
    app.initializer.run().await;
    app.state.navigator.context().set_maintenance(false);

    let response = router.clone().oneshot(get("/maintenance")).await.unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/");

    // Anonymous users still need to log in once maintenance is over.
    let response = router.oneshot(get("/dashboard")).await.unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/login?redirect=%2Fdashboard");
}

#[tokio::test]
async fn integration_operational_routes_bypass_the_gate() {
    let (router, app) = build_app(load_config(MAINTENANCE_CONFIG));

    let response = router.clone().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "OK");

    let response = router.oneshot(get("/auth/state")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["phase"], "unchecked");
    assert_eq!(app.state.auth.waiter_count(), 0);
}

#[tokio::test]
async fn integration_non_get_navigation_rejected() {
    let (router, app) = build_app(load_config(MAINTENANCE_CONFIG));
    app.initializer.run().await;

    let response = router
        .oneshot(request("/dashboard", Method::POST, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn integration_metrics_report_navigations() {
    let (router, app) = build_app(load_config(MAINTENANCE_CONFIG));
    app.initializer.run().await;

    router.clone().oneshot(get("/dashboard")).await.unwrap();
    router.clone().oneshot(get("/status")).await.unwrap();

    let response = router.oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let text = body_text(response).await;
    assert!(text.contains("auth_phase 2"));
    assert!(text.contains("identity_lookup_total{result=\"anonymous\"} 1"));
    assert!(text.contains("gate_navigations_total{decision=\"redirect\"} 1"));
    assert!(text.contains("gate_navigations_total{decision=\"proceed\"} 1"));
}
