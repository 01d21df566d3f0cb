mod common;

use authgate::gate::{Phase, RunOutcome};
use axum::http::{Method, StatusCode};
use common::{body_json, build_app, get, load_config, location, request};
use mockito::Server;
use tower::ServiceExt;

const STATIC_CONFIG: &str = r#"
version: "1.0.0"
bind_address: 127.0.0.1:0
logging:
  level: warn
  format: json
auth:
  timeout_in_ms: 3000
  lookup:
    type: static
    name: fixed
    realm: example
    username: user-42
    roles: [user]
access:
  public_prefixes: [/login, /about]
"#;

async fn wait_for_waiters(auth: &authgate::gate::AuthStateHolder, count: usize) {
    while auth.waiter_count() < count {
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn integration_navigation_waits_for_auth_check() {
    let (router, app) = build_app(load_config(STATIC_CONFIG));
    let auth = app.state.auth.clone();

    let dashboard = tokio::spawn(router.clone().oneshot(get("/dashboard")));
    wait_for_waiters(&auth, 1).await;
    assert!(!dashboard.is_finished());

    let state = body_json(router.clone().oneshot(get("/auth/state")).await.unwrap()).await;
    assert_eq!(state["phase"], "unchecked");
    assert!(state["identity"].is_null());

    assert_eq!(app.initializer.run().await, RunOutcome::Performed);

    let response = dashboard.await.unwrap().unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["path"], "/dashboard");
    assert_eq!(body["identity"]["username"], "user-42");

    // After Done, navigations proceed without waiting.
    let response = router.clone().oneshot(get("/settings")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(auth.waiter_count(), 0);

    let state = body_json(router.oneshot(get("/auth/state")).await.unwrap()).await;
    assert_eq!(state["phase"], "done");
    assert_eq!(state["identity"]["roles"][0], "user");
    assert!(state["checked_at"].is_string());
}

#[tokio::test]
async fn integration_concurrent_navigations_released_together() {
    let (router, app) = build_app(load_config(STATIC_CONFIG));
    let auth = app.state.auth.clone();

    let first = tokio::spawn(router.clone().oneshot(get("/dashboard")));
    let second = tokio::spawn(router.clone().oneshot(get("/reports?range=7d")));
    wait_for_waiters(&auth, 2).await;

    app.initializer.clone().spawn().await.unwrap();

    let first = first.await.unwrap().unwrap();
    let second = second.await.unwrap().unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(second.status(), StatusCode::OK);
    assert_eq!(body_json(second).await["path"], "/reports?range=7d");
    assert_eq!(auth.phase(), Phase::Done);
}

#[tokio::test]
async fn integration_failed_lookup_treated_as_logged_out() {
    let mut server = Server::new_async().await;
    let m = server
        .mock("GET", "/who-am-i")
        .with_status(500)
        .create_async()
        .await;

    let config = load_config(&format!(
        r#"
version: "1.0.0"
bind_address: 127.0.0.1:0
auth:
  lookup:
    type: who-am-i
    name: api
    uri: {}
    realm: example
"#,
        server.url()
    ));
    let (router, app) = build_app(config);

    let dashboard = tokio::spawn(router.clone().oneshot(get("/dashboard")));
    wait_for_waiters(&app.state.auth, 1).await;
    app.initializer.run().await;
    m.assert_async().await;

    let response = dashboard.await.unwrap().unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/login?redirect=%2Fdashboard");
    assert_eq!(app.state.auth.phase(), Phase::Done);
    assert!(app.state.auth.identity().is_none());
}

#[tokio::test]
async fn integration_whoami_lookup_identity() {
    let mut server = Server::new_async().await;
    let _m = server
        .mock("GET", "/who-am-i")
        .match_header("authorization", "Bearer kiosk-token")
        .with_status(200)
        .with_body(r#"{"uid": "user-42", "roles": ["admin"]}"#)
        .create_async()
        .await;

    let config = load_config(&format!(
        r#"
version: "1.0.0"
bind_address: 127.0.0.1:0
auth:
  lookup:
    type: who-am-i
    name: api
    uri: {}
    realm: example
    token: kiosk-token
"#,
        server.url()
    ));
    let (router, app) = build_app(config);
    app.initializer.run().await;

    let response = router.oneshot(get("/login")).await.unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn integration_gate_wait_timeout() {
    let config = load_config(
        r#"
version: "1.0.0"
bind_address: 127.0.0.1:0
auth:
  gate_wait_timeout_in_ms: 50
"#,
    );
    let (router, app) = build_app(config);

    let response = router.oneshot(get("/dashboard")).await.unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = body_json(response).await;
    assert_eq!(body["error"], "auth check did not finish in time");
    assert_eq!(app.state.auth.phase(), Phase::Unchecked);
    assert_eq!(app.state.auth.waiter_count(), 0);
}

#[tokio::test]
async fn integration_superseded_navigation() {
    let (router, app) = build_app(load_config(STATIC_CONFIG));
    let auth = app.state.auth.clone();

    let first = tokio::spawn(
        router
            .clone()
            .oneshot(request("/dashboard", Method::GET, Some("tab-1"))),
    );
    wait_for_waiters(&auth, 1).await;
    let second = tokio::spawn(
        router
            .clone()
            .oneshot(request("/reports", Method::GET, Some("tab-1"))),
    );

    let first = first.await.unwrap().unwrap();
    assert_eq!(first.status(), StatusCode::CONFLICT);

    app.initializer.run().await;
    let second = second.await.unwrap().unwrap();
    assert_eq!(second.status(), StatusCode::OK);
    assert_eq!(app.state.navigator.pending_count(), 0);
}
