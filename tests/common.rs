#![allow(dead_code)]

use std::sync::Arc;

use authgate::config::{Config, ConfigV1};
use authgate::routes::create_router;
use authgate::startup::{build, Application};
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use figment::{
    providers::{Format, Yaml},
    Figment,
};
use serde_json::Value;

pub const SESSION_HEADER: &str = "x-navigation-session";

pub fn load_config(yaml: &str) -> ConfigV1 {
    let config: Config = Figment::new()
        .merge(Yaml::string(yaml))
        .extract()
        .expect("Failed to parse test config YAML");
    config.into()
}

/// Builds the router without starting the auth check; tests drive the initializer.
pub fn build_app(config: ConfigV1) -> (Router, Application) {
    let app = build(Arc::new(config));
    (create_router(app.state.clone()), app)
}

pub fn request(path: &str, method: Method, session: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(session) = session {
        builder = builder.header(SESSION_HEADER, session);
    }
    builder.body(Body::empty()).expect("failed to build request")
}

pub fn get(path: &str) -> Request<Body> {
    request(path, Method::GET, None)
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read body");
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read body");
    String::from_utf8(bytes.to_vec()).expect("body should be UTF-8")
}

pub fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get("location")
        .expect("Location header missing")
        .to_str()
        .expect("Location header not valid UTF-8")
}
