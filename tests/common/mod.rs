//! Shared helpers for the integration tests

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::Arc;
use tempfile::NamedTempFile;

use quicklink::config::Config;
use quicklink::database::{init_db, AppState};
use quicklink::generator::CodeGenerator;
use quicklink::route::create_app;
use quicklink::session::SESSION_COOKIE;

/// Creates a test application with a temporary database
///
/// The state is returned alongside the router so tests can inspect stores directly.
pub fn setup_test_app() -> (Router, AppState, NamedTempFile) {
    let temp_db = NamedTempFile::new().expect("Failed to create temp file");
    let db = init_db(temp_db.path().to_str().unwrap()).expect("Failed to initialize test database");
    let state = AppState::new(Arc::new(db), Config::default());

    (create_app(state.clone()), state, temp_db)
}

/// Same as `setup_test_app`, drawing codes from `generator`
pub fn setup_test_app_with(generator: Arc<dyn CodeGenerator>) -> (Router, AppState, NamedTempFile) {
    let temp_db = NamedTempFile::new().expect("Failed to create temp file");
    let db = init_db(temp_db.path().to_str().unwrap()).expect("Failed to initialize test database");
    let state = AppState::with_generator(Arc::new(db), Config::default(), generator);

    (create_app(state.clone()), state, temp_db)
}

/// Encodes form pairs as `application/x-www-form-urlencoded`
pub fn form_body(pairs: &[(&str, &str)]) -> String {
    serde_urlencoded::to_string(pairs).expect("Failed to encode form")
}

/// Builds a form POST, optionally carrying a session cookie
pub fn post_form(uri: &str, pairs: &[(&str, &str)], cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(form_body(pairs))).unwrap()
}

/// Builds a POST with an arbitrary body and optional content type
pub fn post_raw(uri: &str, content_type: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder().method("POST").uri(uri);
    if let Some(content_type) = content_type {
        builder = builder.header(header::CONTENT_TYPE, content_type);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

/// Full `Set-Cookie` value of the session cookie, if one was set
pub fn set_session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with(SESSION_COOKIE))
        .map(str::to_string)
}

/// The `name=value` part of the response's session cookie, if one was set
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    set_session_cookie(response)
        .and_then(|value| value.split(';').next().map(str::to_string))
}

/// Helper function to parse response body as JSON
pub async fn response_json(body: Body) -> Value {
    let bytes = body
        .collect()
        .await
        .expect("Failed to read response body")
        .to_bytes();

    serde_json::from_slice(&bytes).expect("Failed to parse JSON")
}

pub async fn response_text(body: Body) -> String {
    let bytes = body
        .collect()
        .await
        .expect("Failed to read response body")
        .to_bytes();

    String::from_utf8(bytes.to_vec()).expect("Body is not UTF-8")
}
