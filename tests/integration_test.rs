//! Integration tests for shortening and redirection
//!
//! These tests drive the full router:
//! - Form submission on the home page
//! - Redirects and the not-found path
//! - Guest history kept per session
//! - Input that could never redirect
//! - Collision handling with a scripted generator

mod common;

use axum::http::{header, StatusCode};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

use common::{
    get, post_form, post_raw, response_json, response_text, session_cookie, set_session_cookie,
    setup_test_app, setup_test_app_with,
};
use quicklink::generator::{CodeGenerator, RandomCodeGenerator};
use quicklink::store::UrlRepository;

#[tokio::test]
async fn test_create_short_url_then_redirect() {
    let (app, _state, _temp_db) = setup_test_app();

    let response = app
        .clone()
        .oneshot(post_form("/", &[("url", "https://example.com/a")], None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response_json(response.into_body()).await;
    let code = body["short_code"].as_str().unwrap().to_string();
    assert_eq!(code.len(), 6);
    assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
    assert_eq!(body["short_url"], format!("http://localhost:8080/{code}"));
    assert_eq!(body["recent"][0]["short_code"], code.as_str());
    assert_eq!(body["recent"][0]["original_url"], "https://example.com/a");

    let response = app.oneshot(get(&format!("/{code}"), None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "https://example.com/a"
    );
}

#[tokio::test]
async fn test_redirect_url_not_found() {
    let (app, _state, _temp_db) = setup_test_app();

    let response = app.oneshot(get("/doesnotexist", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response_text(response.into_body()).await, "URL not found");
}

#[tokio::test]
async fn test_redirect_does_not_open_a_session() {
    let (app, _state, _temp_db) = setup_test_app();

    let response = app.oneshot(get("/abcdef", None)).await.unwrap();
    assert!(session_cookie(&response).is_none());
}

#[tokio::test]
async fn test_redirect_is_stable() {
    let (app, _state, _temp_db) = setup_test_app();

    let response = app
        .clone()
        .oneshot(post_form("/", &[("url", "https://example.com/stable")], None))
        .await
        .unwrap();
    let body = response_json(response.into_body()).await;
    let code = body["short_code"].as_str().unwrap().to_string();

    // Later submissions never disturb an existing mapping
    for i in 0..5 {
        let url = format!("https://example.com/other/{i}");
        app.clone()
            .oneshot(post_form("/", &[("url", url.as_str())], None))
            .await
            .unwrap();
    }

    for _ in 0..3 {
        let response = app.clone().oneshot(get(&format!("/{code}"), None)).await.unwrap();
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "https://example.com/stable"
        );
    }
}

#[tokio::test]
async fn test_missing_url_is_rejected() {
    let (app, _state, _temp_db) = setup_test_app();

    let response = app.oneshot(post_form("/", &[], None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Nothing was stored, so no session was started
    assert!(session_cookie(&response).is_none());

    let body = response_json(response.into_body()).await;
    assert_eq!(body["error"], "Please enter a valid URL");
    assert_eq!(body["code"], "validation_error");
}

#[tokio::test]
async fn test_blank_url_is_rejected() {
    let (app, _state, _temp_db) = setup_test_app();

    let response = app
        .oneshot(post_form("/", &[("url", "  ")], None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_submission_that_is_not_a_form_is_a_validation_error() {
    let (app, _state, _temp_db) = setup_test_app();

    for (content_type, body) in [
        (None, ""),
        (Some("application/json"), r#"{"url":"https://example.com"}"#),
        (Some("text/plain"), "https://example.com"),
    ] {
        let response = app
            .clone()
            .oneshot(post_raw("/", content_type, body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{content_type:?}");

        let body = response_json(response.into_body()).await;
        assert_eq!(body["code"], "validation_error");
    }
}

#[tokio::test]
async fn test_url_that_cannot_redirect_is_rejected() {
    let (app, _state, _temp_db) = setup_test_app();

    for url in ["https://example.com/a\nb", "https://example.com/\u{7}bell"] {
        let response = app
            .clone()
            .oneshot(post_form("/", &[("url", url)], None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{url:?}");

        let body = response_json(response.into_body()).await;
        assert_eq!(body["error"], "Please enter a valid URL");
    }

    // Everything accepted must redirect
    let response = app
        .clone()
        .oneshot(post_form("/", &[("url", "https://example.com/a?b=c d")], None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response_json(response.into_body()).await;
    let code = body["short_code"].as_str().unwrap();

    let response = app.oneshot(get(&format!("/{code}"), None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "https://example.com/a?b=c d"
    );
}

#[tokio::test]
async fn test_home_without_submission() {
    let (app, _state, _temp_db) = setup_test_app();

    let response = app.oneshot(get("/", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // A guest with nothing to remember gets no session
    assert!(session_cookie(&response).is_none());

    let body = response_json(response.into_body()).await;
    assert!(body["short_code"].is_null());
    assert!(body["short_url"].is_null());
    assert_eq!(body["recent"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_first_submission_starts_a_session() {
    let (app, _state, _temp_db) = setup_test_app();

    let response = app
        .clone()
        .oneshot(post_form("/", &[("url", "https://example.com/first")], None))
        .await
        .unwrap();
    let issued = set_session_cookie(&response).expect("session cookie issued");
    assert!(issued.starts_with("quicklink_session="));
    assert!(issued.contains("HttpOnly"));
    assert!(issued.contains("SameSite=Lax"));
    assert!(!issued.contains("Secure"));

    let cookie = session_cookie(&response).unwrap();
    let response = app.clone().oneshot(get("/", Some(&cookie))).await.unwrap();
    let body = response_json(response.into_body()).await;
    assert_eq!(body["recent"].as_array().unwrap().len(), 1);

    // A cookie the server never issued starts a new, empty session
    let forged = "quicklink_session=AAAAAAAAAAAAAAAAAAAAAA";
    let response = app
        .oneshot(post_form("/", &[("url", "https://example.com/second")], Some(forged)))
        .await
        .unwrap();
    let replaced = session_cookie(&response).unwrap();
    assert_ne!(replaced, forged);

    let body = response_json(response.into_body()).await;
    assert_eq!(body["recent"].as_array().unwrap().len(), 1);
    assert_eq!(body["recent"][0]["original_url"], "https://example.com/second");
}

#[tokio::test]
async fn test_guest_history_keeps_five_newest() {
    let (app, _state, _temp_db) = setup_test_app();

    let mut cookie: Option<String> = None;
    let mut codes = Vec::new();
    for i in 1..=7 {
        let url = format!("https://example.com/guest/{i}");
        let response = app
            .clone()
            .oneshot(post_form("/", &[("url", url.as_str())], cookie.as_deref()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        cookie = cookie.or_else(|| session_cookie(&response));

        let body = response_json(response.into_body()).await;
        codes.push(body["short_code"].as_str().unwrap().to_string());
    }

    let response = app.oneshot(get("/", cookie.as_deref())).await.unwrap();
    let body = response_json(response.into_body()).await;
    let recent = body["recent"].as_array().unwrap();

    assert_eq!(recent.len(), 5);
    for (entry, (offset, code)) in recent.iter().zip(codes.iter().enumerate().rev()) {
        assert_eq!(entry["short_code"], code.as_str());
        assert_eq!(
            entry["original_url"],
            format!("https://example.com/guest/{}", offset + 1)
        );
    }
}

#[tokio::test]
async fn test_guest_history_is_per_session() {
    let (app, _state, _temp_db) = setup_test_app();

    let response = app
        .clone()
        .oneshot(post_form("/", &[("url", "https://example.com/mine")], None))
        .await
        .unwrap();
    let body = response_json(response.into_body()).await;
    let code = body["short_code"].as_str().unwrap().to_string();
    assert_eq!(body["recent"].as_array().unwrap().len(), 1);

    // Another visitor sees an empty list but can still follow the link
    let response = app.clone().oneshot(get("/", None)).await.unwrap();
    let body = response_json(response.into_body()).await;
    assert_eq!(body["recent"].as_array().unwrap().len(), 0);

    let response = app.oneshot(get(&format!("/{code}"), None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
}

/// Yields `first` for the first `repeat` calls, then random codes
struct RepeatingGenerator {
    pending: Mutex<VecDeque<String>>,
}

impl RepeatingGenerator {
    fn new(first: &str, repeat: usize) -> Self {
        Self {
            pending: Mutex::new(std::iter::repeat(first.to_string()).take(repeat).collect()),
        }
    }
}

impl CodeGenerator for RepeatingGenerator {
    fn generate(&self, length: usize) -> String {
        self.pending
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| RandomCodeGenerator.generate(length))
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_submissions_get_distinct_codes() {
    let generator = Arc::new(RepeatingGenerator::new("SAME00", 2));
    let (app, state, _temp_db) = setup_test_app_with(generator);

    let first = tokio::spawn(
        app.clone()
            .oneshot(post_form("/", &[("url", "https://example.com/one")], None)),
    );
    let second = tokio::spawn(
        app.oneshot(post_form("/", &[("url", "https://example.com/two")], None)),
    );

    let first = first.await.unwrap().unwrap();
    let second = second.await.unwrap().unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);
    assert_eq!(second.status(), StatusCode::CREATED);

    let first = response_json(first.into_body()).await;
    let second = response_json(second.into_body()).await;
    let first_code = first["short_code"].as_str().unwrap();
    let second_code = second["short_code"].as_str().unwrap();

    assert_ne!(first_code, second_code);
    assert!(first_code == "SAME00" || second_code == "SAME00");

    assert_eq!(
        state.urls.find_by_code(first_code).unwrap().unwrap().original_url,
        "https://example.com/one"
    );
    assert_eq!(
        state.urls.find_by_code(second_code).unwrap().unwrap().original_url,
        "https://example.com/two"
    );
}
