use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use serde_json::json;

use super::*;
use crate::test_support::{UNREACHABLE_URL, gateway_for, memory_session, spawn_stub, user};

fn header_echo(headers: &HeaderMap) -> Value {
    let read = |name: &str| headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_owned);
    json!({
        "authorization": read("authorization"),
        "contentType": read("content-type"),
        "trace": read("x-trace"),
    })
}

async fn echo(headers: HeaderMap) -> Json<Value> {
    Json(header_echo(&headers))
}

async fn stub_backend() -> String {
    let router = Router::new()
        .route(
            "/api/v1/auth/login",
            post(|Json(body): Json<Value>| async move {
                if body["password"] == "secret" {
                    (StatusCode::OK, Json(json!({ "token": "t1", "user": { "id": "u1" } })))
                } else {
                    (StatusCode::UNAUTHORIZED, Json(json!({ "error": "invalid credentials" })))
                }
            }),
        )
        .route("/echo", get(echo).post(echo))
        .route("/html", get(|| async { "<html>oops</html>" }))
        .route("/html-error", get(|| async { (StatusCode::BAD_GATEWAY, "<html>bad gateway</html>") }))
        .route("/empty", get(|| async { StatusCode::NO_CONTENT }))
        .route("/empty-error", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
        .route("/bare-401", get(|| async { StatusCode::UNAUTHORIZED }))
        .route(
            "/message-only",
            get(|| async { (StatusCode::FORBIDDEN, Json(json!({ "message": "Not yours" }))) }),
        )
        .route(
            "/upload",
            post(|headers: HeaderMap, body: axum::body::Bytes| async move {
                let content_type = headers.get("content-type").and_then(|v| v.to_str().ok()).unwrap_or_default();
                Json(json!({
                    "multipart": content_type.starts_with("multipart/form-data"),
                    "authorization": headers.get("authorization").and_then(|v| v.to_str().ok()),
                    "bytes": body.len(),
                }))
            }),
        )
        .route("/health", get(|| async { Json(json!({ "status": "ok" })) }));
    spawn_stub(router).await
}

fn login_body(password: &str) -> RequestOptions {
    RequestOptions::post().body(json!({ "email": "a@x.io", "password": password }))
}

// =============================================================================
// send / request
// =============================================================================

#[tokio::test]
async fn success_returns_body_and_status() {
    let gateway = gateway_for(&stub_backend().await);
    let response = gateway.request("/api/v1/auth/login", login_body("secret"), None).await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.data().unwrap()["token"], "t1");
}

#[tokio::test]
async fn rejection_prefers_error_field() {
    let gateway = gateway_for(&stub_backend().await);
    let response = gateway.request("/api/v1/auth/login", login_body("wrong"), None).await;
    let failure = response.failure().unwrap();
    assert_eq!(failure.status_code, 401);
    assert_eq!(failure.message, "invalid credentials");
    assert_eq!(failure.error, "invalid credentials");
    assert!(failure.is_session_invalid());
}

#[tokio::test]
async fn rejection_with_message_only_fills_both_fields() {
    let gateway = gateway_for(&stub_backend().await);
    let failure = gateway.request("/message-only", RequestOptions::get(), None).await.failure().cloned().unwrap();
    assert_eq!(failure.status_code, 403);
    assert_eq!(failure.message, "Not yours");
    assert_eq!(failure.error, "Not yours");
}

#[tokio::test]
async fn unreachable_host_is_network_failure() {
    let gateway = gateway_for(UNREACHABLE_URL);
    let failure = gateway.request("/api/v1/auth/login", login_body("secret"), None).await.failure().cloned().unwrap();
    assert_eq!(failure.status_code, 0);
    assert_eq!(failure.message, UNABLE_TO_CONNECT);
    assert!(!failure.error.is_empty());
}

#[tokio::test]
async fn send_surfaces_unreachable_as_transport_error() {
    let gateway = gateway_for(UNREACHABLE_URL);
    let err = gateway.send("/health", RequestOptions::get(), None).await.unwrap_err();
    assert!(err.is_unreachable());
}

#[tokio::test]
async fn non_json_success_body_is_network_failure() {
    let gateway = gateway_for(&stub_backend().await);
    let failure = gateway.request("/html", RequestOptions::get(), None).await.failure().cloned().unwrap();
    assert_eq!(failure.status_code, 0);
    assert_eq!(failure.message, UNABLE_TO_CONNECT);
}

#[tokio::test]
async fn non_json_error_body_is_network_failure() {
    let gateway = gateway_for(&stub_backend().await);
    let failure = gateway.request("/html-error", RequestOptions::get(), None).await.failure().cloned().unwrap();
    assert_eq!(failure.status_code, 0);
}

#[tokio::test]
async fn empty_success_body_reads_as_null() {
    let gateway = gateway_for(&stub_backend().await);
    let response = gateway.request("/empty", RequestOptions::get(), None).await;
    assert_eq!(response, ApiResponse::Success { data: Value::Null, status_code: 204 });
}

#[tokio::test]
async fn empty_error_body_uses_fallback_message() {
    let gateway = gateway_for(&stub_backend().await);
    let options = RequestOptions::get().failure_message("Failed to fetch profile");
    let failure = gateway.request("/empty-error", options, None).await.failure().cloned().unwrap();
    assert_eq!(failure.status_code, 500);
    assert_eq!(failure.message, "Failed to fetch profile");
    assert_eq!(failure.error, "Failed to fetch profile");
}

#[tokio::test]
async fn bodiless_401_reads_as_session_expired() {
    let gateway = gateway_for(&stub_backend().await);
    let failure = gateway.request("/bare-401", RequestOptions::get(), None).await.failure().cloned().unwrap();
    assert_eq!(failure.status_code, 401);
    assert_eq!(failure.message, REQUEST_FAILED);
    assert_eq!(failure.user_message(), "Session expired. Please log in again.");
}

#[tokio::test]
async fn unreachable_host_reads_as_network_error() {
    let gateway = gateway_for(UNREACHABLE_URL);
    let failure = gateway.request("/health", RequestOptions::get(), None).await.failure().cloned().unwrap();
    assert_eq!(failure.user_message(), "Network error. Please check your connection.");
}

#[tokio::test]
async fn backend_error_text_wins_over_status_default() {
    let gateway = gateway_for(&stub_backend().await);
    let failure = gateway.request("/api/v1/auth/login", login_body("wrong"), None).await.failure().cloned().unwrap();
    assert_eq!(failure.user_message(), "invalid credentials");
}

#[tokio::test]
async fn default_failure_message_is_request_failed() {
    let gateway = gateway_for(&stub_backend().await);
    let failure = gateway.request("/empty-error", RequestOptions::get(), None).await.failure().cloned().unwrap();
    assert_eq!(failure.message, REQUEST_FAILED);
}

// =============================================================================
// Headers
// =============================================================================

#[tokio::test]
async fn credential_becomes_bearer_header() {
    let gateway = gateway_for(&stub_backend().await);
    let response = gateway.request("/echo", RequestOptions::get(), Some("abc")).await;
    let data = response.data().unwrap();
    assert_eq!(data["authorization"], "Bearer abc");
    assert_eq!(data["contentType"], "application/json");
}

#[tokio::test]
async fn empty_credential_sends_no_authorization() {
    let gateway = gateway_for(&stub_backend().await);
    let response = gateway.request("/echo", RequestOptions::get(), Some("")).await;
    assert_eq!(response.data().unwrap()["authorization"], Value::Null);
}

#[tokio::test]
async fn extra_headers_are_sent_and_override_defaults() {
    let gateway = gateway_for(&stub_backend().await);
    let options = RequestOptions::post()
        .body(json!({}))
        .header("x-trace", "t-1")
        .header("content-type", "application/vnd.seckav+json");
    let data = gateway.request("/echo", options, None).await.into_result().unwrap();
    assert_eq!(data["trace"], "t-1");
    assert_eq!(data["contentType"], "application/vnd.seckav+json");
}

#[tokio::test]
async fn invalid_header_name_is_reported() {
    let gateway = gateway_for(&stub_backend().await);
    let err = gateway.send("/echo", RequestOptions::get().header("bad header", "x"), None).await.unwrap_err();
    assert!(matches!(err, TransportError::InvalidHeader { .. }));
    assert!(!err.is_unreachable());
}

// =============================================================================
// Upload
// =============================================================================

#[tokio::test]
async fn upload_sends_multipart_with_bearer() {
    let gateway = gateway_for(&stub_backend().await);
    let form = Form::new().text("name", "report").part(
        "file",
        reqwest::multipart::Part::bytes(b"hello".to_vec()).file_name("hello.txt"),
    );
    let data = gateway.upload("/upload", form, Some("tok")).await.into_result().unwrap();
    assert_eq!(data["multipart"], true);
    assert_eq!(data["authorization"], "Bearer tok");
}

#[tokio::test]
async fn upload_to_unreachable_host_uses_upload_message() {
    let gateway = gateway_for(UNREACHABLE_URL);
    let failure = gateway.upload("/upload", Form::new().text("a", "b"), None).await.failure().cloned().unwrap();
    assert_eq!(failure.status_code, 0);
    assert_eq!(failure.message, UNABLE_TO_UPLOAD);
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn health_ok_when_backend_answers() {
    let gateway = gateway_for(&stub_backend().await);
    assert!(gateway.check_health().await);
}

#[tokio::test]
async fn health_false_when_unreachable() {
    assert!(!gateway_for(UNREACHABLE_URL).check_health().await);
}

#[tokio::test]
async fn health_false_when_probe_times_out() {
    let router = Router::new().route(
        "/health",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            "late"
        }),
    );
    let gateway = gateway_for(&spawn_stub(router).await);
    assert!(!gateway.check_health().await);
}

#[tokio::test]
async fn health_false_on_error_status() {
    let router = Router::new().route("/health", get(|| async { StatusCode::SERVICE_UNAVAILABLE }));
    assert!(!gateway_for(&spawn_stub(router).await).check_health().await);
}

// =============================================================================
// ApiService
// =============================================================================

#[tokio::test]
async fn service_reads_credential_from_session_per_call() {
    let session = memory_session();
    let service = ApiService::with_session(gateway_for(&stub_backend().await), session.clone());

    let anonymous = service.get("/echo").await.into_result().unwrap();
    assert_eq!(anonymous["authorization"], Value::Null);

    session.login(user("u1", "Alice"), "live-token");
    let authed = service.get("/echo").await.into_result().unwrap();
    assert_eq!(authed["authorization"], "Bearer live-token");
}

#[tokio::test]
async fn service_with_pinned_token() {
    let mut service = ApiService::new(gateway_for(&stub_backend().await));
    assert_eq!(service.credential(), None);
    service.set_token("fixed");
    let data = service.post("/echo", Some(json!({ "x": 1 }))).await.into_result().unwrap();
    assert_eq!(data["authorization"], "Bearer fixed");
}

#[test]
fn url_joins_base_and_endpoint() {
    let gateway = gateway_for("http://backend.test:3000/");
    assert_eq!(gateway.base_url(), "http://backend.test:3000");
    assert_eq!(gateway.url("/api/v1/auth/login"), "http://backend.test:3000/api/v1/auth/login");
}
