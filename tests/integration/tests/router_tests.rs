//! Router tests without a socket
//!
//! Drive the axum router directly with `tower::ServiceExt::oneshot`.

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use feed_api::{create_app, create_app_state};
use integration_tests::{scratch_upload_dir, test_config};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn app() -> Router {
    let config = test_config(&scratch_upload_dir()).unwrap();
    create_app(create_app_state(config).await.unwrap())
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn json_request(method: Method, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_error_body_shape() {
    let app = app().await;

    let request = Request::get("/api/messages/12345").body(Body::empty()).unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "UNKNOWN_MESSAGE");
    assert!(body["error"]["message"].as_str().unwrap().contains("12345"));
}

#[tokio::test]
async fn test_validation_errors_are_400() {
    let app = app().await;

    let request = json_request(
        Method::POST,
        "/api/messages",
        &json!({ "author": "", "content": "hello" }),
    );
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_malformed_json_is_400() {
    let app = app().await;

    let request = Request::builder()
        .method(Method::PATCH)
        .uri("/api/messages")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_BODY");
}

#[tokio::test]
async fn test_create_then_view_through_router() {
    let app = app().await;

    let request = json_request(
        Method::POST,
        "/api/messages",
        &json!({ "author": "Admin", "content": "hi", "views": 10 }),
    );
    let (status, created) = send(&app, request).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["views"], 10);
    let id = created["id"].as_str().unwrap().to_string();

    let request = Request::post(format!("/api/viewers/v1/messages/{id}/view"))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "registered");
    assert_eq!(body["views"], 11);
}
