//! Infrastructure route integration tests

use axum::http::{Method, StatusCode};
use tower::ServiceExt;

use crate::common::{failing_router, into_parts, request, TestApp};

#[tokio::test]
async fn test_health_with_reachable_store() {
    let app = TestApp::new();

    let (status, body) = app.send(Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "OK");
    assert_eq!(body["database"], "connected");
    let timestamp = body["timestamp"].as_str().unwrap();
    assert!(timestamp.parse::<chrono::DateTime<chrono::Utc>>().is_ok());
}

#[tokio::test]
async fn test_health_with_unreachable_store_still_ok() {
    let response = failing_router()
        .oneshot(request(Method::GET, "/health", None))
        .await
        .unwrap();

    let (status, body) = into_parts(response).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], "disconnected");
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let app = TestApp::new();

    let (status, body) = app.send(Method::GET, "/api/nothing-here", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Route not found");
}
