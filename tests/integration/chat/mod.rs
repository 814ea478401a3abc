//! Chat relay endpoint integration tests

use std::sync::Arc;

use axum::http::{Method, StatusCode};
use chatline_conversations::domain::relay::{mock_reply, MOCK_REPLIES};
use chatline_conversations::FailureCategory;
use chatline_llm::{mock::MockLlmService, LlmError, LlmRole};
use serde_json::json;
use tower::ServiceExt;

use crate::common::{raw_request, TestApp};

mod test_demo_mode {
    use super::*;

    #[tokio::test]
    async fn test_hi_gets_third_canned_reply_with_note() {
        let app = TestApp::new();

        let (status, body) = app
            .send(
                Method::POST,
                "/api/chat",
                Some(json!({"messages": [{"sender": "user", "text": "hi"}]})),
            )
            .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["reply"], MOCK_REPLIES[2]);
        assert_eq!(
            body["note"],
            "Running in demo mode. Update your OpenAI API key for real AI responses."
        );
    }

    #[tokio::test]
    async fn test_reply_keys_off_last_message() {
        let app = TestApp::new();

        let (_, body) = app
            .send(
                Method::POST,
                "/api/chat",
                Some(json!({"messages": [
                    {"sender": "user", "text": "a much longer opening message"},
                    {"sender": "ai", "text": "something"},
                    {"sender": "user", "text": "hello"}
                ]})),
            )
            .await;

        assert_eq!(body["reply"], mock_reply("hello"));
        assert_eq!(body["reply"], MOCK_REPLIES[5]);
    }

    #[tokio::test]
    async fn test_same_input_same_reply() {
        let app = TestApp::new();
        let payload = json!({"messages": [{"sender": "user", "text": "repeatable"}]});

        let (_, first) = app.send(Method::POST, "/api/chat", Some(payload.clone())).await;
        let (_, second) = app.send(Method::POST, "/api/chat", Some(payload)).await;

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_chat_does_not_store_anything() {
        let app = TestApp::new();

        app.send(
            Method::POST,
            "/api/chat",
            Some(json!({"messages": [{"sender": "user", "text": "hi"}]})),
        )
        .await;

        assert!(app.store.is_empty().await);
    }
}

mod test_validation {
    use super::*;

    #[tokio::test]
    async fn test_missing_messages_is_400() {
        let app = TestApp::new();

        let (status, body) = app.send(Method::POST, "/api/chat", Some(json!({}))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Messages array is required");
    }

    #[tokio::test]
    async fn test_non_array_messages_is_400() {
        let app = TestApp::new();

        for messages in [json!("hi"), json!({"text": "hi"}), json!(null), json!(3)] {
            let (status, body) = app
                .send(Method::POST, "/api/chat", Some(json!({ "messages": messages })))
                .await;

            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["error"], "Messages array is required");
        }
    }

    #[tokio::test]
    async fn test_empty_messages_is_400() {
        let app = TestApp::new();

        let (status, body) = app
            .send(Method::POST, "/api/chat", Some(json!({"messages": []})))
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Messages array is required");
    }

    #[tokio::test]
    async fn test_invalid_json_is_400() {
        let app = TestApp::new();

        let response = app
            .router()
            .oneshot(raw_request(Method::POST, "/api/chat", "not json"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

mod test_live_relay {
    use super::*;

    #[tokio::test]
    async fn test_live_reply_has_no_note() {
        let llm = Arc::new(MockLlmService::new());
        let app = TestApp::with_llm(llm.clone());

        let (status, body) = app
            .send(
                Method::POST,
                "/api/chat",
                Some(json!({"messages": [{"sender": "user", "text": "What is Rust?"}]})),
            )
            .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["reply"], "Mock response to: What is Rust?");
        assert!(body.get("note").is_none());
        assert_eq!(llm.recorded_requests().len(), 1);
    }

    #[tokio::test]
    async fn test_history_is_forwarded_in_order_with_roles() {
        let llm = Arc::new(MockLlmService::new());
        let app = TestApp::with_llm(llm.clone());

        app.send(
            Method::POST,
            "/api/chat",
            Some(json!({"messages": [
                {"sender": "user", "text": "first"},
                {"sender": "ai", "text": "second"},
                {"sender": "user", "text": "third"}
            ]})),
        )
        .await;

        let requests = llm.recorded_requests();
        let forwarded = &requests[0].messages;
        assert_eq!(forwarded.len(), 3);
        assert_eq!(forwarded[0].role, LlmRole::User);
        assert_eq!(forwarded[1].role, LlmRole::Assistant);
        assert_eq!(forwarded[2].content, "third");
    }

    #[tokio::test]
    async fn test_failures_fall_back_with_category_note() {
        let cases = [
            (
                LlmError::QuotaExceeded("insufficient_quota".to_string()),
                FailureCategory::QuotaExceeded,
            ),
            (
                LlmError::InvalidCredentials("bad key".to_string()),
                FailureCategory::InvalidCredentials,
            ),
            (LlmError::RateLimit, FailureCategory::RateLimited),
            (
                LlmError::Request("connection reset".to_string()),
                FailureCategory::Unavailable,
            ),
        ];

        for (error, category) in cases {
            let app = TestApp::with_llm(Arc::new(MockLlmService::failing(error)));

            let (status, body) = app
                .send(
                    Method::POST,
                    "/api/chat",
                    Some(json!({"messages": [{"sender": "user", "text": "hi"}]})),
                )
                .await;

            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["reply"], MOCK_REPLIES[2]);
            assert_eq!(body["note"], category.note());
        }
    }

    #[tokio::test]
    async fn test_unavailable_note_text() {
        let app = TestApp::with_llm(Arc::new(MockLlmService::failing(LlmError::Response(
            "502 Bad Gateway".to_string(),
        ))));

        let (_, body) = app
            .send(
                Method::POST,
                "/api/chat",
                Some(json!({"messages": [{"sender": "user", "text": "hi"}]})),
            )
            .await;

        assert_eq!(
            body["note"],
            "Error occurred. Running in demo mode. Please check your configuration."
        );
    }
}
