//! Typed error for TaskDeck API calls.
//!
//! The backend reports failures as JSON bodies of the form
//! `{"detail": "..."}` (or a structured validation payload). Non-2xx
//! responses are folded into `ApiError` with the detail text preserved.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },
}

/// Map a non-2xx response into an `ApiError`, consuming the body.
///
/// 401 and 404 get dedicated variants so callers can react to a stale
/// session or a missing record without string matching.
pub async fn error_from_response(resp: reqwest::Response) -> ApiError {
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    let message = detail_message(&body);
    match status {
        401 => ApiError::Unauthorized(message),
        404 => ApiError::NotFound(message),
        _ => ApiError::Status { status, message },
    }
}

/// Pull the `detail` field out of a FastAPI error body.
///
/// Falls back to the raw body text when the body is not JSON or carries no
/// `detail` key. Structured validation payloads are kept as their JSON
/// rendering so nothing is silently dropped.
fn detail_message(body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => match value.get("detail") {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => body.trim().to_string(),
        },
        Err(_) => body.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_message_plain_string() {
        let body = r#"{"detail": "Invalid username or password"}"#;
        assert_eq!(detail_message(body), "Invalid username or password");
    }

    #[test]
    fn test_detail_message_structured_payload() {
        let body = r#"{"detail": [{"loc": ["body", "description"], "msg": "field required"}]}"#;
        let message = detail_message(body);
        assert!(message.contains("field required"));
    }

    #[test]
    fn test_detail_message_non_json_body() {
        assert_eq!(detail_message("Internal Server Error"), "Internal Server Error");
        assert_eq!(detail_message("  spaced  "), "spaced");
    }

    #[test]
    fn test_detail_message_empty_body() {
        assert_eq!(detail_message(""), "");
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let mut server = mockito::Server::new_async().await;
        let _unauthorized = server
            .mock("GET", "/401")
            .with_status(401)
            .with_body(r#"{"detail": "Invalid or expired token"}"#)
            .create_async()
            .await;
        let _missing = server
            .mock("GET", "/404")
            .with_status(404)
            .with_body(r#"{"detail": "Task not found"}"#)
            .create_async()
            .await;
        let _broken = server
            .mock("GET", "/500")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let http = reqwest::Client::new();

        let resp = http.get(format!("{}/401", server.url())).send().await.unwrap();
        match error_from_response(resp).await {
            ApiError::Unauthorized(msg) => assert_eq!(msg, "Invalid or expired token"),
            other => panic!("expected Unauthorized, got {:?}", other),
        }

        let resp = http.get(format!("{}/404", server.url())).send().await.unwrap();
        match error_from_response(resp).await {
            ApiError::NotFound(msg) => assert_eq!(msg, "Task not found"),
            other => panic!("expected NotFound, got {:?}", other),
        }

        let resp = http.get(format!("{}/500", server.url())).send().await.unwrap();
        match error_from_response(resp).await {
            ApiError::Status { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "boom");
            }
            other => panic!("expected Status, got {:?}", other),
        }
    }
}
