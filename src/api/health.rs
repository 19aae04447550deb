//! Backend health check.

use super::client::ApiClient;
use super::error::{error_from_response, ApiError};
use super::types::HealthResponse;

/// Ping the backend.
///
/// GET /health-check, unauthenticated. Answers `{"status": "ok"}` when the
/// server is up.
pub async fn check(client: &ApiClient) -> Result<HealthResponse, ApiError> {
    let resp = client.get("/health-check").await?;
    if !resp.status().is_success() {
        return Err(error_from_response(resp).await);
    }
    Ok(resp.json().await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_check_ok() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/health-check")
            .with_status(200)
            .with_body(r#"{"status": "ok"}"#)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url());
        let health = check(&client).await.unwrap();

        assert_eq!(health.status, "ok");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_health_check_down() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/health-check")
            .with_status(503)
            .with_body("Service Unavailable")
            .create_async()
            .await;

        let client = ApiClient::new(&server.url());
        let err = check(&client).await.unwrap_err();

        match err {
            ApiError::Status { status, .. } => assert_eq!(status, 503),
            other => panic!("expected Status, got {:?}", other),
        }
    }
}
