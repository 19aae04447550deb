//! HTTP client with bearer token injection.
//!
//! Wraps a single shared `reqwest::Client` configured once at startup.
//! Authenticated helpers attach `Authorization: Bearer <token>` whenever a
//! token has been installed; requests sent before login go out without the
//! header, matching the backend's mixed public/protected route table.

use reqwest::{Client, Response};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use zeroize::Zeroize;

/// HTTP client wrapper for TaskDeck API communication.
///
/// Manages the base URL and the in-memory access token. The token cell is
/// shared behind `Arc<RwLock>` so concurrent calls observe a consistent token.
pub struct ApiClient {
    client: Client,
    base_url: String,
    access_token: Arc<RwLock<Option<String>>>,
}

impl ApiClient {
    /// Create a new API client with the given base URL.
    pub fn new(base_url: &str) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .connect_timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: Arc::new(RwLock::new(None)),
        }
    }

    /// The base URL this client talks to (no trailing slash).
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Store the access token for authenticated requests.
    pub async fn set_access_token(&self, token: String) {
        let mut guard = self.access_token.write().await;
        *guard = Some(token);
    }

    /// Clear the access token (used on logout). The old token bytes are
    /// zeroed before the slot is emptied.
    pub async fn clear_access_token(&self) {
        let mut guard = self.access_token.write().await;
        if let Some(ref mut t) = *guard {
            t.zeroize();
        }
        *guard = None;
    }

    /// Snapshot of the current access token, if one is installed.
    #[allow(dead_code)]
    pub async fn access_token(&self) -> Option<String> {
        self.access_token.read().await.clone()
    }

    /// Send an unauthenticated GET request to a relative API path.
    pub async fn get(&self, path: &str) -> Result<Response, reqwest::Error> {
        let url = format!("{}{}", self.base_url, path);
        self.client.get(&url).send().await
    }

    /// Send an authenticated GET request to a relative API path.
    pub async fn authenticated_get(&self, path: &str) -> Result<Response, reqwest::Error> {
        let url = format!("{}{}", self.base_url, path);
        let token = self.access_token.read().await;

        let mut builder = self.client.get(&url);
        if let Some(ref t) = *token {
            builder = builder.bearer_auth(t);
        }

        builder.send().await
    }

    /// Send an authenticated POST request with a JSON body to a relative API path.
    pub async fn authenticated_post<T: Serialize>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<Response, reqwest::Error> {
        let url = format!("{}{}", self.base_url, path);
        let token = self.access_token.read().await;

        let mut builder = self.client.post(&url).json(body);
        if let Some(ref t) = *token {
            builder = builder.bearer_auth(t);
        }

        builder.send().await
    }

    /// Send an authenticated PUT request with a JSON body to a relative API path.
    pub async fn authenticated_put<T: Serialize>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<Response, reqwest::Error> {
        let url = format!("{}{}", self.base_url, path);
        let token = self.access_token.read().await;

        let mut builder = self.client.put(&url).json(body);
        if let Some(ref t) = *token {
            builder = builder.bearer_auth(t);
        }

        builder.send().await
    }

    /// Send an authenticated DELETE request to a relative API path.
    pub async fn authenticated_delete(&self, path: &str) -> Result<Response, reqwest::Error> {
        let url = format!("{}{}", self.base_url, path);
        let token = self.access_token.read().await;

        let mut builder = self.client.delete(&url);
        if let Some(ref t) = *token {
            builder = builder.bearer_auth(t);
        }

        builder.send().await
    }

    /// Send an unauthenticated POST request with a JSON body to a relative API path.
    /// Used for registration where no access token exists yet.
    pub async fn post<T: Serialize>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<Response, reqwest::Error> {
        let url = format!("{}{}", self.base_url, path);
        self.client.post(&url).json(body).send().await
    }

    /// Send an unauthenticated POST request with a urlencoded form body.
    /// Used for login, which the backend consumes as an OAuth2 password form.
    pub async fn post_form(
        &self,
        path: &str,
        fields: &[(&str, &str)],
    ) -> Result<Response, reqwest::Error> {
        let url = format!("{}{}", self.base_url, path);
        self.client.post(&url).form(fields).send().await
    }

    /// Send an authenticated multipart POST request (used for image uploads).
    pub async fn authenticated_multipart_post(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<Response, reqwest::Error> {
        let url = format!("{}{}", self.base_url, path);
        let token = self.access_token.read().await;

        let mut builder = self.client.post(&url).multipart(form);
        if let Some(ref t) = *token {
            builder = builder.bearer_auth(t);
        }

        builder.send().await
    }
}
