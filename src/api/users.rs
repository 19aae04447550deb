//! Account and session operations against the TaskDeck backend.
//!
//! Covers registration, the OAuth2 password-form login, server-side logout
//! (token blacklisting) and profile image upload.

use reqwest::multipart;

use super::client::ApiClient;
use super::error::{error_from_response, ApiError};
use super::types::{RegisterRequest, RegisterResponse, TokenResponse, UploadResponse};

/// Create a new account.
///
/// POST /users/ with a JSON body. The response echoes the username and
/// email; the password never comes back.
pub async fn register(
    client: &ApiClient,
    username: &str,
    email: &str,
    password: &str,
) -> Result<RegisterResponse, ApiError> {
    let body = RegisterRequest {
        username: username.to_string(),
        email: email.to_string(),
        password: password.to_string(),
    };

    let resp = client.post("/users/", &body).await?;
    if !resp.status().is_success() {
        return Err(error_from_response(resp).await);
    }

    Ok(resp.json().await?)
}

/// Exchange credentials for an access token.
///
/// POST /users/login with a urlencoded form (the backend consumes an OAuth2
/// password form). The token is returned to the caller, not installed into
/// the client -- the CLI decides whether to persist it.
pub async fn login(
    client: &ApiClient,
    username: &str,
    password: &str,
) -> Result<TokenResponse, ApiError> {
    let resp = client
        .post_form(
            "/users/login",
            &[("username", username), ("password", password)],
        )
        .await?;

    if !resp.status().is_success() {
        return Err(error_from_response(resp).await);
    }

    Ok(resp.json().await?)
}

/// Invalidate the current token server-side.
///
/// POST /users/logout. The backend blacklists the bearer token; an already
/// expired token answers 401, which the caller may treat as moot.
pub async fn logout(client: &ApiClient) -> Result<(), ApiError> {
    let resp = client.authenticated_post("/users/logout", &()).await?;
    if !resp.status().is_success() {
        return Err(error_from_response(resp).await);
    }
    Ok(())
}

/// Upload a profile image for the logged-in user.
///
/// POST /users/upload-image with multipart form data, part name `file`.
/// The original filename is preserved because the server derives the stored
/// extension from it.
pub async fn upload_image(
    client: &ApiClient,
    filename: &str,
    bytes: Vec<u8>,
) -> Result<UploadResponse, ApiError> {
    let part = multipart::Part::bytes(bytes)
        .file_name(filename.to_string())
        .mime_str(image_mime(filename))?;
    let form = multipart::Form::new().part("file", part);

    let resp = client
        .authenticated_multipart_post("/users/upload-image", form)
        .await?;

    if !resp.status().is_success() {
        return Err(error_from_response(resp).await);
    }

    Ok(resp.json().await?)
}

/// Content type for an image filename, by extension.
fn image_mime(filename: &str) -> &'static str {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}
