//! Command handlers for the taskdeck CLI.
//!
//! Each handler maps one CLI action onto the API modules, restoring the
//! stored session first where the backend requires auth. Session state
//! lives in the OS keychain so consecutive invocations share one login.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use thiserror::Error;
use zeroize::Zeroize;

use crate::api::auth::{self, SessionError};
use crate::api::client::ApiClient;
use crate::api::error::ApiError;
use crate::api::types::{
    Category, CategoryRequest, CreateTaskRequest, Task, TaskState, UpdateTaskRequest,
};
use crate::api::{categories, health, tasks, users};

#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("not logged in -- run `taskdeck login` first")]
    NotLoggedIn,

    #[error("session for {0} has expired -- run `taskdeck login` again")]
    SessionExpired(String),

    #[error("invalid access token: {0}")]
    Token(String),

    #[error("{0}")]
    Invalid(String),

    #[error("failed to read {path}: {source}")]
    ReadFile {
        path: String,
        source: std::io::Error,
    },
}

/// Claims the CLI cares about from the backend's JWT access tokens.
#[derive(Debug, Clone)]
pub struct Claims {
    /// The `sub` claim: the username the token was issued to.
    pub username: String,
    /// The `exp` claim in unix seconds, when present.
    pub expires_at: Option<i64>,
}

impl Claims {
    /// Whether the token's `exp` claim has passed.
    ///
    /// Tokens without `exp` never expire client-side; the server still
    /// rejects them once blacklisted.
    pub fn is_expired(&self, now: i64) -> bool {
        self.expires_at.is_some_and(|exp| exp <= now)
    }
}

/// Create a new account, then prompt the user to log in.
pub async fn register(
    client: &ApiClient,
    username: &str,
    email: &str,
    mut password: String,
) -> Result<(), CommandError> {
    log::info!("Registering account {}", username);

    let result = users::register(client, username, email, &password).await;
    password.zeroize();
    let account = result?;

    println!("Account created: {} <{}>", account.username, account.email);
    println!(
        "Run `taskdeck login --username {}` to start a session.",
        account.username
    );
    Ok(())
}

/// Log in: exchange credentials for a token, install it on the client, and
/// persist the session in the keychain.
pub async fn login(
    client: &ApiClient,
    username: &str,
    mut password: String,
) -> Result<(), CommandError> {
    log::info!("Logging in as {}", username);

    let result = users::login(client, username, &password).await;
    password.zeroize();
    let token = result?;

    client.set_access_token(token.access_token.clone()).await;
    auth::store_access_token(username, &token.access_token)?;
    auth::store_current_username(username)?;

    println!("Logged in as {}", username);
    match extract_claims(&token.access_token) {
        Ok(claims) => {
            if let Some(when) = claims
                .expires_at
                .and_then(|exp| DateTime::from_timestamp(exp, 0))
            {
                println!("Session valid until {}", when.format("%Y-%m-%d %H:%M UTC"));
            }
        }
        Err(e) => log::warn!("Could not read claims from access token: {}", e),
    }
    Ok(())
}

/// Log out: invalidate the session server-side, then clear the keychain
/// and the in-memory token.
pub async fn logout(client: &ApiClient) -> Result<(), CommandError> {
    log::info!("Logging out");

    let username = match auth::get_current_username()? {
        Some(username) => username,
        None => {
            println!("Not logged in.");
            return Ok(());
        }
    };

    // Let the server blacklist the token, but an unreachable or already
    // expired session must not block local cleanup.
    if let Some(token) = auth::get_access_token(&username)? {
        client.set_access_token(token).await;
        if let Err(e) = users::logout(client).await {
            log::warn!("Server logout failed, continuing local cleanup: {}", e);
        }
    }

    auth::delete_access_token(&username)?;
    auth::clear_current_username()?;
    client.clear_access_token().await;

    println!("Logged out {}.", username);
    Ok(())
}

/// Show the active session and its expiry state.
pub async fn whoami() -> Result<(), CommandError> {
    let username = match auth::get_current_username()? {
        Some(username) => username,
        None => {
            println!("Not logged in.");
            return Ok(());
        }
    };

    match auth::get_access_token(&username)? {
        None => println!("{} (no stored token -- run `taskdeck login`)", username),
        // Report the token's own subject: that is the identity the server sees.
        Some(token) => match extract_claims(&token) {
            Ok(claims) if claims.is_expired(Utc::now().timestamp()) => {
                println!("{} (session expired -- run `taskdeck login`)", claims.username);
            }
            Ok(claims) => {
                match claims
                    .expires_at
                    .and_then(|exp| DateTime::from_timestamp(exp, 0))
                {
                    Some(when) => println!(
                        "{} (session valid until {})",
                        claims.username,
                        when.format("%Y-%m-%d %H:%M UTC")
                    ),
                    None => println!("{}", claims.username),
                }
            }
            Err(e) => {
                log::warn!("Stored token unreadable: {}", e);
                println!("{} (stored token is malformed -- run `taskdeck login`)", username);
            }
        },
    }
    Ok(())
}

/// Upload a profile image for the logged-in user.
pub async fn upload_image(client: &ApiClient, path: &std::path::Path) -> Result<(), CommandError> {
    restore_session(client).await?;

    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| {
            CommandError::Invalid(format!("{} has no usable filename", path.display()))
        })?;

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| CommandError::ReadFile {
            path: path.display().to_string(),
            source,
        })?;

    log::info!("Uploading {} ({} bytes)", filename, bytes.len());
    let uploaded = users::upload_image(client, filename, bytes).await?;
    println!("Uploaded {} -> {}", uploaded.filename, uploaded.file_path);
    Ok(())
}

/// Create a task in the given category.
pub async fn add_task(
    client: &ApiClient,
    description: &str,
    category_id: i64,
) -> Result<(), CommandError> {
    restore_session(client).await?;

    let request = CreateTaskRequest {
        description: description.to_string(),
        category_id,
    };
    let task = tasks::create(client, &request).await?;
    println!("Created task {} ({})", task.id, task.state.as_str());
    Ok(())
}

/// List the user's tasks, optionally narrowed to one category.
pub async fn list_tasks(client: &ApiClient, category_id: Option<i64>) -> Result<(), CommandError> {
    restore_session(client).await?;

    let tasks = match category_id {
        Some(id) => tasks::list_by_category(client, id).await?,
        None => tasks::list(client).await?,
    };
    print_tasks(&tasks);
    Ok(())
}

/// Update a task. Unspecified fields keep their current values; `--due`
/// replaces the deadline and `--clear-due` removes it.
pub async fn update_task(
    client: &ApiClient,
    task_id: i64,
    description: Option<String>,
    state: Option<TaskState>,
    category_id: Option<i64>,
    due: Option<String>,
    clear_due: bool,
) -> Result<(), CommandError> {
    restore_session(client).await?;

    // PUT replaces the whole row, so fetch the current values and merge.
    let current = find_task(tasks::list(client).await?, task_id)?;

    let expected_finished_at = if clear_due {
        None
    } else if let Some(ref due) = due {
        Some(parse_datetime(due)?)
    } else {
        current.expected_finished_at
    };

    let request = UpdateTaskRequest {
        description: description.unwrap_or(current.description),
        expected_finished_at,
        state: state.unwrap_or(current.state),
        category_id: category_id.or(current.category_id),
    };
    let task = tasks::update(client, task_id, &request).await?;
    println!("Updated task {} ({})", task.id, task.state.as_str());
    Ok(())
}

/// Delete a task by id.
///
/// The id is checked against the current list first: the backend answers
/// 200 even for unknown ids, with the failure only in the body.
pub async fn delete_task(client: &ApiClient, task_id: i64) -> Result<(), CommandError> {
    restore_session(client).await?;

    find_task(tasks::list(client).await?, task_id)?;
    tasks::delete(client, task_id).await?;
    println!("Deleted task {}.", task_id);
    Ok(())
}

/// List all categories.
///
/// The category routes are public on the backend, so no session is needed.
pub async fn list_categories(client: &ApiClient) -> Result<(), CommandError> {
    let categories = categories::list(client).await?;
    if categories.is_empty() {
        println!("No categories.");
        return Ok(());
    }

    println!("{:>4}  {:<16} {}", "ID", "NAME", "DESCRIPTION");
    for category in &categories {
        println!(
            "{:>4}  {:<16} {}",
            category.id, category.name, category.description
        );
    }
    Ok(())
}

/// Create a category.
pub async fn add_category(
    client: &ApiClient,
    name: &str,
    description: &str,
) -> Result<(), CommandError> {
    restore_session(client).await?;

    let request = CategoryRequest {
        name: name.to_string(),
        description: description.to_string(),
    };
    let category = categories::create(client, &request).await?;
    println!("Created category {} ({})", category.id, category.name);
    Ok(())
}

/// Update a category. Unspecified fields keep their current values.
pub async fn update_category(
    client: &ApiClient,
    category_id: i64,
    name: Option<String>,
    description: Option<String>,
) -> Result<(), CommandError> {
    restore_session(client).await?;

    let current = find_category(categories::list(client).await?, category_id)?;

    let request = CategoryRequest {
        name: name.unwrap_or(current.name),
        description: description.unwrap_or(current.description),
    };
    categories::update(client, category_id, &request).await?;
    println!("Updated category {}.", category_id);
    Ok(())
}

/// Delete a category by id.
///
/// The id is checked against the current list first: the backend answers
/// 200 even for unknown ids, with the failure only in the body.
pub async fn delete_category(client: &ApiClient, category_id: i64) -> Result<(), CommandError> {
    restore_session(client).await?;

    find_category(categories::list(client).await?, category_id)?;
    categories::delete(client, category_id).await?;
    println!("Deleted category {}.", category_id);
    Ok(())
}

/// Check that the backend is reachable.
pub async fn health(client: &ApiClient) -> Result<(), CommandError> {
    let health = health::check(client).await?;
    println!("{} answers: {}", client.base_url(), health.status);
    Ok(())
}

/// Load the stored session into the client.
///
/// Returns the logged-in username. Expired tokens are caught here so the
/// user sees "session expired" instead of a raw 401 from the next call.
async fn restore_session(client: &ApiClient) -> Result<String, CommandError> {
    let username = auth::get_current_username()?.ok_or(CommandError::NotLoggedIn)?;
    let token = auth::get_access_token(&username)?.ok_or(CommandError::NotLoggedIn)?;

    let claims = extract_claims(&token)?;
    if claims.is_expired(Utc::now().timestamp()) {
        return Err(CommandError::SessionExpired(username));
    }

    client.set_access_token(token).await;
    Ok(username)
}

/// Find a task in the fetched list by id.
///
/// Mutations check the id client-side: the backend answers 200 for unknown
/// ids and reports the failure only in the body.
fn find_task(tasks: Vec<Task>, task_id: i64) -> Result<Task, CommandError> {
    tasks
        .into_iter()
        .find(|task| task.id == task_id)
        .ok_or_else(|| CommandError::Invalid(format!("no task with id {} in your list", task_id)))
}

/// Find a category in the fetched list by id.
fn find_category(categories: Vec<Category>, category_id: i64) -> Result<Category, CommandError> {
    categories
        .into_iter()
        .find(|category| category.id == category_id)
        .ok_or_else(|| CommandError::Invalid(format!("no category with id {}", category_id)))
}

/// Extract the claims this CLI uses (`sub`, `exp`) from a JWT access token.
///
/// Decodes the JWT payload without verifying the signature; the server
/// verifies, we only need the fields for session bookkeeping.
fn extract_claims(token: &str) -> Result<Claims, CommandError> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(CommandError::Token("not a JWT".to_string()));
    }

    // Decode the payload (second part) -- base64url encoding.
    // base64url: replace - with + and _ with /, then restore padding.
    let payload = parts[1];
    let padded = match payload.len() % 4 {
        2 => format!("{}==", payload),
        3 => format!("{}=", payload),
        _ => payload.to_string(),
    };
    let standard = padded.replace('-', "+").replace('_', "/");

    let decoded = base64::Engine::decode(&base64::engine::general_purpose::STANDARD, &standard)
        .map_err(|e| CommandError::Token(format!("payload is not base64: {}", e)))?;

    let json: serde_json::Value = serde_json::from_slice(&decoded)
        .map_err(|e| CommandError::Token(format!("payload is not JSON: {}", e)))?;

    let username = json["sub"]
        .as_str()
        .map(|s| s.to_string())
        .ok_or_else(|| CommandError::Token("payload missing 'sub' claim".to_string()))?;

    Ok(Claims {
        username,
        expires_at: json["exp"].as_i64(),
    })
}

/// Parse a CLI-supplied datetime.
///
/// Accepts ISO-ish forms (`2024-06-15T09:00:00`, `2024-06-15 09:00`) and a
/// bare date, which means midnight.
fn parse_datetime(input: &str) -> Result<NaiveDateTime, CommandError> {
    const FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ];

    for format in FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(input, format) {
            return Ok(parsed);
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight);
        }
    }

    Err(CommandError::Invalid(format!(
        "cannot parse '{}' as a datetime (try 2024-06-15 or 2024-06-15 09:00)",
        input
    )))
}

/// Render a task list as an aligned table.
fn print_tasks(tasks: &[Task]) {
    if tasks.is_empty() {
        println!("No tasks.");
        return;
    }

    println!(
        "{:>4}  {:<9} {:<17} {:>8}  {}",
        "ID", "STATE", "DUE", "CATEGORY", "DESCRIPTION"
    );
    for task in tasks {
        let due = task
            .expected_finished_at
            .map(|when| when.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        let category = task
            .category_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:>4}  {:<9} {:<17} {:>8}  {}",
            task.id,
            task.state.as_str(),
            due,
            category,
            task.description
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_token(payload: &[u8]) -> String {
        let header = base64::Engine::encode(
            &base64::engine::general_purpose::URL_SAFE_NO_PAD,
            b"{\"alg\":\"HS256\",\"typ\":\"JWT\"}",
        );
        let payload =
            base64::Engine::encode(&base64::engine::general_purpose::URL_SAFE_NO_PAD, payload);
        format!("{}.{}.fake-signature", header, payload)
    }

    #[test]
    fn test_extract_claims() {
        let token = make_token(b"{\"sub\":\"alice\",\"exp\":1700000000}");

        let claims = extract_claims(&token).unwrap();
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.expires_at, Some(1700000000));
    }

    #[test]
    fn test_extract_claims_without_exp() {
        let token = make_token(b"{\"sub\":\"alice\"}");

        let claims = extract_claims(&token).unwrap();
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.expires_at, None);
    }

    #[test]
    fn test_extract_claims_invalid_jwt() {
        let result = extract_claims("not-a-jwt");
        assert!(result.is_err());
    }

    #[test]
    fn test_extract_claims_missing_sub() {
        let token = make_token(b"{\"iat\":1700000000}");

        let result = extract_claims(&token);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("sub"));
    }

    #[test]
    fn test_claims_expiry() {
        let claims = Claims {
            username: "alice".to_string(),
            expires_at: Some(1000),
        };
        assert!(!claims.is_expired(999));
        assert!(claims.is_expired(1000));
        assert!(claims.is_expired(1001));

        let eternal = Claims {
            username: "alice".to_string(),
            expires_at: None,
        };
        assert!(!eternal.is_expired(i64::MAX));
    }

    #[test]
    fn test_parse_datetime_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 6, 15)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        assert_eq!(parse_datetime("2024-06-15T09:30:00").unwrap(), expected);
        assert_eq!(parse_datetime("2024-06-15T09:30").unwrap(), expected);
        assert_eq!(parse_datetime("2024-06-15 09:30").unwrap(), expected);

        let midnight = NaiveDate::from_ymd_opt(2024, 6, 15)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(parse_datetime("2024-06-15").unwrap(), midnight);
    }

    #[test]
    fn test_parse_datetime_rejects_garbage() {
        assert!(parse_datetime("next tuesday").is_err());
        assert!(parse_datetime("15/06/2024").is_err());
        assert!(parse_datetime("").is_err());
    }

    fn sample_task(id: i64) -> Task {
        Task {
            id,
            description: format!("task {}", id),
            created_at: None,
            expected_finished_at: None,
            state: TaskState::Backlog,
            person_id: Some(1),
            category_id: Some(2),
        }
    }

    #[test]
    fn test_find_task_by_id() {
        let tasks = vec![sample_task(1), sample_task(7)];

        let task = find_task(tasks, 7).unwrap();
        assert_eq!(task.id, 7);
    }

    #[test]
    fn test_find_task_unknown_id() {
        let tasks = vec![sample_task(1), sample_task(7)];

        let err = find_task(tasks, 999).unwrap_err();
        assert!(err.to_string().contains("999"));
    }

    #[test]
    fn test_find_category_unknown_id() {
        let categories = vec![Category {
            id: 1,
            name: "home".to_string(),
            description: "Around the house".to_string(),
        }];

        let err = find_category(categories, 999).unwrap_err();
        assert!(err.to_string().contains("999"));
    }

    #[tokio::test]
    async fn test_list_categories_without_session() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/categories/")
            .match_header("authorization", mockito::Matcher::Missing)
            .with_status(200)
            .with_body(r#"[{"id": 1, "name": "home", "description": "Around the house"}]"#)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url());

        list_categories(&client).await.unwrap();
        mock.assert_async().await;
    }
}
