//! Request and response types for the TaskDeck backend API.
//!
//! The backend speaks snake_case JSON, which is serde's default field
//! mapping, so only the task state enum needs rename attributes (its wire
//! values are lowercase words).

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    Backlog,
    Started,
    Finished,
}

impl TaskState {
    /// Wire value / display label for this state.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskState::Backlog => "backlog",
            TaskState::Started => "started",
            TaskState::Finished => "finished",
        }
    }
}

impl std::str::FromStr for TaskState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "backlog" => Ok(TaskState::Backlog),
            "started" => Ok(TaskState::Started),
            "finished" => Ok(TaskState::Finished),
            other => Err(format!(
                "unknown task state '{}' (expected backlog, started or finished)",
                other
            )),
        }
    }
}

/// A task as returned by the backend.
///
/// Timestamps are naive ISO-8601 datetimes (the backend stores wall-clock
/// times without timezone).
#[derive(Debug, Clone, Deserialize)]
pub struct Task {
    pub id: i64,
    pub description: String,
    pub created_at: Option<NaiveDateTime>,
    pub expected_finished_at: Option<NaiveDateTime>,
    pub state: TaskState,
    pub person_id: Option<i64>,
    pub category_id: Option<i64>,
}

/// A task category.
#[derive(Debug, Clone, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: String,
}

/// Response from POST /users/login.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

/// Registration request body sent to POST /users/.
#[derive(Debug, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Response from POST /users/ (echoes the new account, never the password).
#[derive(Debug, Deserialize)]
pub struct RegisterResponse {
    pub username: String,
    pub email: String,
}

/// Response from POST /users/upload-image.
#[derive(Debug, Deserialize)]
pub struct UploadResponse {
    pub filename: String,
    pub file_path: String,
}

/// Response from GET /health-check.
#[derive(Debug, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Task creation body sent to POST /tasks/.
#[derive(Debug, Serialize)]
pub struct CreateTaskRequest {
    pub description: String,
    pub category_id: i64,
}

/// Task update body sent to PUT /tasks/{id}.
///
/// Unset optional fields serialize as `null`; the backend clears the
/// corresponding columns.
#[derive(Debug, Serialize)]
pub struct UpdateTaskRequest {
    pub description: String,
    pub expected_finished_at: Option<NaiveDateTime>,
    pub state: TaskState,
    pub category_id: Option<i64>,
}

/// Category create/update body (POST /categories/ and PUT /categories/{id}
/// share the shape).
#[derive(Debug, Serialize)]
pub struct CategoryRequest {
    pub name: String,
    pub description: String,
}
