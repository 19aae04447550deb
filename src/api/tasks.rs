//! Task operations against the TaskDeck backend.
//!
//! All routes are authenticated; the server scopes reads to the bearer
//! token's user and answers 403 for another user's task.

use super::client::ApiClient;
use super::error::{error_from_response, ApiError};
use super::types::{CreateTaskRequest, Task, UpdateTaskRequest};

/// Create a task for the logged-in user.
///
/// POST /tasks/ with a JSON body. Returns the created task, including the
/// server-assigned id and creation timestamp.
pub async fn create(client: &ApiClient, request: &CreateTaskRequest) -> Result<Task, ApiError> {
    let resp = client.authenticated_post("/tasks/", request).await?;
    if !resp.status().is_success() {
        return Err(error_from_response(resp).await);
    }
    Ok(resp.json().await?)
}

/// List the logged-in user's tasks.
///
/// GET /tasks/. The server derives the user from the bearer token.
pub async fn list(client: &ApiClient) -> Result<Vec<Task>, ApiError> {
    let resp = client.authenticated_get("/tasks/").await?;
    if !resp.status().is_success() {
        return Err(error_from_response(resp).await);
    }
    Ok(resp.json().await?)
}

/// List the logged-in user's tasks within one category.
///
/// GET /tasks/category/{category_id}.
pub async fn list_by_category(
    client: &ApiClient,
    category_id: i64,
) -> Result<Vec<Task>, ApiError> {
    let resp = client
        .authenticated_get(&format!("/tasks/category/{}", category_id))
        .await?;
    if !resp.status().is_success() {
        return Err(error_from_response(resp).await);
    }
    Ok(resp.json().await?)
}

/// Update a task.
///
/// PUT /tasks/{id} with the full replacement body. Optional fields sent as
/// `null` clear the corresponding columns. Returns the updated task.
pub async fn update(
    client: &ApiClient,
    task_id: i64,
    request: &UpdateTaskRequest,
) -> Result<Task, ApiError> {
    let resp = client
        .authenticated_put(&format!("/tasks/{}", task_id), request)
        .await?;
    if !resp.status().is_success() {
        return Err(error_from_response(resp).await);
    }
    Ok(resp.json().await?)
}

/// Delete a task.
///
/// DELETE /tasks/{id}. Success is status-only; the body is not part of the
/// contract.
pub async fn delete(client: &ApiClient, task_id: i64) -> Result<(), ApiError> {
    let resp = client
        .authenticated_delete(&format!("/tasks/{}", task_id))
        .await?;
    if !resp.status().is_success() {
        return Err(error_from_response(resp).await);
    }
    Ok(())
}
