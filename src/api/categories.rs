//! Category operations against the TaskDeck backend.

use super::client::ApiClient;
use super::error::{error_from_response, ApiError};
use super::types::{Category, CategoryRequest};

/// List all categories.
///
/// GET /categories/. Categories are shared across users.
pub async fn list(client: &ApiClient) -> Result<Vec<Category>, ApiError> {
    let resp = client.authenticated_get("/categories/").await?;
    if !resp.status().is_success() {
        return Err(error_from_response(resp).await);
    }
    Ok(resp.json().await?)
}

/// Create a category.
///
/// POST /categories/ with a JSON body. Returns the created category with
/// its server-assigned id.
pub async fn create(client: &ApiClient, request: &CategoryRequest) -> Result<Category, ApiError> {
    let resp = client.authenticated_post("/categories/", request).await?;
    if !resp.status().is_success() {
        return Err(error_from_response(resp).await);
    }
    Ok(resp.json().await?)
}

/// Update a category's name and description.
///
/// PUT /categories/{id}. Success is status-only; the server does not
/// reliably echo the updated row.
pub async fn update(
    client: &ApiClient,
    category_id: i64,
    request: &CategoryRequest,
) -> Result<(), ApiError> {
    let resp = client
        .authenticated_put(&format!("/categories/{}", category_id), request)
        .await?;
    if !resp.status().is_success() {
        return Err(error_from_response(resp).await);
    }
    Ok(())
}

/// Delete a category.
///
/// DELETE /categories/{id}. Success is status-only.
pub async fn delete(client: &ApiClient, category_id: i64) -> Result<(), ApiError> {
    let resp = client
        .authenticated_delete(&format!("/categories/{}", category_id))
        .await?;
    if !resp.status().is_success() {
        return Err(error_from_response(resp).await);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_list_categories() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/categories/")
            .match_header("authorization", "Bearer jwt-token")
            .with_status(200)
            .with_body(
                r#"[
                    {"id": 1, "name": "home", "description": "Around the house"},
                    {"id": 2, "name": "work", "description": "Office tasks"}
                ]"#,
            )
            .create_async()
            .await;

        let client = ApiClient::new(&server.url());
        client.set_access_token("jwt-token".to_string()).await;

        let categories = list(&client).await.unwrap();
        assert_eq!(categories.len(), 2);
        assert_eq!(categories[0].name, "home");
        assert_eq!(categories[1].id, 2);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_create_category() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/categories/")
            .match_header("content-type", "application/json")
            .with_status(200)
            .with_body(r#"{"id": 3, "name": "errands", "description": "Out and about"}"#)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url());
        client.set_access_token("jwt-token".to_string()).await;

        let request = CategoryRequest {
            name: "errands".to_string(),
            description: "Out and about".to_string(),
        };
        let category = create(&client, &request).await.unwrap();

        assert_eq!(category.id, 3);
        assert_eq!(category.name, "errands");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_update_category() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", "/categories/3")
            .match_header("authorization", "Bearer jwt-token")
            .with_status(200)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url());
        client.set_access_token("jwt-token".to_string()).await;

        let request = CategoryRequest {
            name: "errands".to_string(),
            description: "Renamed".to_string(),
        };
        update(&client, 3, &request).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_delete_category() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("DELETE", "/categories/4")
            .with_status(200)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url());
        client.set_access_token("jwt-token".to_string()).await;

        delete(&client, 4).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_list_categories_server_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/categories/")
            .with_status(500)
            .with_body(r#"{"detail": "database unavailable"}"#)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url());
        client.set_access_token("jwt-token".to_string()).await;

        let err = list(&client).await.unwrap_err();
        match err {
            ApiError::Status { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "database unavailable");
            }
            other => panic!("expected Status, got {:?}", other),
        }
    }
}
