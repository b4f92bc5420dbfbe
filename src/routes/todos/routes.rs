use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use super::dto::{CreateTodo, UpdateTodo};
use crate::routes::error::ApiError;
use crate::routes::extract::{JsonBody, TodoId};
use crate::state::AppState;
use crate::model::ValidationError;
use crate::store::StoreError;

fn storage_failure(op: &'static str, id: Option<i64>, source: StoreError) -> ApiError {
    tracing::error!(op, ?id, error = %source, "todo store operation failed");
    ApiError::Storage { op, source }
}

/// List every todo, newest first
pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let todos = state
        .store
        .list_all()
        .await
        .map_err(|e| storage_failure("list todos", None, e))?;

    Ok(Json(todos))
}

pub async fn get(
    State(state): State<AppState>,
    TodoId(id): TodoId,
) -> Result<impl IntoResponse, ApiError> {
    let todo = state
        .store
        .get_by_id(id)
        .await
        .map_err(|e| storage_failure("fetch todo", Some(id), e))?;

    match todo {
        Some(t) => Ok(Json(t)),
        None => {
            tracing::debug!(id, "todo not found");
            Err(ApiError::NotFound { id })
        }
    }
}

pub async fn create(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<CreateTodo>,
) -> Result<impl IntoResponse, ApiError> {
    let input = body.into_input()?;

    let todo = state
        .store
        .create(&input)
        .await
        .map_err(|e| storage_failure("create todo", None, e))?;

    tracing::info!(id = todo.id, "todo created");
    Ok((StatusCode::CREATED, Json(todo)))
}

/// Replace every mutable field of a todo
pub async fn update(
    State(state): State<AppState>,
    TodoId(id): TodoId,
    JsonBody(body): JsonBody<UpdateTodo>,
) -> Result<impl IntoResponse, ApiError> {
    let input = body.into_input()?;

    let todo = state
        .store
        .update(id, &input)
        .await
        .map_err(|e| storage_failure("update todo", Some(id), e))?;

    match todo {
        Some(t) => Ok(Json(t)),
        None => {
            tracing::debug!(id, "todo not found for update");
            Err(ApiError::NotFound { id })
        }
    }
}

pub async fn delete(
    State(state): State<AppState>,
    TodoId(id): TodoId,
) -> Result<impl IntoResponse, ApiError> {
    let deleted = state
        .store
        .delete_by_id(id)
        .await
        .map_err(|e| storage_failure("delete todo", Some(id), e))?;

    if !deleted {
        tracing::debug!(id, "todo not found for delete");
        return Err(ApiError::NotFound { id });
    }

    tracing::info!(id, "todo deleted");
    Ok(Json(json!({"message": "Todo deleted successfully"})))
}

/// PUT or DELETE on the collection path with an empty id segment
pub async fn missing_id() -> ApiError {
    ValidationError::Missing { field: "id" }.into()
}
