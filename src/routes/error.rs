use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::model::ValidationError;
use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// The body could not be read at all (too large, aborted); keeps the
    /// status axum chose for it.
    #[error("{message}")]
    Body { status: StatusCode, message: String },

    #[error("Todo {id} not found")]
    NotFound { id: i64 },

    /// The cause is logged where the error is raised; clients only see
    /// which operation failed.
    #[error("Failed to {op}")]
    Storage {
        op: &'static str,
        #[source]
        source: StoreError,
    },
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Body { status, .. } => *status,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.to_string(),
        });

        (self.status(), body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[test]
    fn test_status_mapping() {
        let validation = ApiError::from(ValidationError::Empty { field: "title" });
        assert_eq!(validation.status(), StatusCode::BAD_REQUEST);

        assert_eq!(ApiError::NotFound { id: 1 }.status(), StatusCode::NOT_FOUND);

        let storage = ApiError::Storage {
            op: "list todos",
            source: StoreError::Database(sqlx::Error::PoolTimedOut),
        };
        assert_eq!(storage.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_storage_error_hides_cause() {
        let err = ApiError::Storage {
            op: "create todo",
            source: StoreError::Database(sqlx::Error::Protocol("password=hunter2".into())),
        };

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, serde_json::json!({"error": "Failed to create todo"}));
    }
}
