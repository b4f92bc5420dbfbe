use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;

use super::error::ApiError;
use crate::model::{parse_id, ValidationError};

/// Todo id from the path, rejected with a 400 JSON body when it is not an
/// integer.
pub struct TodoId(pub i64);

impl<S> FromRequestParts<S> for TodoId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw): Path<String> = Path::from_request_parts(parts, state)
            .await
            .map_err(|_| ValidationError::Missing { field: "id" })?;

        Ok(TodoId(parse_id(&raw)?))
    }
}

/// JSON body parsed regardless of the request content type. Every parse
/// failure becomes a validation error instead of axum's plain-text rejection.
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::Body {
                status: e.status(),
                message: e.body_text(),
            })?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Err(ValidationError::MalformedBody("request body is required".to_string()).into());
        }

        let value = serde_json::from_slice(&bytes)
            .map_err(|e| ValidationError::MalformedBody(e.to_string()))?;

        Ok(JsonBody(value))
    }
}
