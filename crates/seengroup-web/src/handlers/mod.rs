//! HTTP handlers for all gateway routes.

pub mod admin_career;
pub mod auth;
pub mod career;
pub mod contact;
pub mod products;
pub mod proxy;
pub mod system;

use axum::{extract::rejection::JsonRejection, Json};
use serde_json::Value;

use seengroup_common::ApiError;

/// Unwrap a JSON body extractor, turning a malformed body into a 400.
pub(crate) fn json_body(body: Result<Json<Value>, JsonRejection>) -> Result<Value, ApiError> {
    match body {
        Ok(Json(v)) => Ok(v),
        Err(rejection) => {
            tracing::debug!(error = %rejection.body_text(), "rejected request body");
            Err(ApiError::BadRequest("Invalid request body".into()))
        }
    }
}

/// Non-empty string field of a JSON object.
pub(crate) fn str_field<'a>(body: &'a Value, key: &str) -> Option<&'a str> {
    body.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}
