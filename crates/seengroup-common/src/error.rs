use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Failures talking to the backend below the HTTP boundary.
#[derive(Debug, Error)]
pub enum SeenError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, SeenError>;

/// Errors surfaced at the HTTP boundary.
///
/// Every variant renders as `{"success": false, "message": "..."}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("Method not allowed")]
    MethodNotAllowed,

    /// Backend answered with a failure; its status is passed through.
    #[error("{message}")]
    Upstream { status: u16, message: String },

    #[error("{0}")]
    BadGateway(String),

    /// Public message only. The underlying detail is logged when built
    /// through [`ApiError::internal`].
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// Log `detail` and keep only the generic `message` for the caller.
    pub fn internal(message: impl Into<String>, detail: impl std::fmt::Display) -> Self {
        let message = message.into();
        tracing::error!(%detail, "{}", message);
        ApiError::Internal(message)
    }

    pub fn upstream(status: u16, message: impl Into<String>) -> Self {
        ApiError::Upstream { status, message: message.into() }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_)    => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_)  => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_)     => StatusCode::FORBIDDEN,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            ApiError::BadGateway(_)    => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_)      => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::internal("Internal server error", err)
    }
}

impl From<SeenError> for ApiError {
    fn from(err: SeenError) -> Self {
        ApiError::internal("Internal server error", err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = json!({ "success": false, "message": self.to_string() });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::BadRequest("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Unauthorized("x".into()).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::Forbidden("x".into()).status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::MethodNotAllowed.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(ApiError::upstream(422, "bad").status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_invalid_upstream_status_becomes_bad_gateway() {
        assert_eq!(ApiError::upstream(42, "weird").status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_internal_hides_detail() {
        let err = ApiError::internal("Failed to fetch jobs", "connection refused at 10.0.0.3");
        assert_eq!(err.to_string(), "Failed to fetch jobs");
    }

    #[test]
    fn test_transport_error_renders_generic_message() {
        let err = reqwest::Client::new().get("not a url").build().unwrap_err();
        let api: ApiError = SeenError::from(err).into();
        assert_eq!(api.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.to_string(), "Internal server error");
    }
}
