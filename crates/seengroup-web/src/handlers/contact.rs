//! Contact form, gated by a server-side CAPTCHA check.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, Method, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::Value;
use tracing::{info, instrument, warn};

use seengroup_common::ApiError;

use crate::backend::BackendClient;
use crate::captcha::first_forwarded_ip;
use crate::handlers::{json_body, str_field};
use crate::state::SharedState;

/// `POST /api/contact`
#[instrument(skip_all)]
pub async fn submit_contact(
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let body = json_body(body)?;
    let token = str_field(&body, "captchaToken").unwrap_or_default();
    let remote_ip = first_forwarded_ip(headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()));

    let outcome = state.captcha.verify(token, remote_ip.as_deref()).await;
    if !outcome.passed() {
        warn!(?outcome, "contact form captcha refused");
        return Err(ApiError::BadRequest("Captcha verification failed".into()));
    }

    let resp = state
        .backend
        .request(Method::POST, "/api/contact")
        .json(&body)
        .send()
        .await
        .map_err(|e| ApiError::internal("Failed to connect to backend service. Please try again later.", e))?;
    let reply = BackendClient::read_wrapping_text(resp)
        .await
        .map_err(|e| ApiError::internal("Failed to connect to backend service. Please try again later.", e))?;

    info!(status = reply.status, "contact form forwarded");
    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::BAD_GATEWAY);
    Ok((status, Json(reply.body)))
}
