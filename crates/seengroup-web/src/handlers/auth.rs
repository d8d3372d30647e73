//! Admin sign-in, second factor, session validation, logout and CSRF minting.
//!
//! Session cookies are only ever set after the backend has handed over a
//! token: a login answered with a one-time-code challenge leaves the cookie
//! jar untouched until `verify-otp` succeeds.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::CookieJar;
use serde_json::{json, Value};
use tracing::{info, instrument, warn};

use seengroup_common::envelope::{error_or_message, is_success};
use seengroup_common::validate::is_valid_password;
use seengroup_common::ApiError;

use crate::backend::BackendClient;
use crate::handlers::{json_body, str_field};
use crate::session::{self, build_cookie, clear_session, session_token, with_session, CSRF_COOKIE};
use crate::state::SharedState;

/// Session length when "remember me" is not ticked.
const SHORT_SESSION_DAYS: i64 = 1;

/// `POST /api/admin/auth`
#[instrument(skip_all)]
pub async fn login(
    State(state): State<SharedState>,
    jar: CookieJar,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let body = json_body(body)?;
    let (Some(email), Some(password)) = (str_field(&body, "email"), str_field(&body, "password")) else {
        return Err(ApiError::BadRequest("Email and password are required".into()));
    };
    let remember_me = body.get("rememberMe").and_then(Value::as_bool).unwrap_or(false);

    let reply = BackendClient::send(
        state
            .backend
            .request(Method::POST, "/api/auth/login")
            .json(&json!({ "email": email, "password": password, "rememberMe": remember_me })),
    )
    .await?;

    if reply.status == StatusCode::ACCEPTED.as_u16() {
        if let Some(otp_id) = reply.body.pointer("/data/otpId").and_then(Value::as_str) {
            info!("login requires second factor");
            let message = reply
                .body
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("Verification code sent");
            let payload = json!({ "success": true, "message": message, "data": { "otpId": otp_id } });
            return Ok((StatusCode::ACCEPTED, Json(payload)).into_response());
        }
    }

    if !reply.is_ok() || !is_success(&reply.body) {
        let status = if reply.is_ok() { StatusCode::UNAUTHORIZED.as_u16() } else { reply.status };
        return Err(ApiError::upstream(status, error_or_message(&reply.body, "Invalid credentials")));
    }

    let Some(token) = reply.body.pointer("/data/token").and_then(Value::as_str) else {
        return Err(ApiError::BadGateway("Token missing in backend response".into()));
    };
    let refresh = reply
        .body
        .pointer("/data/refreshToken")
        .and_then(Value::as_str)
        .map(str::to_string);
    let user = reply.body.pointer("/data/user").cloned().unwrap_or(Value::Null);

    let days = if remember_me { state.config.session.max_age_days } else { SHORT_SESSION_DAYS };
    let jar = with_session(jar, token.to_string(), refresh, &state.config.session, days);
    info!(remember_me, "admin signed in");
    Ok((jar, Json(json!({ "success": true, "user": user }))).into_response())
}

/// `GET /api/admin/auth`
#[instrument(skip_all)]
pub async fn verify_session(
    State(state): State<SharedState>,
    jar: CookieJar,
) -> Result<Json<Value>, ApiError> {
    let Some(token) = session_token(&jar) else {
        return Err(ApiError::Unauthorized("Not authenticated".into()));
    };

    let reply = BackendClient::send(state.backend.authed(Method::GET, "/api/auth/verify", &token)).await?;
    if !reply.is_ok() {
        return Err(ApiError::Unauthorized("Session expired".into()));
    }

    let user = reply
        .body
        .pointer("/data/user")
        .or_else(|| reply.body.get("user"))
        .or_else(|| reply.body.get("data"))
        .cloned()
        .unwrap_or(Value::Null);
    Ok(Json(json!({ "success": true, "user": user })))
}

/// `POST /api/admin/auth/verify-otp`
#[instrument(skip_all)]
pub async fn verify_otp(
    State(state): State<SharedState>,
    jar: CookieJar,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let body = json_body(body)?;
    let (Some(otp_id), Some(code)) = (str_field(&body, "otpId"), str_field(&body, "code")) else {
        return Err(ApiError::BadRequest("otpId and code are required".into()));
    };

    let reply = BackendClient::send(
        state
            .backend
            .request(Method::POST, "/api/auth/2fa/verify")
            .json(&json!({ "otpId": otp_id, "code": code })),
    )
    .await?;

    if !reply.is_ok() || !is_success(&reply.body) {
        // A 2xx without `success` is still a refusal.
        let status = if reply.is_ok() { StatusCode::UNAUTHORIZED.as_u16() } else { reply.status };
        return Err(ApiError::upstream(status, error_or_message(&reply.body, "Invalid or expired code")));
    }

    let Some(token) = reply.body.pointer("/data/token").and_then(Value::as_str) else {
        return Err(ApiError::BadGateway("Token missing in backend response".into()));
    };
    let refresh = reply
        .body
        .pointer("/data/refreshToken")
        .and_then(Value::as_str)
        .map(str::to_string);
    let user = reply.body.pointer("/data/user").cloned().unwrap_or(Value::Null);

    let session = &state.config.session;
    let jar = with_session(jar, token.to_string(), refresh, session, session.max_age_days);
    info!("second factor accepted");
    Ok((jar, Json(json!({ "success": true, "message": "Authenticated", "user": user }))).into_response())
}

/// `POST /api/admin/auth/resend-otp`
#[instrument(skip_all)]
pub async fn resend_otp(
    State(state): State<SharedState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let body = json_body(body)?;
    let Some(otp_id) = str_field(&body, "otpId") else {
        return Err(ApiError::BadRequest("otpId is required".into()));
    };

    let reply = BackendClient::send(
        state
            .backend
            .request(Method::POST, "/api/auth/2fa/resend")
            .json(&json!({ "otpId": otp_id })),
    )
    .await?;

    if !reply.is_ok() {
        return Err(ApiError::upstream(reply.status, error_or_message(&reply.body, "Failed to resend")));
    }
    Ok(Json(json!({ "success": true, "message": "New code sent" })))
}

/// `POST /api/admin/logout`
#[instrument(skip_all)]
pub async fn logout(State(state): State<SharedState>, jar: CookieJar) -> impl IntoResponse {
    if let Some(token) = session_token(&jar) {
        let req = state
            .backend
            .authed(Method::POST, "/api/auth/logout", &token)
            .json(&json!({}));
        if let Err(e) = req.send().await {
            warn!("Backend logout failed, continuing with local logout: {}", e);
        }
    }
    (
        clear_session(jar),
        Json(json!({ "success": true, "message": "Logged out successfully" })),
    )
}

/// `GET /api/admin/logout`
pub async fn logout_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

/// `GET /api/admin/csrf`
pub async fn csrf_token(State(state): State<SharedState>, jar: CookieJar) -> impl IntoResponse {
    if let Some(existing) = session::cookie_value(&jar, CSRF_COOKIE) {
        return (jar, Json(json!({ "csrfToken": existing })));
    }
    let token = uuid::Uuid::new_v4().to_string();
    let session = &state.config.session;
    let jar = jar.add(build_cookie(CSRF_COOKIE, token.clone(), false, session, session.max_age_days));
    (jar, Json(json!({ "csrfToken": token })))
}

/// `PUT /api/admin/change-password`
#[instrument(skip_all)]
pub async fn change_password(
    State(state): State<SharedState>,
    jar: CookieJar,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let body = json_body(body)?;
    let current = str_field(&body, "currentPassword");
    let new = str_field(&body, "newPassword");
    let (Some(current), Some(new)) = (current, new) else {
        return Err(ApiError::BadRequest("Current and new password are required".into()));
    };
    if !is_valid_password(new) {
        return Err(ApiError::BadRequest("New password must be at least 6 characters".into()));
    }
    let Some(token) = session_token(&jar) else {
        return Err(ApiError::Unauthorized("Unauthorized".into()));
    };

    let reply = BackendClient::send(
        state
            .backend
            .authed(Method::PUT, "/api/auth/change-password", &token)
            .json(&json!({ "currentPassword": current, "newPassword": new })),
    )
    .await?;

    if !reply.is_ok() {
        return Err(ApiError::upstream(
            reply.status,
            error_or_message(&reply.body, "Failed to change password"),
        ));
    }
    let message = reply
        .body
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("Password changed successfully");
    Ok(Json(json!({ "success": true, "message": message })))
}
