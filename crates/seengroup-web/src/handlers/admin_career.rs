//! Admin career management: job postings and the applications received for
//! them. Every route needs a session and forwards it as a bearer token.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header, Method},
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::CookieJar;
use reqwest::RequestBuilder;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, instrument};

use seengroup_common::envelope::error_or;
use seengroup_common::filename::disposition_filename;
use seengroup_common::models::{Application, BackendApplication};
use seengroup_common::ApiError;

use crate::backend::BackendClient;
use crate::handlers::{json_body, str_field};
use crate::session::session_token;
use crate::state::SharedState;

/// Actions the bulk endpoint accepts.
pub const BULK_ACTIONS: &[&str] = &["approve", "reject", "review", "delete"];

fn require_token(jar: &CookieJar) -> Result<String, ApiError> {
    session_token(jar).ok_or_else(|| ApiError::Unauthorized("Authentication required".into()))
}

/// Send, and turn a non-2xx reply into `{success:false, message}` with the
/// backend's status.
async fn call(builder: RequestBuilder, failure: &str) -> Result<Value, ApiError> {
    let reply = BackendClient::exchange(builder, failure).await?;
    if !reply.is_ok() {
        return Err(ApiError::upstream(reply.status, error_or(&reply.body, failure)));
    }
    Ok(reply.body)
}

fn data_of(body: &Value) -> Value {
    body.get("data").cloned().unwrap_or(Value::Null)
}

// ── Jobs ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminJobQuery {
    #[serde(default)]
    pub search: String,
    #[serde(rename = "type", default)]
    pub job_type: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub sort_by: String,
    #[serde(default)]
    pub sort_order: String,
}

impl AdminJobQuery {
    /// Backend query: non-empty filters, defaults for status and sorting,
    /// and one large page so the dashboard can paginate locally.
    pub fn backend_pairs(&self) -> Vec<(&'static str, String)> {
        let or = |v: &str, d: &str| if v.is_empty() { d.to_string() } else { v.to_string() };
        let mut pairs: Vec<(&'static str, String)> = [
            ("search", &self.search),
            ("type", &self.job_type),
            ("department", &self.department),
            ("location", &self.location),
        ]
        .into_iter()
        .filter(|(_, v)| !v.is_empty())
        .map(|(k, v)| (k, v.clone()))
        .collect();
        pairs.push(("status", or(&self.status, "active")));
        pairs.push(("sortBy", or(&self.sort_by, "createdAt")));
        pairs.push(("sortOrder", or(&self.sort_order, "desc")));
        pairs.push(("page", "1".to_string()));
        pairs.push(("limit", "100".to_string()));
        pairs
    }
}

/// `GET /api/admin/career/jobs`
#[instrument(skip(state, jar))]
pub async fn list_jobs(
    State(state): State<SharedState>,
    jar: CookieJar,
    Query(query): Query<AdminJobQuery>,
) -> Result<Json<Value>, ApiError> {
    let token = require_token(&jar)?;
    let body = call(
        state
            .backend
            .authed(Method::GET, "/api/admin/career/jobs", &token)
            .query(&query.backend_pairs()),
        "Failed to fetch jobs",
    )
    .await?;
    Ok(Json(json!({ "success": true, "data": data_of(&body) })))
}

/// `POST /api/admin/career/jobs`
#[instrument(skip_all)]
pub async fn create_job(
    State(state): State<SharedState>,
    jar: CookieJar,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let body = json_body(body)?;
    let token = require_token(&jar)?;
    let reply = call(
        state.backend.authed(Method::POST, "/api/admin/career/jobs", &token).json(&body),
        "Failed to create job",
    )
    .await?;
    info!("job created");
    Ok(Json(json!({ "success": true, "message": "Job created successfully", "data": data_of(&reply) })))
}

/// `GET /api/admin/career/jobs/{id}`
#[instrument(skip(state, jar))]
pub async fn get_job(
    State(state): State<SharedState>,
    jar: CookieJar,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let token = require_token(&jar)?;
    let body = call(
        state.backend.authed(Method::GET, &format!("/api/admin/career/jobs/{}", id), &token),
        "Failed to fetch job",
    )
    .await?;
    Ok(Json(json!({ "success": true, "data": data_of(&body) })))
}

/// `PUT /api/admin/career/jobs/{id}`: the backend takes the id in the body.
#[instrument(skip(state, jar, body))]
pub async fn update_job(
    State(state): State<SharedState>,
    jar: CookieJar,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let mut body = json_body(body)?;
    let token = require_token(&jar)?;
    let Some(fields) = body.as_object_mut() else {
        return Err(ApiError::BadRequest("Job payload must be an object".into()));
    };
    fields.insert("id".to_string(), Value::String(id));

    let reply = call(
        state.backend.authed(Method::PUT, "/api/admin/career/jobs", &token).json(&body),
        "Failed to update job",
    )
    .await?;
    Ok(Json(json!({ "success": true, "message": "Job updated successfully", "data": data_of(&reply) })))
}

/// `DELETE /api/admin/career/jobs/{id}`: the backend takes the id as `?id=`.
#[instrument(skip(state, jar))]
pub async fn delete_job(
    State(state): State<SharedState>,
    jar: CookieJar,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let token = require_token(&jar)?;
    let reply = call(
        state
            .backend
            .authed(Method::DELETE, "/api/admin/career/jobs", &token)
            .query(&[("id", id.as_str())]),
        "Failed to delete job",
    )
    .await?;
    info!(%id, "job deleted");
    Ok(Json(json!({ "success": true, "message": "Job deleted successfully", "data": data_of(&reply) })))
}

// ── Applications ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ApplicationQuery {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub status: String,
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl ApplicationQuery {
    pub fn backend_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if !self.search.is_empty() {
            pairs.push(("search", self.search.clone()));
        }
        if !self.status.is_empty() && self.status != "all" {
            pairs.push(("status", self.status.clone()));
        }
        let page = self.page.clone().filter(|p| !p.is_empty()).unwrap_or_else(|| "1".into());
        let limit = self.limit.clone().filter(|l| !l.is_empty()).unwrap_or_else(|| "10".into());
        pairs.push(("page", page));
        pairs.push(("limit", limit));
        pairs
    }
}

/// `GET /api/admin/career/applications`
#[instrument(skip(state, jar))]
pub async fn list_applications(
    State(state): State<SharedState>,
    jar: CookieJar,
    Query(query): Query<ApplicationQuery>,
) -> Result<Json<Value>, ApiError> {
    let token = require_token(&jar)?;
    let body = call(
        state
            .backend
            .authed(Method::GET, "/api/career/applications", &token)
            .query(&query.backend_pairs()),
        "Failed to fetch applications from backend",
    )
    .await?;

    let raw: Vec<BackendApplication> = serde_json::from_value(data_of(&body))
        .map_err(|e| ApiError::internal("Failed to fetch applications", e))?;
    let applications: Vec<Application> = raw.into_iter().map(Application::from).collect();
    let pagination = body.get("pagination").cloned().unwrap_or(Value::Null);

    Ok(Json(json!({
        "success": true,
        "data": { "applications": applications, "pagination": pagination }
    })))
}

/// `PATCH /api/admin/career/applications` with `{applicationId, status}`.
#[instrument(skip_all)]
pub async fn update_application(
    State(state): State<SharedState>,
    jar: CookieJar,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let body = json_body(body)?;
    let (Some(id), Some(status)) = (str_field(&body, "applicationId"), str_field(&body, "status")) else {
        return Err(ApiError::BadRequest("Application ID and status are required".into()));
    };
    let token = require_token(&jar)?;

    let reply = call(
        state
            .backend
            .authed(Method::PATCH, &format!("/api/career/applications/{}/status", id), &token)
            .json(&json!({ "status": status.to_uppercase() })),
        "Failed to update application status",
    )
    .await?;
    Ok(Json(json!({
        "success": true,
        "message": "Application status updated successfully",
        "data": data_of(&reply)
    })))
}

#[derive(Debug, Deserialize)]
pub struct IdQuery {
    pub id: Option<String>,
}

/// `DELETE /api/admin/career/applications?id=`
#[instrument(skip(state, jar))]
pub async fn delete_application(
    State(state): State<SharedState>,
    jar: CookieJar,
    Query(query): Query<IdQuery>,
) -> Result<Json<Value>, ApiError> {
    let Some(id) = query.id.filter(|id| !id.is_empty()) else {
        return Err(ApiError::BadRequest("Application ID is required".into()));
    };
    let token = require_token(&jar)?;

    let reply = call(
        state
            .backend
            .authed(Method::DELETE, &format!("/api/career/applications/{}", id), &token),
        "Failed to delete application",
    )
    .await?;
    info!(%id, "application deleted");
    Ok(Json(json!({
        "success": true,
        "message": "Application deleted successfully",
        "data": data_of(&reply)
    })))
}

/// `PATCH /api/admin/career/applications/{id}/status`
#[instrument(skip(state, jar, body))]
pub async fn set_application_status(
    State(state): State<SharedState>,
    jar: CookieJar,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let body = json_body(body)?;
    let Some(status) = str_field(&body, "status") else {
        return Err(ApiError::BadRequest("Status is required".into()));
    };
    let token = require_token(&jar)?;

    let reply = call(
        state
            .backend
            .authed(Method::PATCH, &format!("/api/career/applications/{}/status", id), &token)
            .json(&json!({ "status": status })),
        "Failed to update application status",
    )
    .await?;
    Ok(Json(json!({
        "success": true,
        "message": "Application status updated successfully",
        "data": data_of(&reply)
    })))
}

/// `PATCH /api/admin/career/applications/bulk`
#[instrument(skip_all)]
pub async fn bulk_update(
    State(state): State<SharedState>,
    jar: CookieJar,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let body = json_body(body)?;
    let ids = match body.get("applicationIds").and_then(Value::as_array) {
        Some(ids) if !ids.is_empty() => ids.clone(),
        _ => return Err(ApiError::BadRequest("Application IDs array is required".into())),
    };
    let Some(action) = str_field(&body, "action").filter(|a| BULK_ACTIONS.contains(a)) else {
        return Err(ApiError::BadRequest(
            "Valid action is required (approve, reject, review, delete)".into(),
        ));
    };
    let token = require_token(&jar)?;

    let reply = call(
        state
            .backend
            .authed(Method::PATCH, "/api/career/applications/bulk", &token)
            .json(&json!({ "applicationIds": ids, "action": action })),
        "Failed to perform bulk operations",
    )
    .await?;
    info!(action, count = ids.len(), "bulk application update");
    let message = reply
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("Bulk operations completed successfully");
    Ok(Json(json!({ "success": true, "message": message, "data": data_of(&reply) })))
}

/// `POST /api/admin/career/applications/{id}/email`
#[instrument(skip(state, jar, body))]
pub async fn email_applicant(
    State(state): State<SharedState>,
    jar: CookieJar,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let body = json_body(body)?;
    let (Some(subject), Some(message)) = (str_field(&body, "subject"), str_field(&body, "message")) else {
        return Err(ApiError::BadRequest("Subject and message are required".into()));
    };
    let token = require_token(&jar)?;

    let payload = json!({
        "subject": subject,
        "message": message,
        "replyTo": body.get("replyTo"),
        "cc": body.get("cc"),
        "bcc": body.get("bcc"),
    });
    call(
        state
            .backend
            .authed(Method::POST, &format!("/api/career/applications/{}/email", id), &token)
            .json(&payload),
        "Failed to send email",
    )
    .await?;
    Ok(Json(json!({ "success": true, "message": "Email sent successfully" })))
}

// ── Documents ─────────────────────────────────────────────────────────────────

/// A downloadable document attached to an application.
#[derive(Debug, Clone, Copy)]
pub struct Document {
    pub segment: &'static str,
    pub default_name: &'static str,
    pub failure: &'static str,
}

pub const RESUME: Document = Document {
    segment: "resume",
    default_name: "resume.pdf",
    failure: "Failed to download resume",
};

pub const COVER_LETTER: Document = Document {
    segment: "cover-letter",
    default_name: "cover_letter.pdf",
    failure: "Failed to download cover letter",
};

/// `GET /api/admin/career/applications/{id}/resume`
pub async fn download_resume(
    state: State<SharedState>,
    jar: CookieJar,
    id: Path<String>,
) -> Result<Response, ApiError> {
    download(state, jar, id, RESUME).await
}

/// `GET /api/admin/career/applications/{id}/cover-letter`
pub async fn download_cover_letter(
    state: State<SharedState>,
    jar: CookieJar,
    id: Path<String>,
) -> Result<Response, ApiError> {
    download(state, jar, id, COVER_LETTER).await
}

#[instrument(skip(state, jar, doc), fields(doc = doc.segment))]
async fn download(
    State(state): State<SharedState>,
    jar: CookieJar,
    Path(id): Path<String>,
    doc: Document,
) -> Result<Response, ApiError> {
    let token = require_token(&jar)?;
    let resp = state
        .backend
        .authed(Method::GET, &format!("/api/career/applications/{}/{}", id, doc.segment), &token)
        .send()
        .await
        .map_err(|e| ApiError::internal(doc.failure, e))?;

    let status = resp.status();
    let content_type = resp
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let file_name = resp
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
        .and_then(disposition_filename)
        .unwrap_or_else(|| doc.default_name.to_string());

    if !status.is_success() {
        let reply = BackendClient::read(resp).await.map_err(|e| ApiError::internal(doc.failure, e))?;
        return Err(ApiError::upstream(reply.status, error_or(&reply.body, doc.failure)));
    }

    if content_type.contains("application/pdf") || content_type.contains("application/octet-stream") {
        let bytes = resp.bytes().await.map_err(|e| ApiError::internal(doc.failure, e))?;
        let headers = [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", file_name)),
        ];
        return Ok((headers, bytes).into_response());
    }

    let reply = BackendClient::read(resp).await.map_err(|e| ApiError::internal(doc.failure, e))?;
    Ok(Json(reply.body).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_admin_job_query_defaults() {
        let q = AdminJobQuery {
            search: "weld".into(),
            job_type: String::new(),
            department: String::new(),
            location: String::new(),
            status: String::new(),
            sort_by: String::new(),
            sort_order: String::new(),
        };
        let pairs: Vec<(&str, String)> = q.backend_pairs();
        assert_eq!(
            pairs,
            vec![
                ("search", "weld".to_string()),
                ("status", "active".to_string()),
                ("sortBy", "createdAt".to_string()),
                ("sortOrder", "desc".to_string()),
                ("page", "1".to_string()),
                ("limit", "100".to_string()),
            ]
        );
    }

    #[test]
    fn test_application_query_drops_all_status() {
        let q = ApplicationQuery { search: String::new(), status: "all".into(), page: None, limit: Some("25".into()) };
        assert_eq!(q.backend_pairs(), vec![("page", "1".to_string()), ("limit", "25".to_string())]);
    }
}
