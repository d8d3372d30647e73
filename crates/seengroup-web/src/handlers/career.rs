//! Public career endpoints: job board and job applications.

use axum::{
    extract::{multipart::MultipartError, Multipart, Path, Query, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde_json::{json, Value};
use tracing::{info, instrument, warn};

use seengroup_common::envelope::error_or;
use seengroup_common::models::JobFilters;
use seengroup_common::validate::{check_resume, is_valid_email};
use seengroup_common::ApiError;
use seengroup_config::UploadConfig;

use crate::backend::BackendClient;
use crate::state::SharedState;

const SUBMIT_FAILED: &str = "An unexpected error occurred. Please try again later.";

/// Uploaded résumé as received from the browser.
#[derive(Debug, Clone)]
pub struct ResumeFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// A job application after shallow validation.
#[derive(Debug, Clone)]
pub struct ApplicationForm {
    pub name: String,
    pub email: String,
    pub resume: ResumeFile,
    pub job_id: Option<String>,
    pub phone: Option<String>,
    pub message: Option<String>,
    /// Any other text fields, forwarded untouched.
    pub extra: Vec<(String, String)>,
}

impl ApplicationForm {
    /// Drain a multipart body and apply the pre-checks. Nothing here talks
    /// to the backend.
    pub async fn read(mut multipart: Multipart, uploads: &UploadConfig) -> Result<Self, ApiError> {
        let mut text: Vec<(String, String)> = Vec::new();
        let mut resume: Option<ResumeFile> = None;

        while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            if name == "resume" {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let data = field.bytes().await.map_err(bad_multipart)?;
                // An empty file input with no name is what browsers send for "nothing chosen".
                if file_name.as_deref().unwrap_or_default().is_empty() && data.is_empty() {
                    continue;
                }
                resume = Some(ResumeFile {
                    file_name: file_name.unwrap_or_else(|| "resume".to_string()),
                    content_type,
                    data,
                });
            } else {
                let value = field.text().await.map_err(bad_multipart)?;
                text.push((name, value));
            }
        }

        let mut take = |key: &str| -> Option<String> {
            let idx = text.iter().position(|(k, _)| k == key)?;
            Some(text.remove(idx).1).filter(|v| !v.trim().is_empty())
        };
        let name = take("name");
        let email = take("email");
        let job_id = take("jobId");
        let phone = take("phone");
        let message = take("message");

        let (Some(name), Some(email), Some(resume)) = (name, email, resume) else {
            return Err(ApiError::BadRequest("Name, email, and resume are required fields.".into()));
        };
        if !is_valid_email(&email) {
            return Err(ApiError::BadRequest("Please enter a valid email address.".into()));
        }
        check_resume(
            resume.data.len(),
            resume.content_type.as_deref(),
            uploads.max_resume_bytes,
            &uploads.allowed_resume_types,
        )
        .map_err(|r| ApiError::BadRequest(r.message().to_string()))?;

        Ok(Self { name, email, resume, job_id, phone, message, extra: text })
    }

    /// Re-encode for the backend.
    pub fn into_form(self) -> Result<reqwest::multipart::Form, ApiError> {
        let mut part = reqwest::multipart::Part::bytes(self.resume.data.to_vec())
            .file_name(self.resume.file_name);
        if let Some(ct) = &self.resume.content_type {
            part = part
                .mime_str(ct)
                .map_err(|e| ApiError::BadRequest(format!("Invalid resume content type: {}", e)))?;
        }

        let mut form = reqwest::multipart::Form::new()
            .text("name", self.name)
            .text("email", self.email)
            .part("resume", part);
        for (key, value) in [("jobId", self.job_id), ("phone", self.phone), ("message", self.message)] {
            if let Some(v) = value {
                form = form.text(key, v);
            }
        }
        for (key, value) in self.extra {
            form = form.text(key, value);
        }
        Ok(form)
    }
}

fn bad_multipart(e: MultipartError) -> ApiError {
    warn!("malformed multipart body: {}", e);
    ApiError::BadRequest("Invalid form data".into())
}

/// `GET /api/career`
#[instrument(skip(state))]
pub async fn list_jobs(
    State(state): State<SharedState>,
    Query(filters): Query<JobFilters>,
) -> Result<Json<Value>, ApiError> {
    let reply = BackendClient::exchange(
        state
            .backend
            .request(Method::GET, "/api/career/jobs")
            .query(&filters.query_pairs()),
        "Failed to fetch job listings.",
    )
    .await?;

    if !reply.is_ok() {
        warn!(status = reply.status, body = %reply.body, "backend refused job listing");
        return Err(ApiError::upstream(
            reply.status,
            error_or(&reply.body, "Failed to fetch job listings from backend."),
        ));
    }
    let data = reply
        .body
        .get("data")
        .filter(|d| !d.is_null())
        .cloned()
        .unwrap_or_else(|| json!([]));
    Ok(Json(json!({ "success": true, "data": data })))
}

/// `POST /api/career`
#[instrument(skip_all)]
pub async fn submit_application(
    State(state): State<SharedState>,
    multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let form = ApplicationForm::read(multipart, &state.config.uploads).await?;
    let job_id = form.job_id.clone();

    let reply = BackendClient::exchange(
        state
            .backend
            .request(Method::POST, "/api/career/applications")
            .multipart(form.into_form()?),
        SUBMIT_FAILED,
    )
    .await?;

    if !reply.is_ok() {
        return Err(ApiError::upstream(
            reply.status,
            error_or(&reply.body, "Failed to submit application to backend."),
        ));
    }
    info!(job_id = ?job_id, "application submitted");

    let message = reply.body.get("message").and_then(Value::as_str).unwrap_or(
        "Your application has been submitted successfully. We will review your information and get back to you soon.",
    );
    let data = reply.body.get("data").cloned().unwrap_or(Value::Null);
    Ok(Json(json!({ "success": true, "message": message, "data": data })))
}

/// `GET /api/career/jobs/{id}`
#[instrument(skip(state))]
pub async fn get_job(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let resp = state
        .backend
        .request(Method::GET, &format!("/api/career/jobs/{}", id))
        .send()
        .await
        .map_err(|e| ApiError::internal("Server error", e))?;
    let status = resp.status();
    let raw = resp.text().await.map_err(|e| ApiError::internal("Server error", e))?;
    // A non-JSON body is the backend's error text.
    let body: Value = serde_json::from_str(&raw).unwrap_or_else(|_| json!({ "success": false, "error": raw }));

    if !status.is_success() {
        return Err(ApiError::upstream(status.as_u16(), error_or(&body, "Failed to fetch job")));
    }
    let data = body.get("data").cloned().unwrap_or(Value::Null);
    Ok(Json(json!({ "success": true, "data": data })))
}

/// `GET /api/proxy/career/jobs/{id}`: the backend body, unchanged.
#[instrument(skip(state))]
pub async fn proxy_job_detail(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    if id.trim().is_empty() {
        return Err(ApiError::BadRequest("Job ID is required.".into()));
    }
    let reply = BackendClient::exchange(
        state.backend.request(Method::GET, &format!("/api/career/jobs/{}", id)),
        "Failed to fetch job details.",
    )
    .await?;

    if !reply.is_ok() {
        return Err(ApiError::upstream(
            reply.status,
            error_or(&reply.body, "Failed to fetch job details from backend."),
        ));
    }
    Ok(Json(reply.body))
}

/// `POST /api/proxy/career/applications`: validated like `POST /api/career`,
/// but the backend body is returned as-is.
#[instrument(skip_all)]
pub async fn proxy_application(
    State(state): State<SharedState>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let form = ApplicationForm::read(multipart, &state.config.uploads).await?;

    let reply = BackendClient::exchange(
        state
            .backend
            .request(Method::POST, "/api/career/applications")
            .multipart(form.into_form()?),
        SUBMIT_FAILED,
    )
    .await?;

    if !reply.is_ok() {
        return Err(ApiError::upstream(
            reply.status,
            error_or(&reply.body, "Failed to submit application to backend."),
        ));
    }
    Ok((StatusCode::OK, Json(reply.body)).into_response())
}
