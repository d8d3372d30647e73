//! Applicant document downloads from the admin dashboard.

use reqwest::{header, Method};
use serde_json::Value;
use tracing::{debug, instrument};

use seengroup_common::envelope::error_or_message;
use seengroup_common::filename::{disposition_filename, simple_user_filename, user_filename};

use crate::error::{ClientError, Result};
use crate::gateway::GatewayClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Resume,
    CoverLetter,
}

impl DocumentKind {
    fn route(self) -> &'static str {
        match self {
            DocumentKind::Resume => "resume",
            DocumentKind::CoverLetter => "cover-letter",
        }
    }

    fn label(self) -> &'static str {
        match self {
            DocumentKind::Resume => "resume",
            DocumentKind::CoverLetter => "cover_letter",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    /// Name to save under, derived from the applicant's name.
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Local name for a document: `{applicant}_{kind}[_{millis}].{ext}`, the
/// extension taken from the served filename when it has one.
pub fn local_filename(
    applicant: &str,
    kind: DocumentKind,
    served: Option<&str>,
    timestamped: bool,
) -> String {
    let ext = served
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or("pdf");
    if timestamped {
        user_filename(applicant, kind.label(), ext)
    } else {
        simple_user_filename(applicant, kind.label(), ext)
    }
}

/// `GET /api/admin/career/applications/{id}/{resume|cover-letter}`.
/// A JSON answer means there was no file to hand out.
#[instrument(skip(gateway, applicant))]
pub async fn download_document(
    gateway: &GatewayClient,
    application_id: &str,
    applicant: &str,
    kind: DocumentKind,
) -> Result<Download> {
    let path = format!("/api/admin/career/applications/{}/{}", application_id, kind.route());
    let resp = gateway.request(Method::GET, &path)?.send().await?;
    let status = resp.status().as_u16();
    let content_type = resp
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let served = resp
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
        .and_then(disposition_filename);
    let bytes = resp.bytes().await?.to_vec();

    if !(200..300).contains(&status) || content_type.contains("application/json") {
        let body: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        return Err(ClientError::Rejected {
            status,
            message: error_or_message(&body, "Document not available"),
        });
    }

    debug!(size = bytes.len(), "document downloaded");
    Ok(Download {
        filename: local_filename(applicant, kind, served.as_deref(), false),
        content_type,
        bytes,
    })
}
