//! Client for the external backend API.
//!
//! The backend owns every durable record and every authentication decision;
//! this type only knows its base URL and how to read its replies.

use std::time::Duration;

use reqwest::{header, Client, Method, RequestBuilder, Response};
use serde_json::Value;
use tracing::debug;

use seengroup_common::{ApiError, SeenError};
use seengroup_config::BackendConfig;

#[derive(Debug, Clone)]
pub struct BackendClient {
    base_url: String,
    http: Client,
}

/// Status plus best-effort JSON body. A body that is not JSON reads as `Null`.
#[derive(Debug, Clone)]
pub struct BackendReply {
    pub status: u16,
    pub body: Value,
}

impl BackendReply {
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl BackendClient {
    pub fn new(config: &BackendConfig) -> Result<Self, SeenError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { base_url: config.base_url.trim_end_matches('/').to_string(), http })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn http(&self) -> &Client {
        &self.http
    }

    /// `path` must start with `/`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        debug!(%method, path, "backend request");
        self.http.request(method, self.url(path))
    }

    /// Request carrying `Authorization: Bearer <token>`.
    pub fn authed(&self, method: Method, path: &str, token: &str) -> RequestBuilder {
        self.request(method, path)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
    }

    /// Drain a response into status + JSON body.
    pub async fn read(resp: Response) -> Result<BackendReply, SeenError> {
        let status = resp.status().as_u16();
        let bytes = resp.bytes().await?;
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        Ok(BackendReply { status, body })
    }

    /// Like [`read`](Self::read) but a non-JSON body becomes
    /// `{"success": <ok>, "message": <text>}`.
    pub async fn read_wrapping_text(resp: Response) -> Result<BackendReply, SeenError> {
        let status = resp.status().as_u16();
        let text = resp.text().await?;
        let body = serde_json::from_str(&text).unwrap_or_else(|_| {
            serde_json::json!({ "success": (200..300).contains(&status), "message": text })
        });
        Ok(BackendReply { status, body })
    }

    /// Send and drain in one step.
    pub async fn send(builder: RequestBuilder) -> Result<BackendReply, SeenError> {
        let resp = builder.send().await?;
        Self::read(resp).await
    }

    /// [`send`](Self::send), with transport failures reported to the caller
    /// as a 500 carrying `failure`.
    pub async fn exchange(builder: RequestBuilder, failure: &str) -> Result<BackendReply, ApiError> {
        Self::send(builder)
            .await
            .map_err(|e| ApiError::internal(failure.to_string(), e))
    }
}
