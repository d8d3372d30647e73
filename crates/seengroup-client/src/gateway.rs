//! HTTP access to the gateway with a persistent cookie store.
//!
//! The session and CSRF cookies the gateway sets land in a shared
//! `reqwest::cookie::Jar`. Mutating requests copy the `csrfToken` cookie
//! into the `x-csrf-token` header, which is what the gateway's
//! double-submit check compares.

use std::sync::Arc;

use reqwest::cookie::{CookieStore, Jar};
use reqwest::{Client, Method, RequestBuilder};
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

use seengroup_common::envelope::{error_or_message, is_success};

use crate::error::{ClientError, Result};

pub const CSRF_COOKIE: &str = "csrfToken";
pub const CSRF_HEADER: &str = "x-csrf-token";

/// A decoded gateway answer.
#[derive(Debug, Clone)]
pub struct GatewayReply {
    pub status: u16,
    pub body: Value,
}

impl GatewayReply {
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Non-2xx or `success: false` becomes `ClientError::Rejected`.
    pub fn into_result(self, fallback: &str) -> Result<Value> {
        if self.is_ok() && is_success(&self.body) {
            Ok(self.body)
        } else {
            Err(ClientError::Rejected {
                status: self.status,
                message: error_or_message(&self.body, fallback),
            })
        }
    }
}

#[derive(Clone)]
pub struct GatewayClient {
    base_url: Url,
    http: Client,
    jar: Arc<Jar>,
}

impl GatewayClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)?;
        let jar = Arc::new(Jar::default());
        let http = Client::builder()
            .cookie_provider(jar.clone())
            .build()?;
        Ok(Self { base_url, http, jar })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn http(&self) -> &Client {
        &self.http
    }

    pub fn url(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    /// Value of a cookie the store would send to the gateway.
    pub fn cookie(&self, name: &str) -> Option<String> {
        let header = self.jar.cookies(&self.base_url)?;
        let raw = header.to_str().ok()?;
        raw.split(';').find_map(|pair| {
            let (k, v) = pair.trim().split_once('=')?;
            (k == name).then(|| v.to_string())
        })
    }

    pub fn csrf_token(&self) -> Option<String> {
        self.cookie(CSRF_COOKIE)
    }

    /// `GET /api/admin/csrf`. The gateway also sets the cookie, which the
    /// store picks up.
    #[instrument(skip(self))]
    pub async fn fetch_csrf(&self) -> Result<String> {
        let reply = self.send(self.request(Method::GET, "/api/admin/csrf")?).await?;
        if !reply.is_ok() {
            return Err(ClientError::Rejected {
                status: reply.status,
                message: error_or_message(&reply.body, "Failed to fetch CSRF token"),
            });
        }
        reply
            .body
            .get("csrfToken")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| ClientError::Rejected {
                status: reply.status,
                message: "CSRF token missing in response".to_string(),
            })
    }

    /// Fetches a token only when the store has none.
    pub async fn ensure_csrf(&self) -> Result<String> {
        match self.csrf_token() {
            Some(token) => Ok(token),
            None => self.fetch_csrf().await,
        }
    }

    /// Builder for `path`, with the CSRF header attached to mutating methods
    /// when a token cookie is present.
    pub fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let mutating = !matches!(method, Method::GET | Method::HEAD | Method::OPTIONS);
        let mut builder = self.http.request(method, self.url(path)?);
        if mutating {
            if let Some(token) = self.csrf_token() {
                builder = builder.header(CSRF_HEADER, token);
            }
        }
        Ok(builder)
    }

    /// Sends and decodes. A non-JSON body decodes to `Value::Null`.
    pub async fn send(&self, builder: RequestBuilder) -> Result<GatewayReply> {
        let resp = builder.send().await?;
        let status = resp.status().as_u16();
        let bytes = resp.bytes().await?;
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        debug!(status, "gateway replied");
        Ok(GatewayReply { status, body })
    }

    pub async fn send_json(&self, method: Method, path: &str, body: &Value) -> Result<GatewayReply> {
        self.send(self.request(method, path)?.json(body)).await
    }
}
