//! Server-side CAPTCHA verification for the contact form.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde_json::Value;
use tracing::{error, instrument, warn};

use seengroup_config::Config;

#[derive(Debug, Clone, PartialEq)]
pub enum CaptchaOutcome {
    Passed,
    /// No secret configured; every token is refused.
    MissingSecret,
    /// The provider refused the token. Carries its reply for logging.
    Rejected(Value),
}

impl CaptchaOutcome {
    pub fn passed(&self) -> bool {
        matches!(self, CaptchaOutcome::Passed)
    }
}

#[async_trait]
pub trait CaptchaVerifier: Send + Sync {
    async fn verify(&self, token: &str, remote_ip: Option<&str>) -> CaptchaOutcome;
}

/// Cloudflare Turnstile `siteverify`.
pub struct TurnstileVerifier {
    http: Client,
    config: Arc<Config>,
}

impl TurnstileVerifier {
    pub fn new(http: Client, config: Arc<Config>) -> Self {
        Self { http, config }
    }
}

#[async_trait]
impl CaptchaVerifier for TurnstileVerifier {
    #[instrument(skip(self, token))]
    async fn verify(&self, token: &str, remote_ip: Option<&str>) -> CaptchaOutcome {
        let Some(secret) = self.config.captcha.secret_key.as_ref() else {
            error!("TURNSTILE_SECRET_KEY is missing on server");
            return CaptchaOutcome::MissingSecret;
        };

        let mut form = vec![
            ("secret", secret.expose_secret().to_string()),
            ("response", token.to_string()),
        ];
        if let Some(ip) = remote_ip {
            form.push(("remoteip", ip.to_string()));
        }

        let reply = match self.http.post(&self.config.captcha.verify_url).form(&form).send().await {
            Ok(resp) => resp.json::<Value>().await.unwrap_or(Value::Null),
            Err(e) => {
                warn!("Turnstile request failed: {}", e);
                Value::Null
            }
        };

        if reply.get("success").and_then(Value::as_bool) == Some(true) {
            CaptchaOutcome::Passed
        } else {
            warn!(reply = %reply, "Turnstile verify failed");
            CaptchaOutcome::Rejected(reply)
        }
    }
}

/// First address of an `X-Forwarded-For` chain.
pub fn first_forwarded_ip(header: Option<&str>) -> Option<String> {
    header
        .and_then(|h| h.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(str::to_string)
}
