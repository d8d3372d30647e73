//! Shared application state for the web server.

use std::sync::Arc;

use seengroup_common::SeenError;
use seengroup_config::Config;

use crate::backend::BackendClient;
use crate::captcha::{CaptchaVerifier, TurnstileVerifier};

/// Shared state injected into every Axum handler. Immutable after startup.
pub struct AppState {
    pub config: Arc<Config>,
    pub backend: BackendClient,
    pub captcha: Arc<dyn CaptchaVerifier>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, SeenError> {
        let config = Arc::new(config);
        let backend = BackendClient::new(&config.backend)?;
        let captcha: Arc<dyn CaptchaVerifier> =
            Arc::new(TurnstileVerifier::new(backend.http().clone(), config.clone()));
        Ok(Self { config, backend, captcha })
    }

    /// Swap the CAPTCHA verifier (tests, alternative providers).
    pub fn with_captcha(mut self, captcha: Arc<dyn CaptchaVerifier>) -> Self {
        self.captcha = captcha;
        self
    }
}

pub type SharedState = Arc<AppState>;
