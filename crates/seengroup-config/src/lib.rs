//! Configuration loading for the Seen Group gateway.
//! Reads seengroup.toml from the current directory or the path in SEENGROUP_CONFIG,
//! then applies environment overrides (a `.env` file is honoured if present).

use secrecy::SecretString;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};


#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read { path: String, source: std::io::Error },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    fn parse(raw: &str) -> Result<Self, ConfigError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(ConfigError::Invalid {
                key: "APP_ENV",
                reason: format!("unknown environment '{}'", other),
            }),
        }
    }
}

#[derive(Debug)]
pub struct Config {
    pub server: ServerConfig,
    pub backend: BackendConfig,
    pub session: SessionConfig,
    pub captcha: CaptchaConfig,
    pub uploads: UploadConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_host()           -> String { "127.0.0.1".to_string() }
fn default_port()           -> u16    { 3000 }
fn default_max_body_bytes() -> usize  { 10 * 1024 * 1024 }

#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_backend_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_backend_url()  -> String { "http://localhost:5000".to_string() }
fn default_timeout_secs() -> u64    { 30 }

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub environment: Environment,
    #[serde(default = "default_max_age_days")]
    pub max_age_days: i64,
}

fn default_max_age_days() -> i64 { 7 }

impl SessionConfig {
    /// Cookies carry the `Secure` flag in production only.
    pub fn secure_cookies(&self) -> bool {
        self.environment == Environment::Production
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }
}

#[derive(Debug)]
pub struct CaptchaConfig {
    pub secret_key: Option<SecretString>,
    pub verify_url: String,
}

fn default_verify_url() -> String {
    "https://challenges.cloudflare.com/turnstile/v0/siteverify".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    #[serde(default = "default_max_resume_bytes")]
    pub max_resume_bytes: usize,
    #[serde(default = "default_resume_types")]
    pub allowed_resume_types: Vec<String>,
}

fn default_max_resume_bytes() -> usize { 5 * 1024 * 1024 }
fn default_resume_types() -> Vec<String> {
    vec![
        "application/pdf".to_string(),
        "application/msword".to_string(),
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document".to_string(),
    ]
}

// ── File shape ────────────────────────────────────────────────────────────────

/// On-disk layout. Every section is optional.
#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    server: Option<ServerConfig>,
    backend: Option<BackendConfig>,
    session: Option<SessionConfig>,
    captcha: Option<RawCaptcha>,
    uploads: Option<UploadConfig>,
}

#[derive(Debug, Default, Deserialize)]
struct RawCaptcha {
    secret_key: Option<String>,
    verify_url: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port(), max_body_bytes: default_max_body_bytes() }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self { base_url: default_backend_url(), timeout_secs: default_timeout_secs() }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { environment: Environment::default(), max_age_days: default_max_age_days() }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self { max_resume_bytes: default_max_resume_bytes(), allowed_resume_types: default_resume_types() }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            backend: BackendConfig::default(),
            session: SessionConfig::default(),
            captcha: CaptchaConfig { secret_key: None, verify_url: default_verify_url() },
            uploads: UploadConfig::default(),
        }
    }
}

impl Config {
    /// Load `.env`, then the TOML file, then environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        if dotenvy::dotenv().is_ok() {
            debug!("loaded .env");
        }
        let path = std::env::var("SEENGROUP_CONFIG").unwrap_or_else(|_| "seengroup.toml".to_string());
        let text = Self::read_optional(Path::new(&path))?;
        let config = Self::from_sources(text.as_deref(), |key| std::env::var(key).ok())?;
        info!(
            backend = %config.backend.base_url,
            environment = ?config.session.environment,
            "configuration loaded"
        );
        Ok(config)
    }

    fn read_optional(path: &Path) -> Result<Option<String>, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(None);
        }
        std::fs::read_to_string(path)
            .map(Some)
            .map_err(|source| ConfigError::Read { path: path.display().to_string(), source })
    }

    /// Build from optional TOML text and an environment lookup.
    pub fn from_sources<F>(toml_text: Option<&str>, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw: RawConfig = match toml_text {
            Some(text) => toml::from_str(text)?,
            None => RawConfig::default(),
        };
        let captcha = raw.captcha.unwrap_or_default();

        let mut config = Config {
            server: raw.server.unwrap_or_default(),
            backend: raw.backend.unwrap_or_default(),
            session: raw.session.unwrap_or_default(),
            captcha: CaptchaConfig {
                secret_key: captcha.secret_key.filter(|s| !s.is_empty()).map(SecretString::from),
                verify_url: captcha.verify_url.unwrap_or_else(default_verify_url),
            },
            uploads: raw.uploads.unwrap_or_default(),
        };

        let non_empty = |key: &str| env(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(url) = non_empty("BACKEND_URL").or_else(|| non_empty("NEXT_PUBLIC_BACKEND_URL")) {
            config.backend.base_url = url;
        }
        if let Some(secret) = non_empty("TURNSTILE_SECRET_KEY") {
            config.captcha.secret_key = Some(SecretString::from(secret));
        }
        if let Some(env_name) = non_empty("APP_ENV") {
            config.session.environment = Environment::parse(&env_name)?;
        }
        if let Some(host) = non_empty("HOST") {
            config.server.host = host;
        }
        if let Some(port) = non_empty("PORT") {
            config.server.port = port.parse().map_err(|e| ConfigError::Invalid {
                key: "PORT",
                reason: format!("{}", e),
            })?;
        }

        config.backend.base_url = config.backend.base_url.trim_end_matches('/').to_string();
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.backend.base_url.is_empty() {
            return Err(ConfigError::Invalid { key: "backend.base_url", reason: "must not be empty".into() });
        }
        let parsed = url::Url::parse(&self.backend.base_url).map_err(|e| ConfigError::Invalid {
            key: "backend.base_url",
            reason: e.to_string(),
        })?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ConfigError::Invalid {
                key: "backend.base_url",
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }
        if self.session.max_age_days <= 0 {
            return Err(ConfigError::Invalid { key: "session.max_age_days", reason: "must be positive".into() });
        }
        Ok(())
    }
}
