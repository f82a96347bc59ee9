//! Connection settings for the GigaChat API.
//!
//! Settings are immutable once a [`GigaChatClient`](super::GigaChatClient)
//! is built from them.

use crate::error::ConfigError;
use std::time::Duration;

pub const GIGACHAT_API_URL: &str = "https://gigachat.devices.sberbank.ru/api/v1";
pub const GIGACHAT_AUTH_URL: &str = "https://ngw.devices.sberbank.ru:9443/api/v2/oauth";

/// Default model for all LLM calls.
pub const DEFAULT_MODEL: &str = "GigaChat";

/// Default OAuth scope (personal API access).
pub const DEFAULT_SCOPE: &str = "GIGACHAT_API_PERS";

/// Near-zero sampling temperature: as deterministic as the service allows.
pub const DEFAULT_TEMPERATURE: f32 = 1e-8;

#[derive(Debug, Clone)]
pub struct GigaChatConfig {
    /// Base64 authorization key (`client_id:client_secret`), sent as Basic auth
    /// to the OAuth endpoint. Unused when `access_token` is set.
    pub credentials: Option<String>,
    /// OAuth scope. Default: [`DEFAULT_SCOPE`].
    pub scope: String,
    /// Pre-issued access token. Skips the OAuth exchange entirely.
    pub access_token: Option<String>,
    /// Model identifier. Default: [`DEFAULT_MODEL`].
    pub model: String,
    /// Sampling temperature. Default: [`DEFAULT_TEMPERATURE`].
    pub temperature: f32,
    /// Maximum tokens per response. `None` leaves it to the service.
    pub max_tokens: Option<u32>,
    /// API base URL, without the trailing `/chat/completions`.
    pub base_url: String,
    /// OAuth token endpoint.
    pub auth_url: String,
    /// Per-request timeout. Default: 120 s.
    pub timeout: Duration,
    /// Verify TLS certificates. Default: `true`.
    pub verify_ssl_certs: bool,
}

impl Default for GigaChatConfig {
    fn default() -> Self {
        Self {
            credentials: None,
            scope: DEFAULT_SCOPE.to_string(),
            access_token: None,
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: None,
            base_url: GIGACHAT_API_URL.to_string(),
            auth_url: GIGACHAT_AUTH_URL.to_string(),
            timeout: Duration::from_secs(120),
            verify_ssl_certs: true,
        }
    }
}

impl GigaChatConfig {
    /// Config authenticating with an authorization key.
    pub fn with_credentials(credentials: impl Into<String>) -> Self {
        Self {
            credentials: Some(credentials.into()),
            ..Default::default()
        }
    }

    /// Read settings from the environment.
    ///
    /// | Variable | Field |
    /// |----------|-------|
    /// | `GIGA_CREDENTIALS` | `credentials` |
    /// | `GIGA_ACCESS_TOKEN` | `access_token` |
    /// | `GIGA_SCOPE` | `scope` |
    /// | `GIGA_MODEL` | `model` |
    /// | `GIGA_BASE_URL` | `base_url` |
    /// | `GIGA_AUTH_URL` | `auth_url` |
    /// | `GIGA_TIMEOUT_SECS` | `timeout` |
    /// | `GIGA_VERIFY_SSL_CERTS` | `verify_ssl_certs` |
    ///
    /// One of `GIGA_CREDENTIALS` or `GIGA_ACCESS_TOKEN` is required.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let mut config = Self {
            credentials: get("GIGA_CREDENTIALS"),
            access_token: get("GIGA_ACCESS_TOKEN"),
            ..Default::default()
        };
        if config.credentials.is_none() && config.access_token.is_none() {
            return Err(ConfigError::MissingEnv("GIGA_CREDENTIALS"));
        }

        if let Some(scope) = get("GIGA_SCOPE") {
            config.scope = scope;
        }
        if let Some(model) = get("GIGA_MODEL") {
            config.model = model;
        }
        if let Some(url) = get("GIGA_BASE_URL") {
            config.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(url) = get("GIGA_AUTH_URL") {
            config.auth_url = url;
        }
        if let Some(value) = get("GIGA_TIMEOUT_SECS") {
            let secs = value
                .trim()
                .parse::<u64>()
                .map_err(|e| ConfigError::InvalidEnv {
                    name: "GIGA_TIMEOUT_SECS",
                    value: value.clone(),
                    reason: e.to_string(),
                })?;
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(value) = get("GIGA_VERIFY_SSL_CERTS") {
            config.verify_ssl_certs = parse_bool(&value).ok_or_else(|| ConfigError::InvalidEnv {
                name: "GIGA_VERIFY_SSL_CERTS",
                value: value.clone(),
                reason: "expected true/false".to_string(),
            })?;
        }
        Ok(config)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_auth_url(mut self, url: impl Into<String>) -> Self {
        self.auth_url = url.into();
        self
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn with_verify_ssl_certs(mut self, verify: bool) -> Self {
        self.verify_ssl_certs = verify;
        self
    }

    /// Full URL of the chat completions endpoint.
    pub fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
