//! Async HTTP client for the GigaChat chat completions API.
//!
//! Authentication is a two-step affair: the authorization key is exchanged
//! at the OAuth endpoint for a short-lived access token, which is then sent
//! as a Bearer token with every chat request. Tokens are cached and reused
//! until shortly before they expire.

use super::config::GigaChatConfig;
use super::{ChatRequest, Message, RawChatResponse, TokenResponse};
use crate::completion::{Completion, CompletionFuture};
use crate::error::{CompletionError, ConfigError};
use std::time::{Instant, SystemTime};
use tokio::sync::Mutex;
use tracing::{debug, trace, warn};

/// Refresh a cached token this long before its stated expiry.
const TOKEN_EXPIRY_MARGIN_MS: u64 = 60_000;

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    /// Unix milliseconds; `None` for a pre-issued token.
    expires_at: Option<u64>,
}

impl CachedToken {
    fn is_fresh(&self, now_ms: u64) -> bool {
        self.expires_at
            .is_none_or(|at| now_ms.saturating_add(TOKEN_EXPIRY_MARGIN_MS) < at)
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map_or(0, |d| d.as_millis() as u64)
}

pub struct GigaChatClient {
    client: reqwest::Client,
    config: GigaChatConfig,
    token: Mutex<Option<CachedToken>>,
}

impl GigaChatClient {
    /// Build a client. Fails if neither credentials nor an access token are
    /// configured, or if the HTTP client cannot be constructed.
    pub fn new(config: GigaChatConfig) -> Result<Self, ConfigError> {
        if config.credentials.is_none() && config.access_token.is_none() {
            return Err(ConfigError::MissingEnv("GIGA_CREDENTIALS"));
        }
        if !config.verify_ssl_certs {
            warn!("TLS certificate verification is disabled for GigaChat requests");
        }
        let client = reqwest::Client::builder()
            .user_agent(concat!("prompt-improver/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .danger_accept_invalid_certs(!config.verify_ssl_certs)
            .build()
            .map_err(ConfigError::Client)?;
        let token = config.access_token.clone().map(|value| CachedToken {
            value,
            expires_at: None,
        });
        Ok(Self {
            client,
            config,
            token: Mutex::new(token),
        })
    }

    /// Shorthand for `GigaChatClient::new(GigaChatConfig::from_env()?)`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::new(GigaChatConfig::from_env()?)
    }

    pub fn config(&self) -> &GigaChatConfig {
        &self.config
    }

    /// Send a single-turn chat request and return the model's reply text.
    pub async fn chat(&self, prompt: &str) -> Result<String, CompletionError> {
        let body = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![Message::user(prompt)],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };
        self.send(&body).await
    }

    /// Send a chat completion request.
    pub async fn send(&self, body: &ChatRequest) -> Result<String, CompletionError> {
        debug!(
            "LLM request: model={}, messages={}, max_tokens={:?}, temp={}",
            body.model,
            body.messages.len(),
            body.max_tokens,
            body.temperature,
        );
        trace!(
            "Request payload size: {} bytes",
            serde_json::to_string(body).map_or(0, |s| s.len())
        );

        let token = self.access_token().await?;
        let start = Instant::now();

        let resp = self
            .client
            .post(self.config.chat_url())
            .bearer_auth(&token)
            .header("Accept", "application/json")
            .json(body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;

        debug!(
            "LLM response: HTTP {} in {:.1}s ({} bytes)",
            status,
            start.elapsed().as_secs_f64(),
            text.len()
        );

        if status == reqwest::StatusCode::UNAUTHORIZED {
            // The next call re-authenticates.
            self.token.lock().await.take();
        }
        if !status.is_success() {
            return Err(CompletionError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: RawChatResponse =
            serde_json::from_str(&text).map_err(|e| CompletionError::Decode(e.to_string()))?;

        if let Some(err) = parsed.error {
            return Err(CompletionError::Api(err.message));
        }

        if let Some(ref usage) = parsed.usage {
            debug!(
                "Token usage: prompt={}, completion={}, total={}",
                usage.prompt_tokens.unwrap_or(0),
                usage.completion_tokens.unwrap_or(0),
                usage.total_tokens.unwrap_or(0),
            );
        }

        let choice = parsed
            .choices
            .and_then(|c| c.into_iter().next())
            .ok_or(CompletionError::EmptyResponse)?;
        if let Some(reason) = choice.finish_reason.as_deref().filter(|r| *r != "stop") {
            debug!("LLM finish reason: {reason}");
        }
        let content = choice.message.content.ok_or(CompletionError::EmptyResponse)?;
        debug!("LLM output: {} chars", content.chars().count());
        Ok(content)
    }

    /// Return a usable access token, exchanging credentials if the cached
    /// one is missing or about to expire.
    async fn access_token(&self) -> Result<String, CompletionError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(now_ms())) {
            return Ok(token.value.clone());
        }

        let fresh = self.fetch_token().await?;
        let value = fresh.value.clone();
        *cached = Some(fresh);
        Ok(value)
    }

    async fn fetch_token(&self) -> Result<CachedToken, CompletionError> {
        let credentials = self.config.credentials.as_deref().ok_or_else(|| {
            CompletionError::Auth("access token expired and no credentials are configured".into())
        })?;

        let rq_uid = uuid::Uuid::new_v4().to_string();
        debug!(
            "Requesting GigaChat access token (scope={}, RqUID={rq_uid})",
            self.config.scope
        );

        let resp = self
            .client
            .post(&self.config.auth_url)
            .header("Authorization", format!("Basic {credentials}"))
            .header("RqUID", rq_uid)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .header("Accept", "application/json")
            .body(format!("scope={}", self.config.scope))
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(CompletionError::Auth(format!("HTTP {status}: {text}")));
        }

        let token: TokenResponse = serde_json::from_str(&text)
            .map_err(|e| CompletionError::Auth(format!("bad token response: {e}")))?;
        trace!("Access token valid until {} ms", token.expires_at);
        Ok(CachedToken {
            value: token.access_token,
            expires_at: Some(token.expires_at),
        })
    }
}

impl Completion for GigaChatClient {
    fn complete<'a>(&'a self, prompt: &'a str) -> CompletionFuture<'a> {
        Box::pin(self.chat(prompt))
    }
}
