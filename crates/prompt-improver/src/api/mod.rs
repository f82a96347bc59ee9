//! GigaChat API layer: wire types, configuration and the HTTP client.
//!
//! - [`config`]: [`GigaChatConfig`] with defaults and `from_env()`.
//! - [`gigachat`]: [`GigaChatClient`], OAuth token exchange plus chat
//!   completions, implementing [`Completion`](crate::completion::Completion).
//!
//! The chat endpoint speaks the OpenAI-compatible format, so the request and
//! response types below are a small subset of it.

pub mod config;
pub mod gigachat;

pub use config::GigaChatConfig;
pub use gigachat::GigaChatClient;

use serde::{Deserialize, Serialize};

// ── Request types ──────────────────────────────────────────────────

/// Chat completion request body.
#[derive(Serialize, Debug)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

/// Role of a message in the conversation. Every request is a single user
/// turn.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
}

/// A message in the conversation.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

// ── Response types ─────────────────────────────────────────────────

#[derive(Deserialize, Debug)]
pub(crate) struct RawChatResponse {
    pub(crate) choices: Option<Vec<RawChoice>>,
    pub(crate) error: Option<ApiErrorResponse>,
    #[serde(default)]
    pub(crate) usage: Option<UsageInfo>,
}

#[derive(Deserialize, Debug)]
pub(crate) struct RawChoice {
    pub(crate) message: RawResponseMessage,
    pub(crate) finish_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
pub(crate) struct RawResponseMessage {
    pub(crate) content: Option<String>,
}

#[derive(Deserialize, Debug)]
pub(crate) struct ApiErrorResponse {
    pub(crate) message: String,
}

/// Token usage statistics.
#[derive(Deserialize, Debug, Clone)]
pub struct UsageInfo {
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
    pub total_tokens: Option<u32>,
}

/// OAuth token endpoint response. `expires_at` is in Unix milliseconds.
#[derive(Deserialize, Debug, Clone)]
pub(crate) struct TokenResponse {
    pub(crate) access_token: String,
    pub(crate) expires_at: u64,
}
