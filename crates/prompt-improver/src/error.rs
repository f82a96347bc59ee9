//! Error types for prompt-improver.
//!
//! [`CompletionError`] is the only error the pipeline ever returns: a failed
//! model call, or a request template that cannot be rendered, aborts the run
//! and reaches the caller unchanged. Malformed verdicts are not errors (see
//! [`VerdictRule`](crate::verdict::VerdictRule)).

use std::path::PathBuf;
use thiserror::Error;

/// Failure of a single call to the language-model service.
#[derive(Error, Debug)]
pub enum CompletionError {
    /// The HTTP request could not be sent or its body could not be read.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("LLM API HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body was not the expected JSON shape.
    #[error("failed to parse response: {0}")]
    Decode(String),

    /// The service returned an error object instead of choices.
    #[error("LLM API error: {0}")]
    Api(String),

    /// Exchanging credentials for an access token failed.
    #[error("authorization failed: {0}")]
    Auth(String),

    /// The service returned no choice or no message content.
    #[error("empty LLM response")]
    EmptyResponse,

    /// A request template failed to render; no call was sent.
    #[error("failed to render request: {0}")]
    Render(#[from] minijinja::Error),
}

impl CompletionError {
    /// Whether the failure is worth retrying (rate limit, 5xx, network).
    ///
    /// The pipeline never retries on its own; this is for callers that wrap
    /// it in their own backoff policy.
    pub fn is_transient(&self) -> bool {
        match self {
            CompletionError::Request(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            CompletionError::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// Invalid or missing configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    MissingEnv(&'static str),

    #[error("environment variable {name} has invalid value {value:?}: {reason}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("template {name} never uses slot {slot}")]
    Template {
        name: &'static str,
        slot: &'static str,
    },

    #[error("template {name} is invalid: {source}")]
    TemplateEngine {
        name: &'static str,
        #[source]
        source: minijinja::Error,
    },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}
