//! Convenience re-exports for common `prompt-improver` types.
//!
//! ```ignore
//! use prompt_improver::prelude::*;
//! ```

// ── Client ──────────────────────────────────────────────────────────
pub use crate::api::{GigaChatClient, GigaChatConfig};
pub use crate::completion::{Completion, CompletionFuture};

// ── Pipeline ────────────────────────────────────────────────────────
pub use crate::config::ImproverConfig;
pub use crate::criteria::{CriteriaRegistry, Criterion};
pub use crate::pipeline::{Improver, RepairAction, Revision};
pub use crate::templates::PromptTemplates;
pub use crate::verdict::{MatchMode, Verdict, VerdictRule};

// ── Events ──────────────────────────────────────────────────────────
pub use crate::events::{
    CompositeEventHandler, EventHandler, FnEventHandler, ImproverEvent, LoggingHandler,
    NoopHandler,
};

// ── Errors ──────────────────────────────────────────────────────────
pub use crate::error::{CompletionError, ConfigError};
pub use crate::get_upd_prompt_by_recs;
