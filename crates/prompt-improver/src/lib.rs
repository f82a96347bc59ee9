//! Prompt-quality improvement on top of a chat-completion model.
//!
//! `prompt-improver` takes a prompt written for a large language model,
//! asks the model whether it meets each of eight prompt-engineering
//! criteria, and then asks the model to repair whatever is missing. Every
//! step is a single-turn completion against the
//! [GigaChat](https://developers.sber.ru/docs/ru/gigachat/api/overview) API,
//! or against any other [`Completion`](completion::Completion) implementor.
//!
//! # Getting started
//!
//! ```ignore
//! use prompt_improver::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = GigaChatClient::new(GigaChatConfig::from_env()?)?;
//!
//!     let revision = Improver::new(&client, ImproverConfig::default())
//!         .with_event_handler(&LoggingHandler)
//!         .revise("Напиши отзыв о фильме")
//!         .await?;
//!
//!     println!("{}", revision.text());
//!     Ok(())
//! }
//! ```
//!
//! For the stock behaviour in one call there is [`get_upd_prompt_by_recs`].
//!
//! # How a run works
//!
//! 1. One check call per criterion, in registry order. A reply of exactly
//!    `нет` (after trimming) marks the criterion as unmet; anything else
//!    counts as met.
//! 2. No unmet criteria: the acceptance message is returned.
//! 3. Otherwise the unmet criteria, minus the few-shot one, go into a
//!    single revision call. If the few-shot criterion was unmet, a final
//!    call appends three examples to the latest text.
//!
//! Any failed call aborts the run with its [`CompletionError`].
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`api`] | [`GigaChatClient`](api::GigaChatClient), [`GigaChatConfig`](api::GigaChatConfig), wire types |
//! | [`completion`] | [`Completion`](completion::Completion) trait, the model boundary |
//! | [`criteria`] | [`Criterion`](criteria::Criterion), [`CriteriaRegistry`](criteria::CriteriaRegistry) |
//! | [`templates`] | [`PromptTemplates`](templates::PromptTemplates) for check, revision and few-shot requests |
//! | [`verdict`] | [`VerdictRule`](verdict::VerdictRule) turning replies into verdicts |
//! | [`checker`] | [`ComplianceChecker`](checker::ComplianceChecker), one criterion at a time |
//! | [`gaps`] | [`GapSet`](gaps::GapSet) and [`collect_gaps`](gaps::collect_gaps) |
//! | [`pipeline`] | [`Improver`](pipeline::Improver), [`RepairPlan`](pipeline::RepairPlan), [`Revision`](pipeline::Revision) |
//! | [`events`] | [`EventHandler`](events::EventHandler) and the stock handlers |
//! | [`config`] | [`ImproverConfig`](config::ImproverConfig) |
//! | [`error`] | [`CompletionError`], [`ConfigError`](error::ConfigError) |

pub mod api;
pub mod checker;
pub mod completion;
pub mod config;
pub mod criteria;
pub mod error;
pub mod events;
pub mod gaps;
pub mod pipeline;
pub mod prelude;
pub mod templates;
pub mod verdict;

pub use error::CompletionError;

use completion::Completion;
use config::ImproverConfig;
use pipeline::Improver;

/// Improve `manager_prompt` with the default criteria, templates and
/// verdict rule.
///
/// Returns the improved prompt, or the acceptance message when the prompt
/// already meets every criterion.
pub async fn get_upd_prompt_by_recs<C: Completion + ?Sized>(
    client: &C,
    manager_prompt: &str,
) -> Result<String, CompletionError> {
    Improver::new(client, ImproverConfig::default())
        .revise(manager_prompt)
        .await
        .map(pipeline::Revision::into_text)
}
