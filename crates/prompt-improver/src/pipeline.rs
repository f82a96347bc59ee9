//! Detect-then-repair pipeline.
//!
//! The [`Improver`] checks a prompt against every criterion, turns the
//! resulting [`GapSet`] into a [`RepairPlan`], and folds the prompt text
//! through the plan's steps, one model call per step:
//!
//! | Gaps | Steps | Calls after checks |
//! |------|-------|--------------------|
//! | none | none, acceptance message returned | 0 |
//! | no few-shot gap | revise | 1 |
//! | only the few-shot gap | add examples to the original prompt | 1 |
//! | few-shot gap and others | revise, then add examples to the revision | 2 |
//!
//! Whatever the last call returns is the result; it is not re-checked.

use crate::checker::ComplianceChecker;
use crate::completion::Completion;
use crate::config::ImproverConfig;
use crate::criteria::Criterion;
use crate::error::CompletionError;
use crate::events::{EventHandler, ImproverEvent, NoopHandler};
use crate::gaps::{GapSet, collect_gaps, join_criteria};
use tracing::{Instrument, info, info_span};
use uuid::Uuid;

// ── Plan ───────────────────────────────────────────────────────────

/// One repair call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepairStep {
    /// Rewrite the prompt so it meets these criteria.
    Revise { criteria: Vec<Criterion> },
    /// Append three few-shot examples, keeping the text as is.
    AddFewShot,
}

impl RepairStep {
    /// Short label for logs.
    pub fn describe(&self) -> String {
        match self {
            RepairStep::Revise { criteria } => format!("revise ({} criteria)", criteria.len()),
            RepairStep::AddFewShot => "add few-shot examples".to_string(),
        }
    }
}

/// Which repair branch a run took.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepairAction {
    /// No gaps; the acceptance message was returned.
    Accept,
    /// Text revision only.
    Revise,
    /// Text revision, then few-shot examples appended to the revision.
    ReviseWithFewShot,
    /// Few-shot examples appended to the original prompt.
    FewShotOnly,
}

/// The ordered repair steps for a gap set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepairPlan {
    steps: Vec<RepairStep>,
}

impl RepairPlan {
    /// Build the plan for `gaps`.
    ///
    /// When the few-shot criterion is among the gaps it is taken out of the
    /// revision list and handled by a trailing [`RepairStep::AddFewShot`].
    pub fn for_gaps(gaps: &GapSet, few_shot: Option<&Criterion>) -> Self {
        let mut remaining = gaps.as_slice().to_vec();
        let add_examples = match few_shot {
            Some(criterion) if gaps.contains(criterion) => {
                // Only the first occurrence moves to the few-shot step.
                if let Some(position) = remaining.iter().position(|g| g == criterion) {
                    remaining.remove(position);
                }
                true
            }
            _ => false,
        };

        let mut steps = Vec::with_capacity(2);
        if !remaining.is_empty() {
            steps.push(RepairStep::Revise {
                criteria: remaining,
            });
        }
        if add_examples {
            steps.push(RepairStep::AddFewShot);
        }
        Self { steps }
    }

    pub fn steps(&self) -> &[RepairStep] {
        &self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn action(&self) -> RepairAction {
        match self.steps.as_slice() {
            [] => RepairAction::Accept,
            [RepairStep::AddFewShot] => RepairAction::FewShotOnly,
            [RepairStep::Revise { .. }] => RepairAction::Revise,
            _ => RepairAction::ReviseWithFewShot,
        }
    }
}

// ── Result ─────────────────────────────────────────────────────────

/// The outcome of [`Improver::revise`].
#[derive(Debug, Clone)]
pub struct Revision {
    /// Correlation id of the run, also recorded on its tracing span.
    pub run_id: String,
    /// The improved prompt, or the acceptance message.
    pub text: String,
    /// Criteria the original prompt failed, in registry order.
    pub gaps: GapSet,
    pub action: RepairAction,
    /// Check calls plus repair calls.
    pub model_calls: usize,
}

impl Revision {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }

    pub fn is_accepted(&self) -> bool {
        self.action == RepairAction::Accept
    }
}

// ── Improver ───────────────────────────────────────────────────────

/// Checks a prompt and asks the model to repair what is missing.
///
/// ```ignore
/// let client = GigaChatClient::new(GigaChatConfig::from_env()?)?;
/// let revision = Improver::new(&client, ImproverConfig::default())
///     .with_event_handler(&LoggingHandler)
///     .revise("Напиши отзыв о фильме")
///     .await?;
/// println!("{}", revision.text());
/// ```
///
/// The improver borrows the client and the handler; both must outlive the
/// `.revise()` call. Runs are independent, so one improver can serve any
/// number of prompts.
pub struct Improver<'a, C: Completion + ?Sized> {
    client: &'a C,
    config: ImproverConfig,
    event_handler: &'a dyn EventHandler,
}

impl<'a, C: Completion + ?Sized> Improver<'a, C> {
    pub fn new(client: &'a C, config: ImproverConfig) -> Self {
        Self {
            client,
            config,
            event_handler: &NoopHandler,
        }
    }

    pub fn with_event_handler(mut self, handler: &'a dyn EventHandler) -> Self {
        self.event_handler = handler;
        self
    }

    pub fn config(&self) -> &ImproverConfig {
        &self.config
    }

    /// Run one detect-then-repair pass over `prompt`.
    ///
    /// Makes `registry.len()` check calls followed by at most two repair
    /// calls, strictly one after another. Any failed call aborts the run
    /// and its error is returned unchanged.
    pub async fn revise(&self, prompt: &str) -> Result<Revision, CompletionError> {
        let run_id = generate_run_id();
        let span = info_span!("revise", run_id = %run_id);
        self.run(run_id, prompt).instrument(span).await
    }

    async fn run(&self, run_id: String, prompt: &str) -> Result<Revision, CompletionError> {
        let registry = &self.config.registry;
        let templates = &self.config.templates;
        self.event_handler.on_event(&ImproverEvent::RunStarted {
            run_id: &run_id,
            criteria: registry.len(),
        });

        let checker = ComplianceChecker::new(self.client, templates, &self.config.verdict_rule);
        let gaps = collect_gaps(&checker, prompt, registry.criteria(), self.event_handler).await?;
        let mut model_calls = registry.len();
        self.event_handler
            .on_event(&ImproverEvent::GapsCollected { gaps: &gaps });

        let plan = RepairPlan::for_gaps(&gaps, registry.few_shot());
        let action = plan.action();

        let text = if plan.is_empty() {
            self.event_handler.on_event(&ImproverEvent::Accepted);
            self.config.acceptance_message.clone()
        } else {
            let total = plan.steps().len();
            let mut text = prompt.to_string();
            for (index, step) in plan.steps().iter().enumerate() {
                self.event_handler.on_event(&ImproverEvent::StepStarted {
                    index,
                    total,
                    step,
                });
                let request = match step {
                    RepairStep::Revise { criteria } => {
                        templates.render_revision(&text, &join_criteria(criteria))?
                    }
                    RepairStep::AddFewShot => templates.render_few_shot(&text)?,
                };
                text = self.client.complete(&request).await?;
                model_calls += 1;
                self.event_handler.on_event(&ImproverEvent::StepFinished {
                    index,
                    total,
                    step,
                    output: &text,
                });
            }
            text
        };

        info!(
            "Revision done: {} gap(s), {action:?}, {model_calls} model call(s)",
            gaps.len()
        );
        self.event_handler.on_event(&ImproverEvent::Finished {
            action,
            model_calls,
        });

        Ok(Revision {
            run_id,
            text,
            gaps,
            action,
            model_calls,
        })
    }
}

/// Generate a unique id for a revision run: `rv-` and a v4 UUID in
/// simple (unhyphenated) form.
pub fn generate_run_id() -> String {
    format!("rv-{}", Uuid::new_v4().simple())
}
