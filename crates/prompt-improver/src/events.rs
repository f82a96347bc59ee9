//! Events emitted while a prompt is checked and repaired.
//!
//! The [`Improver`](crate::pipeline::Improver) reports each stage of a run
//! through [`ImproverEvent`] values. Handlers are observers: they can log,
//! count or render, but cannot change what the pipeline does next.
//!
//! | Handler | Use case |
//! |---------|----------|
//! | [`NoopHandler`] | Default; tests and fire-and-forget runs |
//! | [`LoggingHandler`] | Structured logging via `tracing` |
//! | [`FnEventHandler`] | Quick closures |
//! | [`CompositeEventHandler`] | Fan out to several handlers in order |

use crate::criteria::Criterion;
use crate::gaps::GapSet;
use crate::pipeline::{RepairAction, RepairStep};
use crate::verdict::Verdict;
use tracing::{debug, info};

/// Events emitted by the pipeline during a run.
#[derive(Debug)]
pub enum ImproverEvent<'a> {
    /// A run is starting; `criteria` checks will follow.
    RunStarted { run_id: &'a str, criteria: usize },
    /// One criterion was classified. `index` is zero-based.
    CriterionChecked {
        index: usize,
        total: usize,
        criterion: &'a Criterion,
        verdict: Verdict,
        response: &'a str,
    },
    /// All criteria were checked.
    GapsCollected { gaps: &'a GapSet },
    /// No gaps: the prompt is returned as acceptable, no repair calls.
    Accepted,
    /// A repair call is about to be sent.
    StepStarted {
        index: usize,
        total: usize,
        step: &'a RepairStep,
    },
    /// A repair call returned.
    StepFinished {
        index: usize,
        total: usize,
        step: &'a RepairStep,
        output: &'a str,
    },
    /// The run completed.
    Finished {
        action: RepairAction,
        model_calls: usize,
    },
}

/// Observer for pipeline events.
///
/// The default implementation ignores every event.
///
/// # Example
///
/// ```ignore
/// struct GapPrinter;
///
/// impl EventHandler for GapPrinter {
///     fn on_event(&self, event: &ImproverEvent<'_>) {
///         if let ImproverEvent::GapsCollected { gaps } = event {
///             for gap in gaps.iter() {
///                 println!("missing: {gap}");
///             }
///         }
///     }
/// }
/// ```
pub trait EventHandler: Send + Sync {
    fn on_event(&self, event: &ImproverEvent<'_>) {
        let _ = event;
    }
}

/// A handler that ignores all events.
pub struct NoopHandler;
impl EventHandler for NoopHandler {}

/// An event handler backed by a closure.
///
/// ```ignore
/// let handler = FnEventHandler::new(|event| {
///     if let ImproverEvent::Finished { model_calls, .. } = event {
///         println!("{model_calls} model calls");
///     }
/// });
/// ```
pub struct FnEventHandler<F>(F)
where
    F: Fn(&ImproverEvent<'_>) + Send + Sync;

impl<F> FnEventHandler<F>
where
    F: Fn(&ImproverEvent<'_>) + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> EventHandler for FnEventHandler<F>
where
    F: Fn(&ImproverEvent<'_>) + Send + Sync,
{
    fn on_event(&self, event: &ImproverEvent<'_>) {
        (self.0)(event)
    }
}

/// Dispatches every event to several handlers, in registration order.
///
/// ```ignore
/// let handler = CompositeEventHandler::new()
///     .with(LoggingHandler)
///     .with(my_metrics_handler);
/// ```
pub struct CompositeEventHandler {
    handlers: Vec<Box<dyn EventHandler>>,
}

impl CompositeEventHandler {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    pub fn with(mut self, handler: impl EventHandler + 'static) -> Self {
        self.handlers.push(Box::new(handler));
        self
    }
}

impl Default for CompositeEventHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl EventHandler for CompositeEventHandler {
    fn on_event(&self, event: &ImproverEvent<'_>) {
        for handler in &self.handlers {
            handler.on_event(event);
        }
    }
}

/// An event handler that logs events via `tracing`.
pub struct LoggingHandler;

impl EventHandler for LoggingHandler {
    fn on_event(&self, event: &ImproverEvent<'_>) {
        match event {
            ImproverEvent::RunStarted { run_id, criteria } => {
                info!("[{run_id}] checking prompt against {criteria} criteria");
            }
            ImproverEvent::CriterionChecked {
                index,
                total,
                criterion,
                verdict,
                response,
            } => {
                let preview: String = criterion.text().chars().take(60).collect();
                debug!(
                    "[{}/{}] {verdict} ({:?}): {preview}",
                    index + 1,
                    total,
                    response.trim()
                );
            }
            ImproverEvent::GapsCollected { gaps } => {
                info!("{} unmet criteria", gaps.len());
            }
            ImproverEvent::Accepted => {
                info!("Prompt meets every criterion, no revision needed");
            }
            ImproverEvent::StepStarted { index, total, step } => {
                info!("Repair step {}/{}: {}", index + 1, total, step.describe());
            }
            ImproverEvent::StepFinished { step, output, .. } => {
                debug!("{} returned {} chars", step.describe(), output.chars().count());
            }
            ImproverEvent::Finished {
                action,
                model_calls,
            } => {
                info!("Finished: {action:?} after {model_calls} model call(s)");
            }
        }
    }
}
