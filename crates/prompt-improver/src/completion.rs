//! The language-model boundary.
//!
//! Everything the pipeline needs from a model service is one operation:
//! send a fully rendered request text and get the reply text back. The
//! [`Completion`] trait captures that, so the pipeline can run against the
//! [`GigaChatClient`](crate::api::GigaChatClient) or any test double.

use crate::error::CompletionError;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Boxed future returned by [`Completion::complete`].
pub type CompletionFuture<'a> =
    Pin<Box<dyn Future<Output = Result<String, CompletionError>> + Send + 'a>>;

/// A text-completion service.
///
/// Implementors must be usable through a shared reference: the pipeline
/// only ever borrows the client, and one client may serve many runs.
///
/// # Example
///
/// ```ignore
/// struct Echo;
///
/// impl Completion for Echo {
///     fn complete<'a>(&'a self, prompt: &'a str) -> CompletionFuture<'a> {
///         Box::pin(async move { Ok(prompt.to_string()) })
///     }
/// }
/// ```
pub trait Completion: Send + Sync {
    /// Send `prompt` as a single user message and return the reply text.
    ///
    /// Uses a boxed future so that the trait is dyn-compatible.
    fn complete<'a>(&'a self, prompt: &'a str) -> CompletionFuture<'a>;
}

impl<C: Completion + ?Sized> Completion for &C {
    fn complete<'a>(&'a self, prompt: &'a str) -> CompletionFuture<'a> {
        (**self).complete(prompt)
    }
}

impl<C: Completion + ?Sized> Completion for Box<C> {
    fn complete<'a>(&'a self, prompt: &'a str) -> CompletionFuture<'a> {
        (**self).complete(prompt)
    }
}

impl<C: Completion + ?Sized> Completion for Arc<C> {
    fn complete<'a>(&'a self, prompt: &'a str) -> CompletionFuture<'a> {
        (**self).complete(prompt)
    }
}
