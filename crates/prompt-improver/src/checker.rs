//! Single-criterion compliance check.

use crate::completion::Completion;
use crate::criteria::Criterion;
use crate::error::CompletionError;
use crate::templates::PromptTemplates;
use crate::verdict::{Verdict, VerdictRule};
use tracing::{debug, trace};

/// The verdict together with the raw text it was parsed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assessment {
    pub verdict: Verdict,
    pub response: String,
}

/// Asks the model whether a prompt satisfies one criterion.
///
/// Borrows the client, the templates and the verdict rule; one checker can
/// be reused for any number of prompts and criteria.
pub struct ComplianceChecker<'a, C: Completion + ?Sized> {
    client: &'a C,
    templates: &'a PromptTemplates,
    rule: &'a VerdictRule,
}

impl<'a, C: Completion + ?Sized> ComplianceChecker<'a, C> {
    pub fn new(client: &'a C, templates: &'a PromptTemplates, rule: &'a VerdictRule) -> Self {
        Self {
            client,
            templates,
            rule,
        }
    }

    /// Classify `prompt` against `criterion`.
    ///
    /// Issues exactly one model call. Errors from the call are returned as-is.
    pub async fn check(
        &self,
        prompt: &str,
        criterion: &Criterion,
    ) -> Result<Verdict, CompletionError> {
        self.assess(prompt, criterion).await.map(|a| a.verdict)
    }

    /// Like [`check`](Self::check), but keeps the raw response.
    pub async fn assess(
        &self,
        prompt: &str,
        criterion: &Criterion,
    ) -> Result<Assessment, CompletionError> {
        let request = self.templates.render_check(prompt, criterion.text())?;
        trace!("Check request: {} chars", request.chars().count());

        let response = self.client.complete(&request).await?;
        let verdict = self.rule.parse(&response);
        debug!("Check verdict: {verdict} (response {:?})", response);

        Ok(Assessment { verdict, response })
    }
}
