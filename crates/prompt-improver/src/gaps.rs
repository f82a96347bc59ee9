//! Collecting the criteria a prompt fails.

use crate::checker::ComplianceChecker;
use crate::completion::Completion;
use crate::criteria::Criterion;
use crate::error::CompletionError;
use crate::events::{EventHandler, ImproverEvent};
use crate::verdict::Verdict;

/// The unmet criteria of one prompt, in registry order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GapSet(Vec<Criterion>);

impl GapSet {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Criterion> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Criterion] {
        &self.0
    }

    pub fn contains(&self, criterion: &Criterion) -> bool {
        self.0.contains(criterion)
    }
}

impl From<Vec<Criterion>> for GapSet {
    fn from(criteria: Vec<Criterion>) -> Self {
        Self(criteria)
    }
}

impl<'a> IntoIterator for &'a GapSet {
    type Item = &'a Criterion;
    type IntoIter = std::slice::Iter<'a, Criterion>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

pub(crate) fn join_criteria(criteria: &[Criterion]) -> String {
    criteria
        .iter()
        .map(Criterion::text)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Check `prompt` against every criterion, in order, and keep the failures.
///
/// Issues exactly one check per criterion. The first failed call aborts the
/// whole collection; no partial result is returned.
pub async fn collect_gaps<C: Completion + ?Sized>(
    checker: &ComplianceChecker<'_, C>,
    prompt: &str,
    criteria: &[Criterion],
    handler: &dyn EventHandler,
) -> Result<GapSet, CompletionError> {
    let total = criteria.len();
    let mut gaps = Vec::new();

    for (index, criterion) in criteria.iter().enumerate() {
        let assessment = checker.assess(prompt, criterion).await?;
        handler.on_event(&ImproverEvent::CriterionChecked {
            index,
            total,
            criterion,
            verdict: assessment.verdict,
            response: &assessment.response,
        });
        if assessment.verdict == Verdict::NonCompliant {
            gaps.push(criterion.clone());
        }
    }

    Ok(GapSet::from(gaps))
}
