//! The checklist a prompt is evaluated against.
//!
//! A [`Criterion`] is identified by its exact text. The default
//! [`CriteriaRegistry`] holds the eight prompt-engineering criteria in a
//! fixed order; the last one, [`FEW_SHOT_CRITERION`], is designated as the
//! few-shot criterion because repairing it appends examples instead of
//! rewriting the prompt.

use std::borrow::Cow;
use std::fmt;

/// The criterion whose repair appends few-shot examples.
pub const FEW_SHOT_CRITERION: &str = "Наличие few-shot примеров.";

/// The default checklist, in evaluation order.
pub const DEFAULT_CRITERIA: [&str; 8] = [
    "Наличие роли, экспертности или знаний в определенной области. В промпте должна быть указана роль модели, ее экспертность или базовые знания в конкретной области (например, 'Ты - специалист по финансовым услугам').",
    "Наличие инструкции. В промпте должна быть четко указана задача, которую должна выполнить языковая модель.",
    "Наличие контекста. В промпте должна быть предоставлена дополнительная информация, которая окружает основную задачу или вопрос и помогает лучше понять суть задачи или вопроса (например тема, цель вопроса и так далее).",
    "Наличие описания выходных данных. В промпте должно быть четко указано, что должно быть получено в результате выполнения задачи, которая описывается в промпте. Также должен быть указан формат выходных данных.",
    "Ясность и конкретность. Промпт должен быть чектим, понятным, детализированным и описательным.",
    "Однозначность инструкций в промпте, отсутствие двусмысленности",
    "Утвердительные операции. Формулируйте задачу для языковой модели так, чтобы она четко указывала на действия, которые необходимо выполнить, избегая указания на то, что делать не следует.",
    FEW_SHOT_CRITERION,
];

/// One prompt-quality property, compared by exact text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Criterion(Cow<'static, str>);

impl Criterion {
    pub const fn from_static(text: &'static str) -> Self {
        Self(Cow::Borrowed(text))
    }

    pub fn new(text: impl Into<String>) -> Self {
        Self(Cow::Owned(text.into()))
    }

    pub fn text(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Criterion {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for Criterion {
    fn from(text: &'static str) -> Self {
        Self::from_static(text)
    }
}

impl From<String> for Criterion {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

/// Ordered, read-only list of criteria plus the designated few-shot one.
///
/// The few-shot criterion does not have to be part of the list; when it
/// isn't, the pipeline never takes the example-appending branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CriteriaRegistry {
    criteria: Vec<Criterion>,
    few_shot: Option<Criterion>,
}

impl Default for CriteriaRegistry {
    fn default() -> Self {
        Self {
            criteria: DEFAULT_CRITERIA
                .iter()
                .copied()
                .map(Criterion::from_static)
                .collect(),
            few_shot: Some(Criterion::from_static(FEW_SHOT_CRITERION)),
        }
    }
}

impl CriteriaRegistry {
    /// A registry with the given criteria and no few-shot designation.
    pub fn new<I, T>(criteria: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Criterion>,
    {
        Self {
            criteria: criteria.into_iter().map(Into::into).collect(),
            few_shot: None,
        }
    }

    /// Designate the criterion whose repair appends few-shot examples.
    pub fn with_few_shot(mut self, criterion: impl Into<Criterion>) -> Self {
        self.few_shot = Some(criterion.into());
        self
    }

    pub fn criteria(&self) -> &[Criterion] {
        &self.criteria
    }

    pub fn few_shot(&self) -> Option<&Criterion> {
        self.few_shot.as_ref()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Criterion> {
        self.criteria.iter()
    }

    pub fn len(&self) -> usize {
        self.criteria.len()
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }
}

impl<'a> IntoIterator for &'a CriteriaRegistry {
    type Item = &'a Criterion;
    type IntoIter = std::slice::Iter<'a, Criterion>;

    fn into_iter(self) -> Self::IntoIter {
        self.criteria.iter()
    }
}
