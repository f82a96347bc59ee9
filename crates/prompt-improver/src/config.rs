//! Configuration for the [`Improver`](crate::pipeline::Improver).
//!
//! [`ImproverConfig::default()`] reproduces the stock behaviour: the eight
//! built-in criteria, the bundled templates, trimmed exact matching of the
//! negative token and the standard acceptance message.
//!
//! ```ignore
//! let config = ImproverConfig::default()
//!     .with_templates(PromptTemplates::from_dir("templates/")?)
//!     .with_verdict_rule(VerdictRule::default().with_mode(MatchMode::CaseInsensitive));
//! ```

use crate::criteria::CriteriaRegistry;
use crate::templates::PromptTemplates;
use crate::verdict::VerdictRule;

/// Returned instead of a revision when a prompt meets every criterion.
pub const ACCEPTANCE_MESSAGE: &str = "Промпт хороший, в серьезных изменениях не нуждается.";

#[derive(Debug, Clone)]
pub struct ImproverConfig {
    /// Criteria checked on every run, in order.
    pub registry: CriteriaRegistry,
    /// Request templates for the check, revision and few-shot calls.
    pub templates: PromptTemplates,
    /// How check responses are turned into verdicts.
    pub verdict_rule: VerdictRule,
    /// Output when no criterion is unmet. Default: [`ACCEPTANCE_MESSAGE`].
    pub acceptance_message: String,
}

impl Default for ImproverConfig {
    fn default() -> Self {
        Self {
            registry: CriteriaRegistry::default(),
            templates: PromptTemplates::default(),
            verdict_rule: VerdictRule::default(),
            acceptance_message: ACCEPTANCE_MESSAGE.to_string(),
        }
    }
}

impl ImproverConfig {
    pub fn with_registry(mut self, registry: CriteriaRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_templates(mut self, templates: PromptTemplates) -> Self {
        self.templates = templates;
        self
    }

    pub fn with_verdict_rule(mut self, rule: VerdictRule) -> Self {
        self.verdict_rule = rule;
        self
    }

    pub fn with_acceptance_message(mut self, message: impl Into<String>) -> Self {
        self.acceptance_message = message.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verdict::MatchMode;

    #[test]
    fn defaults_match_stock_behaviour() {
        let config = ImproverConfig::default();
        assert_eq!(config.registry.len(), 8);
        assert!(config.registry.few_shot().is_some());
        assert_eq!(config.verdict_rule.negative(), "нет");
        assert_eq!(config.verdict_rule.mode(), MatchMode::Trimmed);
        assert_eq!(config.acceptance_message, ACCEPTANCE_MESSAGE);
    }

    #[test]
    fn builders_replace_fields() {
        let config = ImproverConfig::default()
            .with_registry(CriteriaRegistry::new(["only"]))
            .with_verdict_rule(VerdictRule::new("no", MatchMode::Exact))
            .with_acceptance_message("fine");
        assert_eq!(config.registry.len(), 1);
        assert_eq!(config.verdict_rule.negative(), "no");
        assert_eq!(config.acceptance_message, "fine");
    }
}
