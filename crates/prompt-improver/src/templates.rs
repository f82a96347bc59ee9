//! Request templates for the three kinds of model call.
//!
//! Templates use Jinja syntax and are rendered with `minijinja`. Slots are
//! written as `{{ manager_prompt }}`; single braces are literal text, and
//! `{% raw %}...{% endraw %}` keeps a block verbatim. The defaults ship as
//! resources under `templates/` and are compiled in; a directory of
//! overrides can be loaded with [`PromptTemplates::from_dir`].
//!
//! | Template | Slots |
//! |----------|-------|
//! | check    | `manager_prompt`, `point` |
//! | revise   | `manager_prompt`, `missing_points` |
//! | few-shot | `zero_shot_prompt` |
//!
//! Rendering is strict: a template referring to any other variable fails
//! [`validate`](PromptTemplates::validate).

use crate::error::ConfigError;
use minijinja::{Environment, UndefinedBehavior, Value, context};
use std::collections::BTreeMap;
use std::path::Path;

pub const DEFAULT_CHECK_TEMPLATE: &str = include_str!("../templates/check.txt");
pub const DEFAULT_REVISE_TEMPLATE: &str = include_str!("../templates/revise.txt");
pub const DEFAULT_FEW_SHOT_TEMPLATE: &str = include_str!("../templates/few_shot.txt");

pub const SLOT_MANAGER_PROMPT: &str = "manager_prompt";
pub const SLOT_POINT: &str = "point";
pub const SLOT_MISSING_POINTS: &str = "missing_points";
pub const SLOT_ZERO_SHOT_PROMPT: &str = "zero_shot_prompt";

/// The three request templates used by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplates {
    /// Single-criterion yes/no classification request.
    pub check: String,
    /// Rewrite request listing the unmet criteria.
    pub revise: String,
    /// Request to append three few-shot examples.
    pub few_shot: String,
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self {
            check: DEFAULT_CHECK_TEMPLATE.to_string(),
            revise: DEFAULT_REVISE_TEMPLATE.to_string(),
            few_shot: DEFAULT_FEW_SHOT_TEMPLATE.to_string(),
        }
    }
}

impl PromptTemplates {
    /// Load `check.txt`, `revise.txt` and `few_shot.txt` from `dir`.
    ///
    /// Files that don't exist keep their default. The result is validated.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let dir = dir.as_ref();
        let mut templates = Self::default();
        for (file, slot) in [
            ("check.txt", &mut templates.check),
            ("revise.txt", &mut templates.revise),
            ("few_shot.txt", &mut templates.few_shot),
        ] {
            let path = dir.join(file);
            match std::fs::read_to_string(&path) {
                Ok(text) => *slot = text,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(source) => return Err(ConfigError::Io { path, source }),
            }
        }
        templates.validate()?;
        Ok(templates)
    }

    /// Check that every template parses, uses each slot it is rendered
    /// with, and renders without touching undefined variables.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let env = environment();
        let required: [(&'static str, &str, &[&'static str]); 3] = [
            ("check", self.check.as_str(), &[SLOT_MANAGER_PROMPT, SLOT_POINT]),
            (
                "revise",
                self.revise.as_str(),
                &[SLOT_MANAGER_PROMPT, SLOT_MISSING_POINTS],
            ),
            ("few_shot", self.few_shot.as_str(), &[SLOT_ZERO_SHOT_PROMPT]),
        ];
        for (name, source, slots) in required {
            let engine_error = |source| ConfigError::TemplateEngine { name, source };
            let template = env
                .template_from_named_str(name, source)
                .map_err(engine_error)?;

            let declared = template.undeclared_variables(false);
            if let Some(&slot) = slots.iter().find(|slot| !declared.contains(**slot)) {
                return Err(ConfigError::Template { name, slot });
            }

            let sample: BTreeMap<&str, &str> = slots.iter().map(|&slot| (slot, "x")).collect();
            template.render(&sample).map_err(engine_error)?;
        }
        Ok(())
    }

    pub fn render_check(
        &self,
        prompt: &str,
        criterion: &str,
    ) -> Result<String, minijinja::Error> {
        render(
            "check",
            &self.check,
            context! { manager_prompt => prompt, point => criterion },
        )
    }

    /// `missing_points` is the newline-joined list of unmet criteria.
    pub fn render_revision(
        &self,
        prompt: &str,
        missing_points: &str,
    ) -> Result<String, minijinja::Error> {
        render(
            "revise",
            &self.revise,
            context! { manager_prompt => prompt, missing_points => missing_points },
        )
    }

    pub fn render_few_shot(&self, prompt: &str) -> Result<String, minijinja::Error> {
        render(
            "few_shot",
            &self.few_shot,
            context! { zero_shot_prompt => prompt },
        )
    }
}

/// Engine settings shared by validation and rendering: no autoescaping,
/// strict undefined handling, text kept byte for byte including the final
/// newline.
fn environment<'source>() -> Environment<'source> {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    env.set_keep_trailing_newline(true);
    env
}

fn render(name: &str, source: &str, ctx: Value) -> Result<String, minijinja::Error> {
    environment().render_named_str(name, source, ctx)
}
