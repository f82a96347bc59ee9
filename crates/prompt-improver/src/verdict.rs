//! Turning a raw classification response into a [`Verdict`].
//!
//! The rule is deliberately one-sided: a response is non-compliant only when
//! it matches the negative token. Anything else, including an empty,
//! multi-word or misspelled answer, counts as compliant. A confused model
//! therefore hides gaps rather than inventing them.

use std::borrow::Cow;
use std::fmt;

/// The answer the check template asks for when a criterion is unmet.
pub const NEGATIVE_TOKEN: &str = "нет";

/// Whether a prompt satisfies one criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    Compliant,
    NonCompliant,
}

impl Verdict {
    pub fn is_compliant(self) -> bool {
        self == Verdict::Compliant
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Compliant => write!(f, "compliant"),
            Verdict::NonCompliant => write!(f, "non-compliant"),
        }
    }
}

/// How a response is compared against the negative token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// Byte-for-byte equality, whitespace included.
    Exact,
    /// Equality after trimming surrounding whitespace.
    #[default]
    Trimmed,
    /// Trimmed, then compared case-insensitively.
    CaseInsensitive,
}

/// Parser from raw model output to [`Verdict`].
///
/// The default matches the trimmed response exactly against
/// [`NEGATIVE_TOKEN`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerdictRule {
    negative: Cow<'static, str>,
    mode: MatchMode,
}

impl Default for VerdictRule {
    fn default() -> Self {
        Self {
            negative: Cow::Borrowed(NEGATIVE_TOKEN),
            mode: MatchMode::default(),
        }
    }
}

impl VerdictRule {
    pub fn new(negative: impl Into<String>, mode: MatchMode) -> Self {
        Self {
            negative: Cow::Owned(negative.into()),
            mode,
        }
    }

    /// Same negative token, different comparison.
    pub fn with_mode(mut self, mode: MatchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn negative(&self) -> &str {
        &self.negative
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    pub fn parse(&self, response: &str) -> Verdict {
        let negative = match self.mode {
            MatchMode::Exact => response == self.negative,
            MatchMode::Trimmed => response.trim() == self.negative,
            MatchMode::CaseInsensitive => {
                response.trim().to_lowercase() == self.negative.to_lowercase()
            }
        };
        if negative {
            Verdict::NonCompliant
        } else {
            Verdict::Compliant
        }
    }
}
