//! Commit-intent validation.
//!
//! A change description must follow the conventional-commit header grammar
//! `type(scope)?!?: description` unless the caller forces it through.

use crate::error::{Result, ShiprError};
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::OnceLock;

/// Commit types accepted in the header.
pub const INTENT_TYPES: [&str; 9] = [
    "feat", "fix", "docs", "chore", "refactor", "perf", "test", "ci", "build",
];

fn header_regex() -> &'static Regex {
    static HEADER: OnceLock<Regex> = OnceLock::new();
    HEADER.get_or_init(|| {
        let pattern = format!(
            r"(?s)^(?:{})(?:\([^()\n]*[^()\s][^()\n]*\))?!?:[ \t]+\S.*$",
            INTENT_TYPES.join("|")
        );
        Regex::new(&pattern).expect("invalid intent pattern")
    })
}

/// Outcome of a successful classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentVerdict {
    Accepted,
    /// Grammar failed but `force` was set; the caller must warn.
    AcceptedWithWarning,
}

/// Whether `description` matches the conventional-commit header grammar.
pub fn matches_grammar(description: &str) -> bool {
    header_regex().is_match(description)
}

/// Classify a description. Pure; no I/O.
pub fn validate(description: &str, force: bool) -> Result<IntentVerdict> {
    if description.trim().is_empty() {
        return Err(ShiprError::InvalidIntentFormat(description.to_string()));
    }

    match (matches_grammar(description), force) {
        (true, _) => Ok(IntentVerdict::Accepted),
        (false, true) => Ok(IntentVerdict::AcceptedWithWarning),
        (false, false) => Err(ShiprError::InvalidIntentFormat(description.to_string())),
    }
}

/// A description that passed validation. Used as commit message and PR text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ChangeDescription(String);

impl ChangeDescription {
    pub fn accept(raw: &str, force: bool) -> Result<(Self, IntentVerdict)> {
        let trimmed = raw.trim();
        let verdict = validate(trimmed, force)?;
        Ok((Self(trimmed.to_string()), verdict))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChangeDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
