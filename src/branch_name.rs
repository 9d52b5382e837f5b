//! Branch-name synthesis and validation.
//!
//! Generated names look like `<slug>-<YYYYmmddHHMMSS>-<rand4>`. The slug is a
//! pure function of the description so reruns of the same change look related;
//! the timestamp and random suffix keep them unique.

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::OnceLock;

const SLUG_MAX_LEN: usize = 40;
const SLUG_FALLBACK: &str = "change";
const SUFFIX_LEN: usize = 4;
const SUFFIX_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Characters git refuses in ref names, on top of whitespace and control characters.
const FORBIDDEN_REF_CHARS: [char; 7] = ['~', '^', ':', '?', '*', '[', '\\'];

fn prefix_regex() -> &'static Regex {
    static PREFIX: OnceLock<Regex> = OnceLock::new();
    PREFIX.get_or_init(|| {
        Regex::new(r"^[A-Za-z]+(?:\([^()]*\))?!?:\s*").expect("invalid prefix pattern")
    })
}

/// Source of the current time.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A validated branch name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct BranchName(String);

impl BranchName {
    /// Wrap a caller-chosen name. Collision and ref-format checks are the caller's job.
    pub fn explicit(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for BranchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derive the deterministic slug component from a description.
///
/// Strips a conventional-commit prefix, lower-cases, collapses every run of
/// non-alphanumeric characters to one hyphen, trims hyphens and truncates to
/// 40 characters. Falls back to `change` when nothing is left.
pub fn slugify(description: &str) -> String {
    let first_line = description.lines().next().unwrap_or_default();
    let stripped = prefix_regex().replace(first_line, "");

    let mut slug = String::with_capacity(stripped.len());
    let mut pending_hyphen = false;
    for c in stripped.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }

    // ASCII-only at this point, so byte truncation is safe
    slug.truncate(SLUG_MAX_LEN);
    let slug = slug.trim_matches('-');

    if slug.is_empty() {
        SLUG_FALLBACK.to_string()
    } else {
        slug.to_string()
    }
}

/// Local ref-name rules checked before asking git.
pub fn has_forbidden_ref_chars(name: &str) -> bool {
    name.is_empty()
        || name
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || FORBIDDEN_REF_CHARS.contains(&c))
}

/// Produces unique branch names from a clock and a random source.
pub struct BranchNamer {
    clock: Box<dyn Clock>,
    rng: Box<dyn RngCore>,
}

impl BranchNamer {
    pub fn new(clock: Box<dyn Clock>, rng: Box<dyn RngCore>) -> Self {
        Self { clock, rng }
    }

    /// Wall clock and an OS-seeded CSPRNG.
    pub fn system() -> Self {
        Self::new(Box::new(SystemClock), Box::new(StdRng::from_entropy()))
    }

    pub fn generate(&mut self, description: &str) -> BranchName {
        let timestamp = self.clock.now().format(TIMESTAMP_FORMAT);
        let suffix: String = (0..SUFFIX_LEN)
            .map(|_| SUFFIX_ALPHABET[self.rng.gen_range(0..SUFFIX_ALPHABET.len())] as char)
            .collect();

        BranchName(format!("{}-{}-{}", slugify(description), timestamp, suffix))
    }
}

impl Default for BranchNamer {
    fn default() -> Self {
        Self::system()
    }
}

impl fmt::Debug for BranchNamer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BranchNamer").finish_non_exhaustive()
    }
}
