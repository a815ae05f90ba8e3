//! Ignore directives: selectors that are always retained regardless of
//! DOM usage.
//!
//! Two sources: caller-supplied directives (exact strings or `/patterns/`
//! tested against the normalized selector) and the inline one-shot
//! `/* uncss:ignore */` comment, which protects every selector of the
//! next rule in the walk.

use crate::error::{UncssError, UncssResult};
use regex::Regex;
use std::sync::OnceLock;

/// A caller- or author-specified exemption from removal.
#[derive(Debug, Clone)]
pub enum IgnoreDirective {
    /// Exact string equality against the normalized selector.
    Exact(String),
    /// Pattern match against the normalized selector.
    Pattern(Regex),
}

impl IgnoreDirective {
    /// An exact-match directive.
    pub fn exact(selector: impl Into<String>) -> Self {
        Self::Exact(selector.into())
    }

    /// A pattern directive. Invalid patterns are rejected here, at the API
    /// boundary, before any analysis starts.
    pub fn pattern(source: &str) -> UncssResult<Self> {
        Regex::new(source)
            .map(Self::Pattern)
            .map_err(|e| UncssError::pattern(source, e.to_string()))
    }

    /// Parse the textual form used by config files and the CLI: a string
    /// wrapped in slashes (`/^\.vendor-/`) is a pattern, anything else an
    /// exact selector.
    pub fn parse(raw: &str) -> UncssResult<Self> {
        if raw.len() > 2 && raw.starts_with('/') && raw.ends_with('/') {
            Self::pattern(&raw[1..raw.len() - 1])
        } else {
            Ok(Self::exact(raw))
        }
    }

    /// Test a normalized selector against this directive.
    pub fn matches(&self, normalized: &str) -> bool {
        match self {
            Self::Exact(selector) => selector == normalized,
            Self::Pattern(re) => re.is_match(normalized),
        }
    }
}

static COMMENT_DIRECTIVE: OnceLock<Regex> = OnceLock::new();

/// Whether a comment's text is the one-shot ignore directive:
/// `uncss:ignore`, optionally prefixed by `!` and surrounded by single
/// spaces. The marker token is case-insensitive.
pub fn is_ignore_comment(text: &str) -> bool {
    COMMENT_DIRECTIVE
        .get_or_init(|| {
            Regex::new(r"(?i)^!?\s?uncss:ignore\s?$").expect("directive marker is a valid pattern")
        })
        .is_match(text)
}
