//! The document capability: the only thing the engine needs from a
//! rendered page.
//!
//! Modeled as a batch-matching interface so the implementation can live
//! in-process (see [`crate::page`]) or behind an RPC boundary to a real
//! browser without changing the analysis code. Batching matters: a
//! cross-process handle pays a round-trip per call, not per selector.

use crate::error::UncssResult;

/// Result of matching one selector against one document.
///
/// Unsupported selector syntax is a first-class outcome rather than an
/// error: the engine treats it as used (fail open - never delete what
/// cannot be proven unused).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    /// At least one element matched.
    Matched,
    /// The query ran and found nothing.
    NotMatched,
    /// The query engine rejected the selector syntax.
    Unsupported,
}

impl MatchOutcome {
    /// Whether this outcome keeps the selector alive.
    pub fn is_used(self) -> bool {
        matches!(self, Self::Matched | Self::Unsupported)
    }
}

/// An opaque handle to a rendered DOM, exposing batch selector matching.
///
/// Implementations must return one outcome per input selector, in input
/// order. A failure of the handle itself (not of an individual selector)
/// is reported as an error and aborts the whole run.
pub trait Document: Sync {
    /// A human-readable identifier (file path, URL) used in logs and
    /// error context.
    fn name(&self) -> &str;

    /// Match every selector against this document.
    fn match_batch(&self, selectors: &[String]) -> UncssResult<Vec<MatchOutcome>>;

    /// Content fingerprint for usage caching, if the provider has one.
    fn fingerprint(&self) -> Option<&str> {
        None
    }
}
