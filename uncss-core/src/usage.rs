//! Usage analysis: which selectors actually match the analyzed pages.
//!
//! One batch query per document, then a set union across documents with
//! per-selector document counts kept for reporting.

use crate::document::{Document, MatchOutcome};
use crate::error::{UncssError, UncssResult};
use crate::normalize::Normalizer;
use crate::stylesheet::{Node, Stylesheet};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Match a batch of pre-normalized selectors against one document and
/// return the used subset.
///
/// Selectors the query engine cannot handle are conservatively treated as
/// used. Document-level failures propagate and abort the caller's run.
pub fn find_used<D: Document + ?Sized>(
    document: &D,
    selectors: &[String],
) -> UncssResult<Vec<String>> {
    let outcomes = document.match_batch(selectors)?;
    if outcomes.len() != selectors.len() {
        return Err(UncssError::document(
            document.name(),
            format!(
                "provider returned {} outcomes for {} selectors",
                outcomes.len(),
                selectors.len()
            ),
        ));
    }
    let mut used = Vec::new();
    for (selector, outcome) in selectors.iter().zip(outcomes) {
        match outcome {
            MatchOutcome::Matched => used.push(selector.clone()),
            MatchOutcome::Unsupported => {
                debug!(page = %document.name(), selector = %selector, "selector not queryable, keeping");
                used.push(selector.clone());
            }
            MatchOutcome::NotMatched => {}
        }
    }
    Ok(used)
}

/// Every selector present in the stylesheet, in document order, for the
/// report. Keyframe stop selectors are excluded; each `@keyframes` block
/// instead contributes a synthetic `keyframes-<name>` marker.
pub fn collect_selectors(sheet: &Stylesheet) -> Vec<String> {
    let mut all = Vec::new();
    collect_raw(&sheet.nodes, &mut all);
    all
}

fn collect_raw(nodes: &[Node], all: &mut Vec<String>) {
    for node in nodes {
        match node {
            Node::Rule(rule) => all.extend(rule.selectors.iter().cloned()),
            Node::AtRule(at) if at.is_keyframes() => {
                all.push(format!("keyframes-{}", at.params));
            }
            Node::AtRule(at) => collect_raw(&at.children, all),
            Node::Comment(_) => {}
        }
    }
}

/// The deduplicated, normalized selectors worth querying a document for.
/// At-rule-shaped selectors (starting with `@`) and selectors that
/// normalize to nothing are excluded - both are always kept by the filter
/// pass and would only waste a query.
pub fn extract_candidates(sheet: &Stylesheet, normalizer: &Normalizer) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut candidates = Vec::new();
    collect_candidates(&sheet.nodes, normalizer, &mut seen, &mut candidates);
    candidates
}

fn collect_candidates(
    nodes: &[Node],
    normalizer: &Normalizer,
    seen: &mut HashSet<String>,
    candidates: &mut Vec<String>,
) {
    for node in nodes {
        match node {
            Node::Rule(rule) => {
                for selector in &rule.selectors {
                    let normalized = normalizer.normalize(selector);
                    if normalized.is_empty() || normalized.starts_with('@') {
                        continue;
                    }
                    if seen.insert(normalized.clone()) {
                        candidates.push(normalized);
                    }
                }
            }
            Node::AtRule(at) if at.is_keyframes() => {}
            Node::AtRule(at) => collect_candidates(&at.children, normalizer, seen, candidates),
            Node::Comment(_) => {}
        }
    }
}

/// Union of per-document match results, with the number of documents each
/// selector matched in.
#[derive(Debug, Clone, Default)]
pub struct UsageIndex {
    counts: HashMap<String, usize>,
}

impl UsageIndex {
    /// Fold one document's used-selector list into the index.
    pub fn absorb(&mut self, selectors: impl IntoIterator<Item = String>) {
        for selector in selectors {
            *self.counts.entry(selector).or_insert(0) += 1;
        }
    }

    pub fn contains(&self, selector: &str) -> bool {
        self.counts.contains_key(selector)
    }

    /// How many documents this selector matched in.
    pub fn count(&self, selector: &str) -> usize {
        self.counts.get(selector).copied().unwrap_or(0)
    }

    pub fn selectors(&self) -> impl Iterator<Item = &str> {
        self.counts.keys().map(String::as_str)
    }

    pub fn counts(&self) -> &HashMap<String, usize> {
        &self.counts
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}
