//! The rule-filtering walk: remove selectors no analyzed page uses.
//!
//! Depth-first and order-preserving. Two rule kinds are never touched:
//! keyframe stops (their "selectors" are animation offsets like `30%` or
//! `from`) and `@`-shaped selectors inside conditional groups. Ignored
//! selectors - from caller directives or from a one-shot
//! `/* uncss:ignore */` comment - survive regardless of usage.
//!
//! `@keyframes` blocks are left alone here; their fate depends on the
//! animation scan over the already-filtered tree (see
//! [`crate::animations`]).

use crate::ignore::{is_ignore_comment, IgnoreDirective};
use crate::normalize::Normalizer;
use crate::stylesheet::{Node, Position, Stylesheet};
use crate::usage::UsageIndex;
use serde::Serialize;
use tracing::trace;

/// A removal recorded during filtering, for the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnusedRule {
    pub kind: UnusedKind,
    /// The removed selectors, or the keyframes name for removed blocks.
    pub selectors: Vec<String>,
    pub position: Option<Position>,
}

/// What kind of node a removal came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnusedKind {
    Selectors,
    Keyframes,
}

/// Remove unused selectors and newly empty rules/conditional groups from
/// the tree, in place. Returns the removals for the report.
///
/// The ignore list only grows during one walk (the one-shot comment
/// directive appends to it); the growth is scoped to this call, so
/// concurrent runs never interfere.
pub fn filter_unused_rules(
    sheet: &mut Stylesheet,
    ignore: &[IgnoreDirective],
    used: &UsageIndex,
    normalizer: &Normalizer,
) -> Vec<UnusedRule> {
    let mut state = WalkState {
        ignore: ignore.to_vec(),
        used,
        normalizer,
        ignore_next: false,
        unused: Vec::new(),
    };
    walk(&mut sheet.nodes, &mut state);
    state.unused
}

struct WalkState<'a> {
    ignore: Vec<IgnoreDirective>,
    used: &'a UsageIndex,
    normalizer: &'a Normalizer,
    ignore_next: bool,
    unused: Vec<UnusedRule>,
}

fn walk(nodes: &mut Vec<Node>, state: &mut WalkState<'_>) {
    nodes.retain_mut(|node| match node {
        Node::Comment(comment) => {
            // A directive arms the flag; any other comment consumes it.
            state.ignore_next = is_ignore_comment(&comment.text);
            true
        }
        Node::Rule(rule) => {
            if state.ignore_next {
                state.ignore_next = false;
                // Stored normalized, since that is what `survives` tests.
                let protected: Vec<_> = rule
                    .selectors
                    .iter()
                    .map(|s| IgnoreDirective::Exact(state.normalizer.normalize(s)))
                    .collect();
                state.ignore.extend(protected);
            }
            let selectors = std::mem::take(&mut rule.selectors);
            let mut dropped = Vec::new();
            for selector in selectors {
                if survives(&selector, state) {
                    rule.selectors.push(selector);
                } else {
                    trace!(selector = %selector, "removing unused selector");
                    dropped.push(selector);
                }
            }
            if !dropped.is_empty() {
                state.unused.push(UnusedRule {
                    kind: UnusedKind::Selectors,
                    selectors: dropped,
                    position: rule.position,
                });
            }
            !rule.selectors.is_empty()
        }
        Node::AtRule(at) => {
            if at.is_keyframes() {
                // Stop selectors are animation offsets, never filtered.
                state.ignore_next = false;
                true
            } else if at.is_conditional() {
                // The one-shot flag deliberately carries into the group:
                // the next rule in document order may be its first child.
                walk(&mut at.children, state);
                !at.children.is_empty()
            } else {
                state.ignore_next = false;
                true
            }
        }
    });
}

fn survives(selector: &str, state: &WalkState<'_>) -> bool {
    let normalized = state.normalizer.normalize(selector);
    // A selector made entirely of stripped pseudos (`::selection`, a bare
    // `:hover`) leaves nothing to query, so usage is unknowable. Keep it.
    if normalized.is_empty() || normalized.starts_with('@') {
        return true;
    }
    if state
        .ignore
        .iter()
        .any(|directive| directive.matches(&normalized))
    {
        return true;
    }
    state.used.contains(&normalized)
}
