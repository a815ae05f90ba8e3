//! Selector normalization: make author selectors safe for static DOM
//! querying.
//!
//! Some styles are applied only with user interaction, so their selectors
//! cannot be used with a `querySelector`-style API. The normalizer strips
//! a fixed table of those pseudo-classes/pseudo-elements, plus any
//! caller-configured "modifier" fragments (state classes toggled only by
//! scripts). `.clearfix:before` should only be removed if there is no
//! `.clearfix` in any page, which is exactly what matching the stripped
//! form achieves.

use crate::ignore::IgnoreDirective;
use regex::Regex;
use std::sync::OnceLock;

/// Pseudo-classes and pseudo-elements that cannot be queried statically.
/// Order matters: longer tokens sharing a prefix come first so the regex
/// alternation prefers them (`:focus-within` before `:focus`, `::before`
/// before `:before`).
const IGNORED_PSEUDOS: &[&str] = &[
    // link state
    ":link",
    ":visited",
    // user action
    ":hover",
    ":active",
    ":focus-within",
    ":focus",
    // UI element states
    ":enabled",
    ":disabled",
    ":checked",
    ":indeterminate",
    // form validation
    ":required",
    ":invalid",
    ":valid",
    // generated-content pseudo-elements
    "::first-line",
    "::first-letter",
    "::selection",
    "::before",
    "::after",
    ":target",
    // CSS2 single-colon pseudo-elements
    ":before",
    ":after",
];

/// Vendor-prefixed pseudo-elements. There are hundreds of vendor-specific
/// selectors; one pattern covers the prefixes that appear in the wild.
const VENDOR_PSEUDOS: &str = "::?-(?:moz|ms|webkit|o)-[a-z0-9-]+";

static PSEUDO_TABLE: OnceLock<Regex> = OnceLock::new();

fn pseudo_table() -> Regex {
    PSEUDO_TABLE
        .get_or_init(|| {
            let mut alternates: Vec<String> =
                IGNORED_PSEUDOS.iter().map(|p| regex::escape(p)).collect();
            alternates.push(VENDOR_PSEUDOS.to_string());
            Regex::new(&format!("(?i){}", alternates.join("|")))
                .expect("pseudo-class table is a valid pattern")
        })
        .clone()
}

/// Strips non-queryable pseudo syntax and ignored modifier fragments from
/// selectors. Normalization is idempotent.
#[derive(Debug, Clone)]
pub struct Normalizer {
    pseudos: Regex,
    modifiers: Vec<Regex>,
}

impl Normalizer {
    /// A normalizer that only strips the fixed pseudo table.
    pub fn new() -> Self {
        Self::with_modifiers(&[])
    }

    /// A normalizer that additionally strips caller-specified modifier
    /// fragments. Exact directives are treated as literal substrings,
    /// pattern directives as-is.
    pub fn with_modifiers(modifiers: &[IgnoreDirective]) -> Self {
        let modifiers = modifiers
            .iter()
            .map(|directive| match directive {
                IgnoreDirective::Exact(literal) => Regex::new(&regex::escape(literal))
                    .expect("escaped literal is a valid pattern"),
                IgnoreDirective::Pattern(re) => re.clone(),
            })
            .collect();
        Self {
            pseudos: pseudo_table(),
            modifiers,
        }
    }

    /// Produce a selector string safe to hand to a DOM query API.
    ///
    /// Modifier fragments are stripped first, then the pseudo table, so a
    /// selector such as `a.is-open:hover` (with `.is-open` ignored)
    /// reduces to its queryable core.
    pub fn normalize(&self, selector: &str) -> String {
        let mut out = selector.to_string();
        for re in &self.modifiers {
            out = strip_modifier(&out, re);
        }
        self.pseudos.replace_all(&out, "").trim().to_string()
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Remove one modifier fragment from a selector.
///
/// An occurrence that opens a compound selector (preceded by start of
/// string, whitespace, a combinator, a comma, or an open paren) is removed
/// outright. An occurrence attached to a preceding compound part is
/// replaced by `*` instead, keeping the remaining parts joined.
fn strip_modifier(selector: &str, re: &Regex) -> String {
    let mut out = String::with_capacity(selector.len());
    let mut last = 0;
    for found in re.find_iter(selector) {
        out.push_str(&selector[last..found.start()]);
        let at_boundary = selector[..found.start()]
            .chars()
            .next_back()
            .map_or(true, |c| c.is_whitespace() || matches!(c, '>' | '+' | '~' | ',' | '('));
        if !at_boundary {
            out.push('*');
        }
        last = found.end();
    }
    out.push_str(&selector[last..]);
    out
}
