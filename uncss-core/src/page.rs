//! In-process page provider backed by an HTML parser.
//!
//! Holds the markup as a string and re-parses it for each batch query.
//! That keeps the type `Send + Sync` (the parsed DOM is not), and the
//! batch interface means the parse cost is paid once per document per
//! run, not once per selector.
//!
//! `<noscript>` tags are unwrapped before parsing so their contents
//! count as visible: a scripting-disabled fallback still needs its CSS.

use crate::document::{Document, MatchOutcome};
use crate::error::{IoResultExt, UncssResult};
use regex::Regex;
use scraper::{Html, Selector};
use std::path::Path;
use std::sync::OnceLock;
use tracing::debug;

static NOSCRIPT_TAG: OnceLock<Regex> = OnceLock::new();

/// Strip `<noscript>` open/close tags, keeping their contents in the
/// normal DOM.
fn unwrap_noscript(markup: &str) -> String {
    NOSCRIPT_TAG
        .get_or_init(|| {
            Regex::new(r"(?i)</?noscript[^>]*>").expect("noscript tag form is a valid pattern")
        })
        .replace_all(markup, "")
        .into_owned()
}

/// A static HTML document, queryable by CSS selector.
#[derive(Debug, Clone)]
pub struct HtmlDocument {
    name: String,
    markup: String,
    #[cfg(feature = "cache")]
    fingerprint: String,
}

impl HtmlDocument {
    /// Wrap raw markup under a display name (path, URL).
    pub fn new(name: impl Into<String>, markup: &str) -> Self {
        let markup = unwrap_noscript(markup);
        Self {
            name: name.into(),
            #[cfg(feature = "cache")]
            fingerprint: crate::cache::fingerprint(markup.as_bytes()),
            markup,
        }
    }

    /// Read a document from disk, named by its path.
    pub fn from_file(path: impl AsRef<Path>) -> UncssResult<Self> {
        let path = path.as_ref();
        let markup = std::fs::read_to_string(path).with_path(path)?;
        Ok(Self::new(path.display().to_string(), &markup))
    }

    /// `href` values of stylesheet links whose media applies to screen
    /// rendering, in document order. Used for stylesheet discovery.
    pub fn stylesheet_hrefs(&self) -> Vec<String> {
        let dom = Html::parse_document(&self.markup);
        let links = match Selector::parse("link[rel=\"stylesheet\"]") {
            Ok(s) => s,
            Err(_) => return Vec::new(),
        };
        dom.select(&links)
            .filter(|link| {
                matches!(
                    link.value().attr("media").unwrap_or(""),
                    "" | "all" | "screen"
                )
            })
            .filter_map(|link| link.value().attr("href"))
            .map(str::to_string)
            .collect()
    }
}

impl Document for HtmlDocument {
    fn name(&self) -> &str {
        &self.name
    }

    fn match_batch(&self, selectors: &[String]) -> UncssResult<Vec<MatchOutcome>> {
        let dom = Html::parse_document(&self.markup);
        debug!(page = %self.name, selectors = selectors.len(), "matching selector batch");
        Ok(selectors
            .iter()
            .map(|selector| match Selector::parse(selector) {
                Ok(compiled) => {
                    if dom.select(&compiled).next().is_some() {
                        MatchOutcome::Matched
                    } else {
                        MatchOutcome::NotMatched
                    }
                }
                Err(_) => MatchOutcome::Unsupported,
            })
            .collect())
    }

    #[cfg(feature = "cache")]
    fn fingerprint(&self) -> Option<&str> {
        Some(&self.fingerprint)
    }
}
