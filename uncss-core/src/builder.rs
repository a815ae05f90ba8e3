//! Builder pattern API for uncss analysis.
//!
//! Provides a fluent interface for configuring and running a removal
//! pass:
//!
//! ```rust,ignore
//! use uncss_core::prelude::*;
//!
//! let pages = vec![HtmlDocument::from_file("index.html")?];
//! let (css, report) = Uncss::new()
//!     .ignore(["/^\\.vendor-/"])
//!     .concurrency(4)
//!     .process(&pages, &raw_css)?;
//!
//! println!("removed {} selectors", report.unused.len());
//! ```

#[cfg(feature = "cache")]
use std::path::PathBuf;

use rayon::prelude::*;
use tracing::info;

use crate::animations::{prune_keyframes, used_animations};
use crate::document::Document;
use crate::error::{UncssError, UncssResult};
use crate::filter::filter_unused_rules;
use crate::ignore::IgnoreDirective;
use crate::normalize::Normalizer;
use crate::report::Report;
use crate::stylesheet::Stylesheet;
use crate::usage::{collect_selectors, extract_candidates, find_used, UsageIndex};

/// Builder for configuring a removal run.
///
/// # Example
///
/// ```rust,ignore
/// let report = Uncss::new()
///     .ignore([".keep-me"])
///     .run(&pages, &mut stylesheet)?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct Uncss {
    /// Selectors or `/patterns/` to always retain
    ignore: Vec<String>,

    /// Extra selector modifiers stripped before matching
    ignore_modifiers: Vec<String>,

    /// Upper bound on documents analyzed concurrently
    concurrency: Option<usize>,

    /// Directory for the per-document usage cache
    #[cfg(feature = "cache")]
    cache_dir: Option<PathBuf>,
}

impl Uncss {
    /// Create a removal run with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add selectors or `/patterns/` that are always retained.
    pub fn ignore(mut self, directives: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.ignore.extend(directives.into_iter().map(Into::into));
        self
    }

    /// Add selector modifiers (state classes, extra pseudo-classes) that
    /// are stripped from selectors before matching, on top of the
    /// built-in pseudo-class table.
    pub fn ignore_modifiers(
        mut self,
        modifiers: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.ignore_modifiers
            .extend(modifiers.into_iter().map(Into::into));
        self
    }

    /// Bound the number of documents analyzed concurrently. Unset means
    /// one worker per available core.
    pub fn concurrency(mut self, limit: usize) -> Self {
        self.concurrency = Some(limit);
        self
    }

    /// Enable the per-document usage cache under the given directory.
    #[cfg(feature = "cache")]
    pub fn cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    /// Fold settings from a loaded `uncss.toml` into the builder.
    /// Explicit builder calls accumulate with, not override, the file.
    pub fn with_config(mut self, config: &crate::config::UncssConfig) -> Self {
        if let Some(ignore) = &config.ignore {
            self.ignore.extend(ignore.iter().cloned());
        }
        if let Some(modifiers) = &config.ignore_modifiers {
            self.ignore_modifiers.extend(modifiers.iter().cloned());
        }
        if let Some(limit) = config.concurrency {
            self.concurrency = Some(limit);
        }
        #[cfg(feature = "cache")]
        if let Some(dir) = &config.cache_dir {
            self.cache_dir = Some(PathBuf::from(dir));
        }
        self
    }

    /// Run the removal pass over `sheet`, in place, and return the report.
    ///
    /// Documents are analyzed in parallel; the first document failure
    /// aborts the run. Invalid ignore directives are rejected before any
    /// document is touched.
    pub fn run<D: Document>(
        &self,
        documents: &[D],
        sheet: &mut Stylesheet,
    ) -> UncssResult<Report> {
        let ignore = self.compile_ignore()?;
        let normalizer = self.compile_normalizer()?;

        let all = collect_selectors(sheet);
        let candidates = extract_candidates(sheet, &normalizer);
        info!(
            documents = documents.len(),
            selectors = candidates.len(),
            "starting removal run"
        );

        let per_document = self.match_documents(documents, &candidates)?;
        let mut usage = UsageIndex::default();
        for used in per_document {
            usage.absorb(used);
        }

        let mut unused_rules = filter_unused_rules(sheet, &ignore, &usage, &normalizer);

        // Keyframes are pruned against the filtered tree, so animations
        // referenced only by removed rules count as unreferenced.
        let animations = used_animations(sheet);
        prune_keyframes(sheet, &animations, &mut unused_rules);
        for name in &animations {
            usage.absorb([format!("keyframes-{}", name)]);
        }

        let report = Report::build(all, &usage, unused_rules, |selector| {
            normalizer.normalize(selector)
        });
        info!(
            used = report.used.len(),
            unused = report.unused.len(),
            "removal run finished"
        );
        Ok(report)
    }

    /// Parse `css`, run the removal pass, and return the cleaned CSS text
    /// alongside the report.
    pub fn process<D: Document>(
        &self,
        documents: &[D],
        css: &str,
    ) -> UncssResult<(String, Report)> {
        let mut sheet = Stylesheet::parse(css)?;
        let report = self.run(documents, &mut sheet)?;
        Ok((sheet.to_css(), report))
    }

    fn compile_ignore(&self) -> UncssResult<Vec<IgnoreDirective>> {
        self.ignore
            .iter()
            .map(|raw| IgnoreDirective::parse(raw))
            .collect()
    }

    fn compile_normalizer(&self) -> UncssResult<Normalizer> {
        if self.ignore_modifiers.is_empty() {
            return Ok(Normalizer::new());
        }
        let modifiers = self
            .ignore_modifiers
            .iter()
            .map(|raw| IgnoreDirective::parse(raw))
            .collect::<UncssResult<Vec<_>>>()?;
        Ok(Normalizer::with_modifiers(&modifiers))
    }

    /// One used-selector list per document, in document order.
    fn match_documents<D: Document>(
        &self,
        documents: &[D],
        candidates: &[String],
    ) -> UncssResult<Vec<Vec<String>>> {
        let analyze = || {
            documents
                .par_iter()
                .map(|document| self.analyze_document(document, candidates))
                .collect::<UncssResult<Vec<_>>>()
        };
        match self.concurrency {
            Some(limit) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(limit)
                    .build()
                    .map_err(|e| UncssError::internal(e.to_string()))?;
                pool.install(analyze)
            }
            None => analyze(),
        }
    }

    fn analyze_document<D: Document>(
        &self,
        document: &D,
        candidates: &[String],
    ) -> UncssResult<Vec<String>> {
        #[cfg(feature = "cache")]
        if let (Some(dir), Some(fingerprint)) = (&self.cache_dir, document.fingerprint()) {
            let cache = crate::cache::SelectorCache::new(dir);
            if let Some(used) = cache.load(document.name(), fingerprint) {
                info!(page = %document.name(), "usage cache hit");
                return Ok(used);
            }
            let used = find_used(document, candidates)?;
            if let Err(e) = cache.store(document.name(), fingerprint, &used) {
                eprintln!("[WARN] cache store failed for {}: {}", document.name(), e);
            }
            return Ok(used);
        }
        find_used(document, candidates)
    }
}
