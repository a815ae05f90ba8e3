//! uncss-core: unused CSS removal library
//!
//! This library finds the CSS rules whose selectors never match any
//! element in a set of rendered HTML documents and removes them from the
//! stylesheet, preserving everything it cannot prove unused.
//!
//! # Features
//!
//! - **Selector normalization**: Strip interaction pseudo-classes so
//!   `.btn:hover` lives or dies with `.btn`
//! - **Multi-page union**: A selector used on any page survives
//! - **Fail-open matching**: Selectors the query engine cannot handle are
//!   kept, never guessed at
//! - **Ignore directives**: Exact selectors, `/patterns/`, and the inline
//!   `/* uncss:ignore */` comment
//! - **Keyframes pruning**: Drop `@keyframes` blocks no surviving rule
//!   animates
//! - **Usage caching**: Skip re-matching pages whose content is unchanged
//!
//! # Quick Start
//!
//! Use the [`prelude`] module for convenient imports:
//!
//! ```rust,ignore
//! use uncss_core::prelude::*;
//!
//! let pages = vec![HtmlDocument::from_file("index.html")?];
//! let (css, report) = Uncss::new().process(&pages, &raw_css)?;
//! println!("removed {} selectors", report.unused.len());
//! ```
//!
//! # Module Organization
//!
//! - [`parse`]: CSS text to tree
//! - [`stylesheet`]: The tree model and serializer
//! - [`normalize`]: Selector normalization for static querying
//! - [`document`]: The page capability the engine matches against
//! - [`usage`]: Per-page matching and the cross-page usage union
//! - [`filter`]: The removal walk
//! - [`animations`]: Keyframes pruning
//! - [`builder`]: Fluent builder API for configuration
//! - [`error`]: Typed error handling
//!
//! # Cargo Features
//!
//! - `page` (default): In-process HTML page provider
//! - `cache` (default): Per-document usage cache

// Core modules (always available)
pub mod animations;
pub mod builder;
pub mod config;
pub mod document;
pub mod error;
pub mod filter;
pub mod ignore;
pub mod logging;
pub mod normalize;
pub mod parse;
pub mod prelude;
pub mod report;
pub mod stylesheet;
pub mod usage;

// Feature-gated modules
#[cfg(feature = "cache")]
pub mod cache;

#[cfg(feature = "page")]
pub mod page;

// ============================================================================
// Explicit Re-exports (avoiding glob imports for clear API surface)
// ============================================================================

// Error types
pub use error::{IoResultExt, UncssError, UncssResult};

// Builder API
pub use builder::Uncss;

// Stylesheet model
pub use stylesheet::{AtRule, Comment, Declaration, Node, Position, Rule, Stylesheet};

// Parsing
pub use parse::parse_stylesheet;

// Normalization and ignore handling
pub use ignore::{is_ignore_comment, IgnoreDirective};
pub use normalize::Normalizer;

// Document capability
pub use document::{Document, MatchOutcome};

// Usage analysis
pub use usage::{collect_selectors, extract_candidates, find_used, UsageIndex};

// Filtering and pruning
pub use animations::{prune_keyframes, used_animations};
pub use filter::{filter_unused_rules, UnusedKind, UnusedRule};

// Configuration
pub use config::{load_config, OutputConfig, UncssConfig};

// Logging
pub use logging::init_structured_logging;

// Reporting
pub use report::{print_json, print_plain, Report};

// Feature-gated re-exports
#[cfg(feature = "cache")]
pub use cache::{fingerprint, CacheEntry, SelectorCache};

#[cfg(feature = "page")]
pub use page::HtmlDocument;
