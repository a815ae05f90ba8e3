//! Prelude module for convenient imports.
//!
//! Import commonly used types with a single line:
//!
//! ```rust,ignore
//! use uncss_core::prelude::*;
//! ```

// Core analysis types
pub use crate::error::{UncssError, UncssResult};
pub use crate::stylesheet::{Node, Stylesheet};

// Document capability
pub use crate::document::{Document, MatchOutcome};

// Selector handling
pub use crate::ignore::IgnoreDirective;
pub use crate::normalize::Normalizer;

// Reporting
pub use crate::report::Report;

// Configuration
pub use crate::config::{load_config, UncssConfig};

// Builder API
pub use crate::builder::Uncss;

// In-process page provider
#[cfg(feature = "page")]
pub use crate::page::HtmlDocument;

// Usage caching
#[cfg(feature = "cache")]
pub use crate::cache::SelectorCache;
