//! Typed error handling for uncss.
//!
//! Provides structured errors that library consumers can match on,
//! carrying enough context (page name, selector pattern, source location)
//! to log meaningfully at the call site.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for uncss operations.
#[derive(Error, Debug)]
pub enum UncssError {
    /// A document handle failed for reasons other than selector syntax
    /// (e.g. the page provider lost the page). Always fatal for the whole
    /// run: a partially analyzed page could cause still-used rules to be
    /// stripped.
    #[error("Document error on page `{page}`: {message}")]
    Document { page: String, message: String },

    /// A caller-supplied ignore pattern failed to compile. Rejected before
    /// any analysis starts.
    #[error("Invalid ignore pattern `{pattern}`: {message}")]
    Pattern { pattern: String, message: String },

    /// Malformed CSS input, with 1-indexed source location.
    #[error("CSS parse error at {line}:{column}: {message}")]
    Parse {
        line: usize,
        column: usize,
        message: String,
    },

    /// I/O error when reading/writing files (cache, page sources)
    #[error("I/O error at {path}: {message}")]
    Io {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Configuration file errors
    #[error("Config error at {path}: {message}")]
    Config { path: PathBuf, message: String },

    /// Generic internal error
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl UncssError {
    /// Create a document error with page context.
    pub fn document(page: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Document {
            page: page.into(),
            message: message.into(),
        }
    }

    /// Create a pattern error for an ignore directive that failed to compile.
    pub fn pattern(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Pattern {
            pattern: pattern.into(),
            message: message.into(),
        }
    }

    /// Create a parse error with source location.
    pub fn parse(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            column,
            message: message.into(),
        }
    }

    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create a config error.
    pub fn config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// The page this error originated from, if any.
    pub fn page(&self) -> Option<&str> {
        match self {
            Self::Document { page, .. } => Some(page),
            _ => None,
        }
    }

    /// Source location for parse errors.
    pub fn location(&self) -> Option<(usize, usize)> {
        match self {
            Self::Parse { line, column, .. } => Some((*line, *column)),
            _ => None,
        }
    }
}

/// Convenience type alias for uncss results.
pub type UncssResult<T> = Result<T, UncssError>;

/// Extension trait for converting std::io::Error with path context.
pub trait IoResultExt<T> {
    /// Add path context to an I/O error.
    fn with_path(self, path: impl Into<PathBuf>) -> UncssResult<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> UncssResult<T> {
        self.map_err(|e| UncssError::io(path, e))
    }
}
