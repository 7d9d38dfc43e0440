//! Unified error handling for the trendline crate
//!
//! Domain-specific failures are folded into a single `Error` enum so that
//! callers can decide between aborting a run and degrading to empty output.
//!
//! # Architecture
//!
//! - [`TrendlineErrorTrait`] - Common interface implemented by the crate errors
//! - [`ErrorCategory`] - Classification of errors for handling strategies
//! - [`Error`] - Unified error enum
//!
//! Trend estimation failures never reach this type: the estimator recovers
//! them locally (see [`crate::analytics::regression::TrendError`]).

use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub use crate::analytics::regression::TrendError;

/// Common trait for trendline error types
pub trait TrendlineErrorTrait: std::error::Error {
    /// Whether the run can continue (possibly with empty output)
    fn is_recoverable(&self) -> bool;

    /// Get the error category for handling strategies
    fn category(&self) -> ErrorCategory;
}

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Document tables: missing files, malformed rows
    Input,
    /// Configuration, filter and term files
    Config,
    /// Writing report artifacts
    Output,
    /// Other/unknown errors
    Other,
}

impl ErrorCategory {
    /// Get string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Config => "config",
            Self::Output => "output",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unified error type for the trendline crate
#[derive(Error, Debug)]
pub enum Error {
    /// A configuration, filters or terms file that was asked for does not exist
    #[error("Missing configuration file: {}", path.display())]
    MissingConfig { path: PathBuf },

    /// Configuration value is invalid
    #[error("Config error: {0}")]
    Config(String),

    /// A ban or allow pattern failed to compile
    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A report artifact could not be written
    #[error("Failed to write {}: {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV reading/writing errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parse errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Generic error with context
    #[error("{context}")]
    Other {
        context: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl TrendlineErrorTrait for Error {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::MissingConfig { .. } | Self::Config(_) | Self::InvalidPattern { .. } => false,
            Self::Io(_) | Self::Csv(_) => true,
            Self::Output { .. } => false,
            Self::Json(_) | Self::Toml(_) => false,
            Self::Other { .. } => false,
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingConfig { .. }
            | Self::Config(_)
            | Self::InvalidPattern { .. }
            | Self::Toml(_) => ErrorCategory::Config,
            Self::Output { .. } => ErrorCategory::Output,
            Self::Io(_) | Self::Csv(_) => ErrorCategory::Input,
            Self::Json(_) => ErrorCategory::Config,
            Self::Other { .. } => ErrorCategory::Other,
        }
    }
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a missing-file configuration error
    pub fn missing(path: impl Into<PathBuf>) -> Self {
        Self::MissingConfig { path: path.into() }
    }

    /// Create a generic error with context
    pub fn other(context: impl Into<String>) -> Self {
        Self::Other {
            context: context.into(),
            source: None,
        }
    }

    /// Create a generic error with context and source
    pub fn with_source(
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Other {
            context: context.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;
