//! Error types with actionable diagnostics.
//!
//! Every variant carries enough context to locate the offending dataset,
//! column or fold without re-running the analysis.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for neurosem operations.
pub type Result<T> = std::result::Result<T, NeurosemError>;

/// Errors that can occur while preparing data or running a cross-validated analysis.
#[derive(Error, Debug)]
pub enum NeurosemError {
    /// Configuration file not found at expected path.
    #[error("Configuration file not found: {path}\n  → Create a config file or pass a different path")]
    ConfigNotFound { path: PathBuf },

    /// Configuration file has invalid syntax.
    #[error("Invalid configuration syntax in {path}:\n  {message}\n  → Check YAML/JSON syntax at the indicated line")]
    ConfigParsing { path: PathBuf, message: String },

    /// Configuration value is invalid.
    #[error("Invalid configuration value for '{field}': {message}\n  → {suggestion}")]
    ConfigValue { field: String, message: String, suggestion: String },

    /// Item or column counts disagree between two matrices.
    #[error("Shape mismatch in {context}: expected {expected:?}, got {actual:?}\n  → Check that response and feature data describe the same items")]
    ShapeMismatch {
        context: String,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// Item names are not in identical order between the two datasets.
    #[error("Item order mismatch at row {index}: responses have '{response_item}', features have '{feature_item}'\n  → Reorder the feature ratings to the response item order")]
    ItemOrderMismatch {
        index: usize,
        response_item: String,
        feature_item: String,
    },

    /// Not enough items, channels or features for the requested analysis.
    #[error("Insufficient data: {message}")]
    InsufficientData { message: String },

    /// A regression or least-squares solve failed.
    #[error("Numerical fit failed in {context}: {message}")]
    NumericalFit { context: String, message: String },

    /// IO error with context.
    #[error("IO error: {context}\n  Cause: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// Serialization/deserialization error.
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// The run observed its cancellation token.
    #[error("Analysis cancelled before completion")]
    Cancelled,

    /// Generic error for unexpected conditions.
    #[error("Internal error: {message}\n  → This is a bug, please report it with the failing configuration")]
    Internal { message: String },
}

impl NeurosemError {
    /// Create an IO error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io { context: context.into(), source }
    }

    /// Create a numerical-fit error.
    pub fn numerical(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NumericalFit { context: context.into(), message: message.into() }
    }

    /// Create an insufficient-data error.
    pub fn insufficient(message: impl Into<String>) -> Self {
        Self::InsufficientData { message: message.into() }
    }

    /// Create a shape-mismatch error.
    pub fn shape(context: impl Into<String>, expected: Vec<usize>, actual: Vec<usize>) -> Self {
        Self::ShapeMismatch { context: context.into(), expected, actual }
    }

    /// Check if this error is user-recoverable.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::ConfigNotFound { .. }
                | Self::ConfigParsing { .. }
                | Self::ConfigValue { .. }
                | Self::ShapeMismatch { .. }
                | Self::ItemOrderMismatch { .. }
                | Self::InsufficientData { .. }
                | Self::Cancelled
        )
    }

    /// Whether the two datasets disagree on item count or order.
    pub fn is_shape_mismatch(&self) -> bool {
        matches!(self, Self::ShapeMismatch { .. } | Self::ItemOrderMismatch { .. })
    }

    /// Whether a fold that raised this error can be skipped without aborting the run.
    pub fn is_fold_recoverable(&self) -> bool {
        matches!(self, Self::NumericalFit { .. })
    }

    /// Get the error code for structured output.
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigNotFound { .. } => "E001",
            Self::ConfigParsing { .. } => "E002",
            Self::ConfigValue { .. } => "E003",
            Self::InsufficientData { .. } => "E030",
            Self::ShapeMismatch { .. } => "E040",
            Self::ItemOrderMismatch { .. } => "E041",
            Self::Io { .. } => "E050",
            Self::Serialization { .. } => "E051",
            Self::Cancelled => "E060",
            Self::NumericalFit { .. } => "E070",
            Self::Internal { .. } => "E999",
        }
    }
}
