//! Error types for the bayes-evidence library.
//!
//! All fallible operations return [`EvidenceError`] through the crate-wide
//! [`Result`] alias. Note that an unsupported dtype combination is *not* an
//! error: the engine reports it as
//! [`EvidenceOutcome::Unsupported`](crate::engine::EvidenceOutcome::Unsupported).

use thiserror::Error;

/// The main error type for the bayes-evidence library.
#[derive(Error, Debug)]
pub enum EvidenceError {
    /// Error from Arrow operations (casts, filters, zips, batch construction).
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// A field was requested that has no entry in the dtype table.
    #[error("Field '{field}' has no entry in the dtype table")]
    UnknownField { field: String },

    /// A column named in the dtype table is missing from the dataset.
    #[error("Column '{column}' not found in dataset")]
    ColumnNotFound { column: String },

    /// Stored data does not have the expected Arrow type.
    #[error("Type mismatch for '{column}': expected {expected}, found {found}")]
    TypeMismatch {
        column: String,
        expected: String,
        found: String,
    },

    /// The evidence request is malformed (empty mask, wrong mask length).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Invalid distribution or sampling parameters.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Row or column counts disagree between blocks, masks and datasets.
    #[error("Shape mismatch: expected {expected}, found {found}")]
    ShapeMismatch { expected: usize, found: usize },

    /// Failure inside the statistical backend.
    #[error("Backend failure in {test}: {message}")]
    Backend {
        /// Which test routine failed
        test: String,
        /// Detailed error message
        message: String,
    },

    /// The backend result did not contain the requested predictor term.
    #[error("Backend result has no term '{term}'")]
    MissingTerm { term: String },

    /// Error related to configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Error from serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Error from I/O operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A type alias for `Result<T, EvidenceError>`.
///
/// # Examples
///
/// ```rust
/// use bayes_evidence::error::Result;
///
/// fn two() -> Result<f64> {
///     Ok(2.0)
/// }
/// # assert_eq!(two().unwrap(), 2.0);
/// ```
pub type Result<T> = std::result::Result<T, EvidenceError>;

impl EvidenceError {
    /// Creates an unknown-field error.
    pub fn unknown_field(field: impl Into<String>) -> Self {
        Self::UnknownField {
            field: field.into(),
        }
    }

    /// Creates a column-not-found error.
    pub fn column_not_found(column: impl Into<String>) -> Self {
        Self::ColumnNotFound {
            column: column.into(),
        }
    }

    /// Creates a type mismatch error.
    pub fn type_mismatch(
        column: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch {
            column: column.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Creates an invalid request error.
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    /// Creates an invalid parameter error.
    pub fn invalid_parameter(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }

    /// Creates a backend failure for the named test routine.
    pub fn backend(test: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Backend {
            test: test.into(),
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Returns true when the error came from the statistical backend.
    pub fn is_backend_failure(&self) -> bool {
        matches!(self, Self::Backend { .. })
    }
}

impl From<serde_json::Error> for EvidenceError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
