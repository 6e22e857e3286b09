//! Error types for the abtest core library.

use std::path::{Path, PathBuf};

/// Errors that can occur while loading, cleaning or analysing experiment data.
///
/// All error variants are marked with `#[non_exhaustive]` to allow
/// adding new error types without breaking changes.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// I/O error (file operations)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// I/O error tied to a specific file
    #[error("I/O error at {}: {source}", path.display())]
    IoAt {
        /// Path that was being read or written
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// CSV reading or writing error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A required column is not present in the CSV header
    #[error("Missing column: {column}")]
    MissingColumn {
        /// Column name that was expected
        column: String,
    },

    /// A cell could not be interpreted
    #[error("Invalid value {value:?} in column '{column}' at row {row}")]
    InvalidValue {
        /// 1-based data row (header excluded)
        row: usize,
        /// Column the value came from
        column: String,
        /// The raw value
        value: String,
    },

    /// No rows belong to the requested group
    #[error("No rows found for group '{group}'")]
    EmptyGroup {
        /// Group label
        group: String,
    },

    /// A group did not see exactly one page
    #[error(
        "Have non-singular pages seen by the {group} group ({pages:?}). \
         Please process data so you have single pages seen by the {group} group."
    )]
    NonSingularPage {
        /// Group label
        group: String,
        /// Distinct pages seen by the group
        pages: Vec<String>,
    },

    /// Statistical input validation error
    #[error("Validation error: {message}")]
    Validation {
        /// Parameter that failed validation
        field: Option<String>,
        /// What went wrong
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// What configuration is problematic
        message: String,
    },
}

/// Convenience `Result` type alias for abtest operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns whether this error stems from the input data rather than
    /// from the environment or the caller's parameters.
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            Error::Csv(_)
                | Error::MissingColumn { .. }
                | Error::InvalidValue { .. }
                | Error::EmptyGroup { .. }
                | Error::NonSingularPage { .. }
        )
    }

    /// Creates an I/O error that remembers the path involved.
    pub fn io_with_path(source: std::io::Error, path: impl AsRef<Path>) -> Self {
        Error::IoAt {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Creates a new validation error.
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Error::Validation {
            field: None,
            message: message.into(),
        }
    }

    /// Creates a new validation error with a field name.
    pub fn validation_field<F, M>(field: F, message: M) -> Self
    where
        F: Into<String>,
        M: Into<String>,
    {
        Error::Validation {
            field: Some(field.into()),
            message: message.into(),
        }
    }

    /// Creates a new configuration error.
    pub fn config<S: Into<String>>(message: S) -> Self {
        Error::Config {
            message: message.into(),
        }
    }

    /// Creates a missing-column error.
    pub fn missing_column<S: Into<String>>(column: S) -> Self {
        Error::MissingColumn {
            column: column.into(),
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::config(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::config(err.to_string())
    }
}
