//! Error types for Analyze header and data codec operations.

use thiserror::Error;

/// Main error type for the crate.
#[derive(Error, Debug)]
pub enum AnlzError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The byte block is not a well-formed Analyze header record.
    #[error("invalid Analyze header: {0}")]
    InvalidFormat(String),

    /// Datatype code with no known on-disk representation.
    #[error("unsupported data type code: {0}")]
    UnsupportedDataType(i16),

    /// Shape-related field rejection (too many dims, extent out of range).
    #[error("invalid dimensions: {0}")]
    InvalidDimensions(String),

    /// Field value rejection (non-finite where finite required, etc.).
    #[error("invalid value: {0}")]
    InvalidValue(String),

    /// Operation unsupported by this header format variant.
    #[error("unsupported for this header variant: {0}")]
    HeaderType(String),
}

/// Specialized Result type for codec operations.
pub type Result<T> = std::result::Result<T, AnlzError>;
