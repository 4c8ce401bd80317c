//! Error type for dataset loading.

/// Dataset loading error.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// File-system error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parquet decoding/encoding error.
    #[error("Parquet read/write error: {0}")]
    Parquet(#[from] ::parquet::errors::ParquetError),

    /// Arrow error.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// A required column is absent.
    #[error("missing required column: {0}")]
    MissingColumn(String),

    /// A column has an unexpected type.
    #[error("column '{col}' has wrong type: expected {expected}, got {actual}")]
    WrongType {
        /// Column name.
        col: String,
        /// Accepted type(s).
        expected: String,
        /// Type found in the file.
        actual: String,
    },

    /// Columns disagree with each other (lengths, nulls, negative counts).
    #[error("inconsistent column '{col}': {detail}")]
    Inconsistent {
        /// Column name.
        col: String,
        /// What went wrong.
        detail: String,
    },

    /// Locator scheme that cannot be opened.
    #[error(
        "unsupported dataset locator '{0}': only local paths and file:// URIs can be opened; fetch the file locally first"
    )]
    UnsupportedLocator(String),

    /// File extension not recognised (or its reader not compiled in).
    #[error("unsupported dataset format: {0}")]
    UnsupportedFormat(String),

    /// ROOT reader error.
    #[error("ROOT error: {0}")]
    Root(String),

    /// Event-table invariant violation.
    #[error(transparent)]
    Core(#[from] dm_core::Error),
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, LoadError>;
