use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Broad classes of failure, used by callers that decide whether to skip a
/// target row or abort a whole batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The input table is malformed (missing columns, empty, ragged)
    InputShape,
    /// A column name or range does not resolve against the table
    Key,
    /// A target row index is out of bounds
    Index,
    /// An invalid run parameter
    Config,
    /// Underlying I/O failure
    Io,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Expression table has no rows")]
    EmptyTable,

    #[error("Expression table has no sample columns")]
    NoSamples,

    #[error("First column must be named '{expected}', found '{found}'")]
    MissingIdColumn { expected: &'static str, found: String },

    #[error("Shape mismatch: expected {expected} values, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("Duplicate sample column: {0}")]
    DuplicateColumn(String),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Invalid column range {start}:{end}")]
    InvalidRange { start: String, end: String },

    #[error("Control range {control} is not contained in full range {full}")]
    RangeNotContained { control: String, full: String },

    #[error("Column selection does not belong to this table: {0}")]
    SelectionMismatch(String),

    #[error("Row index {index} out of range for table with {rows} rows")]
    RowOutOfRange { index: usize, rows: usize },

    #[error("top_n must be positive")]
    InvalidTopN,

    #[error("Result headers do not match: expected {expected:?}, got {actual:?}")]
    HeaderMismatch { expected: Vec<String>, actual: Vec<String> },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::EmptyTable
            | Error::NoSamples
            | Error::MissingIdColumn { .. }
            | Error::ShapeMismatch { .. }
            | Error::DuplicateColumn(_)
            | Error::HeaderMismatch { .. } => ErrorKind::InputShape,
            Error::ColumnNotFound(_)
            | Error::InvalidRange { .. }
            | Error::RangeNotContained { .. }
            | Error::SelectionMismatch(_) => ErrorKind::Key,
            Error::RowOutOfRange { .. } => ErrorKind::Index,
            Error::InvalidTopN | Error::InvalidConfig(_) => ErrorKind::Config,
            Error::Io(_) => ErrorKind::Io,
        }
    }
}
