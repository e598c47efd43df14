use thiserror::Error;

/// Errors raised before a score is computed.
///
/// Malformed rows inside a table are never reported here, they are
/// excluded from the score instead.
#[derive(Debug, Error)]
pub enum PrsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("p-value threshold must lie in [0, 1], got {0}")]
    InvalidThreshold(f64),

    #[error("Missing column '{column}' in {table} header")]
    MissingColumn { table: &'static str, column: &'static str },
}

pub type PrsResult<T> = Result<T, PrsError>;
