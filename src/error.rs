use thiserror::Error;

#[derive(Debug, Error)]
pub enum FixerError {
    /// A data row that cannot be turned into a record. `line` is 1-based and
    /// counts the header.
    #[error("malformed row at line {line}: {message}")]
    Parse { line: u64, message: String },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl FixerError {
    pub fn parse(line: u64, message: impl Into<String>) -> Self {
        FixerError::Parse {
            line,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FixerError>;
