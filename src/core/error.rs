use thiserror::Error;

#[derive(Error, Debug)]
pub enum DriverError {
    #[error("Unsupported transaction isolation level: {0}")]
    UnsupportedIsolation(u8),

    #[error("Transaction already finished")]
    TransactionFinished,

    #[error("Operation canceled")]
    Canceled,

    #[error("Deadline exceeded")]
    DeadlineExceeded,

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    IoError(String),
}

pub type Result<T> = std::result::Result<T, DriverError>;

impl DriverError {
    /// Whether the error came from the context rather than the server.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Canceled | Self::DeadlineExceeded)
    }
}

impl From<std::io::Error> for DriverError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError(err.to_string())
    }
}
