//! Error types for profile resolution and connection management.

use thiserror::Error;

/// Result type for connection operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// No config section matched the requested name in any candidate file.
    #[error("connection \"{0}\" not defined")]
    NotFound(String),

    /// The port field did not parse as a TCP port number.
    #[error("invalid port value \"{0}\"")]
    InvalidPort(String),

    /// Terminal I/O failed while prompting.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Driver-level connection failures, passed through unmodified.
    #[error(transparent)]
    Driver(#[from] anyhow::Error),
}
