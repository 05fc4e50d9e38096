//! Driver-specific error types
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DriverError>;

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("Container runtime unreachable: {0}")]
    DaemonUnreachable(String),

    #[error("Image not found: {0}")]
    ImageNotFound(String),

    #[error("Host port already in use: {0}")]
    PortInUse(String),

    #[error("Container name already in use: {0}")]
    NameConflict(String),

    #[error("Registry authentication failed: {0}")]
    Unauthorized(String),

    #[error("Builder unavailable: {0}")]
    BuilderUnavailable(String),

    #[error("`{command}` exited with status {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: i32,
        stderr: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
