//! Release pipeline error types
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ReleaseError>;

#[derive(Error, Debug)]
pub enum ReleaseError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Driver error: {0}")]
    Driver(#[from] driver::DriverError),

    #[error("Registry error: {0}")]
    Registry(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Registry authentication failed: {0}")]
    Unauthorized(String),

    #[error("Verification failed: {0}")]
    Verify(String),
}
