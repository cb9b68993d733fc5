use crate::billing::BillingError;

/// The main error type for leasekit
#[derive(Debug, thiserror::Error)]
pub enum LeasekitError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Storage unavailable")]
    StorageUnavailable,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Billing error: {0}")]
    Billing(#[from] BillingError),
}

impl LeasekitError {
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}

/// Result type alias for leasekit operations
pub type Result<T> = std::result::Result<T, LeasekitError>;
