//! Error types for trigger volumes

use thiserror::Error;
use tripwire_core::ObjectId;

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading the config file failed
    #[error("Failed to read trigger config: {0}")]
    Io(#[from] std::io::Error),

    /// The config was not valid JSON for a trigger volume
    #[error("Invalid trigger config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Trigger system errors
#[derive(Debug, Error)]
pub enum TriggerError {
    /// No volume registered under this ID
    #[error("Trigger volume not found: {0}")]
    VolumeNotFound(ObjectId),
}

/// Result type for trigger operations
pub type Result<T> = std::result::Result<T, TriggerError>;
