//! Error types for the notification client.
//!
//! Normalization and dispatch never fail; they report [`crate::Warning`]s
//! instead. The errors here cover the fallible edges: parsing caller input,
//! loading configuration and talking to the native event channel.

/// Main error type for the notification client
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    /// Options could not be interpreted as a key/value mapping
    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    /// A native event payload was malformed
    #[error("Invalid native event: {0}")]
    InvalidEvent(String),

    /// Event system error
    #[error("Event system error: {0}")]
    EventError(#[from] EventError),

    /// The native event channel has no receiver anymore
    #[error("Native event channel closed")]
    ChannelClosed,

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Errors produced by listeners during dispatch
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EventError {
    /// Listener returned an error
    #[error("Handler execution failed: {0}")]
    HandlerFailed(String),

    /// Listener panicked
    #[error("Handler panicked: {0}")]
    HandlerPanicked(String),
}

impl From<serde_json::Error> for NotificationError {
    fn from(err: serde_json::Error) -> Self {
        NotificationError::SerializationError(err.to_string())
    }
}
