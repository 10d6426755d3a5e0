//! Error handling for the people counter

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Error types
///
/// Startup errors (`Config`, `Credential`, `UnavailableService`) are fatal
/// and abort the process. Per-message errors (`Decode`, `MalformedEvent`,
/// `Render`) are contained at the point of detection, logged, and dropped.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Missing or invalid configuration (fatal, pre-start)
    #[error("Config error: {0}")]
    Config(String),

    /// Broker auth file missing/unreadable/malformed (fatal, pre-start)
    #[error("Credential error: {0}")]
    Credential(String),

    /// Scene catalogue unreachable or invalid (fatal, pre-start)
    #[error("Scene service unavailable: {0}")]
    UnavailableService(String),

    /// Raw payload is not valid JSON (recoverable, per-message)
    #[error("Decode error: {0}")]
    Decode(String),

    /// Decoded event violates the payload contract (recoverable, per-message)
    #[error("Malformed event: {0}")]
    MalformedEvent(String),

    /// Report rendering failed (recoverable, never aborts ingestion)
    #[error("Render error: {0}")]
    Render(String),

    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// MQTT client request error
    #[error("MQTT client error: {0}")]
    Mqtt(#[from] rumqttc::ClientError),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
