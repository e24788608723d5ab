use cranelink_transport::TransportError;

/// Errors that can end a streaming session or routine.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// A frame could not be handed to the transport.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The request parameters cannot produce a session.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The controller configuration is unusable.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// A routine document could not be parsed.
    #[error("routine parse error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StreamError>;
