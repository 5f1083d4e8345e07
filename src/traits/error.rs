use thiserror::Error;

/// Main error type for liveboard
#[derive(Error, Debug)]
pub enum LiveboardError {
    /// Transport handle could not be constructed (bad endpoint, refused, ...)
    #[error("transport construction failed: {0}")]
    TransportConstruction(String),

    /// I/O error on a live transport handle
    #[error("transport error: {0}")]
    Transport(String),

    /// Connection closed unexpectedly
    #[error("connection closed: {0}")]
    ConnectionClosed(String),

    /// Malformed inbound frame
    #[error("parse error: {0}")]
    Parse(String),

    /// Reconnect budget exhausted; the connection is disabled
    #[error("reconnect budget exhausted after {attempts} attempts")]
    RetriesExhausted { attempts: usize },

    /// Render target could not be resolved
    #[error("render target not found: {0}")]
    Resolution(String),

    /// Renderable construction failed
    #[error("render error: {0}")]
    Render(String),

    /// Handler reported a failure while processing a message
    #[error("handler error: {0}")]
    Handler(String),
}

/// Result type for liveboard operations
pub type Result<T> = std::result::Result<T, LiveboardError>;
