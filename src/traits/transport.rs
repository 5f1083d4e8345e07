use crate::traits::Result;
use async_trait::async_trait;

/// A single wire frame, text or binary.
#[derive(Debug, Clone)]
pub enum Frame {
    Text(String),
    Binary(Vec<u8>),
}

impl Frame {
    /// Get the frame as text, if it is text
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Frame::Text(s) => Some(s),
            Frame::Binary(_) => None,
        }
    }

    /// Get the frame as binary, if it is binary
    pub fn as_binary(&self) -> Option<&[u8]> {
        match self {
            Frame::Text(_) => None,
            Frame::Binary(b) => Some(b),
        }
    }

    /// Check if the frame is text
    pub fn is_text(&self) -> bool {
        matches!(self, Frame::Text(_))
    }

    /// Check if the frame is binary
    pub fn is_binary(&self) -> bool {
        matches!(self, Frame::Binary(_))
    }
}

/// Event surfaced by the read half of a transport session.
///
/// `Closed` and `Error` both terminate the session; the connection
/// manager decides whether a reconnect follows.
#[derive(Debug)]
pub enum TransportEvent {
    /// A data frame arrived
    Frame(Frame),
    /// The peer closed the session (reason)
    Closed(String),
    /// The session failed with an I/O error
    Error(String),
}

/// Capability to open real-time sessions against an endpoint.
///
/// The connection manager is polymorphic over this trait: production code
/// uses the tokio-tungstenite implementation, tests use a deterministic
/// scripted double. A successful `connect` means the session is open;
/// handshake and framing are entirely the transport's concern.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Write half of an open session
    type Sink: TransportSink;
    /// Read half of an open session
    type Stream: TransportStream;

    /// Open a new session against `endpoint`.
    ///
    /// # Errors
    /// Returns `LiveboardError::TransportConstruction` when the session
    /// cannot be established. The caller feeds this into its reconnect
    /// policy rather than propagating it.
    async fn connect(&self, endpoint: &str) -> Result<(Self::Sink, Self::Stream)>;
}

/// Write half of an open transport session
#[async_trait]
pub trait TransportSink: Send + 'static {
    /// Transmit one frame
    async fn send(&mut self, frame: Frame) -> Result<()>;

    /// Close the session. Best effort; errors are swallowed.
    async fn close(&mut self);
}

/// Read half of an open transport session
#[async_trait]
pub trait TransportStream: Send + 'static {
    /// Wait for the next session event.
    ///
    /// Once `Closed` or `Error` has been returned the stream is spent.
    async fn next_event(&mut self) -> TransportEvent;
}
