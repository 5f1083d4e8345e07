//! Core traits and types for the liveboard real-time layer.
//!
//! These are the seams of the system:
//!
//! - **Transport**: capability to open real-time sessions (production:
//!   WebSocket; tests: scripted double)
//! - **ReconnectPolicy**: backoff schedule after unexpected closes
//! - **MessageHandler**: per-tag message processing
//! - **RenderBackend / Renderable**: boundary to the rendering library

pub mod error;
pub mod handler;
pub mod reconnect;
pub mod render;
pub mod transport;

// Re-export commonly used types
pub use error::{LiveboardError, Result};
pub use handler::MessageHandler;
pub use reconnect::{LinearBackoff, NeverReconnect, ReconnectPolicy};
pub use render::{RenderBackend, Renderable};
pub use transport::{Frame, Transport, TransportEvent, TransportSink, TransportStream};
