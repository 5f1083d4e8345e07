//! Connection management: resilient sessions with typed dispatch.

pub mod envelope;
pub mod manager;
pub mod state;
pub mod ws;

// Re-export main types
pub use envelope::Envelope;
pub use manager::{ConnectionManager, ManagerBuilder, ManagerEvent};
pub use state::{AtomicConnectionState, AtomicMetrics, ConnectionState, Metrics};
pub use ws::WsTransport;
