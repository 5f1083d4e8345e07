//! # Liveboard
//!
//! The resilient real-time client layer of a server-rendered dashboard:
//! reconnecting typed-message connections and live widget lifecycle.
//!
//! ## Components
//!
//! - **ConnectionManager**: owns one logical real-time session; automatic
//!   reconnect with linear backoff and tag-keyed dispatch of inbound
//!   messages to registered handlers
//! - **WidgetRegistry**: named live widgets with strict replace-by-destroy
//!   lifecycle, driven by the data those handlers produce
//!
//! Both are plain values owned by the application, never singletons;
//! independent managers and registries share nothing.
//!
//! ## Example
//!
//! ```rust,ignore
//! use liveboard::{Envelope, LinearBackoff, WsTransport};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut manager = liveboard::builder("wss://dashboard.example/live", WsTransport)
//!         .policy(LinearBackoff::new(Duration::from_secs(1), 5))
//!         .build();
//!
//!     manager.on("tick", |message: Envelope| {
//!         println!("tick: {:?}", message.field("value"));
//!         Ok(())
//!     });
//!
//!     manager.connect();
//!
//!     // ... later
//!     manager.disconnect().await;
//! }
//! ```

pub mod core;
pub mod traits;
pub mod widgets;

// Re-export the public surface
pub use crate::core::{
    ConnectionManager, ConnectionState, Envelope, ManagerBuilder, ManagerEvent, Metrics,
    WsTransport,
};
pub use crate::traits::{
    Frame, LinearBackoff, LiveboardError, MessageHandler, NeverReconnect, ReconnectPolicy,
    RenderBackend, Renderable, Result, Transport, TransportEvent, TransportSink, TransportStream,
};
pub use crate::widgets::WidgetRegistry;

/// Create a new connection manager builder
///
/// # Example
/// ```ignore
/// let manager = liveboard::builder("wss://dashboard.example/live", WsTransport)
///     .handler("tick", TickHandler::new())
///     .subscription(Envelope::new("subscribe").to_frame()?)
///     .build();
/// ```
pub fn builder<T: Transport>(endpoint: impl Into<String>, transport: T) -> ManagerBuilder<T> {
    ManagerBuilder::new(endpoint, transport)
}
