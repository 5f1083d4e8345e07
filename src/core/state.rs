use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};

/// Lifecycle states of a connection manager
///
/// `Disabled` is terminal: it is reached only after the reconnect budget
/// is exhausted or an explicit disconnect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Created, never connected
    Idle,
    /// Connection attempt in flight
    Connecting,
    /// Session established, messages flowing
    Open,
    /// Session ended with a close from the peer
    Closed,
    /// Session or construction failed
    Errored,
    /// Waiting out a backoff delay before the next attempt
    Reconnecting,
    /// No further activity; reconnects suppressed
    Disabled,
}

impl ConnectionState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => ConnectionState::Idle,
            1 => ConnectionState::Connecting,
            2 => ConnectionState::Open,
            3 => ConnectionState::Closed,
            4 => ConnectionState::Errored,
            5 => ConnectionState::Reconnecting,
            _ => ConnectionState::Disabled,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            ConnectionState::Idle => 0,
            ConnectionState::Connecting => 1,
            ConnectionState::Open => 2,
            ConnectionState::Closed => 3,
            ConnectionState::Errored => 4,
            ConnectionState::Reconnecting => 5,
            ConnectionState::Disabled => 6,
        }
    }
}

/// Lock-free connection state shared between the manager and its run task
#[derive(Debug)]
pub struct AtomicConnectionState(AtomicU8);

impl AtomicConnectionState {
    pub fn new(state: ConnectionState) -> Self {
        Self(AtomicU8::new(state.as_u8()))
    }

    #[inline]
    pub fn get(&self) -> ConnectionState {
        ConnectionState::from_u8(self.0.load(Ordering::Acquire))
    }

    #[inline]
    pub fn set(&self, state: ConnectionState) {
        self.0.store(state.as_u8(), Ordering::Release);
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.get() == ConnectionState::Open
    }

    #[inline]
    pub fn is_disabled(&self) -> bool {
        self.get() == ConnectionState::Disabled
    }
}

/// Lock-free counters updated by the run task
#[derive(Debug, Default)]
pub struct AtomicMetrics {
    sent: AtomicU64,
    received: AtomicU64,
    reconnects: AtomicU64,
}

impl AtomicMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn increment_sent(&self) {
        self.sent.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn increment_received(&self) {
        self.received.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn increment_reconnects(&self) {
        self.reconnects.fetch_add(1, Ordering::Relaxed);
    }

    pub fn messages_sent(&self) -> u64 {
        self.sent.load(Ordering::Relaxed)
    }

    pub fn messages_received(&self) -> u64 {
        self.received.load(Ordering::Relaxed)
    }

    pub fn reconnect_count(&self) -> u64 {
        self.reconnects.load(Ordering::Relaxed)
    }
}

/// Point-in-time metrics snapshot
#[derive(Debug, Clone)]
pub struct Metrics {
    pub messages_sent: u64,
    pub messages_received: u64,
    pub reconnect_count: u64,
    pub connection_state: ConnectionState,
}
