//! Common test utilities for liveboard integration tests
//!
//! Provides a deterministic scripted transport double so connection
//! behavior can be tested without sockets or real timers.

use async_trait::async_trait;
use liveboard::{
    Frame, LiveboardError, Result, Transport, TransportEvent, TransportSink, TransportStream,
};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};
use tokio::sync::mpsc;
use tokio::time::Instant;

static INIT_TRACING: Once = Once::new();

/// Opt-in log output for debugging test runs, e.g.
/// `RUST_LOG=liveboard=debug cargo test -- --nocapture`
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Outcome of one scripted connect attempt
pub enum ConnectOutcome {
    /// Construction fails (refused endpoint, bad handshake)
    Refuse,
    /// Session opens; events are fed from this channel. Dropping the
    /// sender closes the session.
    Accept(mpsc::UnboundedReceiver<TransportEvent>),
}

/// Observation side of the fake transport
#[derive(Clone, Default)]
pub struct FakeProbe {
    connect_times: Arc<Mutex<Vec<Instant>>>,
    sent: Arc<Mutex<Vec<Frame>>>,
    closes: Arc<AtomicUsize>,
}

impl FakeProbe {
    /// Virtual timestamps of every connect attempt
    pub fn connect_times(&self) -> Vec<Instant> {
        self.connect_times.lock().clone()
    }

    pub fn connect_count(&self) -> usize {
        self.connect_times.lock().len()
    }

    /// Every frame written to any session sink
    pub fn sent_frames(&self) -> Vec<Frame> {
        self.sent.lock().clone()
    }

    /// Number of explicit sink closes
    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

/// Scripted transport double: each connect attempt consumes the next
/// outcome; an exhausted script refuses further attempts.
pub struct FakeTransport {
    outcomes: Mutex<VecDeque<ConnectOutcome>>,
    probe: FakeProbe,
}

impl FakeTransport {
    pub fn scripted(outcomes: Vec<ConnectOutcome>) -> (Self, FakeProbe) {
        let probe = FakeProbe::default();
        let transport = Self {
            outcomes: Mutex::new(outcomes.into()),
            probe: probe.clone(),
        };
        (transport, probe)
    }
}

#[async_trait]
impl Transport for FakeTransport {
    type Sink = FakeSink;
    type Stream = FakeStream;

    async fn connect(&self, _endpoint: &str) -> Result<(FakeSink, FakeStream)> {
        self.probe.connect_times.lock().push(Instant::now());
        match self.outcomes.lock().pop_front() {
            Some(ConnectOutcome::Accept(events)) => Ok((
                FakeSink {
                    probe: self.probe.clone(),
                },
                FakeStream { events },
            )),
            Some(ConnectOutcome::Refuse) | None => Err(LiveboardError::TransportConstruction(
                "connection refused".into(),
            )),
        }
    }
}

pub struct FakeSink {
    probe: FakeProbe,
}

#[async_trait]
impl TransportSink for FakeSink {
    async fn send(&mut self, frame: Frame) -> Result<()> {
        self.probe.sent.lock().push(frame);
        Ok(())
    }

    async fn close(&mut self) {
        self.probe.closes.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct FakeStream {
    events: mpsc::UnboundedReceiver<TransportEvent>,
}

#[async_trait]
impl TransportStream for FakeStream {
    async fn next_event(&mut self) -> TransportEvent {
        match self.events.recv().await {
            Some(event) => event,
            None => TransportEvent::Closed("script ended".into()),
        }
    }
}

/// Poll `cond` under the paused clock until it holds.
///
/// Each poll advances virtual time by 1ms; panics after 30 virtual
/// seconds so a broken test fails instead of hanging.
pub async fn wait_until(what: &str, mut cond: impl FnMut() -> bool) {
    for _ in 0..30_000 {
        if cond() {
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(1)).await;
    }
    panic!("timed out waiting for: {}", what);
}
