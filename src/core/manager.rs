use crate::core::envelope::Envelope;
use crate::core::state::{AtomicConnectionState, AtomicMetrics, ConnectionState, Metrics};
use crate::traits::{
    Frame, LinearBackoff, MessageHandler, ReconnectPolicy, Transport, TransportEvent,
    TransportSink, TransportStream,
};
use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Commands from the manager handle into its run task
#[derive(Debug)]
enum Command {
    /// Transmit a serialized frame
    Send(Frame),
    /// Close the transport and stop
    Disconnect,
}

/// Events surfaced to the owning application
#[derive(Debug, Clone)]
pub enum ManagerEvent {
    /// Session established
    Connected,
    /// Session ended (peer close, error, or explicit disconnect)
    Disconnected,
    /// Reconnect scheduled (attempt number)
    Reconnecting(usize),
    /// A transport-level failure occurred
    TransportError(String),
    /// Terminal: the retry budget is spent and the manager is disabled.
    /// Fired exactly once per exhaustion.
    RetriesExhausted { attempts: usize },
}

type HandlerMap = Arc<Mutex<HashMap<String, Box<dyn MessageHandler>>>>;

/// Resilient real-time connection with typed message dispatch
///
/// Owns one logical session at a time: connect, automatic reconnect with
/// linear backoff, and tag-keyed routing of inbound messages to registered
/// handlers. Each manager is an independently constructed value; create as
/// many as you need, they share nothing.
///
/// # Type Parameters
/// - `T`: Transport implementation (WebSocket in production, scripted
///   double in tests)
pub struct ConnectionManager<T: Transport> {
    endpoint: String,
    transport: Arc<T>,
    handlers: HandlerMap,
    policy: Arc<dyn ReconnectPolicy>,
    subscriptions: Vec<Frame>,
    state: Arc<AtomicConnectionState>,
    metrics: Arc<AtomicMetrics>,
    /// True while (re)connecting is allowed; cleared by disconnect
    run_flag: Arc<AtomicBool>,
    command_tx: mpsc::UnboundedSender<Command>,
    event_tx: Sender<ManagerEvent>,
    event_rx: Receiver<ManagerEvent>,
    task: Option<tokio::task::JoinHandle<()>>,
}

impl<T: Transport> ConnectionManager<T> {
    /// Start building a manager for `endpoint` over `transport`
    pub fn builder(endpoint: impl Into<String>, transport: T) -> ManagerBuilder<T> {
        ManagerBuilder::new(endpoint, transport)
    }

    /// Attempt to establish the connection.
    ///
    /// No-op while a connection attempt or session is already active.
    /// Construction failures are not propagated here; they feed the
    /// reconnect policy, and the terminal outcome is surfaced as a
    /// `RetriesExhausted` event.
    pub fn connect(&mut self) {
        if matches!(
            self.state.get(),
            ConnectionState::Connecting | ConnectionState::Open | ConnectionState::Reconnecting
        ) {
            debug!("connect ignored: connection already active");
            return;
        }
        if let Some(task) = &self.task {
            if !task.is_finished() {
                debug!("connect ignored: run task still winding down");
                return;
            }
        }

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        self.command_tx = command_tx;
        self.run_flag.store(true, Ordering::Release);
        self.state.set(ConnectionState::Connecting);

        let task = ConnectionTask {
            endpoint: self.endpoint.clone(),
            transport: Arc::clone(&self.transport),
            handlers: Arc::clone(&self.handlers),
            policy: Arc::clone(&self.policy),
            subscriptions: self.subscriptions.clone(),
            state: Arc::clone(&self.state),
            metrics: Arc::clone(&self.metrics),
            run_flag: Arc::clone(&self.run_flag),
            command_rx,
            event_tx: self.event_tx.clone(),
        };
        self.task = Some(tokio::spawn(run_connection(task)));
    }

    /// Register the handler for a dispatch tag.
    ///
    /// Exactly one handler per tag; re-registering a tag replaces the
    /// previous handler (last write wins). May be called before or after
    /// `connect`.
    pub fn on(&self, tag: impl Into<String>, handler: impl MessageHandler) {
        let tag = tag.into();
        if self
            .handlers
            .lock()
            .insert(tag.clone(), Box::new(handler))
            .is_some()
        {
            debug!(%tag, "handler replaced");
        }
    }

    /// Serialize `payload` and transmit it, best effort.
    ///
    /// Only transmits while the connection is `Open`; otherwise the send
    /// is silently dropped. No queuing, no error, no state change. This is
    /// a deliberate policy: the real-time layer is an enhancement, not a
    /// guaranteed-delivery channel.
    pub fn send<P: Serialize + ?Sized>(&self, payload: &P) {
        if !self.state.is_open() {
            debug!("send dropped: connection not open");
            return;
        }
        match serde_json::to_string(payload) {
            Ok(text) => {
                if self.command_tx.send(Command::Send(Frame::Text(text))).is_err() {
                    debug!("send dropped: run task gone");
                }
            }
            Err(e) => warn!("send dropped: serialization failed: {}", e),
        }
    }

    /// Tear the connection down and disable reconnects.
    ///
    /// Closes the active transport handle if present and cancels any
    /// pending reconnect, including one already scheduled. Idempotent:
    /// calling it again has no additional effect.
    pub async fn disconnect(&mut self) {
        self.run_flag.store(false, Ordering::Release);
        let _ = self.command_tx.send(Command::Disconnect);
        if let Some(task) = self.task.take() {
            if task.await.is_err() {
                warn!("connection task panicked during shutdown");
            }
        }
        self.state.set(ConnectionState::Disabled);
        debug!("connection disabled");
    }

    /// Get the current connection state
    #[inline]
    pub fn state(&self) -> ConnectionState {
        self.state.get()
    }

    /// Check if the session is open
    #[inline]
    pub fn is_open(&self) -> bool {
        self.state.is_open()
    }

    /// Get a metrics snapshot
    pub fn metrics(&self) -> Metrics {
        Metrics {
            messages_sent: self.metrics.messages_sent(),
            messages_received: self.metrics.messages_received(),
            reconnect_count: self.metrics.reconnect_count(),
            connection_state: self.state.get(),
        }
    }

    /// Try to receive a lifecycle event (non-blocking)
    pub fn try_recv_event(&self) -> Option<ManagerEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Receive a lifecycle event (blocking)
    pub fn recv_event(&self) -> std::result::Result<ManagerEvent, crossbeam_channel::RecvError> {
        self.event_rx.recv()
    }
}

impl<T: Transport> Drop for ConnectionManager<T> {
    fn drop(&mut self) {
        self.run_flag.store(false, Ordering::Release);
        let _ = self.command_tx.send(Command::Disconnect);
    }
}

/// Builder for `ConnectionManager`
///
/// Endpoint and transport are required up front; policy, handlers and
/// subscriptions are optional.
pub struct ManagerBuilder<T: Transport> {
    endpoint: String,
    transport: T,
    policy: Arc<dyn ReconnectPolicy>,
    handlers: HashMap<String, Box<dyn MessageHandler>>,
    subscriptions: Vec<Frame>,
}

impl<T: Transport> ManagerBuilder<T> {
    pub fn new(endpoint: impl Into<String>, transport: T) -> Self {
        Self {
            endpoint: endpoint.into(),
            transport,
            policy: Arc::new(LinearBackoff::default()),
            handlers: HashMap::new(),
            subscriptions: Vec::new(),
        }
    }

    /// Set the reconnect policy (default: `LinearBackoff::default()`)
    pub fn policy(mut self, policy: impl ReconnectPolicy) -> Self {
        self.policy = Arc::new(policy);
        self
    }

    /// Register a handler for a dispatch tag
    pub fn handler(mut self, tag: impl Into<String>, handler: impl MessageHandler) -> Self {
        self.handlers.insert(tag.into(), Box::new(handler));
        self
    }

    /// Add a frame to send every time the connection opens.
    ///
    /// Subscriptions are re-sent after each reconnect, so the server-side
    /// session is rebuilt without application involvement.
    pub fn subscription(mut self, frame: Frame) -> Self {
        self.subscriptions.push(frame);
        self
    }

    pub fn build(self) -> ConnectionManager<T> {
        let (event_tx, event_rx) = unbounded();
        // Placeholder channel; connect() installs a live one
        let (command_tx, _command_rx) = mpsc::unbounded_channel();

        ConnectionManager {
            endpoint: self.endpoint,
            transport: Arc::new(self.transport),
            handlers: Arc::new(Mutex::new(self.handlers)),
            policy: self.policy,
            subscriptions: self.subscriptions,
            state: Arc::new(AtomicConnectionState::new(ConnectionState::Idle)),
            metrics: Arc::new(AtomicMetrics::new()),
            run_flag: Arc::new(AtomicBool::new(false)),
            command_tx,
            event_tx,
            event_rx,
            task: None,
        }
    }
}

/// Everything the run task owns
struct ConnectionTask<T: Transport> {
    endpoint: String,
    transport: Arc<T>,
    handlers: HandlerMap,
    policy: Arc<dyn ReconnectPolicy>,
    subscriptions: Vec<Frame>,
    state: Arc<AtomicConnectionState>,
    metrics: Arc<AtomicMetrics>,
    run_flag: Arc<AtomicBool>,
    command_rx: mpsc::UnboundedReceiver<Command>,
    event_tx: Sender<ManagerEvent>,
}

/// How an open session ended
enum SessionEnd {
    /// Peer closed the session
    Closed,
    /// Transport failure
    Errored,
    /// Explicit disconnect command
    Disconnect,
}

/// Main connection loop: connect, drive the session, apply the reconnect
/// policy, repeat until disabled.
async fn run_connection<T: Transport>(mut ctx: ConnectionTask<T>) {
    let mut attempt: usize = 0;

    loop {
        if !ctx.run_flag.load(Ordering::Acquire) {
            ctx.state.set(ConnectionState::Disabled);
            break;
        }

        ctx.state.set(ConnectionState::Connecting);

        match ctx.transport.connect(&ctx.endpoint).await {
            Ok((mut sink, stream)) => {
                info!(endpoint = %ctx.endpoint, "connected");
                attempt = 0;

                // Anything still queued belongs to a previous session;
                // send does not queue across sessions.
                let mut stale = 0usize;
                while ctx.command_rx.try_recv().is_ok() {
                    stale += 1;
                }
                if stale > 0 {
                    debug!("discarded {} stale commands", stale);
                }

                ctx.state.set(ConnectionState::Open);
                let _ = ctx.event_tx.send(ManagerEvent::Connected);

                let mut outcome = None;
                for sub in &ctx.subscriptions {
                    if let Err(e) = sink.send(sub.clone()).await {
                        warn!("subscription send failed: {}", e);
                        outcome = Some(SessionEnd::Errored);
                        break;
                    }
                    ctx.metrics.increment_sent();
                }

                let outcome = match outcome {
                    Some(end) => end,
                    None => {
                        drive_session(
                            &mut sink,
                            stream,
                            &ctx.handlers,
                            &ctx.metrics,
                            &ctx.run_flag,
                            &mut ctx.command_rx,
                            &ctx.event_tx,
                        )
                        .await
                    }
                };

                ctx.state.set(match outcome {
                    SessionEnd::Closed => ConnectionState::Closed,
                    SessionEnd::Errored => ConnectionState::Errored,
                    SessionEnd::Disconnect => ConnectionState::Disabled,
                });
                let _ = ctx.event_tx.send(ManagerEvent::Disconnected);

                if matches!(outcome, SessionEnd::Disconnect) {
                    break;
                }
            }
            Err(e) => {
                error!("transport construction failed: {}", e);
                ctx.state.set(ConnectionState::Errored);
                let _ = ctx.event_tx.send(ManagerEvent::TransportError(e.to_string()));
            }
        }

        if !ctx.run_flag.load(Ordering::Acquire) {
            ctx.state.set(ConnectionState::Disabled);
            break;
        }

        attempt += 1;
        match ctx.policy.next_delay(attempt) {
            Some(delay) => {
                ctx.state.set(ConnectionState::Reconnecting);
                let _ = ctx.event_tx.send(ManagerEvent::Reconnecting(attempt));
                info!("reconnecting in {:?} (attempt {})", delay, attempt);
                ctx.metrics.increment_reconnects();

                if !sleep_unless_disabled(delay, &ctx.run_flag).await {
                    ctx.state.set(ConnectionState::Disabled);
                    break;
                }
            }
            None => {
                let attempts = attempt - 1;
                warn!("reconnect budget exhausted after {} attempts", attempts);
                ctx.state.set(ConnectionState::Disabled);
                let _ = ctx.event_tx.send(ManagerEvent::RetriesExhausted { attempts });
                break;
            }
        }
    }

    debug!("connection task exiting");
}

/// Drive one open session until it ends
async fn drive_session<S: TransportSink, E: TransportStream>(
    sink: &mut S,
    mut stream: E,
    handlers: &HandlerMap,
    metrics: &AtomicMetrics,
    run_flag: &AtomicBool,
    command_rx: &mut mpsc::UnboundedReceiver<Command>,
    event_tx: &Sender<ManagerEvent>,
) -> SessionEnd {
    loop {
        if !run_flag.load(Ordering::Acquire) {
            sink.close().await;
            return SessionEnd::Disconnect;
        }

        tokio::select! {
            event = stream.next_event() => match event {
                TransportEvent::Frame(frame) => {
                    metrics.increment_received();
                    dispatch(handlers, &frame);
                }
                TransportEvent::Closed(reason) => {
                    warn!("connection closed: {}", reason);
                    return SessionEnd::Closed;
                }
                TransportEvent::Error(e) => {
                    error!("transport error: {}", e);
                    let _ = event_tx.send(ManagerEvent::TransportError(e));
                    return SessionEnd::Errored;
                }
            },
            cmd = command_rx.recv() => match cmd {
                Some(Command::Send(frame)) => {
                    if let Err(e) = sink.send(frame).await {
                        error!("send failed: {}", e);
                        return SessionEnd::Errored;
                    }
                    metrics.increment_sent();
                }
                Some(Command::Disconnect) => {
                    info!("disconnect requested, closing transport");
                    sink.close().await;
                    return SessionEnd::Disconnect;
                }
                None => {
                    debug!("command channel closed, closing transport");
                    sink.close().await;
                    return SessionEnd::Disconnect;
                }
            },
        }
    }
}

/// Parse a frame and route it to the handler registered for its tag.
///
/// Parse failures and handler errors are logged and dropped; the
/// connection is unaffected. Unregistered tags are ignored so unknown
/// message types never break the client.
fn dispatch(handlers: &HandlerMap, frame: &Frame) {
    let envelope = match Envelope::from_frame(frame) {
        Ok(envelope) => envelope,
        Err(e) => {
            warn!("dropping malformed frame: {}", e);
            return;
        }
    };

    let tag = envelope.tag.clone();
    let mut handlers = handlers.lock();
    match handlers.get_mut(&tag) {
        Some(handler) => {
            if let Err(e) = handler.handle(envelope) {
                error!(%tag, "handler error: {}", e);
            }
        }
        None => debug!(%tag, "no handler registered, message ignored"),
    }
}

/// Sleep for `delay`, waking early if the run flag is cleared.
///
/// Returns false when the wait was cancelled; the caller must not
/// reconnect in that case.
async fn sleep_unless_disabled(delay: Duration, run_flag: &AtomicBool) -> bool {
    let check_interval = Duration::from_millis(100);
    let mut elapsed = Duration::ZERO;

    while elapsed < delay {
        if !run_flag.load(Ordering::Acquire) {
            debug!("pending reconnect cancelled");
            return false;
        }
        let step = check_interval.min(delay - elapsed);
        tokio::time::sleep(step).await;
        elapsed += step;
    }

    run_flag.load(Ordering::Acquire)
}
