//! The telemetry connection actor.
//!
//! One thread owns the socket, the attempt counter and the replay buffer.
//! Everything else talks to it through [`TelemetryClient`], which only pushes
//! intents onto a channel and reads status back, so the frame loop never
//! blocks on the network.
//!
//! ```text
//!              connect ok
//!  Disconnected ─────────▶ Connected
//!     ▲   │  fail, attempts < max           │ write fails
//!     │   └─(wait delay)─▶ retry            │
//!     └─────────────────────────────────────┘ (reconnect immediately)
//! ```

use std::collections::VecDeque;
use std::io::Write;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender, TrySendError};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use crate::config::TelemetryConfig;
use crate::connector::{Connector, Link, TcpConnector};
use crate::event::PinchEvent;

/// Status messages buffered for the owner before new ones are discarded.
const STATUS_CAPACITY: usize = 256;

/// Intents waiting for the actor.  Records beyond this are dropped at the
/// handle, so a stalled link cannot grow memory without bound.
const INTENT_CAPACITY: usize = 1024;

// ════════════════════════════════════════════════════════════════════════════
// Public types
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// Reported by the actor as it works, for logging and tests.
#[derive(Clone, Debug, PartialEq)]
pub enum TelemetryStatus {
    Connecting       { attempt: u32 },
    Connected        { addr: String },
    ConnectFailed    { attempt: u32, error: String },
    /// The current connect sequence gave up; no automatic retries follow.
    RetriesExhausted { attempts: u32 },
    Sent             { bytes: usize },
    SendFailed       { error: String },
    /// A record was discarded: no live link, or the queue was full.
    Dropped,
    /// Buffered records written after a reconnect.
    Replayed         { count: usize },
    Closed,
}

/// Commands for the actor thread.
enum Intent {
    Connect,
    /// `link` is the link generation that was up when the record was
    /// queued, `None` if the client was not connected.
    Send { event: PinchEvent, link: Option<u64> },
    Shutdown,
}

#[derive(Clone, Copy, Debug)]
struct Snapshot {
    state:    ConnectionState,
    attempts: u32,
    /// Bumped each time a link comes up.
    link:     u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

fn lock(snapshot: &Mutex<Snapshot>) -> MutexGuard<'_, Snapshot> {
    snapshot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ════════════════════════════════════════════════════════════════════════════
// TelemetryClient — the handle
// ════════════════════════════════════════════════════════════════════════════

/// Handle to the telemetry actor thread.
///
/// `send` is fire-and-forget: records arriving while disconnected are
/// dropped, or kept in a bounded replay ring when
/// [`TelemetryConfig::replay_capacity`] is non-zero.  Dropping the handle
/// shuts the actor down and closes the connection.
pub struct TelemetryClient {
    intent_tx: SyncSender<Intent>,
    status_tx: SyncSender<TelemetryStatus>,
    status_rx: Receiver<TelemetryStatus>,
    snapshot:  Arc<Mutex<Snapshot>>,
    handle:    Option<JoinHandle<()>>,
}

impl TelemetryClient {
    /// Spawn a TCP-backed actor and queue the initial connect.
    pub fn start(config: TelemetryConfig) -> Self {
        let connector = TcpConnector::new(config.write_timeout);
        let client = TelemetryClient::new(config, Box::new(connector));
        client.connect();
        client
    }

    /// Spawn an idle actor using `connector` for every connection attempt.
    pub fn new(config: TelemetryConfig, connector: Box<dyn Connector>) -> Self {
        let (intent_tx, intent_rx) = mpsc::sync_channel::<Intent>(INTENT_CAPACITY);
        let (status_tx, status_rx) = mpsc::sync_channel::<TelemetryStatus>(STATUS_CAPACITY);
        let snapshot = Arc::new(Mutex::new(Snapshot {
            state:    ConnectionState::Disconnected,
            attempts: 0,
            link:     0,
        }));

        let actor = Actor {
            replay: VecDeque::with_capacity(config.replay_capacity),
            config,
            connector,
            link: None,
            link_gen: 0,
            attempts: 0,
            intents: intent_rx,
            status: status_tx.clone(),
            snapshot: Arc::clone(&snapshot),
        };
        let handle = thread::Builder::new()
            .name("telemetry".to_string())
            .spawn(move || actor.run())
            .ok();
        if handle.is_none() {
            error!("failed to spawn telemetry thread; events will be dropped");
        }

        TelemetryClient { intent_tx, status_tx, status_rx, snapshot, handle }
    }

    /// Ask the actor to (re)connect.  Resets nothing by itself: the attempt
    /// counter only returns to zero after a successful connect.
    pub fn connect(&self) {
        if let Err(TrySendError::Full(_)) = self.intent_tx.try_send(Intent::Connect) {
            warn!("telemetry queue full; connect request ignored");
        }
    }

    /// Queue a record for transmission.  Never blocks on the network.
    ///
    /// The record is tied to the link that is up right now.  If there is
    /// none, or that link is gone by the time the actor gets to it, the drop
    /// policy applies instead of a later link.  Returns false when the queue
    /// is full and the record was discarded here.
    pub fn send(&self, event: PinchEvent) -> bool {
        let link = {
            let snap = lock(&self.snapshot);
            (snap.state == ConnectionState::Connected).then_some(snap.link)
        };
        match self.intent_tx.try_send(Intent::Send { event, link }) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                debug!("telemetry queue full; dropping record");
                let _ = self.status_tx.try_send(TelemetryStatus::Dropped);
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }

    pub fn state(&self) -> ConnectionState {
        lock(&self.snapshot).state
    }

    /// Failed attempts since the last successful connect.
    pub fn attempts(&self) -> u32 {
        lock(&self.snapshot).attempts
    }

    /// Drain pending status messages (non-blocking).
    pub fn drain_status(&self) -> Vec<TelemetryStatus> {
        let mut out = Vec::new();
        while let Ok(s) = self.status_rx.try_recv() { out.push(s); }
        out
    }

    /// Wait up to `timeout` for the next status message.
    pub fn recv_status(&self, timeout: Duration) -> Option<TelemetryStatus> {
        self.status_rx.recv_timeout(timeout).ok()
    }

    /// Stop the actor, cancelling any retry in progress, and wait for it to
    /// close the connection.  Intents queued before this call are handled
    /// first.
    pub fn shutdown(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = self.intent_tx.send(Intent::Shutdown);
            if handle.join().is_err() {
                error!("telemetry thread panicked");
            }
        }
    }
}

impl Drop for TelemetryClient {
    fn drop(&mut self) {
        self.shutdown();
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Actor — runs on the telemetry thread
// ════════════════════════════════════════════════════════════════════════════

struct Actor {
    config:    TelemetryConfig,
    connector: Box<dyn Connector>,
    link:      Option<Link>,
    link_gen:  u64,
    attempts:  u32,
    replay:    VecDeque<PinchEvent>,
    intents:   Receiver<Intent>,
    status:    SyncSender<TelemetryStatus>,
    snapshot:  Arc<Mutex<Snapshot>>,
}

impl Actor {
    fn run(mut self) {
        while let Ok(intent) = self.intents.recv() {
            let flow = match intent {
                Intent::Connect     => self.connect_sequence(),
                Intent::Send { event, link } => self.send(event, link),
                Intent::Shutdown    => Flow::Stop,
            };
            if flow == Flow::Stop { break; }
        }

        if self.link.take().is_some() {
            info!(addr = %self.config.address(), "telemetry connection closed");
        }
        self.set_state(ConnectionState::Disconnected);
        self.report(TelemetryStatus::Closed);
    }

    // ── connect ───────────────────────────────────────────────────────────

    fn connect_sequence(&mut self) -> Flow {
        self.link = None;
        let addr = self.config.address();
        let max  = self.config.max_reconnect_attempts.max(1);

        loop {
            self.set_state(ConnectionState::Connecting);
            self.report(TelemetryStatus::Connecting { attempt: self.attempts + 1 });

            match self.connector.connect(&addr, self.config.connect_timeout) {
                Ok(link) => {
                    info!(%addr, "connected to telemetry server");
                    self.link = Some(link);
                    self.link_gen += 1;
                    self.attempts = 0;
                    self.set_state(ConnectionState::Connected);
                    self.report(TelemetryStatus::Connected { addr: addr.clone() });
                    if self.flush_replay() {
                        return Flow::Continue;
                    }
                    // Link died while replaying; counts against the budget.
                    self.attempts = (self.attempts + 1).min(max);
                }
                Err(e) => {
                    self.attempts = (self.attempts + 1).min(max);
                    warn!(%addr, attempt = self.attempts, max, error = %e, "telemetry connect failed");
                    self.set_state(ConnectionState::Disconnected);
                    self.report(TelemetryStatus::ConnectFailed {
                        attempt: self.attempts,
                        error:   e.to_string(),
                    });
                }
            }

            if self.attempts >= max {
                warn!(%addr, attempts = self.attempts, "giving up on telemetry server until next connect request");
                self.report(TelemetryStatus::RetriesExhausted { attempts: self.attempts });
                return Flow::Continue;
            }
            if self.attempts > 0 {
                info!(delay_ms = self.config.reconnect_delay.as_millis() as u64, "retrying telemetry connect");
                if self.wait_backoff() == Flow::Stop {
                    return Flow::Stop;
                }
            }
        }
    }

    /// Sleep out the reconnect delay while still serving intents, so a
    /// shutdown cancels the retry instead of waiting for it.
    fn wait_backoff(&mut self) -> Flow {
        let deadline = Instant::now() + self.config.reconnect_delay;
        loop {
            let now = Instant::now();
            if now >= deadline {
                return Flow::Continue;
            }
            match self.intents.recv_timeout(deadline - now) {
                Ok(Intent::Shutdown)                => return Flow::Stop,
                Ok(Intent::Send { event, .. })      => self.hold_or_drop(event),
                Ok(Intent::Connect)                 => {}
                Err(RecvTimeoutError::Timeout)      => return Flow::Continue,
                Err(RecvTimeoutError::Disconnected) => return Flow::Stop,
            }
        }
    }

    // ── send ──────────────────────────────────────────────────────────────

    fn send(&mut self, event: PinchEvent, queued_on: Option<u64>) -> Flow {
        if self.link.is_none() || queued_on != Some(self.link_gen) {
            self.hold_or_drop(event);
            return Flow::Continue;
        }
        match self.write_event(&event) {
            Ok(()) => Flow::Continue,
            Err(WriteFailure::Encode) => Flow::Continue,
            Err(WriteFailure::Transport) => self.connect_sequence(),
        }
    }

    fn write_event(&mut self, event: &PinchEvent) -> Result<(), WriteFailure> {
        let frame = match event.to_frame() {
            Ok(f) => f,
            Err(e) => {
                error!(error = %e, "could not encode telemetry record");
                return Err(WriteFailure::Encode);
            }
        };
        let Some(link) = self.link.as_mut() else {
            return Err(WriteFailure::Transport);
        };
        match link.write_all(&frame).and_then(|_| link.flush()) {
            Ok(()) => {
                debug!(hand = %event.hand, finger = %event.finger, bytes = frame.len(), "telemetry record sent");
                self.report(TelemetryStatus::Sent { bytes: frame.len() });
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "telemetry send failed; reconnecting");
                self.link = None;
                self.set_state(ConnectionState::Disconnected);
                self.report(TelemetryStatus::SendFailed { error: e.to_string() });
                Err(WriteFailure::Transport)
            }
        }
    }

    /// Write buffered records in order.  False if the link failed.
    fn flush_replay(&mut self) -> bool {
        let mut count = 0;
        while let Some(event) = self.replay.pop_front() {
            match self.write_event(&event) {
                Ok(()) => count += 1,
                Err(WriteFailure::Encode) => {}
                Err(WriteFailure::Transport) => return false,
            }
        }
        if count > 0 {
            info!(count, "replayed buffered telemetry records");
            self.report(TelemetryStatus::Replayed { count });
        }
        true
    }

    fn hold_or_drop(&mut self, event: PinchEvent) {
        let cap = self.config.replay_capacity;
        if cap == 0 {
            debug!(hand = %event.hand, finger = %event.finger, "not connected; dropping telemetry record");
            self.report(TelemetryStatus::Dropped);
            return;
        }
        if self.replay.len() >= cap {
            self.replay.pop_front();
            debug!("replay buffer full; dropping oldest record");
            self.report(TelemetryStatus::Dropped);
        }
        self.replay.push_back(event);
    }

    // ── bookkeeping ───────────────────────────────────────────────────────

    fn set_state(&self, state: ConnectionState) {
        let mut snap = lock(&self.snapshot);
        snap.state = state;
        snap.attempts = self.attempts;
        snap.link = self.link_gen;
    }

    fn report(&self, status: TelemetryStatus) {
        let _ = self.status.try_send(status);
    }
}

enum WriteFailure {
    /// The record could not be serialized; the link is unaffected.
    Encode,
    /// The link is gone.
    Transport,
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Read};
    use std::net::TcpListener;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use pinch_gesture::{Finger, HandSide};

    use crate::error::TelemetryError;
    use crate::event::decode_frames;

    const WAIT: Duration = Duration::from_secs(5);

    fn event(finger: Finger) -> PinchEvent {
        PinchEvent {
            hand:        HandSide::Right,
            finger,
            is_pinching: true,
            distance:    0.04,
            confidence:  0.97,
        }
    }

    fn fast_config(max: u32, delay_ms: u64) -> TelemetryConfig {
        TelemetryConfig {
            max_reconnect_attempts: max,
            reconnect_delay:        Duration::from_millis(delay_ms),
            connect_timeout:        Duration::from_millis(200),
            ..TelemetryConfig::default()
        }
    }

    /// Wait for a status matching `pred`, returning everything seen so far.
    fn wait_for(client: &TelemetryClient, pred: impl Fn(&TelemetryStatus) -> bool) -> Vec<TelemetryStatus> {
        let deadline = Instant::now() + WAIT;
        let mut seen = Vec::new();
        while Instant::now() < deadline {
            if let Some(s) = client.recv_status(Duration::from_millis(50)) {
                let hit = pred(&s);
                seen.push(s);
                if hit { return seen; }
            }
        }
        panic!("status never arrived; saw {:?}", seen);
    }

    // ── test connectors ───────────────────────────────────────────────────

    /// Records attempt times; fails until `online` is set.
    #[derive(Clone, Default)]
    struct Flaky {
        online:   Arc<AtomicBool>,
        attempts: Arc<Mutex<Vec<Instant>>>,
        written:  Arc<Mutex<Vec<u8>>>,
        /// Writes fail once this many bytes have been accepted.
        fail_after: Arc<AtomicUsize>,
    }

    struct SharedLink {
        written:    Arc<Mutex<Vec<u8>>>,
        fail_after: Arc<AtomicUsize>,
    }

    impl Write for SharedLink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let mut w = self.written.lock().unwrap();
            if w.len() >= self.fail_after.load(Ordering::SeqCst) {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "peer went away"));
            }
            w.extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> { Ok(()) }
    }

    impl Connector for Flaky {
        fn connect(&mut self, addr: &str, _timeout: Duration) -> Result<Link, TelemetryError> {
            self.attempts.lock().unwrap().push(Instant::now());
            if self.online.load(Ordering::SeqCst) {
                Ok(Box::new(SharedLink {
                    written:    Arc::clone(&self.written),
                    fail_after: Arc::clone(&self.fail_after),
                }))
            } else {
                Err(TelemetryError::Connect {
                    addr:   addr.to_string(),
                    source: io::Error::new(io::ErrorKind::ConnectionRefused, "refused"),
                })
            }
        }
    }

    impl Flaky {
        fn offline() -> Self {
            let f = Flaky::default();
            f.fail_after.store(usize::MAX, Ordering::SeqCst);
            f
        }
        fn online() -> Self {
            let f = Flaky::offline();
            f.online.store(true, Ordering::SeqCst);
            f
        }
        fn attempt_count(&self) -> usize {
            self.attempts.lock().unwrap().len()
        }
    }

    /// Takes `delay` to open each link.
    struct Slow {
        inner: Flaky,
        delay: Duration,
    }

    impl Connector for Slow {
        fn connect(&mut self, addr: &str, timeout: Duration) -> Result<Link, TelemetryError> {
            thread::sleep(self.delay);
            self.inner.connect(addr, timeout)
        }
    }

    // ── tests ─────────────────────────────────────────────────────────────

    #[test]
    fn starts_disconnected_and_drops_records() {
        let flaky = Flaky::offline();
        let client = TelemetryClient::new(fast_config(3, 10), Box::new(flaky.clone()));
        assert_eq!(client.state(), ConnectionState::Disconnected);
        client.send(event(Finger::Index));
        assert_eq!(wait_for(&client, |s| *s == TelemetryStatus::Dropped).last(),
                   Some(&TelemetryStatus::Dropped));
        assert_eq!(flaky.attempt_count(), 0);
    }

    #[test]
    fn bounded_retries_then_manual_reconnect_resets_counter() {
        let flaky = Flaky::offline();
        let delay = Duration::from_millis(40);
        let client = TelemetryClient::new(fast_config(3, 40), Box::new(flaky.clone()));

        client.connect();
        wait_for(&client, |s| matches!(s, TelemetryStatus::RetriesExhausted { .. }));

        let times = flaky.attempts.lock().unwrap().clone();
        assert_eq!(times.len(), 3);
        for pair in times.windows(2) {
            assert!(pair[1] - pair[0] >= delay);
        }
        assert_eq!(client.attempts(), 3);
        assert_eq!(client.state(), ConnectionState::Disconnected);

        // No further automatic attempts.
        thread::sleep(delay * 3);
        assert_eq!(flaky.attempt_count(), 3);

        flaky.online.store(true, Ordering::SeqCst);
        client.connect();
        wait_for(&client, |s| matches!(s, TelemetryStatus::Connected { .. }));
        assert_eq!(client.state(), ConnectionState::Connected);
        assert_eq!(client.attempts(), 0);
        assert_eq!(flaky.attempt_count(), 4);
    }

    #[test]
    fn exhausted_client_gets_one_attempt_per_manual_connect() {
        let flaky = Flaky::offline();
        let client = TelemetryClient::new(fast_config(2, 10), Box::new(flaky.clone()));
        client.connect();
        wait_for(&client, |s| matches!(s, TelemetryStatus::RetriesExhausted { .. }));
        assert_eq!(flaky.attempt_count(), 2);

        client.connect();
        wait_for(&client, |s| matches!(s, TelemetryStatus::RetriesExhausted { .. }));
        assert_eq!(flaky.attempt_count(), 3);
        assert_eq!(client.attempts(), 2);
    }

    #[test]
    fn send_failure_disconnects_and_reconnects_without_resending() {
        let flaky = Flaky::online();
        let client = TelemetryClient::new(fast_config(3, 10), Box::new(flaky.clone()));
        client.connect();
        wait_for(&client, |s| matches!(s, TelemetryStatus::Connected { .. }));

        client.send(event(Finger::Index));
        wait_for(&client, |s| matches!(s, TelemetryStatus::Sent { .. }));

        // Break the link: the next write fails.
        let accepted = flaky.written.lock().unwrap().len();
        flaky.fail_after.store(accepted, Ordering::SeqCst);
        client.send(event(Finger::Middle));

        let seen = wait_for(&client, |s| matches!(s, TelemetryStatus::Connected { .. }));
        let failed_at = seen.iter()
            .position(|s| matches!(s, TelemetryStatus::SendFailed { .. }))
            .unwrap();
        let reconnecting = seen.iter()
            .position(|s| matches!(s, TelemetryStatus::Connecting { .. }))
            .unwrap();
        assert!(failed_at < reconnecting);
        assert_eq!(flaky.attempt_count(), 2);

        // Heal the link; the failed record must not reappear.
        flaky.fail_after.store(usize::MAX, Ordering::SeqCst);
        client.send(event(Finger::Ring));
        wait_for(&client, |s| matches!(s, TelemetryStatus::Sent { .. }));

        let written = flaky.written.lock().unwrap().clone();
        let fingers: Vec<Finger> = decode_frames(&written).unwrap()
            .into_iter().map(|e| e.finger).collect();
        assert_eq!(fingers, vec![Finger::Index, Finger::Ring]);
    }

    #[test]
    fn records_sent_while_connecting_are_dropped() {
        let flaky = Flaky::online();
        let slow = Slow { inner: flaky.clone(), delay: Duration::from_millis(300) };
        let client = TelemetryClient::new(fast_config(3, 10), Box::new(slow));

        client.connect();
        thread::sleep(Duration::from_millis(50));
        assert_ne!(client.state(), ConnectionState::Connected);
        for _ in 0..20 {
            assert!(client.send(event(Finger::Index)));
        }

        let mut dropped = 0;
        let deadline = Instant::now() + WAIT;
        while dropped < 20 && Instant::now() < deadline {
            if let Some(TelemetryStatus::Dropped) = client.recv_status(Duration::from_millis(50)) {
                dropped += 1;
            }
        }
        assert_eq!(dropped, 20);
        assert_eq!(client.state(), ConnectionState::Connected);
        assert!(flaky.written.lock().unwrap().is_empty());

        // Records queued after the link is up go out.
        client.send(event(Finger::Ring));
        wait_for(&client, |s| matches!(s, TelemetryStatus::Sent { .. }));
        let written = flaky.written.lock().unwrap().clone();
        let fingers: Vec<Finger> = decode_frames(&written).unwrap()
            .into_iter().map(|e| e.finger).collect();
        assert_eq!(fingers, vec![Finger::Ring]);
    }

    #[test]
    fn full_queue_drops_at_the_handle() {
        let slow = Slow { inner: Flaky::online(), delay: Duration::from_millis(500) };
        let client = TelemetryClient::new(fast_config(3, 10), Box::new(slow));

        client.connect();
        thread::sleep(Duration::from_millis(50));
        let accepted = (0..INTENT_CAPACITY + 5)
            .filter(|_| client.send(event(Finger::Index)))
            .count();
        assert_eq!(accepted, INTENT_CAPACITY);
    }

    #[test]
    fn shutdown_cancels_backoff() {
        let flaky = Flaky::offline();
        let mut client = TelemetryClient::new(fast_config(3, 10_000), Box::new(flaky.clone()));
        client.connect();
        wait_for(&client, |s| matches!(s, TelemetryStatus::ConnectFailed { .. }));

        let started = Instant::now();
        client.shutdown();
        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(flaky.attempt_count(), 1);
        assert_eq!(client.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn replay_buffer_flushes_after_reconnect() {
        let flaky = Flaky::offline();
        let cfg = TelemetryConfig { replay_capacity: 2, ..fast_config(1, 10) };
        let client = TelemetryClient::new(cfg, Box::new(flaky.clone()));

        client.send(event(Finger::Index));
        client.send(event(Finger::Middle));
        client.send(event(Finger::Ring));   // evicts Index
        wait_for(&client, |s| *s == TelemetryStatus::Dropped);

        flaky.online.store(true, Ordering::SeqCst);
        client.connect();
        wait_for(&client, |s| *s == TelemetryStatus::Replayed { count: 2 });

        let written = flaky.written.lock().unwrap().clone();
        let fingers: Vec<Finger> = decode_frames(&written).unwrap()
            .into_iter().map(|e| e.finger).collect();
        assert_eq!(fingers, vec![Finger::Middle, Finger::Ring]);
    }

    #[test]
    fn tcp_stream_receives_newline_delimited_json() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let cfg = TelemetryConfig { port, ..fast_config(3, 10) };

        let mut client = TelemetryClient::start(cfg);
        let (mut peer, _) = listener.accept().unwrap();
        wait_for(&client, |s| matches!(s, TelemetryStatus::Connected { .. }));

        client.send(event(Finger::Index));
        client.send(event(Finger::Pinky));
        client.shutdown();

        let mut received = Vec::new();
        peer.read_to_end(&mut received).unwrap();
        let events = decode_frames(&received).unwrap();
        assert_eq!(events, vec![event(Finger::Index), event(Finger::Pinky)]);
    }
}
