use super::{ChannelConfig, ChannelHandler, CloseEvent, ConnectionState, ConnectionStatus};
use super::{ConnectorEvent, Generation};
use crate::infrastructure::{Backoff, Scheduler};
use crate::types::{ChannelError, ChannelMessage, encode};
use crate::websocket::{Socket, Transport, TransportEvent};
use serde_json::Value;
use tokio::sync::watch;

/// The connector state machine.
///
/// Synchronous and single-owner: every caller operation and every transport
/// or timer notification is a `&mut self` call, so the state needs no locks.
/// [`ChannelConnector`](super::ChannelConnector) drives it from one tokio task.
pub struct ConnectorCore<T: Transport, S: Scheduler> {
    config: ChannelConfig,
    backoff: Backoff,
    handler: Box<dyn ChannelHandler>,
    transport: T,
    scheduler: S,
    state: ConnectionState<T::Socket, S::Handle>,
    status_sink: Option<watch::Sender<ConnectionStatus>>,
}

impl<T: Transport, S: Scheduler> ConnectorCore<T, S> {
    pub fn new(
        config: ChannelConfig,
        handler: Box<dyn ChannelHandler>,
        transport: T,
        scheduler: S,
    ) -> Self {
        Self {
            backoff: config.backoff(),
            config,
            handler,
            transport,
            scheduler,
            state: ConnectionState::new(),
            status_sink: None,
        }
    }

    /// Publish every status transition to `sink` before any handler
    /// callback that follows it runs.
    pub fn set_status_sink(&mut self, sink: watch::Sender<ConnectionStatus>) {
        sink.send_replace(self.state.status);
        self.status_sink = Some(sink);
    }

    pub fn status(&self) -> ConnectionStatus {
        self.state.status
    }

    pub fn is_open(&self) -> bool {
        self.state.status == ConnectionStatus::Open
    }

    pub fn attempt_count(&self) -> u32 {
        self.state.attempt_count
    }

    pub fn generation(&self) -> Generation {
        self.state.generation
    }

    pub fn has_pending_retry(&self) -> bool {
        self.state.pending_retry.is_some()
    }

    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }

    /// Start connecting. No-op while already connecting or open.
    pub fn open(&mut self) {
        match self.state.status {
            ConnectionStatus::Connecting | ConnectionStatus::Open => {
                tracing::debug!("Already connecting or connected, ignoring open");
                return;
            }
            ConnectionStatus::Closing => {
                tracing::debug!(
                    generation = self.state.generation,
                    "Close in progress, reconnecting once the socket is gone"
                );
                self.state.reopen_requested = true;
                self.state.attempt_count = 0;
                self.cancel_retry();
                return;
            }
            ConnectionStatus::Idle | ConnectionStatus::Closed => {}
        }

        self.state.clean_intent = false;
        self.state.attempt_count = 0;
        self.cancel_retry();
        self.connect();
    }

    /// Encode and transmit `message` if open; otherwise drop it with a warning.
    pub fn send(&mut self, message: &Value) {
        if self.state.status != ConnectionStatus::Open {
            tracing::warn!(
                status = ?self.state.status,
                "Channel is not open, dropping outbound message"
            );
            return;
        }

        let text = match encode(message) {
            Ok(text) => text,
            Err(e) => {
                tracing::error!("Failed to encode outbound message: {}", e);
                self.handler.on_error(e);
                return;
            }
        };

        let Some(socket) = self.state.socket.as_mut() else {
            tracing::warn!("Channel reports open without a socket, dropping outbound message");
            return;
        };
        if let Err(e) = socket.send_text(text) {
            tracing::error!("Failed to send message: {}", e);
            self.handler.on_error(e);
        }
    }

    /// Caller-initiated teardown. Never schedules a reconnect.
    pub fn close(&mut self) {
        self.state.clean_intent = true;
        self.state.reopen_requested = false;
        self.cancel_retry();

        match self.state.status {
            ConnectionStatus::Connecting | ConnectionStatus::Open => {
                match self.state.socket.as_mut() {
                    Some(socket) => {
                        tracing::info!("Closing channel {}", self.config.url());
                        socket.close();
                        self.set_status(ConnectionStatus::Closing);
                    }
                    None => self.set_status(ConnectionStatus::Closed),
                }
            }
            ConnectionStatus::Closing => {
                tracing::debug!("Close already in progress");
            }
            ConnectionStatus::Idle | ConnectionStatus::Closed => {
                tracing::debug!(status = ?self.state.status, "Nothing to close");
            }
        }
    }

    pub fn handle_event(&mut self, event: ConnectorEvent) {
        match event {
            ConnectorEvent::Transport { generation, event } => {
                self.handle_transport_event(generation, event)
            }
            ConnectorEvent::RetryElapsed { generation } => self.handle_retry_elapsed(generation),
        }
    }

    pub fn handle_transport_event(&mut self, generation: Generation, event: TransportEvent) {
        if generation != self.state.generation || self.state.socket.is_none() {
            tracing::debug!(
                generation,
                current = self.state.generation,
                "Ignoring stale transport event: {:?}",
                event
            );
            return;
        }

        match event {
            TransportEvent::Opened => self.on_transport_open(),
            TransportEvent::Frame(text) => self.on_frame(text),
            TransportEvent::Error(message) => {
                tracing::error!("Transport error: {}", message);
                self.handler.on_error(ChannelError::Transport(message));
            }
            TransportEvent::Closed {
                clean,
                code,
                reason,
            } => self.on_transport_close(clean, code, reason),
        }
    }

    pub fn handle_retry_elapsed(&mut self, generation: Generation) {
        if self.state.pending_retry.is_none()
            || generation != self.state.generation
            || self.state.clean_intent
        {
            tracing::debug!(generation, "Ignoring stale retry timer");
            return;
        }

        self.state.pending_retry = None;
        tracing::info!(
            attempt = self.state.attempt_count,
            "Attempting to reconnect..."
        );
        self.connect();
    }

    fn connect(&mut self) {
        self.state.generation += 1;
        let generation = self.state.generation;
        tracing::info!(generation, "Connecting to {}", self.config.url());

        self.state.socket = Some(self.transport.connect(self.config.url(), generation));
        self.set_status(ConnectionStatus::Connecting);
    }

    fn set_status(&mut self, status: ConnectionStatus) {
        self.state.status = status;
        if let Some(sink) = &self.status_sink {
            sink.send_if_modified(|published| {
                if *published == status {
                    false
                } else {
                    *published = status;
                    true
                }
            });
        }
    }

    fn cancel_retry(&mut self) {
        if let Some(handle) = self.state.pending_retry.take() {
            tracing::debug!("Cancelling pending reconnect");
            self.scheduler.cancel(handle);
        }
    }

    fn on_transport_open(&mut self) {
        if self.state.status != ConnectionStatus::Connecting {
            tracing::debug!(
                status = ?self.state.status,
                "Handshake completed after close was requested, ignoring"
            );
            return;
        }

        self.set_status(ConnectionStatus::Open);
        self.state.attempt_count = 0;
        tracing::info!("Connected to {}", self.config.url());
        self.handler.on_open();
    }

    fn on_frame(&mut self, text: String) {
        if !matches!(
            self.state.status,
            ConnectionStatus::Open | ConnectionStatus::Closing
        ) {
            tracing::debug!(status = ?self.state.status, "Dropping frame received before open");
            return;
        }

        match ChannelMessage::decode(&text) {
            Ok(message) => {
                tracing::debug!("Dispatching '{}' message", message.kind());
                self.handler.on_message(message);
            }
            Err(e) => {
                tracing::warn!("Failed to decode message: {} - Raw: {}", e, text);
                self.handler.on_error(e);
            }
        }
    }

    fn on_transport_close(&mut self, transport_clean: bool, code: Option<u16>, reason: String) {
        self.state.socket = None;
        self.set_status(ConnectionStatus::Closed);

        if self.state.clean_intent || transport_clean {
            tracing::info!("Channel closed cleanly");
            self.handler.on_close(CloseEvent {
                clean: true,
                code,
                reason,
                ..Default::default()
            });
            if std::mem::take(&mut self.state.reopen_requested) {
                self.state.clean_intent = false;
                self.connect();
            }
            return;
        }

        tracing::warn!(?code, "Channel closed uncleanly");
        let options = self.config.options();

        if !options.auto_reconnect {
            self.handler.on_close(CloseEvent {
                clean: false,
                code,
                reason,
                ..Default::default()
            });
            return;
        }

        if self.state.attempt_count < options.max_reconnect_attempts {
            self.state.attempt_count += 1;
            let delay = self.backoff.delay_for(self.state.attempt_count);
            tracing::info!(
                attempt = self.state.attempt_count,
                max_attempts = options.max_reconnect_attempts,
                "Scheduling reconnect in {:?}",
                delay
            );
            let handle = self.scheduler.schedule(delay, self.state.generation);
            self.state.pending_retry = Some(handle);
            self.handler.on_close(CloseEvent {
                clean: false,
                code,
                reason,
                retry_in: Some(delay),
                retries_exhausted: false,
            });
        } else {
            let attempts = self.state.attempt_count;
            tracing::error!(attempts, "Reconnect attempts exhausted, giving up");
            self.handler
                .on_error(ChannelError::RetryExhausted { attempts });
            self.handler.on_close(CloseEvent {
                clean: false,
                code,
                reason,
                retry_in: None,
                retries_exhausted: true,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ChannelOptions;
    use crate::types::Result;
    use serde_json::json;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use url::Url;

    #[derive(Debug, Clone, PartialEq)]
    enum Observed {
        Open,
        Message(String),
        Close(CloseEvent),
        DecodeError,
        TransportError(String),
        RetryExhausted(u32),
        OtherError,
    }

    #[derive(Default)]
    struct Log {
        connects: Vec<(String, Generation)>,
        sent: Vec<String>,
        socket_closes: usize,
        scheduled: Vec<(Duration, Generation)>,
        cancelled: Vec<usize>,
        observed: Vec<Observed>,
    }

    #[derive(Clone, Default)]
    struct Recorder(Arc<Mutex<Log>>);

    impl Recorder {
        fn log(&self) -> std::sync::MutexGuard<'_, Log> {
            self.0.lock().unwrap()
        }

        fn delays_ms(&self) -> Vec<u64> {
            self.log()
                .scheduled
                .iter()
                .map(|(delay, _)| delay.as_millis() as u64)
                .collect()
        }
    }

    struct MockTransport(Recorder);
    struct MockSocket(Recorder);
    struct MockScheduler(Recorder);
    struct MockHandler(Recorder);

    impl Transport for MockTransport {
        type Socket = MockSocket;

        fn connect(&mut self, url: &Url, generation: Generation) -> MockSocket {
            self.0.log().connects.push((url.to_string(), generation));
            MockSocket(self.0.clone())
        }
    }

    impl Socket for MockSocket {
        fn send_text(&mut self, text: String) -> Result<()> {
            self.0.log().sent.push(text);
            Ok(())
        }

        fn close(&mut self) {
            self.0.log().socket_closes += 1;
        }
    }

    impl Scheduler for MockScheduler {
        type Handle = usize;

        fn schedule(&mut self, delay: Duration, generation: Generation) -> usize {
            let mut log = self.0.log();
            log.scheduled.push((delay, generation));
            log.scheduled.len() - 1
        }

        fn cancel(&mut self, handle: usize) {
            self.0.log().cancelled.push(handle);
        }
    }

    impl ChannelHandler for MockHandler {
        fn on_message(&mut self, message: ChannelMessage) {
            self.0
                .log()
                .observed
                .push(Observed::Message(message.kind().to_string()));
        }

        fn on_open(&mut self) {
            self.0.log().observed.push(Observed::Open);
        }

        fn on_close(&mut self, event: CloseEvent) {
            self.0.log().observed.push(Observed::Close(event));
        }

        fn on_error(&mut self, error: ChannelError) {
            let observed = match error {
                ChannelError::Decode { .. } => Observed::DecodeError,
                ChannelError::Transport(message) => Observed::TransportError(message),
                ChannelError::RetryExhausted { attempts } => Observed::RetryExhausted(attempts),
                _ => Observed::OtherError,
            };
            self.0.log().observed.push(observed);
        }
    }

    type TestCore = ConnectorCore<MockTransport, MockScheduler>;

    fn core_with(options: ChannelOptions) -> (TestCore, Recorder) {
        let recorder = Recorder::default();
        let config = ChannelConfig::new("https://play.example.com", "/room-1", options).unwrap();
        let core = ConnectorCore::new(
            config,
            Box::new(MockHandler(recorder.clone())),
            MockTransport(recorder.clone()),
            MockScheduler(recorder.clone()),
        );
        (core, recorder)
    }

    fn default_core() -> (TestCore, Recorder) {
        core_with(ChannelOptions::default())
    }

    fn opened(core: &mut TestCore) {
        let generation = core.generation();
        core.handle_transport_event(generation, TransportEvent::Opened);
    }

    fn frame(core: &mut TestCore, text: &str) {
        let generation = core.generation();
        core.handle_transport_event(generation, TransportEvent::Frame(text.to_string()));
    }

    fn closed(core: &mut TestCore, clean: bool) {
        let generation = core.generation();
        core.handle_transport_event(
            generation,
            TransportEvent::Closed {
                clean,
                code: None,
                reason: String::new(),
            },
        );
    }

    fn fire_retry(core: &mut TestCore) {
        let generation = core.generation();
        core.handle_retry_elapsed(generation);
    }

    #[test]
    fn test_open_connects_once() {
        let (mut core, recorder) = default_core();
        assert_eq!(core.status(), ConnectionStatus::Idle);

        core.open();
        assert_eq!(core.status(), ConnectionStatus::Connecting);
        core.open();
        opened(&mut core);
        core.open();

        assert!(core.is_open());
        let log = recorder.log();
        assert_eq!(log.connects.len(), 1);
        assert_eq!(log.connects[0].0, "wss://play.example.com/ws/room-1");
        assert_eq!(log.observed, vec![Observed::Open]);
    }

    #[test]
    fn test_send_while_connecting_is_noop() {
        let (mut core, recorder) = default_core();
        core.open();

        core.send(&json!({"type": "ping"}));

        assert_eq!(core.status(), ConnectionStatus::Connecting);
        assert!(recorder.log().sent.is_empty());
        assert!(recorder.log().observed.is_empty());
    }

    #[test]
    fn test_send_while_open_transmits_json() {
        let (mut core, recorder) = default_core();
        core.open();
        opened(&mut core);

        core.send(&json!({"type": "ping"}));

        assert_eq!(recorder.log().sent, vec![r#"{"type":"ping"}"#.to_string()]);
    }

    #[test]
    fn test_messages_delivered_in_arrival_order() {
        let (mut core, recorder) = default_core();
        core.open();
        opened(&mut core);

        frame(&mut core, r#"{"type":"a"}"#);
        frame(&mut core, r#"{"type":"b"}"#);
        frame(&mut core, r#"{"type":"c"}"#);

        assert_eq!(
            recorder.log().observed,
            vec![
                Observed::Open,
                Observed::Message("a".into()),
                Observed::Message("b".into()),
                Observed::Message("c".into()),
            ]
        );
    }

    #[test]
    fn test_malformed_frame_reports_one_decode_error() {
        let (mut core, recorder) = default_core();
        core.open();
        opened(&mut core);

        frame(&mut core, "{oops");
        frame(&mut core, r#"{"type":"after"}"#);

        assert_eq!(core.status(), ConnectionStatus::Open);
        assert_eq!(
            recorder.log().observed,
            vec![
                Observed::Open,
                Observed::DecodeError,
                Observed::Message("after".into()),
            ]
        );
    }

    #[test]
    fn test_transport_error_does_not_reconnect() {
        let (mut core, recorder) = default_core();
        core.open();
        opened(&mut core);

        let generation = core.generation();
        core.handle_transport_event(generation, TransportEvent::Error("reset".into()));

        assert!(core.is_open());
        assert!(recorder.log().scheduled.is_empty());
        assert_eq!(
            recorder.log().observed.last(),
            Some(&Observed::TransportError("reset".into()))
        );
    }

    #[test]
    fn test_backoff_scenario_then_exhausted() {
        let (mut core, recorder) = core_with(ChannelOptions {
            initial_backoff_ms: 1000,
            max_backoff_ms: 8000,
            max_reconnect_attempts: 4,
            ..Default::default()
        });
        core.open();
        opened(&mut core);

        for _ in 0..4 {
            closed(&mut core, false);
            fire_retry(&mut core);
        }
        assert_eq!(recorder.delays_ms(), vec![1000, 2000, 4000, 8000]);
        assert_eq!(core.attempt_count(), 4);
        assert_eq!(core.status(), ConnectionStatus::Connecting);

        closed(&mut core, false);

        assert_eq!(recorder.delays_ms().len(), 4);
        assert_eq!(core.status(), ConnectionStatus::Closed);
        assert!(!core.has_pending_retry());
        assert_eq!(recorder.log().connects.len(), 5);

        let log = recorder.log();
        let tail = &log.observed[log.observed.len() - 2..];
        assert_eq!(tail[0], Observed::RetryExhausted(4));
        match &tail[1] {
            Observed::Close(event) => {
                assert!(!event.clean);
                assert!(event.retries_exhausted);
                assert_eq!(event.retry_in, None);
            }
            other => panic!("expected terminal close, got {:?}", other),
        }
    }

    #[test]
    fn test_close_event_carries_retry_delay() {
        let (mut core, recorder) = default_core();
        core.open();
        opened(&mut core);
        closed(&mut core, false);

        let log = recorder.log();
        match log.observed.last() {
            Some(Observed::Close(event)) => {
                assert!(!event.clean);
                assert_eq!(event.retry_in, Some(Duration::from_millis(1000)));
                assert!(!event.retries_exhausted);
            }
            other => panic!("expected close, got {:?}", other),
        }
    }

    #[test]
    fn test_successful_open_resets_backoff() {
        let (mut core, recorder) = default_core();
        core.open();
        opened(&mut core);

        closed(&mut core, false);
        fire_retry(&mut core);
        closed(&mut core, false);
        fire_retry(&mut core);
        assert_eq!(core.attempt_count(), 2);

        opened(&mut core);
        assert_eq!(core.attempt_count(), 0);

        closed(&mut core, false);
        assert_eq!(recorder.delays_ms(), vec![1000, 2000, 1000]);
    }

    #[test]
    fn test_close_cancels_pending_retry() {
        let (mut core, recorder) = default_core();
        core.open();
        opened(&mut core);
        closed(&mut core, false);
        assert!(core.has_pending_retry());

        core.close();
        assert!(!core.has_pending_retry());
        assert_eq!(recorder.log().cancelled, vec![0]);

        // A timer that already fired before the cancel is ignored too
        fire_retry(&mut core);
        assert_eq!(core.status(), ConnectionStatus::Closed);
        assert_eq!(recorder.log().connects.len(), 1);
    }

    #[test]
    fn test_close_then_unclean_transport_close_is_clean() {
        let (mut core, recorder) = default_core();
        core.open();
        opened(&mut core);

        core.close();
        assert_eq!(core.status(), ConnectionStatus::Closing);
        assert_eq!(recorder.log().socket_closes, 1);

        closed(&mut core, false);

        assert_eq!(core.status(), ConnectionStatus::Closed);
        assert!(recorder.log().scheduled.is_empty());
        match recorder.log().observed.last() {
            Some(Observed::Close(event)) => assert!(event.clean),
            other => panic!("expected close, got {:?}", other),
        }
    }

    #[test]
    fn test_close_is_idempotent() {
        let (mut core, recorder) = default_core();
        core.open();
        opened(&mut core);

        core.close();
        core.close();
        closed(&mut core, true);
        core.close();

        assert_eq!(recorder.log().socket_closes, 1);
        assert_eq!(core.status(), ConnectionStatus::Closed);
    }

    #[test]
    fn test_close_while_connecting_ignores_late_open() {
        let (mut core, recorder) = default_core();
        core.open();
        core.close();

        opened(&mut core);
        assert_eq!(core.status(), ConnectionStatus::Closing);
        closed(&mut core, false);

        assert_eq!(core.status(), ConnectionStatus::Closed);
        assert!(recorder.log().scheduled.is_empty());
        assert!(!recorder.log().observed.contains(&Observed::Open));
    }

    #[test]
    fn test_server_normal_close_does_not_reconnect() {
        let (mut core, recorder) = default_core();
        core.open();
        opened(&mut core);

        closed(&mut core, true);

        assert_eq!(core.status(), ConnectionStatus::Closed);
        assert!(recorder.log().scheduled.is_empty());
    }

    #[test]
    fn test_auto_reconnect_disabled() {
        let (mut core, recorder) = core_with(ChannelOptions {
            auto_reconnect: false,
            ..Default::default()
        });
        core.open();
        opened(&mut core);
        closed(&mut core, false);

        assert!(recorder.log().scheduled.is_empty());
        match recorder.log().observed.last() {
            Some(Observed::Close(event)) => {
                assert!(!event.clean);
                assert!(!event.retries_exhausted);
            }
            other => panic!("expected close, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_attempts_disables_reconnect() {
        let (mut core, recorder) = core_with(ChannelOptions {
            max_reconnect_attempts: 0,
            ..Default::default()
        });
        core.open();
        opened(&mut core);
        closed(&mut core, false);

        assert!(recorder.log().scheduled.is_empty());
        assert!(recorder.log().observed.contains(&Observed::RetryExhausted(0)));
    }

    #[test]
    fn test_open_while_closing_waits_for_socket_to_finish() {
        let (mut core, recorder) = default_core();
        core.open();
        opened(&mut core);
        let first = core.generation();

        core.close();
        core.open();
        assert_eq!(core.status(), ConnectionStatus::Closing);
        assert_eq!(recorder.log().connects.len(), 1);

        // Frames still drain from the closing socket
        frame(&mut core, r#"{"type":"last"}"#);
        assert_eq!(recorder.log().connects.len(), 1);

        closed(&mut core, false);

        assert_eq!(core.status(), ConnectionStatus::Connecting);
        assert_ne!(core.generation(), first);
        assert_eq!(recorder.log().connects.len(), 2);
        assert!(recorder.log().scheduled.is_empty());

        // Late traffic tagged with the old generation is ignored
        core.handle_transport_event(first, TransportEvent::Frame(r#"{"type":"old"}"#.into()));
        opened(&mut core);

        let log = recorder.log();
        assert!(!log.observed.contains(&Observed::Message("old".into())));
        assert_eq!(
            &log.observed[1..],
            &[
                Observed::Message("last".into()),
                Observed::Close(CloseEvent {
                    clean: true,
                    ..Default::default()
                }),
                Observed::Open,
            ]
        );
    }

    #[test]
    fn test_close_after_reopen_request_stays_closed() {
        let (mut core, recorder) = default_core();
        core.open();
        opened(&mut core);

        core.close();
        core.open();
        core.close();
        closed(&mut core, true);

        assert_eq!(core.status(), ConnectionStatus::Closed);
        assert_eq!(recorder.log().connects.len(), 1);
    }

    #[test]
    fn test_status_is_published_before_callbacks_run() {
        let (sink, status) = watch::channel(ConnectionStatus::Idle);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_on_open = Arc::clone(&seen);
        let seen_on_close = Arc::clone(&seen);
        let status_on_close = status.clone();
        let handler = crate::client::Handlers::new(|_| {})
            .on_open(move || seen_on_open.lock().unwrap().push(*status.borrow()))
            .on_close(move |_| seen_on_close.lock().unwrap().push(*status_on_close.borrow()));

        let recorder = Recorder::default();
        let config =
            ChannelConfig::new("https://play.example.com", "/room-1", ChannelOptions::default())
                .unwrap();
        let mut core = ConnectorCore::new(
            config,
            Box::new(handler),
            MockTransport(recorder.clone()),
            MockScheduler(recorder.clone()),
        );
        core.set_status_sink(sink);

        core.open();
        opened(&mut core);
        closed(&mut core, false);

        assert_eq!(
            *seen.lock().unwrap(),
            vec![ConnectionStatus::Open, ConnectionStatus::Closed]
        );
    }

    #[test]
    fn test_explicit_open_after_exhaustion_starts_fresh() {
        let (mut core, recorder) = core_with(ChannelOptions {
            max_reconnect_attempts: 1,
            ..Default::default()
        });
        core.open();
        opened(&mut core);
        closed(&mut core, false);
        fire_retry(&mut core);
        closed(&mut core, false);
        assert_eq!(core.status(), ConnectionStatus::Closed);

        core.open();
        assert_eq!(core.attempt_count(), 0);
        closed(&mut core, false);

        assert_eq!(recorder.delays_ms(), vec![1000, 1000]);
    }

    #[test]
    fn test_retry_reuses_endpoint() {
        let (mut core, recorder) = default_core();
        core.open();
        closed(&mut core, false);
        fire_retry(&mut core);

        let log = recorder.log();
        assert_eq!(log.connects.len(), 2);
        assert_eq!(log.connects[0].0, log.connects[1].0);
        assert!(log.connects[1].1 > log.connects[0].1);
    }
}
