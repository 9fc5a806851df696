use super::{ChannelConfig, ChannelHandler, ConnectionStatus, ConnectorCore, ConnectorEvent};
use crate::infrastructure::{Scheduler, TokioScheduler};
use crate::types::client_events;
use crate::websocket::{Transport, WebSocketTransport};
use serde_json::Value;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::{self, Interval, MissedTickBehavior};
use url::Url;

#[derive(Debug)]
enum Command {
    Open,
    Send(Value),
    Close,
}

/// Handle to one resilient real-time channel.
///
/// `ChannelConnector` keeps a single logical WebSocket connection to the game
/// backend, reconnects with bounded exponential backoff after unclean
/// disconnects, and delivers decoded messages to the registered
/// [`ChannelHandler`] in arrival order.
///
/// All operations return immediately; outcomes are reported through the
/// handler. Handles are cheap to clone. When the last one is dropped the
/// connection is closed and pending timers are cancelled.
///
/// # Example
///
/// ```no_run
/// use challenge_wave_realtime::{ChannelConfig, ChannelConnector, ChannelOptions, Handlers};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ChannelConfig::new("https://play.example.com", "/lobby", ChannelOptions::default())?;
/// let lobby = ChannelConnector::connect(
///     config,
///     Handlers::new(|message| println!("received {}", message.kind())),
/// );
///
/// lobby.send(serde_json::json!({ "type": "ping" }));
/// lobby.close();
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ChannelConnector {
    url: Url,
    commands: mpsc::UnboundedSender<Command>,
    status: watch::Receiver<ConnectionStatus>,
}

impl ChannelConnector {
    /// Creates an idle connector backed by tokio-tungstenite.
    ///
    /// Spawns the driver task, so it must be called inside a tokio runtime.
    /// No connection is made until [`open()`](Self::open).
    pub fn new(config: ChannelConfig, handler: impl ChannelHandler + 'static) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let transport = WebSocketTransport::new(events_tx.clone(), config.close_timeout());
        let scheduler = TokioScheduler::new(events_tx);
        let core = ConnectorCore::new(config, Box::new(handler), transport, scheduler);
        Self::spawn(core, events_rx)
    }

    /// Creates a connector and immediately starts connecting
    pub fn connect(config: ChannelConfig, handler: impl ChannelHandler + 'static) -> Self {
        let connector = Self::new(config, handler);
        connector.open();
        connector
    }

    /// Runs `core` on its own driver task.
    ///
    /// `events` must receive everything the core's transport and scheduler emit.
    pub fn spawn<T, S>(
        mut core: ConnectorCore<T, S>,
        events: mpsc::UnboundedReceiver<ConnectorEvent>,
    ) -> Self
    where
        T: Transport + Send + 'static,
        T::Socket: Send,
        S: Scheduler + Send + 'static,
        S::Handle: Send,
    {
        let url = core.config().url().clone();
        let keepalive = core.config().keepalive_interval();
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (status_tx, status_rx) = watch::channel(core.status());
        core.set_status_sink(status_tx);

        tokio::spawn(drive(core, commands_rx, events, keepalive));

        Self {
            url,
            commands: commands_tx,
            status: status_rx,
        }
    }

    /// Start connecting. Idempotent while connecting or open.
    pub fn open(&self) {
        self.command(Command::Open);
    }

    /// Send `message` as a JSON text frame.
    ///
    /// Only transmitted while the channel is open; otherwise the message is
    /// dropped with a warning. Never fails.
    pub fn send(&self, message: impl Into<Value>) {
        self.command(Command::Send(message.into()));
    }

    /// Close the channel. No reconnect follows. Idempotent.
    pub fn close(&self) {
        self.command(Command::Close);
    }

    pub fn is_open(&self) -> bool {
        *self.status.borrow() == ConnectionStatus::Open
    }

    pub fn status(&self) -> ConnectionStatus {
        *self.status.borrow()
    }

    /// Subscribe to status transitions
    pub fn watch_status(&self) -> watch::Receiver<ConnectionStatus> {
        self.status.clone()
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    fn command(&self, command: Command) {
        if let Err(e) = self.commands.send(command) {
            tracing::debug!("Connector driver has stopped, dropping {:?}", e.0);
        }
    }
}

async fn drive<T, S>(
    mut core: ConnectorCore<T, S>,
    mut commands: mpsc::UnboundedReceiver<Command>,
    mut events: mpsc::UnboundedReceiver<ConnectorEvent>,
    keepalive: Option<Duration>,
) where
    T: Transport,
    S: Scheduler,
{
    tracing::debug!("Starting connector driver for {}", core.config().url());
    let mut keepalive = keepalive.map(|period| {
        let mut interval = time::interval_at(time::Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        interval
    });

    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(Command::Open) => core.open(),
                Some(Command::Send(message)) => core.send(&message),
                Some(Command::Close) => core.close(),
                None => {
                    tracing::info!("All connector handles dropped, closing channel");
                    core.close();
                    break;
                }
            },
            Some(event) = events.recv() => core.handle_event(event),
            _ = next_tick(&mut keepalive) => {
                if core.is_open() {
                    tracing::debug!("Sending keepalive ping");
                    core.send(&serde_json::json!({ "type": client_events::PING }));
                }
            }
        }
    }

    tracing::debug!("Connector driver finished");
}

async fn next_tick(interval: &mut Option<Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}
