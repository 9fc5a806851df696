use crate::types::{ChannelError, ChannelMessage};
use std::time::Duration;

/// Details of a connection closing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CloseEvent {
    /// Caller-initiated, or a normal close reported by the server
    pub clean: bool,
    pub code: Option<u16>,
    pub reason: String,
    /// Delay until the scheduled reconnect, if one was scheduled
    pub retry_in: Option<Duration>,
    /// Terminal close after the reconnect budget ran out
    pub retries_exhausted: bool,
}

/// Receives everything a connector observes.
///
/// Callbacks run on the connector's driver task, one at a time and in
/// arrival order.
pub trait ChannelHandler: Send {
    fn on_message(&mut self, message: ChannelMessage);

    fn on_open(&mut self) {}

    fn on_close(&mut self, event: CloseEvent) {
        let _ = event;
    }

    fn on_error(&mut self, error: ChannelError) {
        let _ = error;
    }
}

type MessageCallback = Box<dyn FnMut(ChannelMessage) + Send + 'static>;
type OpenCallback = Box<dyn FnMut() + Send + 'static>;
type CloseCallback = Box<dyn FnMut(CloseEvent) + Send + 'static>;
type ErrorCallback = Box<dyn FnMut(ChannelError) + Send + 'static>;

/// Closure-based [`ChannelHandler`].
///
/// ```
/// use challenge_wave_realtime::Handlers;
///
/// let handlers = Handlers::new(|message| println!("got {}", message.kind()))
///     .on_open(|| println!("connected"))
///     .on_error(|error| eprintln!("channel error: {}", error));
/// # drop(handlers);
/// ```
pub struct Handlers {
    on_message: MessageCallback,
    on_open: Option<OpenCallback>,
    on_close: Option<CloseCallback>,
    on_error: Option<ErrorCallback>,
}

impl Handlers {
    pub fn new<F>(on_message: F) -> Self
    where
        F: FnMut(ChannelMessage) + Send + 'static,
    {
        Self {
            on_message: Box::new(on_message),
            on_open: None,
            on_close: None,
            on_error: None,
        }
    }

    pub fn on_open<F>(mut self, callback: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        self.on_open = Some(Box::new(callback));
        self
    }

    pub fn on_close<F>(mut self, callback: F) -> Self
    where
        F: FnMut(CloseEvent) + Send + 'static,
    {
        self.on_close = Some(Box::new(callback));
        self
    }

    pub fn on_error<F>(mut self, callback: F) -> Self
    where
        F: FnMut(ChannelError) + Send + 'static,
    {
        self.on_error = Some(Box::new(callback));
        self
    }
}

impl ChannelHandler for Handlers {
    fn on_message(&mut self, message: ChannelMessage) {
        (self.on_message)(message);
    }

    fn on_open(&mut self) {
        if let Some(callback) = self.on_open.as_mut() {
            callback();
        }
    }

    fn on_close(&mut self, event: CloseEvent) {
        if let Some(callback) = self.on_close.as_mut() {
            callback(event);
        }
    }

    fn on_error(&mut self, error: ChannelError) {
        match self.on_error.as_mut() {
            Some(callback) => callback(error),
            None => tracing::debug!("Unhandled channel error: {}", error),
        }
    }
}
