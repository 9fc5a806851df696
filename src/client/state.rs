use crate::websocket::TransportEvent;

/// Identifies one connection attempt. Bumped every time a socket is opened so
/// callbacks from a superseded attempt can be recognised and dropped.
pub type Generation = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Idle,
    Connecting,
    Open,
    Closing,
    Closed,
}

/// Everything the driver feeds back into the connector besides caller commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectorEvent {
    Transport {
        generation: Generation,
        event: TransportEvent,
    },
    RetryElapsed {
        generation: Generation,
    },
}

/// Mutable state owned by one connector.
///
/// Holds at most one socket and at most one pending retry timer.
pub struct ConnectionState<K, H> {
    pub status: ConnectionStatus,
    pub attempt_count: u32,
    pub generation: Generation,

    /// Set by a caller `close()`; forces the next close to count as clean
    pub clean_intent: bool,

    /// `open()` arrived while closing; connect again once the socket is gone
    pub reopen_requested: bool,

    pub socket: Option<K>,
    pub pending_retry: Option<H>,
}

impl<K, H> ConnectionState<K, H> {
    pub fn new() -> Self {
        Self {
            status: ConnectionStatus::Idle,
            attempt_count: 0,
            generation: 0,
            clean_intent: false,
            reopen_requested: false,
            socket: None,
            pending_retry: None,
        }
    }
}

impl<K, H> Default for ConnectionState<K, H> {
    fn default() -> Self {
        Self::new()
    }
}
