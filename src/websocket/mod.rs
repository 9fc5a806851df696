// WebSocket module - transport seam between the connector and the network
mod factory;

pub use factory::{WebSocketSocket, WebSocketTransport};

use crate::client::Generation;
use crate::types::Result;
use url::Url;

/// Notifications a transport delivers for one connection attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// Handshake completed
    Opened,
    /// Text frame received
    Frame(String),
    /// Transport-level failure; a `Closed` event follows when the socket is gone
    Error(String),
    /// Socket is gone. `clean` is the transport's own view (normal close code).
    Closed {
        clean: bool,
        code: Option<u16>,
        reason: String,
    },
}

/// Opens sockets for the connector.
///
/// `connect` must return immediately; the outcome arrives later as
/// [`TransportEvent`]s tagged with `generation`.
pub trait Transport {
    type Socket: Socket;

    fn connect(&mut self, url: &Url, generation: Generation) -> Self::Socket;
}

/// Handle to one live (or pending) socket.
pub trait Socket {
    /// Queue a text frame
    fn send_text(&mut self, text: String) -> Result<()>;

    /// Begin the close handshake. The transport reports `Closed` when done.
    fn close(&mut self);
}
