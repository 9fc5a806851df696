// Module declarations
mod builder;
mod connection;
mod core;
mod handler;
mod state;

// Public API exports
pub use builder::{ChannelConfig, ChannelOptions};
pub use connection::ConnectorCore;
pub use self::core::ChannelConnector;
pub use handler::{ChannelHandler, CloseEvent, Handlers};
pub use state::{ConnectionState, ConnectionStatus, ConnectorEvent, Generation};
