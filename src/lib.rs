//! # Challenge Wave Realtime
//!
//! Resilient real-time channel client for the Challenge Wave trivia game:
//! a self-reconnecting WebSocket connector with bounded exponential backoff,
//! plus the typed game events and state store that ride on top of it.
//!
//! ## Example
//!
//! ```no_run
//! use challenge_wave_realtime::{
//!     ChannelConfig, ChannelConnector, ChannelOptions, ClientMessage, GameEventRouter, GameStore,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ChannelConfig::new(
//!         "https://play.example.com",
//!         "/room/42?wallet_id=0xab",
//!         ChannelOptions::default(),
//!     )?;
//!
//!     let store = GameStore::new();
//!     let channel = ChannelConnector::connect(config, GameEventRouter::new(store.clone()));
//!
//!     channel.send(ClientMessage::Ping);
//!     println!("room status: {}", store.read(|state| state.room_status));
//!
//!     channel.close();
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod game;
pub mod infrastructure;
pub mod messaging;
pub mod types;
pub mod websocket;

pub use client::{
    ChannelConfig, ChannelConnector, ChannelHandler, ChannelOptions, CloseEvent, ConnectionStatus,
    Handlers,
};
pub use game::{GameState, GameStore, RoomStatus};
pub use infrastructure::GameApi;
pub use messaging::{ClientMessage, GameEvent, GameEventRouter};
pub use types::{ChannelError, ChannelMessage};
