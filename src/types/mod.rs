pub mod constants;
pub mod error;
pub mod message;

pub use constants::*;
pub use error::{ChannelError, Result};
pub use message::{ChannelMessage, encode};
