use thiserror::Error;

/// Errors produced by the channel connector and its collaborators.
///
/// `Transport`, `Decode` and `RetryExhausted` are only ever delivered through
/// [`ChannelHandler::on_error`](crate::ChannelHandler::on_error); the connector's
/// `open`/`send`/`close` never return them.
#[derive(Error, Debug)]
pub enum ChannelError {
    /// The underlying connection failed (handshake, read, or write)
    #[error("Transport error: {0}")]
    Transport(String),

    /// An inbound frame could not be decoded; the connection stays up
    #[error("Decode error: {reason}")]
    Decode { reason: String, raw: String },

    /// The reconnect budget was consumed without reaching `Open`
    #[error("Reconnect attempts exhausted after {attempts} attempts")]
    RetryExhausted { attempts: u32 },

    /// Invalid channel configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization error (outbound encode or typed payload access)
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// URL parsing error (malformed origin or endpoint)
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// HTTP request error talking to the backend REST API
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend REST API answered with a non-success status
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
}

impl ChannelError {
    pub(crate) fn decode(reason: impl Into<String>, raw: impl Into<String>) -> Self {
        Self::Decode {
            reason: reason.into(),
            raw: raw.into(),
        }
    }
}

/// Convenience type alias for `Result<T, ChannelError>`.
pub type Result<T> = std::result::Result<T, ChannelError>;
