use crate::infrastructure::Backoff;
use crate::types::{
    ChannelError, DEFAULT_CLOSE_TIMEOUT_MS, DEFAULT_INITIAL_BACKOFF_MS, DEFAULT_MAX_BACKOFF_MS,
    DEFAULT_MAX_RECONNECT_ATTEMPTS, Result, WS_PATH_PREFIX,
};
use std::time::Duration;
use url::Url;

/// Tunable connector options. All fields have defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelOptions {
    /// Host[:port] override; falls back to the origin's host. A value that
    /// already starts with `ws://`/`wss://` is used verbatim as the prefix.
    pub base_host: Option<String>,
    pub auto_reconnect: bool,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    /// 0 disables reconnect
    pub max_reconnect_attempts: u32,
    pub close_timeout_ms: u64,
    /// Send `{"type":"ping"}` at this interval while open
    pub keepalive_interval_ms: Option<u64>,
}

impl Default for ChannelOptions {
    fn default() -> Self {
        Self {
            base_host: None,
            auto_reconnect: true,
            initial_backoff_ms: DEFAULT_INITIAL_BACKOFF_MS,
            max_backoff_ms: DEFAULT_MAX_BACKOFF_MS,
            max_reconnect_attempts: DEFAULT_MAX_RECONNECT_ATTEMPTS,
            close_timeout_ms: DEFAULT_CLOSE_TIMEOUT_MS,
            keepalive_interval_ms: None,
        }
    }
}

/// Validated, immutable configuration of one channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelConfig {
    endpoint_path: String,
    origin: Url,
    options: ChannelOptions,
    url: Url,
}

impl ChannelConfig {
    /// Validate `options` and resolve the endpoint URL.
    ///
    /// * `origin` - the hosting origin, e.g. `https://play.example.com`. Its
    ///   scheme picks `wss`/`ws` and its host is the default channel host.
    /// * `endpoint_path` - logical stream, e.g. `/lobby` or `room-42?wallet_id=0xab`
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError::Config`] for inconsistent backoff settings or a
    /// non-HTTP origin, and [`ChannelError::UrlParse`] for malformed URLs.
    pub fn new(
        origin: impl AsRef<str>,
        endpoint_path: impl Into<String>,
        options: ChannelOptions,
    ) -> Result<Self> {
        if options.max_backoff_ms < options.initial_backoff_ms {
            return Err(ChannelError::Config(format!(
                "max backoff ({} ms) is smaller than initial backoff ({} ms)",
                options.max_backoff_ms, options.initial_backoff_ms
            )));
        }
        if options.keepalive_interval_ms == Some(0) {
            return Err(ChannelError::Config(
                "keepalive interval must be greater than zero".to_string(),
            ));
        }

        let origin = Url::parse(origin.as_ref())?;
        let endpoint_path = normalize_path(endpoint_path.into());
        let url = build_endpoint_url(&origin, options.base_host.as_deref(), &endpoint_path)?;

        Ok(Self {
            endpoint_path,
            origin,
            options,
            url,
        })
    }

    /// Resolved `scheme://host[:port]/ws{endpoint_path}`
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    pub fn endpoint_path(&self) -> &str {
        &self.endpoint_path
    }

    pub fn options(&self) -> &ChannelOptions {
        &self.options
    }

    pub fn backoff(&self) -> Backoff {
        Backoff::new(self.options.initial_backoff_ms, self.options.max_backoff_ms)
    }

    pub fn close_timeout(&self) -> Duration {
        Duration::from_millis(self.options.close_timeout_ms)
    }

    pub fn keepalive_interval(&self) -> Option<Duration> {
        self.options.keepalive_interval_ms.map(Duration::from_millis)
    }
}

fn normalize_path(path: String) -> String {
    if path.is_empty() || path.starts_with('/') {
        path
    } else {
        format!("/{}", path)
    }
}

fn build_endpoint_url(origin: &Url, base_host: Option<&str>, path: &str) -> Result<Url> {
    let scheme = match origin.scheme() {
        "https" => "wss",
        "http" => "ws",
        other => {
            return Err(ChannelError::Config(format!(
                "origin must be http or https, got '{}'",
                other
            )));
        }
    };

    let raw = match base_host {
        Some(prefix) if prefix.starts_with("ws://") || prefix.starts_with("wss://") => {
            format!("{}{}{}", prefix.trim_end_matches('/'), WS_PATH_PREFIX, path)
        }
        Some(host) => format!(
            "{}://{}{}{}",
            scheme,
            host.trim_end_matches('/'),
            WS_PATH_PREFIX,
            path
        ),
        None => {
            let host = origin
                .host_str()
                .ok_or_else(|| ChannelError::Config("origin has no host".to_string()))?;
            match origin.port() {
                Some(port) => format!("{}://{}:{}{}{}", scheme, host, port, WS_PATH_PREFIX, path),
                None => format!("{}://{}{}{}", scheme, host, WS_PATH_PREFIX, path),
            }
        }
    };

    Ok(Url::parse(&raw)?)
}
