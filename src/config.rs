//! Configuration types for okx-tape

use crate::buffer::DEFAULT_CAPACITY;
use crate::feed::BackoffConfig;
use crate::telemetry::LogFormat;
use crate::trade::DEFAULT_EXCHANGE_TAG;
use crate::ws::{TlsPolicy, WsConfig, OKX_PUBLIC_WS_URL};
use chrono_tz::Tz;
use serde::Deserialize;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio_tungstenite::tungstenite::http::Uri;

/// Invalid or unreadable configuration; fatal at startup
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("no instruments configured")]
    EmptyInstruments,

    #[error("invalid instrument identifier {0:?}")]
    InvalidInstrument(String),

    #[error("invalid endpoint {url:?}: {reason}")]
    InvalidEndpoint { url: String, reason: String },

    #[error("buffer capacity must be at least 1")]
    ZeroCapacity,

    #[error(
        "keepalive ping interval and pong timeout must be between 1 and {} seconds",
        MAX_KEEPALIVE_SECS
    )]
    InvalidKeepalive,

    #[error(
        "reconnect delays must be non-zero, ordered and at most {} seconds",
        MAX_RECONNECT_DELAY_SECS
    )]
    InvalidBackoff,

    #[error("display refresh must be between 1 and {} milliseconds", MAX_REFRESH_MS)]
    InvalidRefresh,

    #[error("unknown display timezone {0:?}")]
    InvalidTimezone(String),
}

/// Upper bound for keepalive ping interval and pong timeout
pub const MAX_KEEPALIVE_SECS: u64 = 3600;

/// Upper bound for the reconnect backoff ceiling
pub const MAX_RECONNECT_DELAY_SECS: u64 = 3600;

/// Upper bound for the display redraw cadence
pub const MAX_REFRESH_MS: u64 = 60_000;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub feed: FeedConfig,
    #[serde(default)]
    pub buffer: BufferConfig,
    #[serde(default)]
    pub keepalive: KeepaliveConfig,
    #[serde(default)]
    pub reconnect: ReconnectConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Trade feed configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// Websocket endpoint
    #[serde(default = "default_url")]
    pub url: String,

    /// Prefix for instrument ids (e.g., "OKEx" gives "OKEx-BTC-USDT-SWAP")
    #[serde(default = "default_exchange_tag")]
    pub exchange_tag: String,

    /// Native instrument ids to subscribe to
    pub instruments: Vec<String>,

    /// Certificate validation policy
    #[serde(default)]
    pub tls: TlsPolicy,
}

fn default_url() -> String {
    OKX_PUBLIC_WS_URL.to_string()
}
fn default_exchange_tag() -> String {
    DEFAULT_EXCHANGE_TAG.to_string()
}

/// Rolling buffer configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BufferConfig {
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
        }
    }
}

/// Websocket keepalive configuration
#[derive(Debug, Clone, Deserialize)]
pub struct KeepaliveConfig {
    #[serde(default = "default_ping_interval_secs")]
    pub ping_interval_secs: u64,
    #[serde(default = "default_pong_timeout_secs")]
    pub pong_timeout_secs: u64,
}

fn default_ping_interval_secs() -> u64 {
    60
}
fn default_pong_timeout_secs() -> u64 {
    10
}

impl Default for KeepaliveConfig {
    fn default() -> Self {
        Self {
            ping_interval_secs: 60,
            pong_timeout_secs: 10,
        }
    }
}

/// Reconnect backoff configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ReconnectConfig {
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    #[serde(default = "default_max_delay_secs")]
    pub max_delay_secs: u64,
}

fn default_initial_delay_ms() -> u64 {
    500
}
fn default_max_delay_secs() -> u64 {
    30
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: 500,
            max_delay_secs: 30,
        }
    }
}

/// Zone trade times are shown in unless configured otherwise
pub const DEFAULT_TIMEZONE: &str = "Europe/London";

/// Console trade list configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DisplayConfig {
    /// Redraw cadence in milliseconds
    #[serde(default = "default_refresh_ms")]
    pub refresh_ms: u64,

    /// IANA zone used to render trade times
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Colour the aggressor column
    #[serde(default = "default_true")]
    pub color: bool,
}

fn default_refresh_ms() -> u64 {
    100
}
fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}
fn default_true() -> bool {
    true
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            refresh_ms: 100,
            timezone: default_timezone(),
            color: true,
        }
    }
}

impl DisplayConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_ms.clamp(1, MAX_REFRESH_MS))
    }

    /// Parse the configured zone name
    pub fn timezone(&self) -> Result<Tz, ConfigError> {
        self.timezone
            .parse()
            .map_err(|_| ConfigError::InvalidTimezone(self.timezone.clone()))
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
    /// Prometheus exporter port; disabled when absent
    pub metrics_port: Option<u16>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::Pretty,
            metrics_port: None,
        }
    }
}

impl Config {
    /// Load and validate configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every constraint the feed relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.feed.instruments.is_empty() {
            return Err(ConfigError::EmptyInstruments);
        }
        if let Some(bad) = self
            .feed
            .instruments
            .iter()
            .find(|id| id.trim().is_empty() || id.chars().any(char::is_whitespace))
        {
            return Err(ConfigError::InvalidInstrument(bad.clone()));
        }

        validate_endpoint(&self.feed.url)?;
        self.buffer_capacity()?;

        let keepalive_range = 1..=MAX_KEEPALIVE_SECS;
        if !keepalive_range.contains(&self.keepalive.ping_interval_secs)
            || !keepalive_range.contains(&self.keepalive.pong_timeout_secs)
        {
            return Err(ConfigError::InvalidKeepalive);
        }

        if self.reconnect.max_delay_secs > MAX_RECONNECT_DELAY_SECS {
            return Err(ConfigError::InvalidBackoff);
        }
        let backoff = self.backoff();
        if backoff.initial_delay.is_zero() || backoff.initial_delay > backoff.max_delay {
            return Err(ConfigError::InvalidBackoff);
        }

        if !(1..=MAX_REFRESH_MS).contains(&self.display.refresh_ms) {
            return Err(ConfigError::InvalidRefresh);
        }
        self.display.timezone()?;
        Ok(())
    }

    pub fn buffer_capacity(&self) -> Result<NonZeroUsize, ConfigError> {
        NonZeroUsize::new(self.buffer.capacity).ok_or(ConfigError::ZeroCapacity)
    }

    /// Websocket settings for the feed connection
    pub fn ws_config(&self) -> WsConfig {
        WsConfig::new(&self.feed.url)
            .ping_interval(Duration::from_secs(self.keepalive.ping_interval_secs))
            .pong_timeout(Duration::from_secs(self.keepalive.pong_timeout_secs))
            .tls(self.feed.tls)
    }

    pub fn backoff(&self) -> BackoffConfig {
        BackoffConfig {
            initial_delay: Duration::from_millis(self.reconnect.initial_delay_ms),
            max_delay: Duration::from_secs(self.reconnect.max_delay_secs),
        }
    }
}

fn validate_endpoint(url: &str) -> Result<(), ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidEndpoint {
        url: url.to_string(),
        reason: reason.to_string(),
    };

    let uri: Uri = url.parse().map_err(|_| invalid("not a valid URI"))?;
    match uri.scheme_str() {
        Some("ws") | Some("wss") => {}
        _ => return Err(invalid("scheme must be ws or wss")),
    }
    if uri.host().map_or(true, str::is_empty) {
        return Err(invalid("missing host"));
    }
    Ok(())
}
