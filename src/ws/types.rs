//! WebSocket types and configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// OKX v5 public websocket endpoint
pub const OKX_PUBLIC_WS_URL: &str = "wss://ws.okx.com:8443/ws/v5/public";

/// Certificate validation policy for `wss://` endpoints
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TlsPolicy {
    /// Full certificate and hostname validation
    #[default]
    Verify,
    /// Accept any certificate and hostname. Explicit opt-in only.
    AcceptInvalidCerts,
}

/// WebSocket client configuration
#[derive(Debug, Clone)]
pub struct WsConfig {
    /// WebSocket URL to connect to
    pub url: String,
    /// Interval for sending ping frames
    pub ping_interval: Duration,
    /// Time allowed for a pong before the connection is declared dead
    pub pong_timeout: Duration,
    /// Certificate validation policy
    pub tls: TlsPolicy,
}

impl Default for WsConfig {
    fn default() -> Self {
        Self {
            url: OKX_PUBLIC_WS_URL.to_string(),
            ping_interval: Duration::from_secs(60),
            pong_timeout: Duration::from_secs(10),
            tls: TlsPolicy::Verify,
        }
    }
}

impl WsConfig {
    /// Create a new config with the given URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set ping interval
    pub fn ping_interval(mut self, d: Duration) -> Self {
        self.ping_interval = d;
        self
    }

    /// Set pong timeout
    pub fn pong_timeout(mut self, d: Duration) -> Self {
        self.pong_timeout = d;
        self
    }

    /// Set certificate validation policy
    pub fn tls(mut self, policy: TlsPolicy) -> Self {
        self.tls = policy;
        self
    }
}

/// Transport-level failures; every one of them ends the feed session
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("connect failed: {0}")]
    ConnectFailed(String),

    #[error("connection lost: {0}")]
    ConnectionLost(String),

    #[error("send failed: {0}")]
    SendFailed(String),

    #[error("tls setup failed: {0}")]
    Tls(String),
}
