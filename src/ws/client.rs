//! WebSocket client with ping/pong keepalive

use super::transport::{Connector, Transport};
use super::types::{TlsPolicy, TransportError, WsConfig};
use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::{interval_at, sleep_until, Instant, Interval, MissedTickBehavior};
use tokio_tungstenite::{
    connect_async_tls_with_config, tungstenite::Message, Connector as TlsConnector, MaybeTlsStream,
    WebSocketStream,
};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Opens keepalive-managed WebSocket connections
///
/// Each call to [`Connector::connect`] performs a fresh handshake; nothing is
/// shared between connections. Reconnection is the caller's concern.
pub struct WsClient {
    config: WsConfig,
}

impl WsClient {
    /// Create a new WebSocket client with the given configuration
    pub fn new(config: WsConfig) -> Self {
        Self { config }
    }

    /// Create a new client with just a URL using default config
    pub fn with_url(url: impl Into<String>) -> Self {
        Self::new(WsConfig::new(url))
    }

    /// Get the configured URL
    pub fn url(&self) -> &str {
        &self.config.url
    }
}

#[async_trait]
impl Connector for WsClient {
    type Transport = WsConnection;

    async fn connect(&self) -> Result<WsConnection, TransportError> {
        tracing::info!(url = %self.config.url, "Connecting to WebSocket");

        let tls = tls_connector(self.config.tls)?;
        let (ws_stream, _response) =
            connect_async_tls_with_config(self.config.url.as_str(), None, false, tls)
                .await
                .map_err(|e| TransportError::ConnectFailed(e.to_string()))?;

        tracing::info!("WebSocket connected");

        Ok(WsConnection::new(
            ws_stream,
            self.config.ping_interval,
            self.config.pong_timeout,
        ))
    }
}

/// Build the TLS connector for the configured policy
///
/// `None` lets tungstenite use its default, fully validating connector.
fn tls_connector(policy: TlsPolicy) -> Result<Option<TlsConnector>, TransportError> {
    match policy {
        TlsPolicy::Verify => Ok(None),
        TlsPolicy::AcceptInvalidCerts => {
            tracing::warn!("TLS certificate verification is disabled by configuration");
            let connector = native_tls::TlsConnector::builder()
                .danger_accept_invalid_certs(true)
                .danger_accept_invalid_hostnames(true)
                .build()
                .map_err(|e| TransportError::Tls(e.to_string()))?;
            Ok(Some(TlsConnector::NativeTls(connector)))
        }
    }
}

/// A live WebSocket connection
///
/// Pings are sent from inside [`Transport::recv_text`], so keepalive runs as
/// long as the owner keeps reading.
pub struct WsConnection {
    write: SplitSink<WsStream, Message>,
    read: SplitStream<WsStream>,
    ping_interval: Interval,
    pong_timeout: Duration,
    /// Set while a ping is outstanding
    pong_deadline: Option<Instant>,
}

impl WsConnection {
    fn new(stream: WsStream, ping_every: Duration, pong_timeout: Duration) -> Self {
        let (write, read) = stream.split();

        // First ping one full interval after connect
        let mut ping_interval = interval_at(Instant::now() + ping_every, ping_every);
        ping_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        Self {
            write,
            read,
            ping_interval,
            pong_timeout,
            pong_deadline: None,
        }
    }
}

#[async_trait]
impl Transport for WsConnection {
    async fn send_text(&mut self, text: String) -> Result<(), TransportError> {
        self.write
            .send(Message::Text(text))
            .await
            .map_err(|e| TransportError::SendFailed(e.to_string()))
    }

    async fn recv_text(&mut self) -> Result<Option<String>, TransportError> {
        loop {
            let pong_deadline = self.pong_deadline;

            tokio::select! {
                msg = self.read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => return Ok(Some(text)),
                        Some(Ok(Message::Binary(data))) => {
                            tracing::trace!(len = data.len(), "Ignoring binary frame");
                        }
                        Some(Ok(Message::Ping(data))) => {
                            self.write.send(Message::Pong(data)).await
                                .map_err(|e| TransportError::SendFailed(e.to_string()))?;
                        }
                        Some(Ok(Message::Pong(_))) => {
                            self.pong_deadline = None;
                        }
                        Some(Ok(Message::Close(frame))) => {
                            tracing::info!(?frame, "Received close frame");
                            return Ok(None);
                        }
                        Some(Ok(Message::Frame(_))) => {}
                        Some(Err(e)) => {
                            return Err(TransportError::ConnectionLost(e.to_string()));
                        }
                        None => {
                            tracing::debug!("WebSocket stream ended");
                            return Ok(None);
                        }
                    }
                }

                // Send periodic pings
                _ = self.ping_interval.tick() => {
                    self.write.send(Message::Ping(Vec::new())).await
                        .map_err(|e| TransportError::SendFailed(e.to_string()))?;
                    if self.pong_deadline.is_none() {
                        self.pong_deadline = Some(Instant::now() + self.pong_timeout);
                    }
                }

                // Outstanding ping went unanswered
                _ = async {
                    match pong_deadline {
                        Some(deadline) => sleep_until(deadline).await,
                        None => std::future::pending().await,
                    }
                } => {
                    return Err(TransportError::ConnectionLost("keepalive timeout".into()));
                }
            }
        }
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.write
            .close()
            .await
            .map_err(|e| TransportError::SendFailed(e.to_string()))
    }
}
