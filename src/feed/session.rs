//! One connection attempt: connect, subscribe, decode, append

use super::types::{SessionEnd, SessionState, SessionStats, SubscribeRequest};
use crate::buffer::RollingBuffer;
use crate::shutdown::Shutdown;
use crate::telemetry::{self, CounterMetric, GaugeMetric};
use crate::trade::Decoder;
use crate::ws::{Connector, Transport, TransportError};
use std::sync::Arc;
use std::time::Duration;

/// How long a shutdown waits for the close handshake
pub const DEFAULT_CLOSE_TIMEOUT: Duration = Duration::from_secs(2);

/// A single feed session
///
/// Created fresh for every connection attempt. The session is the only
/// writer of the rolling buffer while it runs; messages are decoded and
/// appended strictly in arrival order.
pub struct FeedSession {
    id: u64,
    instruments: Vec<String>,
    decoder: Decoder,
    buffer: Arc<RollingBuffer>,
    state: SessionState,
    stats: SessionStats,
    close_timeout: Duration,
}

impl FeedSession {
    /// Create a new session in the `Disconnected` state
    pub fn new(
        id: u64,
        instruments: Vec<String>,
        decoder: Decoder,
        buffer: Arc<RollingBuffer>,
    ) -> Self {
        Self {
            id,
            instruments,
            decoder,
            buffer,
            state: SessionState::Disconnected,
            stats: SessionStats::default(),
            close_timeout: DEFAULT_CLOSE_TIMEOUT,
        }
    }

    /// Bound the close handshake performed on shutdown
    pub fn with_close_timeout(mut self, timeout: Duration) -> Self {
        self.close_timeout = timeout;
        self
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Run the session until the connection ends or shutdown is requested
    ///
    /// Always leaves the session `Disconnected`. Decode failures never end
    /// the session; transport failures always do.
    pub async fn run<C: Connector>(
        &mut self,
        connector: &C,
        shutdown: &mut Shutdown,
    ) -> Result<SessionEnd, TransportError> {
        let result = self.drive(connector, shutdown).await;
        self.transition(SessionState::Disconnected);
        result
    }

    async fn drive<C: Connector>(
        &mut self,
        connector: &C,
        shutdown: &mut Shutdown,
    ) -> Result<SessionEnd, TransportError> {
        if shutdown.is_triggered() {
            return Ok(SessionEnd::Shutdown);
        }

        self.transition(SessionState::Connecting);
        let mut transport = tokio::select! {
            result = connector.connect() => result?,
            _ = shutdown.wait() => return Ok(SessionEnd::Shutdown),
        };

        if let Err(e) = self.subscribe(&mut transport).await {
            self.transition(SessionState::Closing);
            return Err(e);
        }
        self.transition(SessionState::Subscribed);

        loop {
            tokio::select! {
                msg = transport.recv_text() => {
                    match msg {
                        Ok(Some(text)) => self.handle_message(&text),
                        Ok(None) => {
                            self.transition(SessionState::Closing);
                            return Ok(SessionEnd::RemoteClosed);
                        }
                        Err(e) => {
                            self.transition(SessionState::Closing);
                            return Err(e);
                        }
                    }
                }

                _ = shutdown.wait() => {
                    self.transition(SessionState::Closing);
                    match tokio::time::timeout(self.close_timeout, transport.close()).await {
                        Ok(Ok(())) => {}
                        Ok(Err(e)) => {
                            tracing::debug!(session = self.id, error = %e, "Close failed");
                        }
                        Err(_) => {
                            tracing::warn!(
                                session = self.id,
                                timeout_ms = self.close_timeout.as_millis() as u64,
                                "Close handshake timed out; dropping connection"
                            );
                        }
                    }
                    return Ok(SessionEnd::Shutdown);
                }
            }
        }
    }

    /// Send one subscription request per instrument
    async fn subscribe<T: Transport>(&self, transport: &mut T) -> Result<(), TransportError> {
        for inst_id in &self.instruments {
            let request = SubscribeRequest::trades(inst_id)
                .to_json()
                .map_err(|e| TransportError::SendFailed(e.to_string()))?;
            transport.send_text(request).await?;
            tracing::debug!(session = self.id, inst_id = %inst_id, "Sent trades subscription");
        }

        tracing::info!(
            session = self.id,
            instruments = self.instruments.len(),
            "Subscribed to trades"
        );
        Ok(())
    }

    fn handle_message(&mut self, text: &str) {
        self.stats.messages_received += 1;
        telemetry::increment(CounterMetric::MessagesReceived, 1);

        match self.decoder.decode_all(text) {
            Ok(records) => {
                if records.is_empty() {
                    tracing::debug!(session = self.id, "Received control message");
                    return;
                }
                let count = records.len() as u64;
                for record in records {
                    tracing::trace!(
                        instrument = %record.instrument_id,
                        side = %record.side,
                        qty = %record.quantity,
                        px = %record.price,
                        "Trade"
                    );
                    self.buffer.append(record);
                }
                self.stats.records_appended += count;
                telemetry::increment(CounterMetric::TradesAppended, count);
                telemetry::set_gauge(GaugeMetric::BufferLen, self.buffer.len() as f64);
            }
            Err(e) => {
                self.stats.decode_failures += 1;
                telemetry::increment(CounterMetric::DecodeFailures, 1);
                tracing::warn!(
                    session = self.id,
                    error = %e,
                    msg_preview = %text.chars().take(100).collect::<String>(),
                    "Failed to decode trade message"
                );
            }
        }
    }

    fn transition(&mut self, next: SessionState) {
        if self.state != next {
            tracing::debug!(session = self.id, from = %self.state, to = %next, "Session state change");
            self.state = next;
        }
    }
}
