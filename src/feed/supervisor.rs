//! Restarts feed sessions for the lifetime of the process

use super::backoff::{Backoff, BackoffConfig};
use super::session::FeedSession;
use super::types::SessionEnd;
use crate::buffer::RollingBuffer;
use crate::shutdown::Shutdown;
use crate::telemetry;
use crate::trade::Decoder;
use crate::ws::Connector;
use std::sync::Arc;

/// Summary returned once the supervisor stops
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SupervisorReport {
    pub sessions_started: u64,
    pub records_appended: u64,
    pub decode_failures: u64,
}

/// Owns the restart loop around [`FeedSession`]
///
/// Every session shares the same rolling buffer, so history survives
/// reconnects. The loop only exits on shutdown.
pub struct SessionSupervisor<C: Connector> {
    connector: C,
    instruments: Vec<String>,
    decoder: Decoder,
    buffer: Arc<RollingBuffer>,
    backoff: Backoff,
}

impl<C: Connector> SessionSupervisor<C> {
    pub fn new(
        connector: C,
        instruments: Vec<String>,
        decoder: Decoder,
        buffer: Arc<RollingBuffer>,
        backoff: BackoffConfig,
    ) -> Self {
        Self {
            connector,
            instruments,
            decoder,
            buffer,
            backoff: Backoff::new(backoff),
        }
    }

    /// Shared handle to the buffer sessions write into
    pub fn buffer(&self) -> Arc<RollingBuffer> {
        Arc::clone(&self.buffer)
    }

    /// Run sessions back to back until shutdown
    pub async fn run(mut self, mut shutdown: Shutdown) -> SupervisorReport {
        let mut report = SupervisorReport::default();

        tracing::info!(
            instruments = ?self.instruments,
            capacity = self.buffer.capacity(),
            "Starting feed supervisor"
        );

        while !shutdown.is_triggered() {
            report.sessions_started += 1;
            let mut session = FeedSession::new(
                report.sessions_started,
                self.instruments.clone(),
                self.decoder.clone(),
                Arc::clone(&self.buffer),
            );

            let outcome = session.run(&self.connector, &mut shutdown).await;
            let stats = session.stats();
            report.records_appended += stats.records_appended;
            report.decode_failures += stats.decode_failures;

            match outcome {
                Ok(SessionEnd::Shutdown) => {
                    telemetry::record_session_end("shutdown");
                    tracing::info!(session = session.id(), "Feed session stopped for shutdown");
                    break;
                }
                Ok(SessionEnd::RemoteClosed) => {
                    telemetry::record_session_end("remote_closed");
                    tracing::warn!(
                        session = session.id(),
                        messages = stats.messages_received,
                        "Feed connection closed by exchange"
                    );
                }
                Err(e) => {
                    telemetry::record_session_end("error");
                    tracing::warn!(
                        session = session.id(),
                        error = %e,
                        messages = stats.messages_received,
                        "Feed session failed"
                    );
                }
            }

            // Only a session that delivered trades counts as healthy; a
            // subscribe acknowledgement alone does not
            if stats.records_appended > 0 {
                self.backoff.reset();
            }
            let delay = self.backoff.next_delay();
            tracing::info!(
                delay_ms = delay.as_millis() as u64,
                retained = self.buffer.len(),
                "Reconnecting after backoff"
            );

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = shutdown.wait() => break,
            }
        }

        tracing::info!(
            sessions = report.sessions_started,
            records = report.records_appended,
            "Feed supervisor stopped"
        );
        report
    }
}
