//! In-memory transport
//!
//! Drives feed sessions without a network: each queued connection is paired
//! with a [`MemoryPeer`] that plays the exchange side.

use super::transport::{Connector, Transport};
use super::TransportError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;

enum Pending {
    Open(MemoryTransport),
    Fail(TransportError),
}

/// Hands out queued transports in FIFO order
///
/// Once the queue is empty, `connect` never completes; callers are expected
/// to race it against shutdown.
#[derive(Default)]
pub struct MemoryConnector {
    pending: Mutex<VecDeque<Pending>>,
    attempts: AtomicU64,
}

impl MemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a connection that will open successfully
    pub fn push_connection(&self) -> MemoryPeer {
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();

        let transport = MemoryTransport {
            inbound: inbound_rx,
            outbound: outbound_tx,
            closed: false,
        };
        self.pending.lock().push_back(Pending::Open(transport));

        MemoryPeer {
            inbound: Some(inbound_tx),
            outbound: outbound_rx,
        }
    }

    /// Queue a connection attempt that fails
    pub fn push_failure(&self, err: TransportError) {
        self.pending.lock().push_back(Pending::Fail(err));
    }

    /// Number of `connect` calls made so far
    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    type Transport = MemoryTransport;

    async fn connect(&self) -> Result<MemoryTransport, TransportError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let next = self.pending.lock().pop_front();
        match next {
            Some(Pending::Open(transport)) => Ok(transport),
            Some(Pending::Fail(err)) => Err(err),
            None => std::future::pending().await,
        }
    }
}

/// Session side of an in-memory connection
pub struct MemoryTransport {
    inbound: mpsc::UnboundedReceiver<Result<String, TransportError>>,
    outbound: mpsc::UnboundedSender<String>,
    closed: bool,
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn send_text(&mut self, text: String) -> Result<(), TransportError> {
        if self.closed {
            return Err(TransportError::SendFailed("connection closed".into()));
        }
        self.outbound
            .send(text)
            .map_err(|_| TransportError::SendFailed("peer gone".into()))
    }

    async fn recv_text(&mut self) -> Result<Option<String>, TransportError> {
        match self.inbound.recv().await {
            Some(Ok(text)) => Ok(Some(text)),
            Some(Err(err)) => Err(err),
            None => Ok(None),
        }
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.closed = true;
        self.inbound.close();
        Ok(())
    }
}

/// Exchange side of an in-memory connection
pub struct MemoryPeer {
    inbound: Option<mpsc::UnboundedSender<Result<String, TransportError>>>,
    outbound: mpsc::UnboundedReceiver<String>,
}

impl MemoryPeer {
    /// Push a text frame to the session. Returns false if the session is gone.
    pub fn send_text(&self, text: impl Into<String>) -> bool {
        self.push(Ok(text.into()))
    }

    /// Make the session's next read fail after already queued frames
    pub fn fail(&self, err: TransportError) -> bool {
        self.push(Err(err))
    }

    /// Close cleanly; the session sees end of stream after queued frames
    pub fn close(&mut self) {
        self.inbound = None;
    }

    fn push(&self, item: Result<String, TransportError>) -> bool {
        match &self.inbound {
            Some(tx) => tx.send(item).is_ok(),
            None => false,
        }
    }

    /// Next frame the session sent
    pub async fn next_sent(&mut self) -> Option<String> {
        self.outbound.recv().await
    }

    /// Frames sent by the session so far, without waiting
    pub fn drain_sent(&mut self) -> Vec<String> {
        let mut sent = Vec::new();
        while let Ok(text) = self.outbound.try_recv() {
            sent.push(text);
        }
        sent
    }
}
