//! Transport seam between the feed session and the network

use super::TransportError;
use async_trait::async_trait;
use std::sync::Arc;

/// An open, message-framed duplex connection
#[async_trait]
pub trait Transport: Send {
    /// Send one text frame
    async fn send_text(&mut self, text: String) -> Result<(), TransportError>;

    /// Wait for the next text frame
    ///
    /// Returns `Ok(None)` once the peer closed the connection cleanly.
    async fn recv_text(&mut self) -> Result<Option<String>, TransportError>;

    /// Close the connection from our side
    async fn close(&mut self) -> Result<(), TransportError>;
}

/// Opens fresh transports; one call per feed session
#[async_trait]
pub trait Connector: Send + Sync {
    type Transport: Transport;

    async fn connect(&self) -> Result<Self::Transport, TransportError>;
}

#[async_trait]
impl<C: Connector> Connector for Arc<C> {
    type Transport = C::Transport;

    async fn connect(&self) -> Result<Self::Transport, TransportError> {
        self.as_ref().connect().await
    }
}
