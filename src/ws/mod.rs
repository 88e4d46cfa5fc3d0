//! WebSocket transport
//!
//! Keepalive-managed WebSocket connections with a pluggable TLS policy, plus
//! the [`Connector`]/[`Transport`] seam the feed session is written against.

mod client;
mod memory;
mod transport;
mod types;

pub use client::{WsClient, WsConnection};
pub use memory::{MemoryConnector, MemoryPeer, MemoryTransport};
pub use transport::{Connector, Transport};
pub use types::{TlsPolicy, TransportError, WsConfig, OKX_PUBLIC_WS_URL};
