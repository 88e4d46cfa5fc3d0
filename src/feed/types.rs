//! Feed session types

use serde::Serialize;
use std::fmt;

/// Lifecycle of a single feed session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connecting,
    Subscribed,
    Closing,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Disconnected => "disconnected",
            SessionState::Connecting => "connecting",
            SessionState::Subscribed => "subscribed",
            SessionState::Closing => "closing",
        };
        f.write_str(name)
    }
}

/// How a session ended without a transport error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The exchange closed the connection
    RemoteClosed,
    /// Local shutdown was requested
    Shutdown,
}

/// Counters for one session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub messages_received: u64,
    pub records_appended: u64,
    pub decode_failures: u64,
}

/// Subscription request, one per instrument
///
/// `{"op":"subscribe","args":[{"channel":"trades","instId":"BTC-USDT-SWAP"}]}`
#[derive(Debug, Serialize)]
pub struct SubscribeRequest<'a> {
    op: &'static str,
    args: [ChannelArg<'a>; 1],
}

#[derive(Debug, Serialize)]
struct ChannelArg<'a> {
    channel: &'static str,
    #[serde(rename = "instId")]
    inst_id: &'a str,
}

impl<'a> SubscribeRequest<'a> {
    /// Subscribe to the trades channel of one instrument
    pub fn trades(inst_id: &'a str) -> Self {
        Self {
            op: "subscribe",
            args: [ChannelArg {
                channel: "trades",
                inst_id,
            }],
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
