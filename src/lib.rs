//! okx-tape: live trade tape for OKX perpetual swaps
//!
//! This library provides the core components for:
//! - Decoding OKX trades channel messages into normalized trade records
//! - A bounded, concurrently readable rolling buffer of recent trades
//! - Feed sessions over a keepalive-managed WebSocket
//! - A supervisor that reconnects under exponential backoff
//! - A console trade list over buffer snapshots
//! - Structured logging and Prometheus metrics

pub mod buffer;
pub mod cli;
pub mod config;
pub mod display;
pub mod feed;
pub mod shutdown;
pub mod telemetry;
pub mod trade;
pub mod ws;
