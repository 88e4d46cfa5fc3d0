//! Trade module
//!
//! Canonical trade record and the OKX trade message decoder

mod decoder;

pub use decoder::{DecodeError, Decoder, DEFAULT_EXCHANGE_TAG};

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Aggressor side of an executed trade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Buyer lifted the offer
    Bid,
    /// Seller hit the bid
    Ask,
}

impl Side {
    /// Map the exchange's buy/sell vocabulary onto the aggressor side
    pub fn from_wire(raw: &str) -> Option<Self> {
        match raw {
            "buy" => Some(Side::Bid),
            "sell" => Some(Side::Ask),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Bid => "Bid",
            Side::Ask => "Ask",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single normalized trade execution
///
/// Records are shared behind `Arc` once appended to the rolling buffer and
/// are never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeRecord {
    /// Exchange event time, millisecond precision
    pub timestamp: DateTime<Utc>,
    /// Exchange-tagged instrument (e.g., "OKEx-BTC-USDT-SWAP")
    pub instrument_id: String,
    /// Aggressor side
    pub side: Side,
    /// Trade size at source precision
    pub quantity: Decimal,
    /// Trade price at source precision
    pub price: Decimal,
}

impl TradeRecord {
    /// Create a new trade record
    pub fn new(
        timestamp: DateTime<Utc>,
        instrument_id: impl Into<String>,
        side: Side,
        quantity: Decimal,
        price: Decimal,
    ) -> Self {
        Self {
            timestamp,
            instrument_id: instrument_id.into(),
            side,
            quantity,
            price,
        }
    }

    /// Event time rendered as `HH:MM:SS.mmm` in the given zone
    pub fn display_time<Z>(&self, zone: &Z) -> String
    where
        Z: TimeZone,
        Z::Offset: fmt::Display,
    {
        self.timestamp
            .with_timezone(zone)
            .format("%H:%M:%S%.3f")
            .to_string()
    }
}
