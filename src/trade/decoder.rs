//! OKX trades channel decoder

use super::{Side, TradeRecord};
use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use std::str::FromStr;
use thiserror::Error;

/// Tag prefixed to every instrument identifier
pub const DEFAULT_EXCHANGE_TAG: &str = "OKEx";

/// Reasons a single message could not be turned into trade records
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("malformed message: {0}")]
    Malformed(String),

    #[error("exchange rejected request ({code}): {msg}")]
    Rejected { code: String, msg: String },
}

impl DecodeError {
    fn malformed(cause: impl Into<String>) -> Self {
        DecodeError::Malformed(cause.into())
    }
}

/// Push envelope: `{"arg": {...}, "data": [...]}` or a control event
#[derive(Debug, Deserialize)]
struct Envelope {
    event: Option<String>,
    code: Option<Value>,
    msg: Option<String>,
    data: Option<Vec<RawTrade>>,
}

/// One entry of the `data` array
///
/// OKX sends numeric fields as strings, but JSON numbers are accepted too.
/// `serde_json` is built with `arbitrary_precision`, so a number keeps the
/// exact digits it had on the wire.
#[derive(Debug, Deserialize)]
struct RawTrade {
    ts: Option<Value>,
    #[serde(rename = "instId")]
    inst_id: Option<String>,
    side: Option<String>,
    sz: Option<Value>,
    px: Option<Value>,
}

/// Turns raw trade channel payloads into [`TradeRecord`]s
#[derive(Debug, Clone)]
pub struct Decoder {
    exchange_tag: String,
}

impl Decoder {
    /// Create a decoder that prefixes instrument ids with `exchange_tag`
    pub fn new(exchange_tag: impl Into<String>) -> Self {
        Self {
            exchange_tag: exchange_tag.into(),
        }
    }

    pub fn exchange_tag(&self) -> &str {
        &self.exchange_tag
    }

    /// Decode the first trade of a message
    ///
    /// Subscription acknowledgements yield `Ok(None)`.
    pub fn decode(&self, raw: &str) -> Result<Option<TradeRecord>, DecodeError> {
        Ok(self.decode_all(raw)?.into_iter().next())
    }

    /// Decode every trade of a message, in wire order
    ///
    /// Either all entries decode or the whole message is rejected.
    pub fn decode_all(&self, raw: &str) -> Result<Vec<TradeRecord>, DecodeError> {
        let envelope: Envelope = serde_json::from_str(raw)
            .map_err(|e| DecodeError::malformed(format!("invalid json: {}", e)))?;

        if let Some(event) = envelope.event.as_deref() {
            return match event {
                "subscribe" | "unsubscribe" => Ok(Vec::new()),
                "error" => Err(DecodeError::Rejected {
                    code: envelope
                        .code
                        .and_then(|code| scalar_text(code, "code").ok())
                        .unwrap_or_default(),
                    msg: envelope.msg.unwrap_or_default(),
                }),
                other => Err(DecodeError::malformed(format!(
                    "unexpected event `{}`",
                    other
                ))),
            };
        }

        let entries = envelope
            .data
            .ok_or_else(|| DecodeError::malformed("missing field `data`"))?;
        if entries.is_empty() {
            return Err(DecodeError::malformed("`data` contains no trades"));
        }

        entries
            .into_iter()
            .map(|entry| self.decode_entry(entry))
            .collect()
    }

    fn decode_entry(&self, entry: RawTrade) -> Result<TradeRecord, DecodeError> {
        let ts = scalar_text(required(entry.ts, "ts")?, "ts")?;
        let millis: i64 = ts
            .trim()
            .parse()
            .map_err(|_| DecodeError::malformed(format!("invalid timestamp `{}`", ts)))?;
        let timestamp = Utc
            .timestamp_millis_opt(millis)
            .single()
            .ok_or_else(|| DecodeError::malformed(format!("timestamp out of range `{}`", ts)))?;

        let inst_id = required(entry.inst_id, "instId")?;
        if inst_id.is_empty() {
            return Err(DecodeError::malformed("empty `instId`"));
        }

        let raw_side = required(entry.side, "side")?;
        let side = Side::from_wire(&raw_side)
            .ok_or_else(|| DecodeError::malformed(format!("unrecognized side `{}`", raw_side)))?;

        let quantity = parse_decimal(required(entry.sz, "sz")?, "sz")?;
        let price = parse_decimal(required(entry.px, "px")?, "px")?;

        Ok(TradeRecord {
            timestamp,
            instrument_id: format!("{}-{}", self.exchange_tag, inst_id),
            side,
            quantity,
            price,
        })
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new(DEFAULT_EXCHANGE_TAG)
    }
}

fn required<T>(value: Option<T>, field: &str) -> Result<T, DecodeError> {
    value.ok_or_else(|| DecodeError::malformed(format!("missing field `{}`", field)))
}

/// Wire text of a string or number field
fn scalar_text(value: Value, field: &str) -> Result<String, DecodeError> {
    match value {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => {
            let cause = format!("`{field}` is not a string or number: {other}");
            Err(DecodeError::malformed(cause))
        }
    }
}

fn parse_decimal(value: Value, field: &str) -> Result<Decimal, DecodeError> {
    let text = scalar_text(value, field)?;
    Decimal::from_str(text.trim())
        .or_else(|_| Decimal::from_scientific(text.trim()))
        .map_err(|_| DecodeError::malformed(format!("invalid `{}` value `{}`", field, text)))
}
