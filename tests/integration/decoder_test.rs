//! Integration tests for the trades channel decoder

use chrono::{TimeZone, Utc};
use okx_tape::trade::{DecodeError, Decoder, Side};
use rust_decimal_macros::dec;

#[test]
fn test_decode_btc_trade() {
    let decoder = Decoder::default();
    let raw = r#"{"data":[{"ts":"1700000000000","instId":"BTC-USDT-SWAP","side":"buy","sz":"0.5","px":"42000.1"}]}"#;

    let record = decoder.decode(raw).unwrap().unwrap();
    assert_eq!(record.side, Side::Bid);
    assert_eq!(record.quantity, dec!(0.5));
    assert_eq!(record.price, dec!(42000.1));
    assert_eq!(record.quantity.to_string(), "0.5");
    assert_eq!(record.price.to_string(), "42000.1");
    assert_eq!(record.instrument_id, "OKEx-BTC-USDT-SWAP");
    assert_eq!(
        record.timestamp,
        Utc.timestamp_millis_opt(1_700_000_000_000).unwrap()
    );
}

#[test]
fn test_decode_full_push_envelope() {
    let decoder = Decoder::new("OKX");
    let raw = r#"{
        "arg": {"channel": "trades", "instId": "ETH-USDT-SWAP"},
        "data": [
            {"instId":"ETH-USDT-SWAP","tradeId":"1","px":"2000.50","sz":"3","side":"sell","ts":"1700000000001"},
            {"instId":"ETH-USDT-SWAP","tradeId":"2","px":"2000.60","sz":"1","side":"buy","ts":"1700000000002"}
        ]
    }"#;

    let records = decoder.decode_all(raw).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].instrument_id, "OKX-ETH-USDT-SWAP");
    assert_eq!(records[0].side, Side::Ask);
    assert_eq!(records[0].price.to_string(), "2000.50");
    assert_eq!(records[1].side, Side::Bid);
}

#[test]
fn test_subscription_ack_is_not_a_trade() {
    let decoder = Decoder::default();
    let raw = r#"{"event":"subscribe","arg":{"channel":"trades","instId":"BTC-USDT-SWAP"}}"#;
    assert_eq!(decoder.decode(raw).unwrap(), None);
}

#[test]
fn test_error_event_is_rejected() {
    let decoder = Decoder::default();
    let raw = r#"{"event":"error","code":"60012","msg":"Invalid request"}"#;
    assert_eq!(
        decoder.decode(raw),
        Err(DecodeError::Rejected {
            code: "60012".to_string(),
            msg: "Invalid request".to_string(),
        })
    );
}

#[test]
fn test_malformed_messages() {
    let decoder = Decoder::default();
    let cases = [
        "not json",
        r#"{"arg":{"channel":"trades"}}"#,
        r#"{"data":[]}"#,
        r#"{"data":[{"ts":"1700000000000","instId":"BTC-USDT-SWAP","side":"hold","sz":"1","px":"1"}]}"#,
        r#"{"data":[{"ts":"1700000000000","instId":"BTC-USDT-SWAP","side":"buy","sz":"abc","px":"1"}]}"#,
        r#"{"data":[{"ts":"yesterday","instId":"BTC-USDT-SWAP","side":"buy","sz":"1","px":"1"}]}"#,
        r#"{"data":[{"ts":"1700000000000","side":"buy","sz":"1","px":"1"}]}"#,
    ];

    for raw in cases {
        assert!(
            matches!(decoder.decode(raw), Err(DecodeError::Malformed(_))),
            "{raw} should be malformed"
        );
    }
}
