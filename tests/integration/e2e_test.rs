//! End-to-end integration tests

use okx_tape::buffer::RollingBuffer;
use okx_tape::config::Config;
use okx_tape::display::{render_table, snapshot_rows};
use okx_tape::trade::Decoder;
use std::sync::Arc;

#[test]
fn test_config_example_loads() {
    let config = Config::load(concat!(env!("CARGO_MANIFEST_DIR"), "/config.toml.example")).unwrap();
    assert_eq!(config.feed.exchange_tag, "OKEx");
    assert_eq!(config.buffer_capacity().unwrap().get(), 200);
    assert!(config.feed.url.starts_with("wss://"));
}

#[test]
fn test_decode_buffer_render() {
    let config = Config::from_toml_str(
        r#"
        [feed]
        instruments = ["BTC-USDT-SWAP"]

        [buffer]
        capacity = 2

        [display]
        color = false
        "#,
    )
    .unwrap();

    let decoder = Decoder::new(&config.feed.exchange_tag);
    let buffer = Arc::new(RollingBuffer::new(config.buffer_capacity().unwrap()));

    for (i, px) in ["42000.1", "42000.2", "42000.3"].iter().enumerate() {
        let raw = format!(
            r#"{{"data":[{{"ts":"{}","instId":"BTC-USDT-SWAP","side":"buy","sz":"0.5","px":"{px}"}}]}}"#,
            1_700_000_000_000u64 + i as u64
        );
        for record in decoder.decode_all(&raw).unwrap() {
            buffer.append(record);
        }
    }

    let rows = snapshot_rows(&buffer, &config.display).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].price, "42000.3");
    assert_eq!(rows[1].price, "42000.2");
    assert_eq!(rows[0].time, "22:13:20.002");

    let table = render_table(&rows, config.display.color);
    assert!(table.contains("OKEx-BTC-USDT-SWAP"));
    assert!(!table.contains("42000.1"));
}
