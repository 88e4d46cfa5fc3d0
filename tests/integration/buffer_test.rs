//! Integration tests for the rolling trade buffer

use chrono::{TimeZone, Utc};
use okx_tape::buffer::RollingBuffer;
use okx_tape::trade::{Side, TradeRecord};
use rust_decimal_macros::dec;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::thread;

fn record(id: &str) -> TradeRecord {
    TradeRecord::new(
        Utc.timestamp_millis_opt(1_700_000_000_000).unwrap(),
        id,
        Side::Ask,
        dec!(1),
        dec!(100),
    )
}

fn ids(records: &[Arc<TradeRecord>]) -> Vec<String> {
    records.iter().map(|r| r.instrument_id.clone()).collect()
}

#[test]
fn test_capacity_three_keeps_newest() {
    let buffer = RollingBuffer::new(NonZeroUsize::new(3).unwrap());
    for id in ["A", "B", "C", "D"] {
        buffer.append(record(id));
    }

    assert_eq!(ids(&buffer.snapshot()), vec!["D", "C", "B"]);
    assert_eq!(ids(&buffer.snapshot_oldest_first()), vec!["B", "C", "D"]);
    assert_eq!(buffer.appended_total(), 4);
}

#[test]
fn test_default_capacity_bound() {
    let buffer = RollingBuffer::default();
    for i in 0..250 {
        buffer.append(record(&i.to_string()));
    }

    let snapshot = buffer.snapshot();
    assert_eq!(snapshot.len(), 200);
    assert_eq!(snapshot[0].instrument_id, "249");
    assert_eq!(snapshot[199].instrument_id, "50");
}

#[test]
fn test_writer_and_readers_across_threads() {
    let buffer = Arc::new(RollingBuffer::new(NonZeroUsize::new(16).unwrap()));

    let writer = {
        let buffer = Arc::clone(&buffer);
        thread::spawn(move || {
            for i in 0..1_000 {
                buffer.append(record(&format!("{i:04}")));
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let buffer = Arc::clone(&buffer);
            thread::spawn(move || {
                for _ in 0..200 {
                    let snapshot = buffer.snapshot();
                    assert!(snapshot.len() <= 16);
                    // Newest first: ids strictly decrease
                    let ids = ids(&snapshot);
                    assert!(ids.windows(2).all(|w| w[0] > w[1]));
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }

    let snapshot = buffer.snapshot();
    assert_eq!(snapshot.len(), 16);
    assert_eq!(snapshot[0].instrument_id, "0999");
}
