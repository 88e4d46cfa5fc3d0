//! Integration tests for feed sessions and the reconnecting supervisor

use okx_tape::buffer::RollingBuffer;
use okx_tape::feed::{BackoffConfig, SessionSupervisor};
use okx_tape::shutdown;
use okx_tape::trade::Decoder;
use okx_tape::ws::{MemoryConnector, TransportError};
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

fn trade_msg(inst_id: &str, px: &str) -> String {
    format!(
        r#"{{"arg":{{"channel":"trades","instId":"{inst_id}"}},"data":[{{"instId":"{inst_id}","px":"{px}","sz":"1","side":"sell","ts":"1700000000000"}}]}}"#
    )
}

async fn wait_for_appends(buffer: &RollingBuffer, total: u64) {
    let mut rx = buffer.subscribe();
    tokio::time::timeout(Duration::from_secs(5), async {
        while *rx.borrow_and_update() < total {
            rx.changed().await.unwrap();
        }
    })
    .await
    .expect("records never arrived");
}

#[tokio::test]
async fn test_history_survives_reconnect() {
    let connector = Arc::new(MemoryConnector::new());

    let mut first = connector.push_connection();
    first.send_text(r#"{"event":"subscribe","arg":{"channel":"trades","instId":"A"}}"#);
    first.send_text(trade_msg("A", "1"));
    first.send_text(trade_msg("B", "2"));
    first.fail(TransportError::ConnectionLost("reset by peer".into()));

    let mut second = connector.push_connection();
    second.send_text(trade_msg("C", "3"));

    let buffer = Arc::new(RollingBuffer::new(NonZeroUsize::new(10).unwrap()));
    let supervisor = SessionSupervisor::new(
        Arc::clone(&connector),
        vec!["A".to_string(), "B".to_string(), "C".to_string()],
        Decoder::default(),
        Arc::clone(&buffer),
        BackoffConfig {
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(10),
        },
    );
    let (trigger, shutdown) = shutdown::channel();
    let handle = tokio::spawn(supervisor.run(shutdown));

    wait_for_appends(&buffer, 3).await;

    let ids: Vec<String> = buffer
        .snapshot()
        .iter()
        .map(|r| r.instrument_id.clone())
        .collect();
    assert_eq!(ids, vec!["OKEx-C", "OKEx-B", "OKEx-A"]);

    // Both connections subscribed to every instrument, in order
    for peer in [&mut first, &mut second] {
        let sent = peer.drain_sent();
        assert_eq!(sent.len(), 3);
        assert!(sent[0].contains(r#""instId":"A""#));
        assert!(sent[2].contains(r#""instId":"C""#));
    }

    trigger.trigger();
    let report = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("supervisor ignored shutdown")
        .unwrap();
    assert_eq!(report.sessions_started, 2);
    assert_eq!(report.records_appended, 3);
    assert_eq!(buffer.len(), 3);
}

#[tokio::test]
async fn test_bad_messages_do_not_end_session() {
    let connector = Arc::new(MemoryConnector::new());
    let peer = connector.push_connection();
    peer.send_text("garbage");
    peer.send_text(r#"{"event":"error","code":"60018","msg":"doesn't exist"}"#);
    peer.send_text(trade_msg("BTC-USDT-SWAP", "42000"));

    let buffer = Arc::new(RollingBuffer::default());
    let supervisor = SessionSupervisor::new(
        Arc::clone(&connector),
        vec!["BTC-USDT-SWAP".to_string()],
        Decoder::default(),
        Arc::clone(&buffer),
        BackoffConfig::default(),
    );
    let (trigger, shutdown) = shutdown::channel();
    let handle = tokio::spawn(supervisor.run(shutdown));

    wait_for_appends(&buffer, 1).await;
    trigger.trigger();

    let report = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("supervisor ignored shutdown")
        .unwrap();
    assert_eq!(connector.attempts(), 1);
    assert_eq!(report.sessions_started, 1);
    assert_eq!(report.decode_failures, 2);
    assert_eq!(report.records_appended, 1);
}
