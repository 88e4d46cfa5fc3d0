//! Prometheus metrics

use std::net::SocketAddr;

/// Counter metric types
#[derive(Debug, Clone, Copy)]
pub enum CounterMetric {
    /// Text frames received from the exchange
    MessagesReceived,
    /// Trade records appended to the buffer
    TradesAppended,
    /// Messages rejected by the decoder
    DecodeFailures,
}

/// Gauge metric types
#[derive(Debug, Clone, Copy)]
pub enum GaugeMetric {
    /// Records currently held by the rolling buffer
    BufferLen,
}

/// Session termination metric name, labelled by outcome
const SESSIONS_ENDED: &str = "okx_tape_sessions_ended_total";

fn counter_name(metric: CounterMetric) -> &'static str {
    match metric {
        CounterMetric::MessagesReceived => "okx_tape_messages_total",
        CounterMetric::TradesAppended => "okx_tape_trades_total",
        CounterMetric::DecodeFailures => "okx_tape_decode_failures_total",
    }
}

fn gauge_name(metric: GaugeMetric) -> &'static str {
    match metric {
        GaugeMetric::BufferLen => "okx_tape_buffer_len",
    }
}

/// Increment a counter
pub fn increment(metric: CounterMetric, value: u64) {
    metrics::counter!(counter_name(metric)).increment(value);
}

/// Set a gauge value
pub fn set_gauge(metric: GaugeMetric, value: f64) {
    metrics::gauge!(gauge_name(metric)).set(value);
}

/// Count a finished feed session
pub fn record_session_end(outcome: &'static str) {
    metrics::counter!(SESSIONS_ENDED, "outcome" => outcome).increment(1);
}

/// Install the Prometheus exporter on `0.0.0.0:port`
pub fn init_metrics(port: u16) -> anyhow::Result<SocketAddr> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| anyhow::anyhow!("Failed to install prometheus exporter: {}", e))?;

    tracing::info!(metrics_addr = %addr, "Prometheus metrics exporter enabled");
    Ok(addr)
}
