//! Console trade list
//!
//! Thin presentation shell over the rolling buffer: polls snapshots on a
//! fixed cadence and redraws the table when new trades arrived.

mod table;

pub use table::{render_table, TradeRow};

use crate::buffer::RollingBuffer;
use crate::config::DisplayConfig;
use crate::shutdown::Shutdown;
use std::io::Write;
use std::sync::Arc;
use tokio::time::MissedTickBehavior;

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Build display rows from the current buffer contents, newest first
pub fn snapshot_rows(
    buffer: &RollingBuffer,
    config: &DisplayConfig,
) -> anyhow::Result<Vec<TradeRow>> {
    let zone = config.timezone()?;
    Ok(buffer
        .snapshot()
        .iter()
        .map(|record| TradeRow::from_record(record, &zone))
        .collect())
}

/// Redraw the trade list until shutdown
pub async fn run_display(
    buffer: Arc<RollingBuffer>,
    config: DisplayConfig,
    mut shutdown: Shutdown,
) -> anyhow::Result<()> {
    let mut ticker = tokio::time::interval(config.refresh_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut drawn: Option<u64> = None;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let appended = buffer.appended_total();
                if drawn == Some(appended) {
                    continue;
                }
                let rows = snapshot_rows(&buffer, &config)?;
                let table = render_table(&rows, config.color);

                let mut stdout = std::io::stdout().lock();
                write!(stdout, "{CLEAR_SCREEN}{table}")?;
                stdout.flush()?;
                drawn = Some(appended);
            }
            _ = shutdown.wait() => {
                tracing::debug!("Display stopped");
                return Ok(());
            }
        }
    }
}
