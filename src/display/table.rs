//! Trade list table rendering

use crate::trade::{Side, TradeRecord};
use chrono_tz::Tz;
use std::fmt::Write;

const TITLE: &str = "Trade List";

/// Column widths: Time, ID, Aggr, Qty, Price
const WIDTHS: [usize; 5] = [12, 20, 4, 10, 12];

const BID_COLOR: &str = "\x1b[38;5;208m";
const ASK_COLOR: &str = "\x1b[38;5;75m";
const RESET: &str = "\x1b[0m";

/// One display row of the trade list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeRow {
    pub time: String,
    pub id: String,
    pub side: Side,
    pub qty: String,
    pub price: String,
}

impl TradeRow {
    pub fn from_record(record: &TradeRecord, zone: &Tz) -> Self {
        Self {
            time: record.display_time(zone),
            id: record.instrument_id.clone(),
            side: record.side,
            qty: record.quantity.to_string(),
            price: record.price.to_string(),
        }
    }
}

/// Render rows as a fixed-width table, in the order given
///
/// ID and aggressor are left aligned, numbers right aligned.
pub fn render_table(rows: &[TradeRow], color: bool) -> String {
    let total_width = WIDTHS.iter().sum::<usize>() + WIDTHS.len() - 1;
    let [w_time, w_id, w_aggr, w_qty, w_px] = WIDTHS;

    let mut out = String::with_capacity((rows.len() + 3) * (total_width + 1));
    let _ = writeln!(out, "{:^total_width$}", TITLE);
    let _ = writeln!(
        out,
        "{:^w_time$} {:^w_id$} {:^w_aggr$} {:^w_qty$} {:^w_px$}",
        "Time", "ID", "Aggr", "Qty", "Price"
    );
    let _ = writeln!(out, "{}", "-".repeat(total_width));

    for row in rows {
        let aggr = format!("{:<w_aggr$}", row.side.as_str());
        let aggr = if color {
            let code = match row.side {
                Side::Bid => BID_COLOR,
                Side::Ask => ASK_COLOR,
            };
            format!("{code}{aggr}{RESET}")
        } else {
            aggr
        };
        let _ = writeln!(
            out,
            "{:>w_time$} {:<w_id$} {} {:>w_qty$} {:>w_px$}",
            row.time, row.id, aggr, row.qty, row.price
        );
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn row(id: &str, side: Side) -> TradeRow {
        let record = TradeRecord::new(
            Utc.timestamp_millis_opt(1_700_000_000_250).unwrap(),
            id,
            side,
            dec!(0.5),
            dec!(42000.1),
        );
        TradeRow::from_record(&record, &Tz::UTC)
    }

    #[test]
    fn test_row_from_record() {
        let row = row("OKEx-BTC-USDT-SWAP", Side::Bid);
        assert_eq!(row.time, "22:13:20.250");
        assert_eq!(row.id, "OKEx-BTC-USDT-SWAP");
        assert_eq!(row.qty, "0.5");
        assert_eq!(row.price, "42000.1");
    }

    #[test]
    fn test_render_plain_table() {
        let rows = vec![
            row("OKEx-ETH-USDT-SWAP", Side::Ask),
            row("OKEx-BTC-USDT-SWAP", Side::Bid),
        ];
        let table = render_table(&rows, false);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0].trim(), "Trade List");
        assert!(lines[1].contains("Time") && lines[1].contains("Price"));
        assert!(lines[3].contains("OKEx-ETH-USDT-SWAP") && lines[3].contains("Ask"));
        assert!(lines[4].contains("OKEx-BTC-USDT-SWAP") && lines[4].contains("Bid"));
        assert!(lines[4].ends_with("42000.1"));
        assert!(!table.contains('\x1b'));
    }

    #[test]
    fn test_render_colored_aggressor() {
        let table = render_table(&[row("OKEx-BTC-USDT-SWAP", Side::Bid)], true);
        assert!(table.contains(&format!("{BID_COLOR}Bid {RESET}")));
    }

    #[test]
    fn test_render_empty() {
        let table = render_table(&[], false);
        assert_eq!(table.lines().count(), 3);
    }
}
