//! Rolling trade buffer
//!
//! Fixed-capacity, most-recent-first view of the last N trades shared
//! between the feed session (single writer) and display readers.

mod rolling;

pub use rolling::{RollingBuffer, DEFAULT_CAPACITY};
