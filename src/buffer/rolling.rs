//! Bounded FIFO buffer with snapshot reads

use crate::trade::TradeRecord;
use parking_lot::RwLock;
use std::collections::VecDeque;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tokio::sync::watch;

/// Default number of trades retained
pub const DEFAULT_CAPACITY: usize = 200;

/// Fixed-capacity container of trade records
///
/// Appends and evictions happen inside a single write critical section, so a
/// concurrent [`snapshot`](Self::snapshot) never observes a length above
/// capacity or a half-applied append. Records are stored behind `Arc`, which
/// keeps snapshots cheap and the records immutable.
pub struct RollingBuffer {
    capacity: NonZeroUsize,
    records: RwLock<VecDeque<Arc<TradeRecord>>>,
    /// Monotonic append count, doubles as a change notification
    appended: watch::Sender<u64>,
}

impl RollingBuffer {
    /// Create an empty buffer holding at most `capacity` records
    pub fn new(capacity: NonZeroUsize) -> Self {
        let (appended, _) = watch::channel(0);
        Self {
            capacity,
            records: RwLock::new(VecDeque::with_capacity(capacity.get())),
            appended,
        }
    }

    /// Append a record at the newest end, evicting the oldest when full
    pub fn append(&self, record: TradeRecord) {
        let record = Arc::new(record);
        {
            let mut records = self.records.write();
            while records.len() >= self.capacity.get() {
                records.pop_front();
            }
            records.push_back(record);
        }
        self.appended.send_modify(|n| *n += 1);
    }

    /// Point-in-time copy, newest first (display order)
    pub fn snapshot(&self) -> Vec<Arc<TradeRecord>> {
        self.records.read().iter().rev().cloned().collect()
    }

    /// Point-in-time copy, oldest first (arrival order)
    pub fn snapshot_oldest_first(&self) -> Vec<Arc<TradeRecord>> {
        self.records.read().iter().cloned().collect()
    }

    /// Most recently appended record
    pub fn latest(&self) -> Option<Arc<TradeRecord>> {
        self.records.read().back().cloned()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    /// Total number of appends since construction, including evicted records
    pub fn appended_total(&self) -> u64 {
        *self.appended.borrow()
    }

    /// Watch the append count to be woken on new trades
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.appended.subscribe()
    }

    /// Drop every record. Reconnects never call this.
    pub fn clear(&self) {
        self.records.write().clear();
        self.appended.send_modify(|_| {});
    }
}

impl Default for RollingBuffer {
    fn default() -> Self {
        Self::new(NonZeroUsize::new(DEFAULT_CAPACITY).unwrap_or(NonZeroUsize::MIN))
    }
}

impl std::fmt::Debug for RollingBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RollingBuffer")
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .field("appended_total", &self.appended_total())
            .finish()
    }
}
