//! Trade feed module
//!
//! Feed sessions against the OKX trades channel and the supervisor that
//! keeps one running for the lifetime of the process.

mod backoff;
mod session;
mod supervisor;
mod types;

pub use backoff::{Backoff, BackoffConfig};
pub use session::FeedSession;
pub use supervisor::{SessionSupervisor, SupervisorReport};
pub use types::{SessionEnd, SessionState, SessionStats, SubscribeRequest};
