//! common: pure core of the peer monitor.
//!
//! Everything in here is a function of its inputs: the per-peer state
//! machine, the registry and its bucket partition, report scheduling,
//! the message catalog and the body composer. All clock access happens
//! in the binary crate; `now` is always passed in as Unix seconds.

pub mod compose;
pub mod lang;
pub mod peer;
pub mod registry;
pub mod schedule;

/// Current Unix time in whole seconds.
pub fn now_unix() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
