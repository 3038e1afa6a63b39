//! Immutable per-run configuration, resolved once at startup.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;

use common::schedule::ReminderSchedule;

/// Which channels the dispatcher uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchMode {
    /// Only the external command.
    Command,
    /// Only HTTP POSTs to the URL list.
    Urls,
    /// The command first, then the URLs, regardless of the command's outcome.
    Both,
}

/// Everything the cycle loop needs, fixed for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct MonitorCtx {
    pub interface: String,
    /// Path of the wg control tool.
    pub tool: PathBuf,
    /// Sleep between polling cycles.
    pub interval: Duration,
    /// Handshake silence after which a peer counts as lost.
    pub lost_after: Duration,
    pub schedule: ReminderSchedule,
    /// Declared peer keys; only these are stepped and reported.
    pub peers: BTreeSet<String>,
    pub progress: bool,
    /// Unix seconds when the monitor came up; the age reference for
    /// peers that have never completed a handshake.
    pub monitor_start: u64,
}

/// Resolve the wg tool path: `WG` env override when set and non-empty,
/// otherwise the stock location.
pub fn wg_tool() -> PathBuf {
    match std::env::var("WG") {
        Ok(v) if !v.trim().is_empty() => PathBuf::from(v),
        _ => PathBuf::from("/usr/bin/wg"),
    }
}
