//! Command line surface and the stable exit codes.

use clap::Parser;
use std::path::PathBuf;

/// Watch a WireGuard interface and phone home when peers go quiet.
#[derive(Parser, Debug)]
#[command(name = "wg-monitor", version, about)]
pub struct Opts {
    /// WireGuard interface to watch
    pub interface: String,

    /// Peer list file (overrides the search path)
    #[arg(long)]
    pub peer_file: Option<PathBuf>,

    /// Notification URL file (overrides the search path)
    #[arg(long)]
    pub url_file: Option<PathBuf>,

    /// External notification command
    #[arg(long)]
    pub command: Option<PathBuf>,

    /// Notify through both the command and the URLs
    #[arg(long)]
    pub both: bool,

    /// CA bundle for HTTPS notification endpoints
    #[arg(long)]
    pub ca_bundle: Option<PathBuf>,

    /// Seconds of handshake silence before a peer counts as lost
    #[arg(long, default_value_t = 600)]
    pub timeout: u64,

    /// Seconds to sleep between polling cycles
    #[arg(long, default_value_t = 60)]
    pub interval: u64,

    /// Five escalating reminder delays in seconds, comma separated
    #[arg(
        long,
        value_delimiter = ',',
        default_value = "21600,86400,172800,259200,604800"
    )]
    pub reminders: Vec<u64>,

    /// Keep retrying at startup until the interface exists
    #[arg(long)]
    pub wait_for_interface: bool,

    /// Print per-peer state lines every cycle
    #[arg(long)]
    pub progress: bool,

    /// Report language
    #[arg(long, default_value = "english")]
    pub lang: String,

    /// List available report languages and exit
    #[arg(long)]
    pub list_languages: bool,

    /// Print the report to stdout instead of sending it
    #[arg(long)]
    pub dry_run: bool,

    /// Internal marker: this process was already re-executed under sudo
    #[arg(long, hide = true)]
    pub elevated: bool,
}

/// Stable exit codes. Scripts and the service unit depend on these.
pub mod exit {
    pub const OK: i32 = 0;
    pub const FAILURE: i32 = 1;
    pub const CLI: i32 = 8;
    pub const EXCEPTION: i32 = 9;
    pub const MISSING_FILES: i32 = 10;
    pub const UNKNOWN_LANGUAGE: i32 = 11;
    pub const TOOL_MISSING: i32 = 12;
    pub const NETWORK: i32 = 13;
    pub const PERMISSIONS: i32 = 14;
    pub const EMPTY_FILE: i32 = 15;
    pub const NOT_UTF8: i32 = 16;
}
