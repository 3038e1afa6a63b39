//! Driving `wg show` and classifying its failures.

use std::path::Path;

use thiserror::Error;
use tokio::process::Command;

/// Classified probe failure. The matched substrings come from the wg
/// tool's stderr and are a stable part of its CLI contract.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("wg needs elevated privileges")]
    NeedElevation,
    #[error("interface {0} does not exist")]
    NoSuchInterface(String),
    #[error("address family not supported")]
    NetworkFailure,
    #[error("wg tool not found at {0}")]
    ToolMissing(String),
    #[error("wg failed: {0}")]
    Generic(String),
}

/// One parsed `latest-handshakes` row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandshakeRow {
    /// A completed handshake at `secs` (Unix seconds).
    Seen { key: String, secs: u64 },
    /// The tool's "no handshake yet" sentinel.
    NeverSeen { key: String },
}

/// Parse the TSV output of `wg show <iface> latest-handshakes`.
///
/// One row per peer, `<key>\t<unix seconds>`. Rows without a tab, with
/// an empty value or with an unparsable value are skipped; a value whose
/// first byte is `0` is the never-seen sentinel. Parsing never touches
/// the registry; callers apply the rows afterwards.
pub fn parse_handshake_rows(text: &str) -> Vec<HandshakeRow> {
    let mut rows = Vec::new();
    for line in text.lines() {
        let Some((key, value)) = line.split_once('\t') else {
            continue;
        };
        if value.is_empty() {
            continue;
        }
        if value.as_bytes()[0] == b'0' {
            rows.push(HandshakeRow::NeverSeen {
                key: key.to_string(),
            });
        } else if let Ok(secs) = value.trim().parse::<u64>() {
            rows.push(HandshakeRow::Seen {
                key: key.to_string(),
                secs,
            });
        }
    }
    rows
}

/// The node's own public key on `iface`.
pub async fn own_public_key(tool: &Path, iface: &str) -> Result<String, ProbeError> {
    let stdout = run_show(tool, iface, "public-key").await?;
    Ok(stdout.trim().to_string())
}

/// Current handshake rows for every peer on `iface`.
pub async fn latest_handshakes(tool: &Path, iface: &str) -> Result<Vec<HandshakeRow>, ProbeError> {
    let stdout = run_show(tool, iface, "latest-handshakes").await?;
    Ok(parse_handshake_rows(&stdout))
}

async fn run_show(tool: &Path, iface: &str, subcommand: &str) -> Result<String, ProbeError> {
    let output = Command::new(tool)
        .arg("show")
        .arg(iface)
        .arg(subcommand)
        .output()
        .await
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ProbeError::ToolMissing(tool.display().to_string()),
            _ => ProbeError::Generic(e.to_string()),
        })?;

    if output.status.success() {
        return Ok(String::from_utf8_lossy(&output.stdout).into_owned());
    }

    // The tool writes its complaints to stderr, but be lenient about
    // which stream carried them.
    let mut text = String::from_utf8_lossy(&output.stderr).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stdout));
    Err(classify_failure(iface, &text))
}

/// Map the tool's complaint text onto the error taxonomy.
pub fn classify_failure(iface: &str, text: &str) -> ProbeError {
    if text.contains("Operation not permitted") {
        ProbeError::NeedElevation
    } else if text.contains("No such device") {
        ProbeError::NoSuchInterface(iface.to_string())
    } else if text.contains("Address family not supported by protocol") {
        ProbeError::NetworkFailure
    } else {
        ProbeError::Generic(text.trim().to_string())
    }
}
