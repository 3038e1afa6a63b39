//! Discovery and lexical parsing of the peer and URL list files.
//!
//! Search order per logical file, first hit wins: the explicit CLI path,
//! `<iface><ext>` then the base name in the working directory, then the
//! same two under `/etc/wg-monitor`.

use std::path::{Path, PathBuf};

use thiserror::Error;

pub const ETC_DIR: &str = "/etc/wg-monitor";
pub const PEERS_BASE: &str = "peers.list";
pub const PEERS_EXT: &str = ".list";
pub const URLS_BASE: &str = "batsign.url";
pub const URLS_EXT: &str = ".url";

#[derive(Debug, Error)]
pub enum ListError {
    #[error("cannot read {0}: {1}")]
    Io(PathBuf, std::io::Error),
    #[error("{0} is not valid UTF-8")]
    NotUtf8(PathBuf),
    #[error("{0} contains no entries")]
    Empty(PathBuf),
}

/// One parsed list file: accepted entries plus rejected lines for the log.
#[derive(Debug, Default)]
pub struct ListFile {
    pub entries: Vec<String>,
    pub rejected: Vec<String>,
}

/// Walk the search path for a logical file. `dirs` is ordered; each
/// directory is probed for the per-interface name before the base name.
pub fn locate(
    explicit: Option<&Path>,
    iface: &str,
    base: &str,
    ext: &str,
    dirs: &[&Path],
) -> Option<PathBuf> {
    if let Some(path) = explicit {
        if path.is_file() {
            return Some(path.to_path_buf());
        }
    }
    for dir in dirs {
        for name in [format!("{iface}{ext}"), base.to_string()] {
            let candidate = dir.join(name);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
    }
    None
}

/// Search path for normal operation: working directory, then the
/// system directory.
pub fn search_dirs() -> Vec<PathBuf> {
    vec![PathBuf::from("."), PathBuf::from(ETC_DIR)]
}

/// Read and lexically parse a list file.
///
/// Blank lines and `#` comments (whole-line or inline) are dropped;
/// remaining lines are trimmed and run through `accept`. Rejected lines
/// are collected, not fatal. A file with nothing but comments and
/// whitespace is an error of its own.
pub fn read_list(path: &Path, accept: fn(&str) -> bool) -> Result<ListFile, ListError> {
    let bytes = std::fs::read(path).map_err(|e| ListError::Io(path.to_path_buf(), e))?;
    let text = String::from_utf8(bytes).map_err(|_| ListError::NotUtf8(path.to_path_buf()))?;

    let mut out = ListFile::default();
    for raw in text.lines() {
        let line = match raw.find('#') {
            Some(i) => &raw[..i],
            None => raw,
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if accept(line) {
            out.entries.push(line.to_string());
        } else {
            out.rejected.push(line.to_string());
        }
    }
    if out.entries.is_empty() && out.rejected.is_empty() {
        return Err(ListError::Empty(path.to_path_buf()));
    }
    Ok(out)
}

/// Peer list entries must be well-formed keys.
pub fn read_peer_list(path: &Path) -> Result<ListFile, ListError> {
    read_list(path, common::peer::is_valid_key)
}

/// URL entries have no length constraint.
pub fn read_url_list(path: &Path) -> Result<ListFile, ListError> {
    read_list(path, |_| true)
}
