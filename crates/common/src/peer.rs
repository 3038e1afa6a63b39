//! Peer records and the per-cycle connectivity state machine.
//!
//! - `PeerState::step` is the pure transition function; `Peer::step`
//!   applies it in place and reports whether the move counts as a change.
//! - A peer the tunnel has never completed a handshake with measures its
//!   age from the monitor's start time, so a fresh start gets one full
//!   timeout window before it can be flagged as lost.

use std::time::Duration;

/// Length of a base64-encoded WireGuard public key.
pub const KEY_LEN: usize = 44;

/// A well-formed peer key is exactly 44 characters and ends with `=`.
pub fn is_valid_key(s: &str) -> bool {
    s.len() == KEY_LEN && s.ends_with('=')
}

/// Connectivity classification of one peer.
///
/// `Unset` exists only between a record's creation and its first stepping
/// pass. `JustLost`/`JustReturned` are one-cycle edge labels; `Present`
/// and `StillLost` are the steady states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PeerState {
    Unset,
    Present,
    JustReturned,
    JustLost,
    StillLost,
}

impl PeerState {
    /// One cell of the transition table: `(state, timed_out)` to
    /// `(next state, counts as a change)`.
    pub fn step(self, timed_out: bool) -> (PeerState, bool) {
        use PeerState::*;
        match (self, timed_out) {
            (Unset, false) => (Present, false),
            // Already beyond the threshold on first observation: jump
            // straight to the steady lost state, but count it as a change
            // so the first cycle can report it.
            (Unset, true) => (StillLost, true),
            (Present, false) => (Present, false),
            (Present, true) => (JustLost, true),
            (JustReturned, false) => (Present, false),
            (JustReturned, true) => (JustLost, true),
            (JustLost, false) => (JustReturned, true),
            (JustLost, true) => (StillLost, false),
            (StillLost, false) => (JustReturned, true),
            (StillLost, true) => (StillLost, false),
        }
    }

    /// Short lowercase tag for progress output.
    pub fn label(self) -> &'static str {
        match self {
            PeerState::Unset => "unset",
            PeerState::Present => "present",
            PeerState::JustReturned => "just returned",
            PeerState::JustLost => "just lost",
            PeerState::StillLost => "still lost",
        }
    }
}

/// One remote tunnel participant.
#[derive(Debug, Clone)]
pub struct Peer {
    /// Base64 public key; primary identifier, immutable.
    pub key: String,
    pub state: PeerState,
    /// Unix seconds of the newest completed handshake, if any.
    pub latest_handshake: Option<u64>,
    /// True while the tool has never reported a nonzero handshake.
    pub never_seen: bool,
}

impl Peer {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            state: PeerState::Unset,
            latest_handshake: None,
            never_seen: true,
        }
    }

    /// Whether the peer has been quiet for longer than `threshold`.
    ///
    /// Never-seen peers are aged from `monitor_start` instead of a
    /// handshake timestamp.
    pub fn timed_out(&self, now: u64, monitor_start: u64, threshold: Duration) -> bool {
        let reference = if self.never_seen {
            monitor_start
        } else {
            self.latest_handshake.unwrap_or(monitor_start)
        };
        now.saturating_sub(reference) > threshold.as_secs()
    }

    /// Advance the state machine; returns whether the transition counts
    /// as a change.
    pub fn step(&mut self, timed_out: bool) -> bool {
        let (next, changed) = self.state.step(timed_out);
        self.state = next;
        changed
    }
}

/// Display identity carved out of a key's 7-character vanity prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerName {
    /// Capitalized site name.
    pub name: String,
    /// Electrical phase 1-3 from the vanity prefix, or 0 when absent.
    pub phase: u8,
}

/// Derive the display name from a peer key.
///
/// Within the first 7 characters: text before a `+` is the name and a
/// digit `1`-`3` right after the `+` is the phase; text before a `/` is
/// the name with no phase; otherwise the whole prefix is the name.
pub fn peer_name(key: &str) -> PeerName {
    let prefix: &str = match key.char_indices().nth(7) {
        Some((idx, _)) => &key[..idx],
        None => key,
    };
    if let Some(pos) = prefix.find('+') {
        let phase = match prefix[pos + 1..].chars().next() {
            Some(c @ '1'..='3') => c as u8 - b'0',
            _ => 0,
        };
        PeerName {
            name: capitalize(&prefix[..pos]),
            phase,
        }
    } else if let Some(pos) = prefix.find('/') {
        PeerName {
            name: capitalize(&prefix[..pos]),
            phase: 0,
        }
    } else {
        PeerName {
            name: capitalize(prefix),
            phase: 0,
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
