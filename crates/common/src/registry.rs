//! Keyed peer store and the per-cycle bucket partition.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use crate::peer::{Peer, PeerState};

/// Every peer ever observed on the interface, keyed by public key.
///
/// The probe inserts records and updates timestamps; the orchestrator
/// steps states. Peers that are not in the configured set stay in the
/// map but are never stepped, so they remain `Unset` and can never land
/// in a report bucket.
#[derive(Debug, Default)]
pub struct PeerRegistry {
    peers: BTreeMap<String, Peer>,
}

/// What one stepping pass did to the registry.
#[derive(Debug, Clone, Copy)]
pub struct StepOutcome {
    /// At least one peer made a counted transition.
    pub changed_any: bool,
    /// Every counted transition landed in `JustReturned` (good news only).
    pub only_returns: bool,
}

impl PeerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Peer> {
        self.peers.get(key)
    }

    /// Peers in ascending key order.
    pub fn peers(&self) -> impl Iterator<Item = &Peer> {
        self.peers.values()
    }

    /// Record a completed handshake at `secs`.
    pub fn note_handshake(&mut self, key: &str, secs: u64) {
        let peer = self
            .peers
            .entry(key.to_string())
            .or_insert_with(|| Peer::new(key));
        peer.latest_handshake = Some(secs);
        peer.never_seen = false;
    }

    /// Record the tool's "no handshake yet" sentinel for `key`.
    ///
    /// Any previously stored timestamp is left untouched; only the
    /// never-seen flag is raised.
    pub fn note_never_seen(&mut self, key: &str) {
        let peer = self
            .peers
            .entry(key.to_string())
            .or_insert_with(|| Peer::new(key));
        peer.never_seen = true;
    }

    /// Apply the state machine to every configured peer.
    pub fn step_peers(
        &mut self,
        configured: &BTreeSet<String>,
        now: u64,
        monitor_start: u64,
        threshold: Duration,
    ) -> StepOutcome {
        let mut changed = Vec::new();
        for (key, peer) in self.peers.iter_mut() {
            if !configured.contains(key) {
                continue;
            }
            let timed_out = peer.timed_out(now, monitor_start, threshold);
            if peer.step(timed_out) {
                changed.push(peer.state);
            }
        }
        StepOutcome {
            changed_any: !changed.is_empty(),
            only_returns: !changed.is_empty()
                && changed.iter().all(|s| *s == PeerState::JustReturned),
        }
    }

    /// Partition the registry into per-state buckets.
    ///
    /// The map iterates in key order, so each bucket comes out strictly
    /// ascending without a separate sort.
    pub fn sorted(&self) -> SortedBuckets {
        let mut buckets = SortedBuckets::default();
        for (key, peer) in &self.peers {
            match peer.state {
                PeerState::Unset => {}
                PeerState::Present => buckets.present.push(key.clone()),
                PeerState::JustReturned => buckets.just_returned.push(key.clone()),
                PeerState::JustLost => buckets.just_lost.push(key.clone()),
                PeerState::StillLost => buckets.still_lost.push(key.clone()),
            }
        }
        buckets
    }
}

/// Snapshot partition of the registry, one bucket per post-init state,
/// each sorted ascending by key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortedBuckets {
    pub present: Vec<String>,
    pub just_returned: Vec<String>,
    pub just_lost: Vec<String>,
    pub still_lost: Vec<String>,
}

impl SortedBuckets {
    /// No outage: nothing just-lost and nothing still-lost. Peers that
    /// just returned do not count against this.
    pub fn all_present(&self) -> bool {
        self.just_lost.is_empty() && self.still_lost.is_empty()
    }
}
