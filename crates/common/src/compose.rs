//! Renders the notification body from a bucket snapshot.

use chrono::{Local, TimeZone};

use crate::lang::Translation;
use crate::peer::{peer_name, PeerName};
use crate::registry::{PeerRegistry, SortedBuckets};

/// `YYYY-MM-DD HH:MM` in local time.
pub fn format_timestamp(secs: u64) -> String {
    Local
        .timestamp_opt(secs as i64, 0)
        .earliest()
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| format!("@{secs}"))
}

/// Human name for a peer key, phase expansion included.
pub fn display_name(key: &str, t: &Translation) -> String {
    let PeerName { name, phase } = peer_name(key);
    if phase > 0 {
        t.phase_description
            .replace("$phaseName", &name)
            .replace("$phaseNumber", &phase.to_string())
    } else {
        name
    }
}

enum RowPhrase {
    Lost,
    Back,
}

/// Assemble the report lines for one cycle. Callers join with `\n`.
///
/// Cycle 0 is the restart announcement and nothing else. Later cycles
/// render one section per non-empty bucket (lost, returned, still lost,
/// in that fixed order), a blank line between sections, and close with
/// the all-clear line once no outage remains.
pub fn compose_body(
    t: &Translation,
    server_name: &str,
    buckets: &SortedBuckets,
    registry: &PeerRegistry,
    cycle: u64,
) -> Vec<String> {
    let mut lines = Vec::new();
    if cycle == 0 {
        lines.push(t.power_restored.replace("$serverName", server_name));
        return lines;
    }

    let sections = [
        (&buckets.just_lost, &t.just_lost, RowPhrase::Lost),
        (&buckets.just_returned, &t.just_returned, RowPhrase::Back),
        (&buckets.still_lost, &t.still_lost, RowPhrase::Lost),
    ];

    for (keys, header, phrase) in sections {
        if keys.is_empty() {
            continue;
        }
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push(
            header
                .replace("$numPeers", &keys.len().to_string())
                .replace("$peerNoun", t.peer_noun(keys.len())),
        );
        for key in keys {
            lines.push(format!("    {}, {}", display_name(key, t), row_phrase(t, registry, key, &phrase)));
        }
    }

    if buckets.all_present() {
        if !lines.is_empty() {
            lines.push(String::new());
            lines.push(t.all_present.replace("$serverName", server_name));
        } else {
            // Nothing else to say (e.g. no peers configured at all):
            // the bare all-clear line is the whole report.
            lines.push(t.all_present.replace("$serverName", server_name));
        }
    }
    lines
}

fn row_phrase(t: &Translation, registry: &PeerRegistry, key: &str, phrase: &RowPhrase) -> String {
    match registry.get(key) {
        Some(peer) if !peer.never_seen => {
            let stamp = format_timestamp(peer.latest_handshake.unwrap_or(0));
            let template = match phrase {
                RowPhrase::Lost => &t.last_seen,
                RowPhrase::Back => &t.back,
            };
            template.replace("$timestamp", &stamp)
        }
        _ => t.not_seen_since_restart.clone(),
    }
}
