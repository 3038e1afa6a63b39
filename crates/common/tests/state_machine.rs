use std::time::Duration;

use common::peer::{is_valid_key, Peer, PeerState};

const THRESHOLD: Duration = Duration::from_secs(600);

fn stepped(state: PeerState, timed_out: bool) -> (PeerState, bool) {
    state.step(timed_out)
}

#[test]
fn full_transition_table() {
    use PeerState::*;
    let table = [
        (Unset, false, Present, false),
        (Unset, true, StillLost, true),
        (Present, false, Present, false),
        (Present, true, JustLost, true),
        (JustReturned, false, Present, false),
        (JustReturned, true, JustLost, true),
        (JustLost, false, JustReturned, true),
        (JustLost, true, StillLost, false),
        (StillLost, false, JustReturned, true),
        (StillLost, true, StillLost, false),
    ];
    for (from, timed_out, to, changed) in table {
        assert_eq!(
            stepped(from, timed_out),
            (to, changed),
            "step({from:?}, {timed_out})"
        );
    }
}

#[test]
fn stepped_state_is_never_unset() {
    use PeerState::*;
    for state in [Unset, Present, JustReturned, JustLost, StillLost] {
        for timed_out in [false, true] {
            let (next, _) = stepped(state, timed_out);
            assert_ne!(next, Unset);
        }
    }
}

/// A lost peer that answers again always surfaces as JustReturned.
#[test]
fn recovery_lands_in_just_returned() {
    use PeerState::*;
    for start in [Unset, Present, JustLost, StillLost] {
        let (lost, _) = stepped(start, true);
        let (back, changed) = stepped(lost, false);
        assert_eq!(back, JustReturned, "from {start:?}");
        assert!(changed);
    }
}

/// Two healthy cycles from scratch settle on Present.
#[test]
fn two_healthy_steps_settle_on_present() {
    let mut peer = Peer::new("k");
    peer.step(false);
    peer.step(false);
    assert_eq!(peer.state, PeerState::Present);
}

#[test]
fn timed_out_uses_handshake_age() {
    let now = 1_700_000_000;
    let mut peer = Peer::new("k");
    peer.never_seen = false;

    peer.latest_handshake = Some(now - 599);
    assert!(!peer.timed_out(now, 0, THRESHOLD));

    peer.latest_handshake = Some(now - 600);
    assert!(!peer.timed_out(now, 0, THRESHOLD), "exactly at threshold is not yet lost");

    peer.latest_handshake = Some(now - 601);
    assert!(peer.timed_out(now, 0, THRESHOLD));
}

/// Never-seen peers age from the monitor's start, so a fresh start gets
/// one full timeout window before they can be flagged.
#[test]
fn never_seen_ages_from_monitor_start() {
    let start = 1_700_000_000;
    let peer = Peer::new("k");
    assert!(peer.never_seen);
    assert!(!peer.timed_out(start + 1, start, THRESHOLD));
    assert!(!peer.timed_out(start + 600, start, THRESHOLD));
    assert!(peer.timed_out(start + 601, start, THRESHOLD));
}

#[test]
fn key_validation() {
    let good = format!("{}=", "A".repeat(43));
    assert!(is_valid_key(&good));
    assert!(!is_valid_key(&"A".repeat(44)), "must end with =");
    assert!(!is_valid_key(&format!("{}=", "A".repeat(42))), "too short");
    assert!(!is_valid_key(""));
}
