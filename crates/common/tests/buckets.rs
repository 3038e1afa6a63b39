use std::collections::BTreeSet;
use std::time::Duration;

use common::registry::PeerRegistry;

const THRESHOLD: Duration = Duration::from_secs(600);
const START: u64 = 1_700_000_000;

fn key(name: &str) -> String {
    format!("{name}{}=", "A".repeat(43 - name.len()))
}

fn configured(keys: &[&String]) -> BTreeSet<String> {
    keys.iter().map(|k| (*k).clone()).collect()
}

#[test]
fn buckets_are_sorted_ascending() {
    let (a, b, c) = (key("aaa"), key("bbb"), key("ccc"));
    let now = START + 100;

    let mut reg = PeerRegistry::new();
    // Insert out of order; the registry keys the map, not insertion order.
    reg.note_handshake(&c, now - 10);
    reg.note_handshake(&a, now - 20);
    reg.note_handshake(&b, now - 30);

    reg.step_peers(&configured(&[&a, &b, &c]), now, START, THRESHOLD);
    let buckets = reg.sorted();

    assert_eq!(buckets.present, vec![a, b, c]);
    for window in buckets.present.windows(2) {
        assert!(window[0] < window[1]);
    }
}

#[test]
fn partition_covers_all_stepped_states() {
    let (a, b, c) = (key("aaa"), key("bbb"), key("ccc"));
    let now = START + 10_000;

    let mut reg = PeerRegistry::new();
    reg.note_handshake(&a, now - 10); // present
    reg.note_handshake(&b, now - 10); // will be lost next pass
    reg.note_handshake(&c, now - 9_000); // lost from the first pass

    let all = configured(&[&a, &b, &c]);
    reg.step_peers(&all, now, START, THRESHOLD);
    let buckets = reg.sorted();
    assert_eq!(buckets.present, vec![a.clone(), b.clone()]);
    // An over-threshold first observation goes straight to still-lost.
    assert_eq!(buckets.still_lost, vec![c.clone()]);
    assert!(!buckets.all_present());

    // b stops answering, c comes back.
    let later = now + 700;
    reg.note_handshake(&a, later - 5);
    reg.note_handshake(&c, later - 5);
    reg.step_peers(&all, later, START, THRESHOLD);
    let buckets = reg.sorted();
    assert_eq!(buckets.present, vec![a]);
    assert_eq!(buckets.just_lost, vec![b]);
    assert_eq!(buckets.just_returned, vec![c]);
}

/// all_present ignores the just-returned bucket.
#[test]
fn all_present_ignores_returns() {
    let a = key("aaa");
    let now = START + 2_000;

    let mut reg = PeerRegistry::new();
    reg.note_handshake(&a, START); // lost on first step
    let all = configured(&[&a]);
    reg.step_peers(&all, now, START, THRESHOLD);
    assert!(!reg.sorted().all_present());

    reg.note_handshake(&a, now + 600);
    reg.step_peers(&all, now + 700, START, THRESHOLD);
    let buckets = reg.sorted();
    assert_eq!(buckets.just_returned, vec![a]);
    assert!(buckets.all_present());
}

/// Sorting is a pure snapshot: calling it twice yields the same partition.
#[test]
fn sorting_is_idempotent() {
    let (a, b) = (key("aaa"), key("bbb"));
    let now = START + 100;

    let mut reg = PeerRegistry::new();
    reg.note_handshake(&a, now - 10);
    reg.note_handshake(&b, now - 10);
    reg.step_peers(&configured(&[&a, &b]), now, START, THRESHOLD);

    assert_eq!(reg.sorted(), reg.sorted());
}

/// Undeclared peers are tracked but never stepped, so they stay out of
/// every bucket.
#[test]
fn undeclared_peers_are_skipped() {
    let (a, stranger) = (key("aaa"), key("zzz"));
    let now = START + 100;

    let mut reg = PeerRegistry::new();
    reg.note_handshake(&a, now - 10);
    reg.note_handshake(&stranger, now - 10);

    let outcome = reg.step_peers(&configured(&[&a]), now, START, THRESHOLD);
    assert!(!outcome.changed_any);

    let buckets = reg.sorted();
    assert_eq!(buckets.present, vec![a]);
    assert!(buckets.just_returned.is_empty());
    assert!(buckets.just_lost.is_empty());
    assert!(buckets.still_lost.is_empty());
    assert_eq!(reg.len(), 2, "the stranger is still tracked");
}

#[test]
fn only_returns_flags_good_news_cycles() {
    let (a, b) = (key("aaa"), key("bbb"));
    let all = configured(&[&a, &b]);
    let mut reg = PeerRegistry::new();

    // Cycle 1: both fine.
    let t1 = START + 100;
    reg.note_handshake(&a, t1 - 10);
    reg.note_handshake(&b, t1 - 10);
    let out = reg.step_peers(&all, t1, START, THRESHOLD);
    assert!(!out.changed_any);

    // Cycle 2: both lost — a change, but not returns-only.
    let t2 = t1 + 1_000;
    let out = reg.step_peers(&all, t2, START, THRESHOLD);
    assert!(out.changed_any);
    assert!(!out.only_returns);

    // Cycle 3: only a comes back.
    let t3 = t2 + 100;
    reg.note_handshake(&a, t3 - 10);
    let out = reg.step_peers(&all, t3, START, THRESHOLD);
    assert!(out.changed_any, "a return is a change");
    assert!(out.only_returns, "the only change is a return");

    // Cycle 4: a fine, b comes back but a also drops.
    let t4 = t3 + 1_000;
    reg.note_handshake(&b, t4 - 10);
    let out = reg.step_peers(&all, t4, START, THRESHOLD);
    assert!(out.changed_any);
    assert!(!out.only_returns, "a loss rode along with the return");
}

/// The never-seen sentinel raises the flag without touching the stamp.
#[test]
fn never_seen_sentinel_keeps_timestamp() {
    let a = key("aaa");
    let mut reg = PeerRegistry::new();

    reg.note_handshake(&a, START);
    reg.note_never_seen(&a);

    let peer = reg.get(&a).expect("peer exists");
    assert!(peer.never_seen);
    assert_eq!(peer.latest_handshake, Some(START));
}
