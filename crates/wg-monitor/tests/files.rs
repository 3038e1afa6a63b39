use std::fs;
use std::path::Path;

use wg_monitor::files::{locate, read_peer_list, read_url_list, ListError, PEERS_BASE, PEERS_EXT};

fn key(c: char) -> String {
    format!("{}=", c.to_string().repeat(43))
}

#[test]
fn explicit_path_wins_when_it_exists() {
    let dir = tempfile::tempdir().expect("tempdir");
    let explicit = dir.path().join("mine.list");
    fs::write(&explicit, key('A')).expect("write");
    fs::write(dir.path().join(format!("wg0{PEERS_EXT}")), key('B')).expect("write");

    let found = locate(
        Some(&explicit),
        "wg0",
        PEERS_BASE,
        PEERS_EXT,
        &[dir.path()],
    );
    assert_eq!(found, Some(explicit));
}

#[test]
fn missing_explicit_path_falls_through() {
    let dir = tempfile::tempdir().expect("tempdir");
    let per_iface = dir.path().join(format!("wg0{PEERS_EXT}"));
    fs::write(&per_iface, key('B')).expect("write");

    let found = locate(
        Some(Path::new("/nonexistent/mine.list")),
        "wg0",
        PEERS_BASE,
        PEERS_EXT,
        &[dir.path()],
    );
    assert_eq!(found, Some(per_iface));
}

#[test]
fn per_interface_beats_base_within_a_directory() {
    let dir = tempfile::tempdir().expect("tempdir");
    let per_iface = dir.path().join(format!("wg0{PEERS_EXT}"));
    fs::write(&per_iface, key('A')).expect("write");
    fs::write(dir.path().join(PEERS_BASE), key('B')).expect("write");

    let found = locate(None, "wg0", PEERS_BASE, PEERS_EXT, &[dir.path()]);
    assert_eq!(found, Some(per_iface));
}

#[test]
fn earlier_directory_beats_later_even_for_base_name() {
    let first = tempfile::tempdir().expect("tempdir");
    let second = tempfile::tempdir().expect("tempdir");
    let in_first = first.path().join(PEERS_BASE);
    fs::write(&in_first, key('A')).expect("write");
    fs::write(second.path().join(format!("wg0{PEERS_EXT}")), key('B')).expect("write");

    let found = locate(
        None,
        "wg0",
        PEERS_BASE,
        PEERS_EXT,
        &[first.path(), second.path()],
    );
    assert_eq!(found, Some(in_first));
}

#[test]
fn nothing_found_is_none() {
    let dir = tempfile::tempdir().expect("tempdir");
    assert_eq!(
        locate(None, "wg0", PEERS_BASE, PEERS_EXT, &[dir.path()]),
        None
    );
}

#[test]
fn peer_list_lexing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("peers.list");
    let (a, b) = (key('A'), key('B'));
    fs::write(
        &path,
        format!(
            "# heading comment\n\
             {a}\n\
             \n\
             \x20\x20# indented comment\n\
             {b}  # inline comment\n\
             short-entry\n\
             {}\n",
            "C".repeat(44) // 44 chars but no trailing =
        ),
    )
    .expect("write");

    let list = read_peer_list(&path).expect("parse");
    assert_eq!(list.entries, vec![a, b]);
    assert_eq!(list.rejected.len(), 2, "bad entries are collected, not fatal");
}

#[test]
fn url_list_has_no_shape_constraint() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("batsign.url");
    fs::write(&path, "https://example.net/batsign?x=1\nshort\n").expect("write");

    let list = read_url_list(&path).expect("parse");
    assert_eq!(list.entries.len(), 2);
    assert!(list.rejected.is_empty());
}

#[test]
fn comment_only_file_is_empty() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("peers.list");
    fs::write(&path, "# nothing\n\n   \n").expect("write");

    match read_peer_list(&path) {
        Err(ListError::Empty(p)) => assert_eq!(p, path),
        other => panic!("expected Empty, got {other:?}"),
    }
}

#[test]
fn non_utf8_file_is_its_own_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("peers.list");
    fs::write(&path, [0xffu8, 0xfe, 0x00, 0x41]).expect("write");

    match read_peer_list(&path) {
        Err(ListError::NotUtf8(p)) => assert_eq!(p, path),
        other => panic!("expected NotUtf8, got {other:?}"),
    }
}

#[test]
fn unreadable_file_is_io() {
    match read_peer_list(Path::new("/nonexistent/peers.list")) {
        Err(ListError::Io(_, _)) => {}
        other => panic!("expected Io, got {other:?}"),
    }
}
