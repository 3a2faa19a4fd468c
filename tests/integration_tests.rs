//! Integration tests for playlist-selector.
//!
//! These run whole sessions against playlists in temporary directories,
//! feeding scripted commands in place of a terminal.

use playlist_selector::config::Settings;
use playlist_selector::parser::{parse_playlist, BlockList};
use playlist_selector::session::{Session, SessionOutcome};
use playlist_selector::source::{read_local, Acquired};
use playlist_selector::store::{self, PersistedConfig, SessionPaths};
use std::fs;
use std::io::Cursor;
use std::path::Path;

const PLAYLIST: &str = "#EXTM3U\n\
#EXTINF:-1 tvg-id=\"espn\" group-title=\"Sports\",ESPN HD\n\
http://example.com/espn\n\
#EXTINF:-1 group-title=\"Sports\",Sports 2\n\
http://example.com/sports2\n\
#EXTINF:-1 group-title=\"News\",News 1\n\
http://example.com/news1\n\
#EXTINF:-1 group-title=\"News\",News 2\n\
http://example.com/news2\n";

fn write_playlist(dir: &Path, text: &str) -> Acquired {
    let path = dir.join("tv.m3u");
    fs::write(&path, text).unwrap();
    read_local(&path).unwrap()
}

fn run_session(settings: &Settings, acquired: &Acquired, script: &str) -> (SessionOutcome, String) {
    let mut session = Session::new(settings, Cursor::new(script.to_string()), Vec::new());
    let outcome = session.run(acquired).unwrap();
    (outcome, String::from_utf8(session.into_output()).unwrap())
}

fn saved_config(outcome: SessionOutcome) -> PersistedConfig {
    match outcome {
        SessionOutcome::Saved { config, .. } => config,
        SessionOutcome::NoGroupsKept => panic!("expected a saved session"),
    }
}

/// Keep the News group, select its page, and save.
#[test]
fn test_keep_news_group() {
    let dir = tempfile::tempdir().unwrap();
    let acquired = write_playlist(dir.path(), PLAYLIST);
    let settings = Settings::new();

    // Groups are sorted, so "News" is item 1 and "Sports" item 2.
    let (outcome, out) = run_session(&settings, &acquired, "1\nq\na\nq\n");
    let config = saved_config(outcome);

    assert_eq!(config.groups, vec!["News"]);
    assert_eq!(config.group_mode, "keep");
    assert_eq!(config.include_channels, vec!["News 1", "News 2"]);
    assert!(config.discard_channels.is_empty());
    assert!(out.contains("Found 2 groups, 4 channels."));
    assert!(out.contains("=== CHANNELS (25 per page) ==="));

    let paths = SessionPaths::for_playlist(&acquired.path);
    assert_eq!(store::load_config(&paths.config).unwrap(), config);
    assert_eq!(store::load_groups(&paths.groups).unwrap(), vec!["News"]);
}

/// A search with no matches clears itself and the full list comes back.
#[test]
fn test_empty_search_recovers() {
    let dir = tempfile::tempdir().unwrap();
    let acquired = write_playlist(dir.path(), PLAYLIST);
    let settings = Settings::new();

    let (outcome, out) = run_session(&settings, &acquired, "/zzz\n2\nq\n/news\n1\nq\n");
    let config = saved_config(outcome);

    assert!(out.contains("No groups match \"zzz\". Search cleared."));
    assert_eq!(config.groups, vec!["Sports"]);
    // Only Sports channels are candidates, so "/news" finds nothing.
    assert!(out.contains("No channels match \"news\". Search cleared."));
    assert_eq!(config.include_channels, vec!["ESPN HD"]);
    assert_eq!(config.discard_channels, vec!["Sports 2"]);
}

/// Channels removed from the playlist drop out of the restored selection.
#[test]
fn test_restore_by_intersection() {
    let dir = tempfile::tempdir().unwrap();
    let acquired = write_playlist(dir.path(), PLAYLIST);
    let settings = Settings::new();

    let (outcome, _) = run_session(&settings, &acquired, "1\nq\na\nq\n");
    saved_config(outcome);

    let updated = PLAYLIST.replace("News 2", "News 3");
    let acquired = write_playlist(dir.path(), &updated);

    // Accept the restored state on both pages.
    let (outcome, out) = run_session(&settings, &acquired, "q\nq\n");
    let config = saved_config(outcome);

    assert!(out.contains("Restored 1 of 1 saved groups."));
    assert_eq!(config.groups, vec!["News"]);
    assert_eq!(config.include_channels, vec!["News 1"]);
    assert_eq!(config.discard_channels, vec!["News 3"]);
}

/// Saving keeps fields written by other tools.
#[test]
fn test_save_preserves_foreign_fields() {
    let dir = tempfile::tempdir().unwrap();
    let acquired = write_playlist(dir.path(), PLAYLIST);
    let paths = SessionPaths::for_playlist(&acquired.path);
    fs::write(&paths.config, r#"{"epgurl": "http://example.com/epg.xml"}"#).unwrap();

    let settings = Settings::new();
    let (outcome, _) = run_session(&settings, &acquired, "1\nq\nq\n");
    let config = saved_config(outcome);
    assert!(config.include_channels.is_empty());

    let raw: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&paths.config).unwrap()).unwrap();
    assert_eq!(raw["epgurl"], "http://example.com/epg.xml");
    assert_eq!(raw["discard_channels"], serde_json::json!(["News 1", "News 2"]));
}

/// Quitting the group page with nothing kept ends the session early.
#[test]
fn test_no_groups_ends_early() {
    let dir = tempfile::tempdir().unwrap();
    let acquired = write_playlist(dir.path(), PLAYLIST);
    let settings = Settings::new();

    let (outcome, out) = run_session(&settings, &acquired, "q\n");
    assert_eq!(outcome, SessionOutcome::NoGroupsKept);
    assert!(out.contains("No groups selected."));
    assert!(!out.contains("=== CHANNELS"));

    let paths = SessionPaths::for_playlist(&acquired.path);
    assert!(!paths.config.exists());
    assert_eq!(store::load_groups(&paths.groups).unwrap(), Vec::<String>::new());
}

/// An empty playlist still shows a group page and ends cleanly.
#[test]
fn test_empty_playlist() {
    let dir = tempfile::tempdir().unwrap();
    let acquired = write_playlist(dir.path(), "#EXTM3U\n");
    let settings = Settings::new();

    let (outcome, out) = run_session(&settings, &acquired, "a\nq\n");
    assert_eq!(outcome, SessionOutcome::NoGroupsKept);
    assert!(out.contains("Found 0 groups, 0 channels."));
    assert!(out.contains("No items to show."));
}

/// `A` on the channel page keeps every candidate and finishes at once.
#[test]
fn test_select_all_channels_finishes() {
    let dir = tempfile::tempdir().unwrap();
    let acquired = write_playlist(dir.path(), PLAYLIST);
    let settings = Settings::new();

    let (outcome, out) = run_session(&settings, &acquired, "1-2\nq\nA\n");
    let config = saved_config(outcome);

    assert!(out.contains("ALL 4 channels selected!"));
    assert_eq!(config.include_channels.len(), 4);
    assert!(config.discard_channels.is_empty());
}

/// Parsing the same text twice gives the same playlist, and every channel
/// sits in exactly one group.
#[test]
fn test_parse_is_stable() {
    let blocklist = BlockList::new(&["sports", "espn"]).unwrap();
    let first = parse_playlist(PLAYLIST, &blocklist);
    let second = parse_playlist(PLAYLIST, &blocklist);
    assert_eq!(first, second);

    for (name, channel) in &first.channels {
        let holders: Vec<_> = first
            .groups
            .iter()
            .filter(|(_, members)| members.contains(name))
            .map(|(group, _)| group)
            .collect();
        assert_eq!(holders, vec![&channel.group]);
    }
    assert_eq!(first.blocked_count(), 2);
}
