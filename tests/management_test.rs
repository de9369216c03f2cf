use std::{path::Path, time::Duration};

use playlist_bridge::config::Settings;
use playlist_bridge::convert;
use playlist_bridge::error::Error;
use playlist_bridge::management::{SnapshotManager, UnmatchedManager};
use playlist_bridge::types::{MatchOutcome, ReconcileReport, SourceTrack, TrackOutcome};
use serde_json::Value;

fn report(outcomes: Vec<(SourceTrack, MatchOutcome)>) -> ReconcileReport {
    ReconcileReport {
        playlist_id: "p1".to_string(),
        outcomes: outcomes
            .into_iter()
            .map(|(track, outcome)| TrackOutcome { track, outcome })
            .collect(),
    }
}

#[tokio::test]
async fn test_unmatched_manager_writes_only_unmatched() {
    let dir = tempfile::tempdir().unwrap();
    let manager = UnmatchedManager::new(dir.path().join("unmatched").join("p1.json"));

    let written = manager
        .persist(&report(vec![
            (
                SourceTrack::new("a", "A", "X"),
                MatchOutcome::Added {
                    destination_id: "sa".to_string(),
                },
            ),
            (SourceTrack::new("b", "B", "Y"), MatchOutcome::NotFound),
            (
                SourceTrack::new("c", "C", "Z"),
                MatchOutcome::SearchFailed {
                    reason: "timeout".to_string(),
                },
            ),
        ]))
        .await
        .unwrap();

    assert_eq!(written, 2);
    let entries: Value =
        serde_json::from_str(&std::fs::read_to_string(manager.path()).unwrap()).unwrap();
    let entries = entries.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["id"], "b");
    assert_eq!(entries[0]["artist_name"], "Y");
    assert_eq!(entries[0]["outcome"]["status"], "not_found");
    assert_eq!(entries[1]["outcome"]["status"], "search_failed");
    assert_eq!(entries[1]["outcome"]["reason"], "timeout");
}

#[tokio::test]
async fn test_unmatched_manager_skips_complete_runs() {
    let dir = tempfile::tempdir().unwrap();
    let manager = UnmatchedManager::new(dir.path().join("p1.json"));

    let written = manager
        .persist(&report(vec![(
            SourceTrack::new("a", "A", "X"),
            MatchOutcome::Added {
                destination_id: "sa".to_string(),
            },
        )]))
        .await
        .unwrap();

    assert_eq!(written, 0);
    assert!(!manager.path().exists());
}

#[test]
fn test_unmatched_manager_for_playlist() {
    let manager = UnmatchedManager::for_playlist("pl.test");
    assert!(manager.path().ends_with("unmatched/pl.test.json"));
}

#[tokio::test]
async fn test_snapshot_manager_overwrites() {
    let dir = tempfile::tempdir().unwrap();
    let manager = SnapshotManager::new(dir.path().join("tracks.json"));

    manager
        .persist(&[SourceTrack::new("a", "A", "X")])
        .await
        .unwrap();
    manager
        .persist(&[SourceTrack::new("a", "A", "X"), SourceTrack::new("b", "B", "X")])
        .await
        .unwrap();

    let tracks: Vec<SourceTrack> =
        serde_json::from_str(&std::fs::read_to_string(manager.path()).unwrap()).unwrap();
    assert_eq!(tracks.len(), 2);
}

#[test]
fn test_settings_defaults() {
    let settings = Settings::default();

    assert_eq!(settings.server_address, "127.0.0.1:8000");
    assert_eq!(settings.apple_music_storefront, "us");
    assert_eq!(settings.item_delay, Duration::from_secs(5));
    assert_eq!(settings.http_timeout, Duration::from_secs(30));
    assert!(settings.client_id().is_err());
    assert!(settings.scope_param().contains("playlist-modify-private"));
    assert!(!settings.scope_param().contains(','));
}

#[test]
fn test_snapshot_manager_for_playlist() {
    let manager = SnapshotManager::for_playlist("/tmp/snapshots", "pl.test");
    assert_eq!(manager.path(), Path::new("/tmp/snapshots/pl.test.json"));
}

#[test]
fn test_source_snapshots_keyed_by_playlist() {
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings {
        apple_music_token: Some("apple-token".to_string()),
        snapshot_dir: dir.path().to_path_buf(),
        ..Settings::default()
    };

    let first = convert::source_enumerator(
        &settings,
        "https://music.apple.com/us/playlist/gym/pl.a",
        None,
    )
    .unwrap();
    let second = convert::source_enumerator(
        &settings,
        "https://music.apple.com/us/playlist/chill/pl.b",
        None,
    )
    .unwrap();

    assert_eq!(first.snapshot().unwrap().path(), dir.path().join("pl.a.json"));
    assert_eq!(second.snapshot().unwrap().path(), dir.path().join("pl.b.json"));
}

#[test]
fn test_source_enumerator_rejects_invalid_url() {
    let settings = Settings {
        apple_music_token: Some("apple-token".to_string()),
        ..Settings::default()
    };

    let result = convert::source_enumerator(&settings, "not a playlist url", None);

    assert!(matches!(result, Err(Error::InvalidPlaylistUrl(_))));
}
