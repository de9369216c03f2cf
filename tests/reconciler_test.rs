use playlist_bridge::convert::{self, ConversionRequest};
use playlist_bridge::error::Error;
use playlist_bridge::spotify::playlist::{self, PlaylistLookup};
use playlist_bridge::types::{CurrentUser, MatchOutcome, SourceTrack};

mod common;

use common::{
    FakeCatalog, FakeDestination, PLAYLIST_URL, Scripted, enumerator, fast_retry, page, reconciler,
    terminal_page,
};

fn user() -> CurrentUser {
    CurrentUser {
        id: "user-1".to_string(),
        display_name: None,
    }
}

fn request(name: &str) -> ConversionRequest {
    ConversionRequest {
        source_url: PLAYLIST_URL.to_string(),
        playlist_name: name.to_string(),
        description: "Converted".to_string(),
        public: false,
    }
}

#[tokio::test]
async fn test_resolve_creates_missing_playlist() {
    let destination = FakeDestination::new().with_playlist("p0", "Other");
    let reconciler = reconciler(destination.clone());

    let id = reconciler
        .resolve_playlist(&user(), "Gym", true, "From Apple Music")
        .await
        .unwrap();

    let created = destination.created();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].name, "Gym");
    assert_eq!(created[0].description, "From Apple Music");
    assert!(created[0].public);
    assert_eq!(id, "created-1");
}

#[tokio::test]
async fn test_resolve_is_idempotent() {
    let destination = FakeDestination::new();
    let reconciler = reconciler(destination.clone());

    let first = reconciler
        .resolve_playlist(&user(), "Gym", false, "")
        .await
        .unwrap();
    let second = reconciler
        .resolve_playlist(&user(), "Gym", false, "")
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(destination.created().len(), 1);
}

#[tokio::test]
async fn test_resolve_finds_playlist_on_later_page() {
    let mut destination = FakeDestination::new();
    for n in 0..120 {
        destination = destination.with_playlist(&format!("p{n}"), &format!("List {n}"));
    }
    destination = destination.with_playlist("target", "Gym");
    let reconciler = reconciler(destination.clone());

    let id = reconciler
        .resolve_playlist(&user(), "Gym", false, "")
        .await
        .unwrap();

    assert_eq!(id, "target");
    assert_eq!(destination.listings(), 3);
    assert!(destination.created().is_empty());
}

#[tokio::test]
async fn test_resolve_requires_exact_name() {
    let destination = FakeDestination::new().with_playlist("p1", "gym");
    let lookup = playlist::find_playlist(&destination, &fast_retry(), "user-1", "Gym")
        .await
        .unwrap();
    assert_eq!(lookup, PlaylistLookup::NotFound);
}

#[tokio::test]
async fn test_resolve_retries_listing() {
    let destination = FakeDestination::new()
        .with_playlist("p1", "Gym")
        .with_failing_listings(4);
    let reconciler = reconciler(destination.clone());

    let id = reconciler
        .resolve_playlist(&user(), "Gym", false, "")
        .await
        .unwrap();

    assert_eq!(id, "p1");
    assert_eq!(destination.listings(), 5);
    assert!(destination.created().is_empty());
}

#[tokio::test]
async fn test_resolve_creates_when_listing_unverifiable() {
    let destination = FakeDestination::new()
        .with_playlist("p1", "Gym")
        .with_failing_listings(5);

    let lookup = playlist::find_playlist(&destination, &fast_retry(), "user-1", "Gym")
        .await
        .unwrap();
    assert!(matches!(lookup, PlaylistLookup::Unverified { .. }));

    let destination = FakeDestination::new()
        .with_playlist("p1", "Gym")
        .with_failing_listings(5);
    let id = reconciler(destination.clone())
        .resolve_playlist(&user(), "Gym", false, "")
        .await
        .unwrap();

    // Existing playlist could not be seen, so a second one is created
    assert_ne!(id, "p1");
    assert_eq!(destination.created().len(), 1);
}

#[tokio::test]
async fn test_append_skips_unmatched_tracks() {
    let destination = FakeDestination::new()
        .with_track("A", "X", "sa")
        .with_track("C", "X", "sc");
    let reconciler = reconciler(destination.clone());
    let tracks = vec![
        SourceTrack::new("a", "A", "X"),
        SourceTrack::new("b", "B", "X"),
        SourceTrack::new("c", "C", "X"),
    ];

    let report = reconciler.append_tracks("p1", &tracks).await;

    assert_eq!(destination.playlist_tracks("p1"), vec!["sa", "sc"]);
    assert_eq!(report.added_ids(), vec!["sa", "sc"]);
    assert_eq!(report.outcomes[1].outcome, MatchOutcome::NotFound);
    assert_eq!(
        destination.searches(),
        vec![
            "track:'A' artist:'X'",
            "track:'B' artist:'X'",
            "track:'C' artist:'X'"
        ]
    );
    // One append call per matched track
    assert!(destination.appended().iter().all(|(_, ids)| ids.len() == 1));
}

#[tokio::test]
async fn test_append_continues_after_failures() {
    let destination = FakeDestination::new()
        .with_track("A", "X", "sa")
        .with_track("B", "X", "sb")
        .with_track("C", "X", "sc")
        .with_failing_search("A", "X")
        .with_failing_append("sb");
    let reconciler = reconciler(destination.clone());
    let tracks = vec![
        SourceTrack::new("a", "A", "X"),
        SourceTrack::new("b", "B", "X"),
        SourceTrack::new("c", "C", "X"),
    ];

    let report = reconciler.append_tracks("p1", &tracks).await;

    assert!(matches!(
        report.outcomes[0].outcome,
        MatchOutcome::SearchFailed { .. }
    ));
    assert!(matches!(
        &report.outcomes[1].outcome,
        MatchOutcome::AppendFailed { destination_id, .. } if destination_id == "sb"
    ));
    assert_eq!(destination.playlist_tracks("p1"), vec!["sc"]);
    assert_eq!(report.unmatched().len(), 2);
}

#[tokio::test]
async fn test_append_preserves_duplicates() {
    let destination = FakeDestination::new().with_track("A", "X", "sa");
    let reconciler = reconciler(destination.clone());
    let tracks = vec![SourceTrack::new("a", "A", "X"), SourceTrack::new("a", "A", "X")];

    reconciler.append_tracks("p1", &tracks).await;

    assert_eq!(destination.playlist_tracks("p1"), vec!["sa", "sa"]);
}

#[tokio::test]
async fn test_authenticate_rejects_bad_token() {
    let destination = FakeDestination::unauthorized();
    let result = reconciler(destination).authenticate().await;
    assert!(matches!(result, Err(Error::Authentication(_))));
}

#[tokio::test]
async fn test_convert_single_track() {
    let catalog = FakeCatalog::new(vec![Scripted::Page(page(&[("1", "Song1", "Artist1")], None))]);
    let destination = FakeDestination::new().with_track("Song1", "Artist1", "s1");

    let report = convert::run(
        &enumerator(catalog),
        &reconciler(destination.clone()),
        &request("Gym"),
    )
    .await
    .unwrap();

    let created = destination.created();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].name, "Gym");
    assert_eq!(destination.searches(), vec!["track:'Song1' artist:'Artist1'"]);
    assert_eq!(destination.playlist_tracks(&report.playlist_id), vec!["s1"]);
}

#[tokio::test]
async fn test_convert_skips_track_without_match() {
    let catalog = FakeCatalog::new(vec![
        Scripted::Page(page(&[("1", "Song1", "ArtistX")], Some(1))),
        Scripted::Page(page(&[("2", "Song2", "ArtistY")], Some(2))),
        Scripted::Page(terminal_page()),
    ]);
    let destination = FakeDestination::new().with_track("Song1", "ArtistX", "s1");

    let report = convert::run(
        &enumerator(catalog),
        &reconciler(destination.clone()),
        &request("Mix"),
    )
    .await
    .unwrap();

    assert_eq!(destination.playlist_tracks(&report.playlist_id), vec!["s1"]);
    assert_eq!(report.outcomes.len(), 2);
    assert_eq!(report.outcomes[1].track.name, "Song2");
    assert_eq!(report.outcomes[1].outcome, MatchOutcome::NotFound);
}

#[tokio::test]
async fn test_convert_reuses_existing_playlist() {
    let catalog = FakeCatalog::new(vec![Scripted::Page(page(&[("1", "Song1", "Artist1")], None))]);
    let destination = FakeDestination::new()
        .with_playlist("existing", "Gym")
        .with_track("Song1", "Artist1", "s1");

    let report = convert::run(
        &enumerator(catalog),
        &reconciler(destination.clone()),
        &request("Gym"),
    )
    .await
    .unwrap();

    assert_eq!(report.playlist_id, "existing");
    assert!(destination.created().is_empty());
    assert_eq!(destination.playlist_tracks("existing"), vec!["s1"]);
}

#[tokio::test]
async fn test_convert_auth_failure_touches_nothing() {
    let catalog = FakeCatalog::new(vec![Scripted::Page(page(&[("1", "Song1", "Artist1")], None))]);
    let destination = FakeDestination::unauthorized();

    let result = convert::run(
        &enumerator(catalog.clone()),
        &reconciler(destination.clone()),
        &request("Gym"),
    )
    .await;

    assert!(matches!(result, Err(Error::Authentication(_))));
    assert!(catalog.calls().is_empty());
    assert_eq!(destination.listings(), 0);
    assert!(destination.searches().is_empty());
    assert!(destination.created().is_empty());
}

#[tokio::test]
async fn test_convert_fetch_failure_creates_nothing() {
    let catalog = FakeCatalog::new(vec![
        Scripted::Page(page(&[("1", "Song1", "Artist1")], Some(1))),
        Scripted::Fail,
        Scripted::Fail,
        Scripted::Fail,
        Scripted::Fail,
        Scripted::Fail,
    ]);
    let destination = FakeDestination::new().with_track("Song1", "Artist1", "s1");

    let result = convert::run(
        &enumerator(catalog),
        &reconciler(destination.clone()),
        &request("Gym"),
    )
    .await;

    assert!(matches!(result, Err(Error::FetchFailure { offset: 1, .. })));
    assert!(destination.created().is_empty());
    assert!(destination.appended().is_empty());
}
