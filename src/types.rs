use std::time::Duration;

use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// Body of a successful authorization-code exchange. Only the access token
/// is kept; each run authorizes anew.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
}

/// Everything needed to swap an authorization code for an access token.
#[derive(Debug, Clone)]
pub struct CodeExchange {
    pub token_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub timeout: Duration,
}

/// State shared between the interactive authorization flow and its callback
/// handler.
#[derive(Debug, Clone)]
pub struct PendingAuthorization {
    pub state: String,
    pub exchange: CodeExchange,
    pub access_token: Option<String>,
}

/// A track read from the source catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceTrack {
    pub id: String,
    pub name: String,
    pub artist_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isrc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

impl SourceTrack {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        artist_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            artist_name: artist_name.into(),
            album_name: None,
            isrc: None,
            duration_ms: None,
        }
    }
}

/// `resources.songs.<id>` entry of a catalog page.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogSong {
    pub id: String,
    pub attributes: CatalogSongAttributes,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSongAttributes {
    pub name: String,
    pub artist_name: String,
    pub album_name: Option<String>,
    pub isrc: Option<String>,
    pub duration_in_millis: Option<u64>,
}

impl From<CatalogSong> for SourceTrack {
    fn from(song: CatalogSong) -> Self {
        SourceTrack {
            id: song.id,
            name: song.attributes.name,
            artist_name: song.attributes.artist_name,
            album_name: song.attributes.album_name,
            isrc: song.attributes.isrc,
            duration_ms: song.attributes.duration_in_millis,
        }
    }
}

/// One parsed page of the source catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    Tracks {
        tracks: Vec<SourceTrack>,
        next_offset: Option<u32>,
    },
    /// The page carried no resources; the playlist has been read completely.
    Exhausted,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: String,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlaylistRequest {
    pub name: String,
    pub description: String,
    pub public: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub public: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetUserPlaylistsResponse {
    pub items: Vec<Playlist>,
    pub next: Option<String>,
    #[serde(default)]
    pub total: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub tracks: Option<SearchTracks>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchTracks {
    pub items: Vec<Track>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    pub uri: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTrackToPlaylistRequest {
    pub uris: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTrackToPlaylistResponse {
    pub snapshot_id: String,
}

/// What happened to one source track during reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MatchOutcome {
    Added { destination_id: String },
    NotFound,
    SearchFailed { reason: String },
    AppendFailed { destination_id: String, reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct TrackOutcome {
    pub track: SourceTrack,
    pub outcome: MatchOutcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconcileReport {
    pub playlist_id: String,
    pub outcomes: Vec<TrackOutcome>,
}

impl ReconcileReport {
    /// Destination ids in the order they were appended.
    pub fn added_ids(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter_map(|o| match &o.outcome {
                MatchOutcome::Added { destination_id } => Some(destination_id.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn added_count(&self) -> usize {
        self.added_ids().len()
    }

    pub fn unmatched(&self) -> Vec<&TrackOutcome> {
        self.outcomes
            .iter()
            .filter(|o| !matches!(o.outcome, MatchOutcome::Added { .. }))
            .collect()
    }
}

#[derive(Tabled)]
pub struct UnmatchedTableRow {
    pub name: String,
    pub artist: String,
    pub reason: String,
}

impl From<&TrackOutcome> for UnmatchedTableRow {
    fn from(o: &TrackOutcome) -> Self {
        let reason = match &o.outcome {
            MatchOutcome::Added { .. } => "added".to_string(),
            MatchOutcome::NotFound => "no match".to_string(),
            MatchOutcome::SearchFailed { reason } => format!("search failed: {reason}"),
            MatchOutcome::AppendFailed { reason, .. } => format!("append failed: {reason}"),
        };
        UnmatchedTableRow {
            name: o.track.name.clone(),
            artist: o.track.artist_name.clone(),
            reason,
        }
    }
}

/// Body of `POST /create_playlist`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistCreateRequest {
    pub apple_playlist_url: String,
    pub playlist_name: String,
    pub access_token: String,
    #[serde(default)]
    pub public: bool,
    #[serde(default)]
    pub description: Option<String>,
}
