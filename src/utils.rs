use base64::{Engine, engine::general_purpose::STANDARD};
use rand::{Rng, distr::Alphanumeric};
use url::Url;

use crate::{Res, error::Error};

/// Random value for the OAuth `state` parameter.
pub fn generate_state() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

/// `Authorization` header value for client-credential authenticated token
/// requests.
pub fn basic_auth_header(client_id: &str, client_secret: &str) -> String {
    let encoded = STANDARD.encode(format!("{client_id}:{client_secret}"));
    format!("Basic {encoded}")
}

/// Splits a comma separated scope list, trimming entries and dropping empty ones.
pub fn normalize_scopes(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Playlist identifier from a catalog URL: its last non-empty path segment.
///
/// `https://music.apple.com/us/playlist/gymbro/pl.u-55D6X8qU63EXGbj?l=en`
/// yields `pl.u-55D6X8qU63EXGbj`.
pub fn playlist_id_from_url(playlist_url: &str) -> Res<String> {
    let invalid = || Error::InvalidPlaylistUrl(playlist_url.to_string());
    let url = Url::parse(playlist_url.trim()).map_err(|_| invalid())?;

    url.path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .map(str::to_string)
        .ok_or_else(invalid)
}

/// Reads the `offset` query parameter out of a catalog `next` pointer, which
/// may be absolute or relative to the API host.
pub fn parse_next_offset(next: &str) -> Res<u32> {
    let base = Url::parse("https://localhost/").map_err(|e| Error::Cursor(e.to_string()))?;
    let url = base
        .join(next)
        .map_err(|e| Error::Cursor(format!("'{next}': {e}")))?;

    let (_, offset) = url
        .query_pairs()
        .find(|(key, _)| key == "offset")
        .ok_or_else(|| Error::Cursor(format!("'{next}' has no offset parameter")))?;

    offset
        .parse::<u32>()
        .map_err(|e| Error::Cursor(format!("'{next}' has invalid offset '{offset}': {e}")))
}

/// Query used to look a source track up in the destination catalog.
pub fn build_search_query(track_name: &str, artist_name: &str) -> String {
    format!("track:'{track_name}' artist:'{artist_name}'")
}

pub fn track_uri(track_id: &str) -> String {
    format!("spotify:track:{track_id}")
}
