use std::time::Duration;

use crate::{
    Res,
    error::Error,
    retry::RetryPolicy,
    spotify::DestinationApi,
    types::CreatePlaylistRequest,
};

/// Number of playlists requested per listing page.
pub const PAGE_SIZE: u32 = 50;

/// Result of looking a playlist up by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaylistLookup {
    Found(String),
    NotFound,
    /// Listing failed on every attempt before the list could be read to its end.
    Unverified { reason: String },
}

/// Five attempts per listing page, 5s apart. Authentication errors are not retried.
pub fn default_listing_retry() -> RetryPolicy {
    RetryPolicy::fixed(5, Duration::from_secs(5)).retry_if(|e| !e.is_authentication())
}

/// Pages through the account's playlists looking for an exact name match.
pub async fn find_playlist<D: DestinationApi + ?Sized>(
    api: &D,
    retry: &RetryPolicy,
    user_id: &str,
    name: &str,
) -> Res<PlaylistLookup> {
    let mut offset = 0;

    loop {
        let page = match retry
            .run("list playlists", || api.user_playlists(user_id, PAGE_SIZE, offset))
            .await
        {
            Ok(page) => page,
            Err(Error::RetriesExhausted { source, .. }) => {
                return Ok(PlaylistLookup::Unverified {
                    reason: source.to_string(),
                });
            }
            Err(e) => return Err(e),
        };

        if let Some(playlist) = page.items.iter().find(|p| p.name == name) {
            tracing::info!(playlist_id = %playlist.id, name, "found playlist");
            return Ok(PlaylistLookup::Found(playlist.id.clone()));
        }

        if page.next.is_none() {
            return Ok(PlaylistLookup::NotFound);
        }
        offset += PAGE_SIZE;
    }
}

/// Returns the id of the playlist called `name`, creating it when the account
/// has none.
///
/// When the listing cannot be read the playlist is created anyway. A playlist
/// with the same name may already exist in that case, so the fallback is
/// logged as a warning.
///
/// # Errors
///
/// Authentication failures and a failed creation are returned.
pub async fn resolve_or_create<D: DestinationApi + ?Sized>(
    api: &D,
    retry: &RetryPolicy,
    user_id: &str,
    name: &str,
    public: bool,
    description: &str,
) -> Res<String> {
    match find_playlist(api, retry, user_id, name).await? {
        PlaylistLookup::Found(id) => return Ok(id),
        PlaylistLookup::NotFound => {
            tracing::info!(name, "playlist not found, creating");
        }
        PlaylistLookup::Unverified { reason } => {
            tracing::warn!(
                name,
                %reason,
                "playlist listing unverified, creating it; it may duplicate an existing playlist"
            );
        }
    }

    let request = CreatePlaylistRequest {
        name: name.to_string(),
        description: description.to_string(),
        public,
    };
    let playlist = api.create_playlist(user_id, &request).await?;
    tracing::info!(playlist_id = %playlist.id, name, "created playlist");
    Ok(playlist.id)
}
