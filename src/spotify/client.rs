use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{
    Res,
    error::Error,
    types::{
        AddTrackToPlaylistRequest, AddTrackToPlaylistResponse, CreatePlaylistRequest, CurrentUser,
        GetUserPlaylistsResponse, Playlist, SearchResponse, Track,
    },
    utils,
};

/// The Spotify Web API operations the reconciler relies on.
///
/// [`SpotifyClient`] is the HTTP implementation; tests substitute in-memory
/// fakes.
#[async_trait]
pub trait DestinationApi: Send + Sync {
    /// Loads the account the access token belongs to.
    ///
    /// # Errors
    ///
    /// [`Error::Authentication`] if the token is rejected.
    async fn current_user(&self) -> Res<CurrentUser>;

    /// Reads one page of the account's playlists.
    ///
    /// # Arguments
    ///
    /// * `user_id` - Account whose playlists are listed
    /// * `limit` - Page size, at most 50
    /// * `offset` - Index of the first playlist on the page
    ///
    /// # Errors
    ///
    /// [`Error::Authentication`] for a rejected token, [`Error::Api`] for any
    /// other error status and [`Error::Http`] for transport failures.
    async fn user_playlists(
        &self,
        user_id: &str,
        limit: u32,
        offset: u32,
    ) -> Res<GetUserPlaylistsResponse>;

    /// Creates an empty playlist owned by `user_id`.
    async fn create_playlist(
        &self,
        user_id: &str,
        request: &CreatePlaylistRequest,
    ) -> Res<Playlist>;

    /// Track search, best match first.
    ///
    /// # Arguments
    ///
    /// * `query` - Search expression, see [`utils::build_search_query`]
    /// * `limit` - Maximum number of results
    ///
    /// # Errors
    ///
    /// Same as [`DestinationApi::user_playlists`]. An answer without a
    /// `tracks` section is an empty result, not an error.
    async fn search_tracks(&self, query: &str, limit: u32) -> Res<Vec<Track>>;

    /// Appends tracks to the end of a playlist, duplicates included.
    ///
    /// # Arguments
    ///
    /// * `playlist_id` - Target playlist
    /// * `track_ids` - Bare track ids; they are sent as `spotify:track:<id>` URIs
    async fn add_tracks(&self, playlist_id: &str, track_ids: &[String]) -> Res<()>;
}

/// Authenticated handle on the Spotify Web API.
#[derive(Clone)]
pub struct SpotifyClient {
    client: Client,
    api_url: String,
    access_token: String,
}

impl SpotifyClient {
    /// Creates a client acting with `access_token`.
    ///
    /// # Arguments
    ///
    /// * `api_url` - Web API base, e.g. `https://api.spotify.com/v1`
    /// * `access_token` - Bearer token sent with every request
    /// * `timeout` - Bound on each request, connection included
    ///
    /// # Errors
    ///
    /// [`Error::Http`] if the HTTP client cannot be built.
    pub fn new(
        api_url: impl Into<String>,
        access_token: impl Into<String>,
        timeout: Duration,
    ) -> Res<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            access_token: access_token.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Res<T> {
        let response = request.bearer_auth(&self.access_token).send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body);
        if status == StatusCode::UNAUTHORIZED {
            return Err(Error::Authentication(message));
        }

        Err(Error::Api {
            service: "Spotify",
            status: status.as_u16(),
            message,
        })
    }
}

/// Spotify wraps errors as `{"error": {"status": 401, "message": "..."}}`;
/// the token endpoint uses `{"error": "...", "error_description": "..."}`.
fn error_message(body: &str) -> String {
    let Ok(json) = serde_json::from_str::<Value>(body) else {
        return body.trim().to_string();
    };

    json["error"]["message"]
        .as_str()
        .or_else(|| json["error_description"].as_str())
        .or_else(|| json["error"].as_str())
        .map(str::to_string)
        .unwrap_or_else(|| body.trim().to_string())
}

#[async_trait]
impl DestinationApi for SpotifyClient {
    async fn current_user(&self) -> Res<CurrentUser> {
        self.send(self.client.get(self.url("/me"))).await
    }

    async fn user_playlists(
        &self,
        user_id: &str,
        limit: u32,
        offset: u32,
    ) -> Res<GetUserPlaylistsResponse> {
        let request = self
            .client
            .get(self.url(&format!("/users/{user_id}/playlists")))
            .query(&[("limit", limit), ("offset", offset)]);
        self.send(request).await
    }

    async fn create_playlist(
        &self,
        user_id: &str,
        request: &CreatePlaylistRequest,
    ) -> Res<Playlist> {
        let request = self
            .client
            .post(self.url(&format!("/users/{user_id}/playlists")))
            .json(request);
        self.send(request).await
    }

    async fn search_tracks(&self, query: &str, limit: u32) -> Res<Vec<Track>> {
        let limit = limit.to_string();
        let request = self
            .client
            .get(self.url("/search"))
            .query(&[("q", query), ("type", "track"), ("limit", limit.as_str())]);
        let response: SearchResponse = self.send(request).await?;

        Ok(response.tracks.map(|t| t.items).unwrap_or_default())
    }

    async fn add_tracks(&self, playlist_id: &str, track_ids: &[String]) -> Res<()> {
        let body = AddTrackToPlaylistRequest {
            uris: track_ids.iter().map(|id| utils::track_uri(id)).collect(),
        };
        let request = self
            .client
            .post(self.url(&format!("/playlists/{playlist_id}/tracks")))
            .json(&body);
        let response: AddTrackToPlaylistResponse = self.send(request).await?;
        tracing::debug!(playlist_id, snapshot_id = %response.snapshot_id, "tracks added");
        Ok(())
    }
}
