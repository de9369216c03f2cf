#![allow(dead_code)]

use std::{
    collections::{HashMap, HashSet, VecDeque},
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use playlist_bridge::{
    Res,
    apple_music::{CatalogApi, SourceEnumerator, TokenProvider},
    error::Error,
    retry::RetryPolicy,
    spotify::{DestinationApi, Reconciler},
    types::{CreatePlaylistRequest, CurrentUser, GetUserPlaylistsResponse, Playlist, Track},
};
use serde_json::{Map, Value, json};

pub const PLAYLIST_URL: &str = "https://music.apple.com/us/playlist/test/pl.test";

pub fn fast_retry() -> RetryPolicy {
    RetryPolicy::fixed(5, Duration::ZERO)
}

/// A catalog page holding `songs` as `(id, name, artist)`.
pub fn page(songs: &[(&str, &str, &str)], next: Option<u32>) -> Value {
    let data: Vec<Value> = songs
        .iter()
        .map(|(id, _, _)| json!({ "id": id, "type": "songs" }))
        .collect();

    let mut resources = Map::new();
    for (id, name, artist) in songs {
        resources.insert(
            id.to_string(),
            json!({
                "id": id,
                "type": "songs",
                "attributes": { "name": name, "artistName": artist, "albumName": "Album" }
            }),
        );
    }

    let mut body = json!({ "data": data, "resources": { "songs": resources } });
    if let Some(offset) = next {
        body["next"] = json!(format!("/v1/catalog/us/playlists/pl.test/tracks?offset={offset}"));
    }
    body
}

/// The body the catalog returns once the playlist is exhausted.
pub fn terminal_page() -> Value {
    json!({ "data": [] })
}

pub enum Scripted {
    Page(Value),
    Fail,
}

#[derive(Default)]
struct CatalogState {
    responses: VecDeque<Scripted>,
    calls: Vec<u32>,
}

/// Catalog answering with a fixed script of responses.
#[derive(Clone, Default)]
pub struct FakeCatalog {
    state: Arc<Mutex<CatalogState>>,
}

impl FakeCatalog {
    pub fn new(responses: Vec<Scripted>) -> Self {
        Self {
            state: Arc::new(Mutex::new(CatalogState {
                responses: responses.into(),
                calls: Vec::new(),
            })),
        }
    }

    /// Offsets requested, in order.
    pub fn calls(&self) -> Vec<u32> {
        self.state.lock().unwrap().calls.clone()
    }
}

#[async_trait]
impl CatalogApi for FakeCatalog {
    async fn fetch_page(&self, _token: &str, _playlist_id: &str, offset: u32) -> Res<Value> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(offset);
        match state.responses.pop_front() {
            Some(Scripted::Page(body)) => Ok(body),
            Some(Scripted::Fail) | None => Err(Error::Api {
                service: "test catalog",
                status: 503,
                message: "unavailable".to_string(),
            }),
        }
    }
}

#[derive(Clone, Default)]
pub struct FakeTokens {
    calls: Arc<Mutex<u32>>,
}

impl FakeTokens {
    pub fn calls(&self) -> u32 {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl TokenProvider for FakeTokens {
    async fn token(&self) -> Res<String> {
        *self.calls.lock().unwrap() += 1;
        Ok("source-token".to_string())
    }
}

pub fn enumerator(catalog: FakeCatalog) -> SourceEnumerator<FakeCatalog, FakeTokens> {
    SourceEnumerator::new(catalog, FakeTokens::default()).with_retry(fast_retry())
}

#[derive(Default)]
struct DestinationState {
    authorized: bool,
    playlists: Vec<Playlist>,
    failing_listings: u32,
    failing_appends: HashSet<String>,
    failing_searches: HashSet<String>,
    catalog: HashMap<String, String>,
    searches: Vec<String>,
    listings: u32,
    created: Vec<CreatePlaylistRequest>,
    appended: Vec<(String, Vec<String>)>,
}

/// In-memory Spotify account.
#[derive(Clone)]
pub struct FakeDestination {
    state: Arc<Mutex<DestinationState>>,
}

impl FakeDestination {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(DestinationState {
                authorized: true,
                ..Default::default()
            })),
        }
    }

    pub fn unauthorized() -> Self {
        let fake = Self::new();
        fake.state.lock().unwrap().authorized = false;
        fake
    }

    /// Makes `track:'<name>' artist:'<artist>'` resolve to `id`.
    pub fn with_track(self, name: &str, artist: &str, id: &str) -> Self {
        self.state.lock().unwrap().catalog.insert(
            playlist_bridge::utils::build_search_query(name, artist),
            id.to_string(),
        );
        self
    }

    pub fn with_playlist(self, id: &str, name: &str) -> Self {
        self.state.lock().unwrap().playlists.push(Playlist {
            id: id.to_string(),
            name: name.to_string(),
            description: None,
            public: Some(false),
        });
        self
    }

    /// The next `count` listing calls fail with a server error.
    pub fn with_failing_listings(self, count: u32) -> Self {
        self.state.lock().unwrap().failing_listings = count;
        self
    }

    pub fn with_failing_append(self, id: &str) -> Self {
        self.state.lock().unwrap().failing_appends.insert(id.to_string());
        self
    }

    pub fn with_failing_search(self, name: &str, artist: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .failing_searches
            .insert(playlist_bridge::utils::build_search_query(name, artist));
        self
    }

    pub fn searches(&self) -> Vec<String> {
        self.state.lock().unwrap().searches.clone()
    }

    pub fn listings(&self) -> u32 {
        self.state.lock().unwrap().listings
    }

    pub fn created(&self) -> Vec<CreatePlaylistRequest> {
        self.state.lock().unwrap().created.clone()
    }

    pub fn appended(&self) -> Vec<(String, Vec<String>)> {
        self.state.lock().unwrap().appended.clone()
    }

    /// Track ids appended to `playlist_id`, in order.
    pub fn playlist_tracks(&self, playlist_id: &str) -> Vec<String> {
        self.appended()
            .into_iter()
            .filter(|(id, _)| id == playlist_id)
            .flat_map(|(_, ids)| ids)
            .collect()
    }

    fn check_auth(&self) -> Res<()> {
        if self.state.lock().unwrap().authorized {
            Ok(())
        } else {
            Err(Error::Authentication("Invalid access token".to_string()))
        }
    }
}

#[async_trait]
impl DestinationApi for FakeDestination {
    async fn current_user(&self) -> Res<CurrentUser> {
        self.check_auth()?;
        Ok(CurrentUser {
            id: "user-1".to_string(),
            display_name: Some("Test User".to_string()),
        })
    }

    async fn user_playlists(
        &self,
        _user_id: &str,
        limit: u32,
        offset: u32,
    ) -> Res<GetUserPlaylistsResponse> {
        self.check_auth()?;
        let mut state = self.state.lock().unwrap();
        state.listings += 1;
        if state.failing_listings > 0 {
            state.failing_listings -= 1;
            return Err(Error::Api {
                service: "test destination",
                status: 502,
                message: "bad gateway".to_string(),
            });
        }

        let items: Vec<Playlist> = state
            .playlists
            .iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect();
        let next = ((offset + limit) as usize) < state.playlists.len();

        Ok(GetUserPlaylistsResponse {
            items,
            next: next.then(|| format!("https://api.test/playlists?offset={}", offset + limit)),
            total: Some(state.playlists.len() as u64),
        })
    }

    async fn create_playlist(
        &self,
        _user_id: &str,
        request: &CreatePlaylistRequest,
    ) -> Res<Playlist> {
        self.check_auth()?;
        let mut state = self.state.lock().unwrap();
        let playlist = Playlist {
            id: format!("created-{}", state.created.len() + 1),
            name: request.name.clone(),
            description: Some(request.description.clone()),
            public: Some(request.public),
        };
        state.created.push(request.clone());
        state.playlists.push(playlist.clone());
        Ok(playlist)
    }

    async fn search_tracks(&self, query: &str, _limit: u32) -> Res<Vec<Track>> {
        self.check_auth()?;
        let mut state = self.state.lock().unwrap();
        state.searches.push(query.to_string());
        if state.failing_searches.contains(query) {
            return Err(Error::Api {
                service: "test destination",
                status: 500,
                message: "search broke".to_string(),
            });
        }

        Ok(state
            .catalog
            .get(query)
            .map(|id| Track {
                id: id.clone(),
                name: query.to_string(),
                uri: playlist_bridge::utils::track_uri(id),
            })
            .into_iter()
            .collect())
    }

    async fn add_tracks(&self, playlist_id: &str, track_ids: &[String]) -> Res<()> {
        self.check_auth()?;
        let mut state = self.state.lock().unwrap();
        if track_ids.iter().any(|id| state.failing_appends.contains(id)) {
            return Err(Error::Api {
                service: "test destination",
                status: 400,
                message: "rejected".to_string(),
            });
        }
        state
            .appended
            .push((playlist_id.to_string(), track_ids.to_vec()));
        Ok(())
    }
}

pub fn reconciler(destination: FakeDestination) -> Reconciler<FakeDestination> {
    Reconciler::new(destination)
        .with_listing_retry(fast_retry().retry_if(|e| !e.is_authentication()))
        .with_item_delay(Duration::ZERO)
}
