//! # Spotify Integration Module
//!
//! This module is the destination side of a conversion: it authenticates
//! against the Spotify Web API, finds or creates the target playlist and fills
//! it with the best match for every source track.
//!
//! ## Architecture
//!
//! ```text
//! convert pipeline
//!          ↓
//! Reconciler ──── playlist::resolve_or_create
//!          ↓
//! DestinationApi (trait) ◀── SpotifyClient (reqwest)
//!          ↓
//! Spotify Web API
//! ```
//!
//! ## Core Modules
//!
//! ### Authentication Module
//!
//! [`auth`] - Credentials and the authorization-code flow:
//! - **Credentials**: [`auth::DestinationCredentials`] is either the
//!   application's client id/secret/redirect triple or a ready bearer token
//! - **Interactive Flow**: local callback server, browser launch, random
//!   `state`, code exchange with HTTP Basic client authentication
//!
//! ### Client Module
//!
//! [`client`] - The [`DestinationApi`] trait and its reqwest implementation.
//! A `401` from any endpoint becomes an authentication error; other failures
//! keep their HTTP status so retry predicates can tell transient ones apart.
//!
//! ### Playlist Module
//!
//! [`playlist`] - Exact-name lookup over the paged playlist listing (50 per
//! page) with bounded retry, and creation when no match exists.
//!
//! ### Reconciler Module
//!
//! [`reconciler`] - The per-track loop: search `track:'<name>' artist:'<artist>'`,
//! take the first hit, append it, wait, continue.
//!
//! ## API Coverage
//!
//! - `GET /me` - Current account
//! - `GET /users/{user_id}/playlists` - Playlist listing for name lookup
//! - `POST /users/{user_id}/playlists` - Create playlist
//! - `GET /search` - Track search
//! - `POST /playlists/{playlist_id}/tracks` - Append tracks
//! - `POST /api/token` - Authorization code exchange

pub mod auth;
pub mod client;
pub mod playlist;
pub mod reconciler;

pub use auth::DestinationCredentials;
pub use client::{DestinationApi, SpotifyClient};
pub use reconciler::Reconciler;
