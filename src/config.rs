//! Configuration management for the playlist converter.
//!
//! This module handles loading and accessing configuration values from environment
//! variables and `.env` files. Every value the application needs is read once into
//! a [`Settings`] value which is then passed explicitly to the components that
//! need it.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. `.env` file in the working directory
//! 4. Application defaults (where applicable)

use std::{env, path::PathBuf, time::Duration};

use crate::{Res, error::Error, types::CodeExchange, utils};

pub const APP_DIR: &str = "playlist-bridge";

const DEFAULT_SCOPE: &str = "playlist-modify-public,playlist-modify-private,playlist-read-private";
const DEFAULT_DESCRIPTION: &str = "Apple Music playlist converted to a Spotify playlist.";

/// Loads environment variables from `.env` files.
///
/// Creates the local data directory if it doesn't exist and loads the `.env`
/// file located under `playlist-bridge/.env` in it, followed by a `.env` file
/// in the current working directory. Both files are optional; variables that
/// are already set in the process environment are never overridden.
///
/// # Directory Structure
///
/// The function looks for the `.env` file in:
/// - Linux: `~/.local/share/playlist-bridge/.env`
/// - macOS: `~/Library/Application Support/playlist-bridge/.env`
/// - Windows: `%LOCALAPPDATA%/playlist-bridge/.env`
///
/// # Errors
///
/// Returns an error if the data directory cannot be created or an existing
/// `.env` file cannot be parsed.
pub async fn load_env() -> Res<()> {
    let path = data_dir().join(".env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent).await?;
    }

    if path.is_file() {
        dotenv::from_path(&path).map_err(|e| Error::Config(e.to_string()))?;
    }
    let _ = dotenv::dotenv();
    Ok(())
}

/// Platform specific directory holding the `.env` file and run artifacts.
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(APP_DIR);
    path
}

/// Runtime configuration, read from the environment once per process.
#[derive(Debug, Clone)]
pub struct Settings {
    pub spotify_client_id: Option<String>,
    pub spotify_client_secret: Option<String>,
    pub spotify_redirect_uri: Option<String>,
    pub spotify_scope: Vec<String>,
    pub spotify_api_url: String,
    pub spotify_auth_url: String,
    pub spotify_token_url: String,
    pub apple_music_api_url: String,
    pub apple_music_storefront: String,
    pub apple_music_token: Option<String>,
    pub server_address: String,
    pub frontend_url: String,
    pub http_timeout: Duration,
    pub item_delay: Duration,
    /// Directory of the per-playlist track snapshots.
    pub snapshot_dir: PathBuf,
    pub log_level: String,
    pub default_description: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            spotify_client_id: None,
            spotify_client_secret: None,
            spotify_redirect_uri: None,
            spotify_scope: utils::normalize_scopes(DEFAULT_SCOPE),
            spotify_api_url: "https://api.spotify.com/v1".to_string(),
            spotify_auth_url: "https://accounts.spotify.com/authorize".to_string(),
            spotify_token_url: "https://accounts.spotify.com/api/token".to_string(),
            apple_music_api_url: "https://amp-api.music.apple.com/v1".to_string(),
            apple_music_storefront: "us".to_string(),
            apple_music_token: None,
            server_address: "127.0.0.1:8000".to_string(),
            frontend_url: "http://localhost:3000".to_string(),
            http_timeout: Duration::from_secs(30),
            item_delay: Duration::from_millis(5000),
            snapshot_dir: data_dir().join("snapshots"),
            log_level: "info".to_string(),
            default_description: DEFAULT_DESCRIPTION.to_string(),
        }
    }
}

impl Settings {
    /// Reads all settings from the process environment, falling back to the
    /// defaults for unset variables.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when a numeric variable cannot be parsed.
    pub fn from_env() -> Res<Self> {
        let defaults = Settings::default();

        Ok(Self {
            spotify_client_id: optional("SPOTIFY_CLIENT_ID"),
            spotify_client_secret: optional("SPOTIFY_CLIENT_SECRET"),
            spotify_redirect_uri: optional("SPOTIFY_REDIRECT_URI"),
            spotify_scope: optional("SPOTIFY_SCOPE")
                .map(|s| utils::normalize_scopes(&s))
                .unwrap_or(defaults.spotify_scope),
            spotify_api_url: optional("SPOTIFY_API_URL").unwrap_or(defaults.spotify_api_url),
            spotify_auth_url: optional("SPOTIFY_AUTH_URL").unwrap_or(defaults.spotify_auth_url),
            spotify_token_url: optional("SPOTIFY_TOKEN_URL").unwrap_or(defaults.spotify_token_url),
            apple_music_api_url: optional("APPLE_MUSIC_API_URL")
                .unwrap_or(defaults.apple_music_api_url),
            apple_music_storefront: optional("APPLE_MUSIC_STOREFRONT")
                .unwrap_or(defaults.apple_music_storefront),
            apple_music_token: optional("APPLE_MUSIC_TOKEN"),
            server_address: optional("SERVER_ADDRESS").unwrap_or(defaults.server_address),
            frontend_url: optional("FRONTEND_URL").unwrap_or(defaults.frontend_url),
            http_timeout: match optional("HTTP_TIMEOUT_SECS") {
                Some(v) => Duration::from_secs(parse_number("HTTP_TIMEOUT_SECS", &v)?),
                None => defaults.http_timeout,
            },
            item_delay: match optional("RECONCILE_ITEM_DELAY_MS") {
                Some(v) => Duration::from_millis(parse_number("RECONCILE_ITEM_DELAY_MS", &v)?),
                None => defaults.item_delay,
            },
            snapshot_dir: optional("SNAPSHOT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.snapshot_dir),
            log_level: optional("LOG_LEVEL").unwrap_or(defaults.log_level),
            default_description: defaults.default_description,
        })
    }

    /// Returns the Spotify API client ID.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `SPOTIFY_CLIENT_ID` is not set.
    pub fn client_id(&self) -> Res<&str> {
        required(&self.spotify_client_id, "SPOTIFY_CLIENT_ID")
    }

    /// Returns the Spotify API client secret.
    ///
    /// The client secret should be kept confidential and never exposed in logs
    /// or version control.
    pub fn client_secret(&self) -> Res<&str> {
        required(&self.spotify_client_secret, "SPOTIFY_CLIENT_SECRET")
    }

    /// Returns the OAuth redirect URI registered with the Spotify application.
    pub fn redirect_uri(&self) -> Res<&str> {
        required(&self.spotify_redirect_uri, "SPOTIFY_REDIRECT_URI")
    }

    /// Token endpoint, application credentials and timeout for swapping an
    /// authorization code.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the client id, secret or redirect URI is
    /// not set.
    pub fn code_exchange(&self) -> Res<CodeExchange> {
        Ok(CodeExchange {
            token_url: self.spotify_token_url.clone(),
            client_id: self.client_id()?.to_string(),
            client_secret: self.client_secret()?.to_string(),
            redirect_uri: self.redirect_uri()?.to_string(),
            timeout: self.http_timeout,
        })
    }

    /// Scopes joined the way the authorize endpoint expects them.
    pub fn scope_param(&self) -> String {
        self.spotify_scope.join(" ")
    }
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn required<'a>(value: &'a Option<String>, key: &str) -> Res<&'a str> {
    value
        .as_deref()
        .ok_or_else(|| Error::Config(format!("{key} must be set")))
}

fn parse_number(key: &str, value: &str) -> Res<u64> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|e| Error::Config(format!("{key}='{value}' is not a number: {e}")))
}
