use thiserror::Error;

/// Errors produced while converting a playlist.
///
/// Per-track conditions (no match, rejected append) are not errors; they are
/// recorded as [`crate::types::MatchOutcome`] values and never leave the
/// reconciler.
#[derive(Debug, Error)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{service} API returned {status}: {message}")]
    Api {
        service: &'static str,
        status: u16,
        message: String,
    },

    #[error("failed to decode JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("could not obtain source catalog token: {0}")]
    SourceToken(String),

    #[error("invalid playlist URL '{0}'")]
    InvalidPlaylistUrl(String),

    #[error("invalid pagination cursor: {0}")]
    Cursor(String),

    #[error("{operation} failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        operation: String,
        attempts: u32,
        #[source]
        source: Box<Error>,
    },

    #[error("failed to fetch playlist {playlist_id} at offset {offset}: {source}")]
    FetchFailure {
        playlist_id: String,
        offset: u32,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    pub fn is_authentication(&self) -> bool {
        matches!(self, Error::Authentication(_))
    }
}
