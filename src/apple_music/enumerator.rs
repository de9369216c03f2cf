use std::time::Duration;

use serde_json::Value;
use tracing::{Instrument, Span};

use crate::{
    Res,
    apple_music::{CatalogApi, TokenProvider},
    error::Error,
    management::SnapshotManager,
    retry::RetryPolicy,
    types::{CatalogSong, PageOutcome, SourceTrack},
    utils,
};

/// Pages through a catalog playlist and collects every track in order.
///
/// ```text
/// INIT ─▶ FETCHING(0) ─▶ FETCHING(next) ─▶ … ─▶ DONE
///               │                │
///               └──── 5 failed attempts ────▶ FAILED
/// ```
pub struct SourceEnumerator<C, P> {
    catalog: C,
    tokens: P,
    retry: RetryPolicy,
    snapshot: Option<SnapshotManager>,
    span: Span,
}

impl<C: CatalogApi, P: TokenProvider> SourceEnumerator<C, P> {
    pub fn new(catalog: C, tokens: P) -> Self {
        Self {
            catalog,
            tokens,
            retry: Self::default_retry(),
            snapshot: None,
            span: tracing::info_span!("source_enumerator"),
        }
    }

    /// Five attempts per page, waiting 5s, 5s, 5s, 8s between them.
    pub fn default_retry() -> RetryPolicy {
        RetryPolicy::exponential(
            5,
            Duration::from_secs(1),
            Duration::from_secs(5),
            Duration::from_secs(60),
        )
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_snapshot(mut self, snapshot: SnapshotManager) -> Self {
        self.snapshot = Some(snapshot);
        self
    }

    /// Where the running track list is written, if anywhere.
    pub fn snapshot(&self) -> Option<&SnapshotManager> {
        self.snapshot.as_ref()
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Reads the whole playlist behind `playlist_url`.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidPlaylistUrl`] if no identifier can be taken from the URL
    /// - token provider errors, unretried
    /// - [`Error::FetchFailure`] once a page has failed on every attempt; no
    ///   partial result is returned in that case
    pub async fn enumerate(&self, playlist_url: &str) -> Res<Vec<SourceTrack>> {
        self.enumerate_pages(playlist_url)
            .instrument(self.span.clone())
            .await
    }

    async fn enumerate_pages(&self, playlist_url: &str) -> Res<Vec<SourceTrack>> {
        let playlist_id = utils::playlist_id_from_url(playlist_url)?;
        tracing::info!(%playlist_id, "fetching source playlist");

        let token = self.tokens.token().await?;
        let mut tracks: Vec<SourceTrack> = Vec::new();
        let mut offset: u32 = 0;

        loop {
            let page = self
                .retry
                .run("fetch catalog page", || {
                    self.fetch_page(&token, &playlist_id, offset)
                })
                .await
                .map_err(|e| Error::FetchFailure {
                    playlist_id: playlist_id.clone(),
                    offset,
                    source: Box::new(e),
                })?;

            match page {
                PageOutcome::Exhausted => break,
                PageOutcome::Tracks {
                    tracks: page_tracks,
                    next_offset,
                } => {
                    tracks.extend(page_tracks);
                    self.write_snapshot(&tracks).await;
                    tracing::info!(offset, total = tracks.len(), "merged page");

                    match next_offset {
                        Some(next) => {
                            tracing::debug!(next_offset = next, "following cursor");
                            offset = next;
                        }
                        None => break,
                    }
                }
            }
        }

        tracing::info!(%playlist_id, total = tracks.len(), "source playlist complete");
        Ok(tracks)
    }

    async fn fetch_page(&self, token: &str, playlist_id: &str, offset: u32) -> Res<PageOutcome> {
        let body = self.catalog.fetch_page(token, playlist_id, offset).await?;
        let page = parse_page(&body)?;

        if let PageOutcome::Tracks {
            next_offset: Some(next),
            ..
        } = &page
        {
            if *next <= offset {
                return Err(Error::Cursor(format!(
                    "next offset {next} does not advance past {offset}"
                )));
            }
        }
        Ok(page)
    }

    async fn write_snapshot(&self, tracks: &[SourceTrack]) {
        if let Some(snapshot) = &self.snapshot {
            if let Err(e) = snapshot.persist(tracks).await {
                tracing::warn!(
                    path = %snapshot.path().display(),
                    error = %e,
                    "could not write snapshot"
                );
            }
        }
    }
}

/// Interprets one catalog response body.
///
/// A body without `resources` is the terminal page. Songs are taken in the
/// order of the top-level `data` array, falling back to the order of the
/// resource map.
///
/// # Errors
///
/// [`Error::Json`] for song resources missing required attributes and
/// [`Error::Cursor`] for a `next` pointer without a usable offset.
pub fn parse_page(body: &Value) -> Res<PageOutcome> {
    let Some(resources) = body.get("resources") else {
        return Ok(PageOutcome::Exhausted);
    };

    let mut tracks = Vec::new();
    if let Some(songs) = resources.get("songs").and_then(Value::as_object) {
        let mut ordered: Vec<&str> = body
            .get("data")
            .and_then(Value::as_array)
            .map(|data| {
                data.iter()
                    .filter(|entry| {
                        entry
                            .get("type")
                            .and_then(Value::as_str)
                            .is_none_or(|kind| kind == "songs")
                    })
                    .filter_map(|entry| entry.get("id").and_then(Value::as_str))
                    .filter(|id| songs.contains_key(*id))
                    .collect()
            })
            .unwrap_or_default();
        if ordered.is_empty() {
            ordered = songs.keys().map(String::as_str).collect();
        }

        for id in ordered {
            if let Some(resource) = songs.get(id) {
                let song: CatalogSong = serde_json::from_value(resource.clone())?;
                tracks.push(SourceTrack::from(song));
            }
        }
    }

    let next_offset = match body.get("next") {
        None | Some(Value::Null) => None,
        Some(Value::String(next)) => Some(utils::parse_next_offset(next)?),
        Some(other) => return Err(Error::Cursor(format!("unexpected next value {other}"))),
    };

    Ok(PageOutcome::Tracks {
        tracks,
        next_offset,
    })
}
