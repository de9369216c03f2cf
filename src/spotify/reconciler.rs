use std::time::Duration;

use tokio::time::sleep;
use tracing::{Instrument, Span};

use crate::{
    Res,
    error::Error,
    retry::RetryPolicy,
    spotify::{DestinationApi, playlist},
    types::{CurrentUser, MatchOutcome, ReconcileReport, SourceTrack, TrackOutcome},
    utils,
};

/// Rebuilds a list of source tracks as a Spotify playlist, best effort.
///
/// Tracks are handled one at a time in source order: one search, first hit
/// only, one append per hit. Per-track failures are logged and recorded in the
/// [`ReconcileReport`]; they never stop the loop.
pub struct Reconciler<D> {
    api: D,
    listing_retry: RetryPolicy,
    item_delay: Duration,
    span: Span,
}

impl<D: DestinationApi> Reconciler<D> {
    /// Wraps `api` with the default listing retry and a 5s pause per track.
    pub fn new(api: D) -> Self {
        Self {
            api,
            listing_retry: playlist::default_listing_retry(),
            item_delay: Duration::from_secs(5),
            span: tracing::info_span!("reconciler"),
        }
    }

    pub fn with_listing_retry(mut self, retry: RetryPolicy) -> Self {
        self.listing_retry = retry;
        self
    }

    /// Pause after every track, whatever its outcome.
    pub fn with_item_delay(mut self, delay: Duration) -> Self {
        self.item_delay = delay;
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Loads the account the API handle acts for.
    ///
    /// # Errors
    ///
    /// Any failure is reported as [`Error::Authentication`]; it is not retried.
    pub async fn authenticate(&self) -> Res<CurrentUser> {
        async {
            match self.api.current_user().await {
                Ok(user) => {
                    tracing::info!(user_id = %user.id, "authenticated");
                    Ok(user)
                }
                Err(Error::Authentication(reason)) => {
                    tracing::error!(%reason, "authentication rejected");
                    Err(Error::Authentication(reason))
                }
                Err(e) => {
                    tracing::error!(error = %e, "could not load current user");
                    Err(Error::Authentication(format!("could not load current user: {e}")))
                }
            }
        }
        .instrument(self.span.clone())
        .await
    }

    /// Finds the playlist named `name` or creates it.
    ///
    /// # Arguments
    ///
    /// * `user` - Account returned by [`Reconciler::authenticate`]
    /// * `name` - Exact playlist name to look for
    /// * `public` - Visibility of a newly created playlist
    /// * `description` - Description of a newly created playlist
    ///
    /// # Errors
    ///
    /// Authentication errors from the listing and a failed creation. See
    /// [`playlist::resolve_or_create`].
    pub async fn resolve_playlist(
        &self,
        user: &CurrentUser,
        name: &str,
        public: bool,
        description: &str,
    ) -> Res<String> {
        playlist::resolve_or_create(
            &self.api,
            &self.listing_retry,
            &user.id,
            name,
            public,
            description,
        )
        .instrument(self.span.clone())
        .await
    }

    /// Searches and appends every track in order.
    ///
    /// # Arguments
    ///
    /// * `playlist_id` - Playlist returned by [`Reconciler::resolve_playlist`]
    /// * `tracks` - Source tracks in playlist order
    ///
    /// Never fails; every track's outcome is in the returned report.
    pub async fn append_tracks(
        &self,
        playlist_id: &str,
        tracks: &[SourceTrack],
    ) -> ReconcileReport {
        async {
            let mut outcomes = Vec::with_capacity(tracks.len());

            for (position, track) in tracks.iter().enumerate() {
                let outcome = self.reconcile_track(playlist_id, track).await;
                match &outcome {
                    MatchOutcome::Added { destination_id } => tracing::info!(
                        position,
                        name = %track.name,
                        artist = %track.artist_name,
                        %destination_id,
                        "added track"
                    ),
                    MatchOutcome::NotFound => tracing::warn!(
                        position,
                        name = %track.name,
                        artist = %track.artist_name,
                        "no match in destination catalog"
                    ),
                    MatchOutcome::SearchFailed { reason } => tracing::error!(
                        position,
                        name = %track.name,
                        artist = %track.artist_name,
                        %reason,
                        "search failed"
                    ),
                    MatchOutcome::AppendFailed {
                        destination_id,
                        reason,
                    } => tracing::error!(
                        position,
                        name = %track.name,
                        artist = %track.artist_name,
                        %destination_id,
                        %reason,
                        "append failed"
                    ),
                }

                outcomes.push(TrackOutcome {
                    track: track.clone(),
                    outcome,
                });
                sleep(self.item_delay).await;
            }

            let report = ReconcileReport {
                playlist_id: playlist_id.to_string(),
                outcomes,
            };
            tracing::info!(
                playlist_id,
                total = tracks.len(),
                added = report.added_count(),
                unmatched = report.unmatched().len(),
                "reconciliation finished"
            );
            report
        }
        .instrument(self.span.clone())
        .await
    }

    async fn reconcile_track(&self, playlist_id: &str, track: &SourceTrack) -> MatchOutcome {
        let query = utils::build_search_query(&track.name, &track.artist_name);

        let destination_id = match self.api.search_tracks(&query, 1).await {
            Ok(results) => match results.into_iter().next() {
                Some(hit) => hit.id,
                None => return MatchOutcome::NotFound,
            },
            Err(e) => {
                return MatchOutcome::SearchFailed {
                    reason: e.to_string(),
                };
            }
        };

        match self
            .api
            .add_tracks(playlist_id, std::slice::from_ref(&destination_id))
            .await
        {
            Ok(()) => MatchOutcome::Added { destination_id },
            Err(e) => MatchOutcome::AppendFailed {
                destination_id,
                reason: e.to_string(),
            },
        }
    }
}
