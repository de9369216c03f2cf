//! End-to-end conversion: authenticate, read the source playlist, resolve the
//! destination playlist, append the matches.
//!
//! Authentication runs first so that bad credentials stop the run before any
//! request reaches either catalog.

use tracing::Span;

use crate::{
    Res,
    apple_music::{
        CatalogApi, HttpCatalogApi, SourceEnumerator, StaticTokenProvider, TokenProvider,
        WebPageTokenProvider,
    },
    config::Settings,
    management::SnapshotManager,
    spotify::{self, DestinationApi, DestinationCredentials, Reconciler},
    types::ReconcileReport,
    utils,
};

#[derive(Debug, Clone)]
pub struct ConversionRequest {
    pub source_url: String,
    pub playlist_name: String,
    pub description: String,
    pub public: bool,
}

/// Runs one conversion with already constructed components.
///
/// # Errors
///
/// Authentication failures, enumeration failures after retries and a failed
/// playlist creation. Per-track problems are part of the returned report.
pub async fn run<C, P, D>(
    enumerator: &SourceEnumerator<C, P>,
    reconciler: &Reconciler<D>,
    request: &ConversionRequest,
) -> Res<ReconcileReport>
where
    C: CatalogApi,
    P: TokenProvider,
    D: DestinationApi,
{
    let user = reconciler.authenticate().await?;
    let tracks = enumerator.enumerate(&request.source_url).await?;

    let playlist_id = reconciler
        .resolve_playlist(
            &user,
            &request.playlist_name,
            request.public,
            &request.description,
        )
        .await?;

    Ok(reconciler.append_tracks(&playlist_id, &tracks).await)
}

/// Token source for the catalog: an explicit token wins over
/// `APPLE_MUSIC_TOKEN`, which wins over scraping the playlist page.
pub fn token_provider(
    settings: &Settings,
    source_url: &str,
    source_token: Option<String>,
) -> Res<Box<dyn TokenProvider>> {
    match source_token.or_else(|| settings.apple_music_token.clone()) {
        Some(token) => Ok(Box::new(StaticTokenProvider::new(token))),
        None => Ok(Box::new(WebPageTokenProvider::new(
            source_url,
            settings.http_timeout,
        )?)),
    }
}

/// Source enumerator wired to the real catalog API. Its snapshot goes to
/// `<snapshot_dir>/<playlist id>.json`.
///
/// # Errors
///
/// [`crate::error::Error::InvalidPlaylistUrl`] and HTTP client construction
/// errors.
pub fn source_enumerator(
    settings: &Settings,
    source_url: &str,
    source_token: Option<String>,
) -> Res<SourceEnumerator<HttpCatalogApi, Box<dyn TokenProvider>>> {
    let playlist_id = utils::playlist_id_from_url(source_url)?;
    let catalog = HttpCatalogApi::new(
        &settings.apple_music_api_url,
        &settings.apple_music_storefront,
        settings.http_timeout,
    )?;
    let tokens = token_provider(settings, source_url, source_token)?;

    Ok(SourceEnumerator::new(catalog, tokens)
        .with_snapshot(SnapshotManager::for_playlist(&settings.snapshot_dir, &playlist_id))
        .with_span(tracing::info_span!("source_enumerator", source_url)))
}

/// Wires the HTTP implementations from `settings` and runs the conversion.
pub async fn from_settings(
    settings: &Settings,
    credentials: &DestinationCredentials,
    request: &ConversionRequest,
    source_token: Option<String>,
) -> Res<ReconcileReport> {
    let client = spotify::auth::authenticate(credentials, settings).await?;
    let reconciler = Reconciler::new(client)
        .with_item_delay(settings.item_delay)
        .with_span(reconciler_span(&request.playlist_name));
    let enumerator = source_enumerator(settings, &request.source_url, source_token)?;

    run(&enumerator, &reconciler, request).await
}

fn reconciler_span(playlist_name: &str) -> Span {
    tracing::info_span!("reconciler", playlist_name)
}
