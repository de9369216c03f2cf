use tabled::Table;

use crate::{
    config::Settings,
    convert::{self, ConversionRequest},
    error,
    management::UnmatchedManager,
    info,
    spotify::DestinationCredentials,
    success,
    types::UnmatchedTableRow,
    warning,
};

pub async fn convert(
    settings: &Settings,
    request: ConversionRequest,
    access_token: Option<String>,
    source_token: Option<String>,
) {
    let credentials = match DestinationCredentials::from_settings(settings, access_token) {
        Ok(c) => c,
        Err(e) => error!(
            "No Spotify credentials. Pass --access-token or configure the client.\n Error: {}",
            e
        ),
    };

    if let DestinationCredentials::AuthorizationFlow { .. } = credentials {
        info!("Waiting for Spotify authorization in your browser...");
    }
    info!(
        "Converting {} into Spotify playlist '{}'",
        request.source_url, request.playlist_name
    );

    let result = convert::from_settings(settings, &credentials, &request, source_token).await;
    let report = match result {
        Ok(report) => report,
        Err(e) => error!("Conversion failed. Err: {}", e),
    };

    success!(
        "Playlist '{}' updated: {} of {} tracks added",
        request.playlist_name,
        report.added_count(),
        report.outcomes.len()
    );

    let unmatched = report.unmatched();
    if unmatched.is_empty() {
        return;
    }

    warning!("{} tracks could not be added", unmatched.len());
    let rows: Vec<UnmatchedTableRow> = unmatched.into_iter().map(UnmatchedTableRow::from).collect();
    println!("{}", Table::new(rows));

    let manager = UnmatchedManager::for_playlist(&report.playlist_id);
    match manager.persist(&report).await {
        Ok(_) => info!("Unmatched tracks written to {}", manager.path().display()),
        Err(e) => warning!("Failed to write unmatched tracks. Err: {}", e),
    }
}
