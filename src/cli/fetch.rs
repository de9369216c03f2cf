use std::{path::PathBuf, time::Duration};

use indicatif::{ProgressBar, ProgressStyle};

use crate::{config::Settings, convert, error, info, management::SnapshotManager, success};

pub async fn fetch(
    settings: &Settings,
    source_url: &str,
    output: Option<PathBuf>,
    source_token: Option<String>,
) {
    let mut enumerator = match convert::source_enumerator(settings, source_url, source_token) {
        Ok(e) => e,
        Err(e) => error!("Cannot set up the Apple Music client. Err: {}", e),
    };
    if let Some(path) = output {
        enumerator = enumerator.with_snapshot(SnapshotManager::new(path));
    }

    let pb = ProgressBar::new_spinner();
    pb.set_message("Fetching Apple Music playlist...");
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }

    let tracks = match enumerator.enumerate(source_url).await {
        Ok(tracks) => tracks,
        Err(e) => {
            pb.finish_and_clear();
            error!("Failed to fetch playlist. Err: {}", e)
        }
    };
    pb.finish_and_clear();

    success!("Fetched {} tracks", tracks.len());
    if let Some(snapshot) = enumerator.snapshot().filter(|_| !tracks.is_empty()) {
        info!("Track list written to {}", snapshot.path().display());
    }
}
