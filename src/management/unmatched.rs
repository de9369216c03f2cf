use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::{
    Res, config,
    types::{MatchOutcome, ReconcileReport, SourceTrack},
};

#[derive(Serialize)]
struct UnmatchedEntry<'a> {
    #[serde(flatten)]
    track: &'a SourceTrack,
    outcome: &'a MatchOutcome,
}

/// Keeps the tracks that could not be added to the destination playlist, so
/// they can be added by hand later.
#[derive(Debug, Clone)]
pub struct UnmatchedManager {
    path: PathBuf,
}

impl UnmatchedManager {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<data dir>/unmatched/<playlist id>.json`
    pub fn for_playlist(playlist_id: &str) -> Self {
        let mut path = config::data_dir();
        path.push(format!("unmatched/{playlist_id}.json"));
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the unmatched part of `report`. Returns the number of entries
    /// written; nothing is written when every track was added.
    pub async fn persist(&self, report: &ReconcileReport) -> Res<usize> {
        let entries: Vec<UnmatchedEntry> = report
            .unmatched()
            .into_iter()
            .map(|o| UnmatchedEntry {
                track: &o.track,
                outcome: &o.outcome,
            })
            .collect();

        if entries.is_empty() {
            return Ok(0);
        }

        if let Some(parent) = self.path.parent() {
            async_fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(&entries)?;
        async_fs::write(&self.path, json).await?;
        Ok(entries.len())
    }
}
