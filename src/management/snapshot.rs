use std::path::{Path, PathBuf};

use crate::{Res, types::SourceTrack};

/// Writes the tracks fetched so far to a JSON file.
///
/// The file is a debugging and recovery artifact; nothing reads it back.
#[derive(Debug, Clone)]
pub struct SnapshotManager {
    path: PathBuf,
}

impl SnapshotManager {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<dir>/<playlist id>.json`
    pub fn for_playlist(dir: impl AsRef<Path>, playlist_id: &str) -> Self {
        Self {
            path: dir.as_ref().join(format!("{playlist_id}.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn persist(&self, tracks: &[SourceTrack]) -> Res<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                async_fs::create_dir_all(parent).await?;
            }
        }

        let json = serde_json::to_string_pretty(tracks)?;
        async_fs::write(&self.path, json).await?;
        Ok(())
    }
}
