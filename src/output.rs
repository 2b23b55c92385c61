use std::path::Path;

use anyhow::{Context, Result};

use crate::records::Extracted;

pub const SONG_INFO: &str = "song_info.json";
pub const COLLECTION_INFO: &str = "collection_info.json";
pub const AVATARS: &str = "avatars.json";
pub const TIPS: &str = "tips.json";

impl Extracted {
    /// Writes the four collections as pretty JSON into `dir`, creating it if needed.
    ///
    /// Everything is serialized before the directory is touched, so a failure
    /// leaves no partial output.
    pub fn write_to(&self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref();

        let files = [
            (SONG_INFO, serde_json::to_vec_pretty(&self.songs)?),
            (COLLECTION_INFO, serde_json::to_vec_pretty(&self.collection)?),
            (AVATARS, serde_json::to_vec_pretty(&self.avatars)?),
            (TIPS, serde_json::to_vec_pretty(&self.tips)?),
        ];

        std::fs::create_dir_all(dir)
            .with_context(|| format!("could not create output directory '{}'", dir.display()))?;
        for (name, data) in files {
            let path = dir.join(name);
            std::fs::write(&path, data)
                .with_context(|| format!("failed to write '{}'", path.display()))?;
            tracing::info!("wrote {}", path.display());
        }

        Ok(())
    }
}
