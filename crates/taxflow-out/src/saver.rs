//! Directory-backed document saver

use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use taxflow_returns::DocumentSaver;

/// Writes every document into one directory, replacing same-named files
#[derive(Debug, Clone)]
pub struct DirectorySaver {
    dir: PathBuf,
}

impl DirectorySaver {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Only a single plain path component is accepted.
    fn target(&self, filename: &str) -> anyhow::Result<PathBuf> {
        let mut components = Path::new(filename).components();
        let single = matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        );
        if !single || filename.contains('/') || filename.contains('\\') {
            anyhow::bail!("refusing to save outside {}: {:?}", self.dir.display(), filename);
        }
        Ok(self.dir.join(filename))
    }
}

#[async_trait]
impl DocumentSaver for DirectorySaver {
    async fn save(&self, bytes: &[u8], filename: &str) -> anyhow::Result<()> {
        let target = self.target(filename)?;
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(&target, bytes).await?;
        tracing::info!(path = %target.display(), bytes = bytes.len(), "document saved");
        Ok(())
    }
}
