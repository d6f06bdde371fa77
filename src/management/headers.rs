use std::path::PathBuf;

use crate::{config, error::MigrationError, ytmusic::BrowserHeaders};

/// Persists the YouTube Music browser headers as `browser.json`.
pub struct HeadersManager {
    path: PathBuf,
}

impl HeadersManager {
    pub fn new(path: PathBuf) -> Self {
        HeadersManager { path }
    }

    pub fn default_location() -> Self {
        Self::new(config::ytmusic_headers_path())
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    pub async fn load(&self) -> Result<Option<BrowserHeaders>, MigrationError> {
        if !self.path.is_file() {
            return Ok(None);
        }
        let content = async_fs::read_to_string(&self.path).await?;
        BrowserHeaders::from_json(&content).map(Some)
    }

    pub async fn persist(&self, headers: &BrowserHeaders) -> Result<(), MigrationError> {
        if let Some(parent) = self.path.parent() {
            async_fs::create_dir_all(parent).await?;
        }

        async_fs::write(&self.path, headers.to_json()?).await?;
        Ok(())
    }
}
