use std::sync::Arc;

use crate::{error::MigrationError, migration::DestinationCatalog, warning};

/// Creates the destination playlist and appends resolved tracks to it.
pub struct PlaylistPopulator {
    destination: Arc<dyn DestinationCatalog>,
}

impl PlaylistPopulator {
    pub fn new(destination: Arc<dyn DestinationCatalog>) -> Self {
        PlaylistPopulator { destination }
    }

    pub fn destination_name(&self) -> &str {
        self.destination.name()
    }

    /// Any failure here is fatal to the migration and comes back as
    /// `PlaylistCreate`.
    pub async fn create_playlist(
        &self,
        title: &str,
        description: &str,
    ) -> Result<String, MigrationError> {
        self.destination
            .create_playlist(title, description)
            .await
            .map_err(|e| match e {
                MigrationError::PlaylistCreate(msg) => MigrationError::PlaylistCreate(msg),
                other => MigrationError::PlaylistCreate(other.to_string()),
            })
    }

    /// Returns whether the track made it into the playlist. Failed adds are
    /// logged and reported as `false`; only an expired destination session is
    /// returned as an error.
    pub async fn add_track(
        &self,
        playlist_id: &str,
        track_destination_id: &str,
    ) -> Result<bool, MigrationError> {
        let ids = [track_destination_id.to_string()];
        match self.destination.add_items(playlist_id, &ids).await {
            Ok(()) => Ok(true),
            Err(MigrationError::AuthExpired) => Err(MigrationError::AuthExpired),
            Err(e) => {
                warning!("Error adding track to playlist: {}", e);
                Ok(false)
            }
        }
    }
}
