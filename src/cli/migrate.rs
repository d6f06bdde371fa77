use std::sync::Arc;

use crate::{
    cli::spinner,
    error,
    management::{FileTokenStore, HeadersManager, TokenManager},
    migration::{DestinationCatalog, MigrationOrchestrator, ProgressEvent},
    spotify::SpotifyClient,
    success,
    ytmusic::DestinationState,
};

pub async fn migrate(playlist: String) {
    let tokens = TokenManager::new(Arc::new(FileTokenStore::default_location()));
    if !tokens.has_token().await {
        error!("Not authenticated with Spotify. Run `spot2yt auth` first.");
    }

    let destination: Arc<dyn DestinationCatalog> =
        match DestinationState::load(&HeadersManager::default_location())
            .await
            .client()
        {
            Ok(client) => client,
            Err(e) => error!("{}. Run `spot2yt setup` first.", e),
        };

    let source = Arc::new(SpotifyClient::new(tokens));
    let mut rx = MigrationOrchestrator::new(source, destination).spawn(playlist);

    let pb = spinner("Starting migration...");

    while let Some(event) = rx.recv().await {
        match event {
            ProgressEvent::Status { status } => pb.set_message(status),
            ProgressEvent::Fetched {
                total,
                playlist_name,
            } => pb.set_message(format!("Fetched '{}' ({} tracks)", playlist_name, total)),
            ProgressEvent::Processing {
                current_track,
                artist,
                progress,
                total,
                added,
                skipped,
            } => pb.set_message(format!(
                "[{}/{}] {} - {} (added {}, skipped {})",
                progress, total, current_track, artist, added, skipped
            )),
            ProgressEvent::Completed {
                added,
                skipped,
                playlist_id,
            } => {
                pb.finish_and_clear();
                success!(
                    "Migration complete: {} added, {} skipped. https://music.youtube.com/playlist?list={}",
                    added,
                    skipped,
                    playlist_id
                );
                return;
            }
            ProgressEvent::Error { error } => {
                pb.finish_and_clear();
                error!("Migration failed: {}", error);
            }
        }
    }

    pb.finish_and_clear();
    error!("Migration ended without a result.");
}
