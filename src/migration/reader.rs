use std::sync::Arc;

use crate::{
    error::MigrationError,
    migration::SourceCatalog,
    types::{CatalogTrack, PlaylistItem},
    utils,
};

pub const UNKNOWN_ARTIST: &str = "Unknown Artist";

/// Collects every usable track of a source playlist, in playlist order.
pub struct SourcePlaylistReader {
    source: Arc<dyn SourceCatalog>,
}

impl SourcePlaylistReader {
    pub fn new(source: Arc<dyn SourceCatalog>) -> Self {
        SourcePlaylistReader { source }
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    /// Returns the playlist name and its normalized tracks.
    ///
    /// Pages are followed until the source reports none left. `AuthExpired`
    /// is passed through untouched; every other failure becomes
    /// `SourceFetch`.
    pub async fn read(
        &self,
        playlist_ref: &str,
    ) -> Result<(String, Vec<CatalogTrack>), MigrationError> {
        let playlist_id = utils::parse_playlist_id(playlist_ref).ok_or_else(|| {
            MigrationError::SourceFetch(format!("Invalid playlist reference: {}", playlist_ref))
        })?;

        let mut items: Vec<PlaylistItem> = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let session = self.source.authenticate().await?;
            let page = self
                .source
                .fetch_playlist_page(&session, &playlist_id, cursor.as_deref())
                .await
                .map_err(as_source_fetch)?;

            items.extend(page.items);

            match page.next {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        let tracks = normalize_items(items);

        let session = self.source.authenticate().await?;
        let meta = self
            .source
            .fetch_playlist_meta(&session, &playlist_id)
            .await
            .map_err(as_source_fetch)?;

        Ok((meta.name, tracks))
    }
}

/// Drops entries without a resolvable track (deleted, local-only, unavailable)
/// and converts the rest into [`CatalogTrack`]s.
pub fn normalize_items(items: Vec<PlaylistItem>) -> Vec<CatalogTrack> {
    items
        .into_iter()
        .filter_map(|item| item.track)
        .filter(|track| !track.is_local)
        .filter_map(|track| {
            let source_id = track.id?;
            let primary = track.artists.into_iter().next();
            Some(CatalogTrack {
                title: track.name,
                primary_artist: primary
                    .as_ref()
                    .map(|a| a.name.clone())
                    .unwrap_or_else(|| UNKNOWN_ARTIST.to_string()),
                primary_artist_id: primary.and_then(|a| a.id),
                source_id,
                duration_ms: track.duration_ms,
                uri: track.uri,
            })
        })
        .collect()
}

fn as_source_fetch(err: MigrationError) -> MigrationError {
    match err {
        MigrationError::AuthExpired => MigrationError::AuthExpired,
        MigrationError::SourceFetch(msg) => MigrationError::SourceFetch(msg),
        other => MigrationError::SourceFetch(format!("Error fetching playlist: {}", other)),
    }
}
