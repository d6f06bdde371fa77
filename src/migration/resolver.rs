use std::sync::Arc;

use crate::{
    error::MigrationError,
    migration::DestinationCatalog,
    types::{CatalogTrack, MatchResult},
    warning,
};

/// Maps a source track onto the destination catalog: the first song result
/// for `"<title> <artist>"` wins.
pub struct TrackResolver {
    destination: Arc<dyn DestinationCatalog>,
}

impl TrackResolver {
    pub fn new(destination: Arc<dyn DestinationCatalog>) -> Self {
        TrackResolver { destination }
    }

    /// Search failures count as "not found". Only an expired destination
    /// session is returned as an error.
    pub async fn resolve(&self, track: &CatalogTrack) -> Result<MatchResult, MigrationError> {
        let query = build_query(track);

        match self.destination.search_songs(&query).await {
            Ok(hits) => Ok(hits
                .into_iter()
                .next()
                .map(|hit| MatchResult::found(hit.destination_id))
                .unwrap_or_else(MatchResult::not_found)),
            Err(MigrationError::AuthExpired) => Err(MigrationError::AuthExpired),
            Err(e) => {
                warning!("Error searching for song '{}': {}", query, e);
                Ok(MatchResult::not_found())
            }
        }
    }
}

pub fn build_query(track: &CatalogTrack) -> String {
    format!("{} {}", track.title, track.primary_artist)
}
