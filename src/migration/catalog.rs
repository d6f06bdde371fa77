use async_trait::async_trait;

use crate::{
    error::MigrationError,
    types::{PlaylistMeta, PlaylistPage, SearchHit, Session},
};

/// The catalog a playlist is migrated from.
#[async_trait]
pub trait SourceCatalog: Send + Sync {
    /// Human readable catalog name, used in the destination playlist title.
    fn name(&self) -> &str;

    /// Produces a session for the next call, refreshing credentials when
    /// needed. Fails with `AuthExpired` when no valid session can be produced.
    async fn authenticate(&self) -> Result<Session, MigrationError>;

    /// Fetches one page of raw playlist entries. `cursor` is `None` for the
    /// first page and the previous page's `next` afterwards.
    async fn fetch_playlist_page(
        &self,
        session: &Session,
        playlist_id: &str,
        cursor: Option<&str>,
    ) -> Result<PlaylistPage, MigrationError>;

    async fn fetch_playlist_meta(
        &self,
        session: &Session,
        playlist_id: &str,
    ) -> Result<PlaylistMeta, MigrationError>;
}

/// The catalog a playlist is migrated to.
#[async_trait]
pub trait DestinationCatalog: Send + Sync {
    fn name(&self) -> &str;

    async fn create_playlist(
        &self,
        title: &str,
        description: &str,
    ) -> Result<String, MigrationError>;

    /// Searches songs only. Results keep the catalog's ranking order.
    async fn search_songs(&self, query: &str) -> Result<Vec<SearchHit>, MigrationError>;

    async fn add_items(
        &self,
        playlist_id: &str,
        destination_ids: &[String],
    ) -> Result<(), MigrationError>;
}
