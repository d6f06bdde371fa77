use crate::{
    error::MigrationError,
    spotify::SpotifyClient,
    types::{
        Artist, AudioFeatures, AudioFeaturesResponse, GetSeveralArtistsResponse,
        PlaylistItemsResponse, Session, Track,
    },
};

impl SpotifyClient {
    /// Tracks of the first playlist page only, at most `limit` of them.
    pub async fn first_tracks(
        &self,
        session: &Session,
        playlist_id: &str,
        limit: u32,
    ) -> Result<Vec<Track>, MigrationError> {
        let url = self.playlist_items_url(playlist_id, limit);
        let res = self.get_json::<PlaylistItemsResponse>(session, &url).await?;

        Ok(res.items.into_iter().filter_map(|item| item.track).collect())
    }

    /// Audio features for up to 100 track ids, one entry per id.
    pub async fn audio_features(
        &self,
        session: &Session,
        track_ids: &[String],
    ) -> Result<Vec<Option<AudioFeatures>>, MigrationError> {
        let url = format!(
            "{uri}/audio-features?ids={ids}",
            uri = self.api_url(),
            ids = track_ids.join(",")
        );
        let res = self.get_json::<AudioFeaturesResponse>(session, &url).await?;
        Ok(res.audio_features)
    }

    /// Full artist objects for up to 50 artist ids. Unknown ids are dropped.
    pub async fn artists(
        &self,
        session: &Session,
        artist_ids: &[String],
    ) -> Result<Vec<Artist>, MigrationError> {
        let url = format!(
            "{uri}/artists?ids={ids}",
            uri = self.api_url(),
            ids = artist_ids.join(",")
        );
        let res = self.get_json::<GetSeveralArtistsResponse>(session, &url).await?;
        Ok(res.artists.into_iter().flatten().collect())
    }
}
