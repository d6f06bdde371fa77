use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tokio::time::sleep;

use crate::{
    config,
    error::MigrationError,
    management::TokenManager,
    migration::SourceCatalog,
    types::{PlaylistItemsResponse, PlaylistMeta, PlaylistNameResponse, PlaylistPage, Session},
    warning,
};

/// Maximum entries per playlist page the Web API hands out.
pub const PLAYLIST_PAGE_LIMIT: u32 = 100;

const MAX_BAD_GATEWAY_RETRIES: u32 = 3;
const MAX_RETRY_AFTER_SECS: u64 = 120;

/// Spotify Web API client used as the migration source.
pub struct SpotifyClient {
    client: Client,
    api_url: String,
    tokens: TokenManager,
}

impl SpotifyClient {
    pub fn new(tokens: TokenManager) -> Self {
        SpotifyClient {
            client: Client::new(),
            api_url: config::spotify_apiurl(),
            tokens,
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn playlist_items_url(&self, playlist_id: &str, limit: u32) -> String {
        format!(
            "{uri}/playlists/{id}/tracks?limit={limit}&additional_types=track",
            uri = self.api_url,
            id = playlist_id,
            limit = limit
        )
    }

    /// GETs `url` and decodes the JSON body.
    ///
    /// 502 responses are retried after 10 seconds, 429 responses after the
    /// advertised `Retry-After` as long as it stays reasonable. A 401 comes
    /// back as `AuthExpired`.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        session: &Session,
        url: &str,
    ) -> Result<T, MigrationError> {
        let mut bad_gateways = 0;

        loop {
            let response = self
                .client
                .get(url)
                .bearer_auth(&session.access_token)
                .send()
                .await?;

            let status = response.status();
            if status == StatusCode::BAD_GATEWAY && bad_gateways < MAX_BAD_GATEWAY_RETRIES {
                bad_gateways += 1;
                sleep(Duration::from_secs(10)).await;
                continue; // retry
            }

            if status == StatusCode::TOO_MANY_REQUESTS {
                let retry_after = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(1);
                if retry_after <= MAX_RETRY_AFTER_SECS {
                    sleep(Duration::from_secs(retry_after)).await;
                    continue; // retry
                }
                warning!(
                    "Retry after has reached an abnormal high of {} seconds.",
                    retry_after
                );
            }

            match response.error_for_status() {
                Ok(valid_response) => return Ok(valid_response.json::<T>().await?),
                Err(err) => {
                    return Err(MigrationError::from_status(status, MigrationError::Http(err)));
                }
            }
        }
    }
}

#[async_trait]
impl SourceCatalog for SpotifyClient {
    fn name(&self) -> &str {
        "Spotify"
    }

    async fn authenticate(&self) -> Result<Session, MigrationError> {
        let access_token = self.tokens.get_valid_token().await?;
        Ok(Session { access_token })
    }

    async fn fetch_playlist_page(
        &self,
        session: &Session,
        playlist_id: &str,
        cursor: Option<&str>,
    ) -> Result<PlaylistPage, MigrationError> {
        let url = match cursor {
            Some(next) => next.to_string(),
            None => self.playlist_items_url(playlist_id, PLAYLIST_PAGE_LIMIT),
        };

        let res = self.get_json::<PlaylistItemsResponse>(session, &url).await?;

        Ok(PlaylistPage {
            items: res.items,
            next: res.next,
        })
    }

    async fn fetch_playlist_meta(
        &self,
        session: &Session,
        playlist_id: &str,
    ) -> Result<PlaylistMeta, MigrationError> {
        let url = format!(
            "{uri}/playlists/{id}?fields=name",
            uri = self.api_url,
            id = playlist_id
        );

        let res = self.get_json::<PlaylistNameResponse>(session, &url).await?;
        Ok(PlaylistMeta { name: res.name })
    }
}
