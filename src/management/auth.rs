use std::{path::PathBuf, sync::Arc};

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use tokio::sync::Mutex;

use crate::{config, error::MigrationError, spotify, types::Token, warning};

/// Seconds before expiry at which a token is already treated as expired.
const EXPIRY_MARGIN_SECS: u64 = 240;

/// Where the Spotify token lives between calls.
///
/// The migration pipeline and the Spotify client only talk to this trait, never
/// to a concrete backend.
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn get(&self) -> Result<Option<Token>, MigrationError>;
    async fn put(&self, token: Token) -> Result<(), MigrationError>;
    /// Forgets the stored token. Clearing an empty store is not an error.
    async fn clear(&self) -> Result<(), MigrationError>;
}

/// Token store backed by a JSON file in the local data directory.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: PathBuf) -> Self {
        FileTokenStore { path }
    }

    pub fn default_location() -> Self {
        Self::new(config::token_path())
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn get(&self) -> Result<Option<Token>, MigrationError> {
        if !self.path.is_file() {
            return Ok(None);
        }
        let content = async_fs::read_to_string(&self.path).await?;
        let token: Token = serde_json::from_str(&content)?;
        Ok(Some(token))
    }

    async fn put(&self, token: Token) -> Result<(), MigrationError> {
        if let Some(parent) = self.path.parent() {
            async_fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(&token)?;
        async_fs::write(&self.path, json).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), MigrationError> {
        if !self.path.is_file() {
            return Ok(());
        }
        async_fs::remove_file(&self.path).await?;
        Ok(())
    }
}

/// Token store that lives only as long as the process.
#[derive(Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<Token>>,
}

impl MemoryTokenStore {
    pub fn new(token: Option<Token>) -> Self {
        MemoryTokenStore {
            token: Mutex::new(token),
        }
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn get(&self) -> Result<Option<Token>, MigrationError> {
        Ok(self.token.lock().await.clone())
    }

    async fn put(&self, token: Token) -> Result<(), MigrationError> {
        *self.token.lock().await = Some(token);
        Ok(())
    }

    async fn clear(&self) -> Result<(), MigrationError> {
        *self.token.lock().await = None;
        Ok(())
    }
}

/// Hands out access tokens from a [`TokenStore`], refreshing them when they
/// are about to expire.
///
/// Calling [`TokenManager::get_valid_token`] repeatedly is safe: a refresh only
/// happens while the stored token is expired, and the refreshed token is put
/// back into the store before it is returned.
pub struct TokenManager {
    store: Arc<dyn TokenStore>,
    client: Client,
    token_url: String,
    client_id: Option<String>,
}

impl TokenManager {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        TokenManager {
            store,
            client: Client::new(),
            token_url: config::spotify_apitoken_url(),
            client_id: config::spotify_client_id(),
        }
    }

    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    pub async fn has_token(&self) -> bool {
        matches!(self.store.get().await, Ok(Some(_)))
    }

    /// Returns a usable access token or `AuthExpired` when there is none and
    /// none can be obtained by refreshing.
    pub async fn get_valid_token(&self) -> Result<String, MigrationError> {
        let token = match self.store.get().await {
            Ok(Some(token)) => token,
            Ok(None) => return Err(MigrationError::AuthExpired),
            Err(e) => {
                warning!("Failed to read stored token: {}", e);
                return Err(MigrationError::AuthExpired);
            }
        };

        if !is_expired(&token, Utc::now().timestamp() as u64) {
            return Ok(token.access_token);
        }

        let Some(client_id) = self.client_id.as_deref() else {
            return Err(MigrationError::AuthExpired);
        };

        let refreshed =
            match spotify::auth::refresh_token(&self.client, &self.token_url, client_id, &token)
                .await
            {
                Ok(t) => t,
                Err(e) => {
                    warning!("Token refresh failed: {}", e);
                    return Err(MigrationError::AuthExpired);
                }
            };

        let access_token = refreshed.access_token.clone();
        self.store.put(refreshed).await?;
        Ok(access_token)
    }
}

/// Whether `token` is expired, or about to, at unix time `now`.
pub fn is_expired(token: &Token, now: u64) -> bool {
    now + EXPIRY_MARGIN_SECS >= token.obtained_at + token.expires_in
}
