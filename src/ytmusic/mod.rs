//! # YouTube Music Integration Module
//!
//! The destination-catalog side of a migration. YouTube Music has no public
//! playlist API, so requests go to the internal API the web player uses,
//! authenticated with headers copied from a logged-in browser session.
//!
//! - [`auth`] - Browser header parsing and the SAPISID authorization hash
//! - [`client`] - [`YtMusicClient`]: create playlists, search songs, add items
//!
//! Whether a client is available is decided once at startup from the stored
//! `browser.json` and kept in a [`DestinationState`].

pub mod auth;
pub mod client;

use std::sync::Arc;

pub use auth::BrowserHeaders;
pub use client::YtMusicClient;

use crate::{error::MigrationError, management::HeadersManager, warning};

/// Whether the destination client can be used.
pub enum DestinationState {
    Unconfigured,
    Ready(Arc<YtMusicClient>),
}

impl DestinationState {
    /// Builds the state from the stored browser headers. Missing or unusable
    /// headers leave the destination unconfigured.
    pub async fn load(headers: &HeadersManager) -> Self {
        match headers.load().await {
            Ok(Some(h)) => match YtMusicClient::new(h) {
                Ok(client) => DestinationState::Ready(Arc::new(client)),
                Err(e) => {
                    warning!("Stored YouTube Music headers are unusable: {}", e);
                    DestinationState::Unconfigured
                }
            },
            Ok(None) => DestinationState::Unconfigured,
            Err(e) => {
                warning!("Failed to read YouTube Music headers: {}", e);
                DestinationState::Unconfigured
            }
        }
    }

    pub fn is_configured(&self) -> bool {
        matches!(self, DestinationState::Ready(_))
    }

    pub fn client(&self) -> Result<Arc<YtMusicClient>, MigrationError> {
        match self {
            DestinationState::Ready(client) => Ok(Arc::clone(client)),
            DestinationState::Unconfigured => Err(MigrationError::NotConfigured("YouTube Music")),
        }
    }
}
