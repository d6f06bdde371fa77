use crate::{
    error,
    management::{FileTokenStore, TokenStore},
    success,
};

pub async fn logout() {
    if let Err(e) = FileTokenStore::default_location().clear().await {
        error!("Failed to remove stored Spotify token. Err: {}", e);
    }

    success!("Logged out of Spotify. Run `spot2yt auth` to log in again.");
}
