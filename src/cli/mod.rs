//! # CLI Module
//!
//! User-facing commands of spot2yt. Each command loads what it needs from the
//! local data directory, delegates to the library layers and reports through
//! the crate's logging macros.
//!
//! - [`auth`] - Spotify authorization via the PKCE browser flow
//! - [`logout`] - Forget the stored Spotify token
//! - [`setup`] - Store and validate YouTube Music browser headers
//! - [`migrate`] - Copy a Spotify playlist to YouTube Music with a live progress line
//! - [`analyze`] - Print the mood and genre report of a playlist
//! - [`serve`] - Run the local HTTP server
//!
//! ## Usage
//!
//! ```bash
//! spot2yt auth
//! spot2yt setup --headers-file headers.txt
//! spot2yt migrate https://open.spotify.com/playlist/37i9dQZF1DXcBWIGoYBM5M
//! ```
//!
//! Fatal problems such as a missing login end the process through `error!`.

mod analyze;
mod auth;
mod logout;
mod migrate;
mod serve;
mod setup;

use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};

pub use analyze::analyze;
pub use auth::auth;
pub use logout::logout;
pub use migrate::migrate;
pub use serve::serve;
pub use setup::setup;

use crate::{
    management::{FileTokenStore, HeadersManager},
    server::AppState,
    ytmusic::DestinationState,
};

/// Application state backed by the files in the local data directory.
async fn local_state() -> AppState {
    let destination = DestinationState::load(&HeadersManager::default_location()).await;
    AppState::new(Arc::new(FileTokenStore::default_location()), destination)
}

fn spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message);
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    pb
}
