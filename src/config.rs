//! Configuration management for spot2yt.
//!
//! This module handles loading and accessing configuration values from environment
//! variables and `.env` files. It provides a centralized way to manage application
//! configuration including Spotify API credentials, YouTube Music endpoints, server
//! settings and the migration throttle.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults (where applicable)

use dotenv;
use std::{env, path::PathBuf, time::Duration};

const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:5000";
const DEFAULT_REDIRECT_URI: &str = "http://127.0.0.1:5000/callback";
const DEFAULT_SCOPE: &str = "playlist-read-private";
const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
const DEFAULT_YTMUSIC_API_URL: &str = "https://music.youtube.com/youtubei/v1";
const DEFAULT_TRACK_DELAY_MS: u64 = 500;

/// Returns the application's directory inside the platform local data directory.
///
/// - Linux: `~/.local/share/spot2yt`
/// - macOS: `~/Library/Application Support/spot2yt`
/// - Windows: `%LOCALAPPDATA%/spot2yt`
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("spot2yt");
    path
}

/// Loads environment variables from a `.env` file in the local data directory.
///
/// Creates the directory structure if it doesn't exist. A missing `.env` file
/// is not an error: every setting has either a default or an explicit
/// "not configured" state.
///
/// # Errors
///
/// Returns an error string if the directory cannot be created or an existing
/// `.env` file cannot be parsed.
pub async fn load_env() -> Result<(), String> {
    let path = data_dir().join(".env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    if path.is_file() {
        dotenv::from_path(&path).map_err(|e| e.to_string())?;
    }
    Ok(())
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Address the local HTTP server binds to (`SERVER_ADDRESS`).
pub fn server_addr() -> String {
    var_or("SERVER_ADDRESS", DEFAULT_SERVER_ADDRESS)
}

/// Spotify application client id (`SPOTIFY_API_AUTH_CLIENT_ID`).
///
/// `None` means Spotify has not been configured yet.
pub fn spotify_client_id() -> Option<String> {
    env::var("SPOTIFY_API_AUTH_CLIENT_ID")
        .ok()
        .filter(|v| !v.trim().is_empty())
}

/// OAuth redirect URI registered for the Spotify application
/// (`SPOTIFY_API_REDIRECT_URI`).
pub fn spotify_redirect_uri() -> String {
    var_or("SPOTIFY_API_REDIRECT_URI", DEFAULT_REDIRECT_URI)
}

/// Space separated OAuth scopes (`SPOTIFY_API_AUTH_SCOPE`).
pub fn spotify_scope() -> String {
    var_or("SPOTIFY_API_AUTH_SCOPE", DEFAULT_SCOPE)
}

/// Spotify authorize endpoint (`SPOTIFY_API_AUTH_URL`).
pub fn spotify_apiauth_url() -> String {
    var_or("SPOTIFY_API_AUTH_URL", DEFAULT_AUTH_URL)
}

/// Spotify Web API base URL (`SPOTIFY_API_URL`).
pub fn spotify_apiurl() -> String {
    var_or("SPOTIFY_API_URL", DEFAULT_API_URL)
}

/// Spotify token exchange endpoint (`SPOTIFY_API_TOKEN_URL`).
pub fn spotify_apitoken_url() -> String {
    var_or("SPOTIFY_API_TOKEN_URL", DEFAULT_TOKEN_URL)
}

/// YouTube Music internal API base URL (`YTMUSIC_API_URL`).
pub fn ytmusic_apiurl() -> String {
    var_or("YTMUSIC_API_URL", DEFAULT_YTMUSIC_API_URL)
}

/// Pause inserted after each migrated track (`MIGRATION_TRACK_DELAY_MS`).
pub fn track_delay() -> Duration {
    let millis = env::var("MIGRATION_TRACK_DELAY_MS")
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(DEFAULT_TRACK_DELAY_MS);
    Duration::from_millis(millis)
}

/// Location of the persisted Spotify token.
pub fn token_path() -> PathBuf {
    data_dir().join("cache/token.json")
}

/// Location of the persisted YouTube Music browser headers.
pub fn ytmusic_headers_path() -> PathBuf {
    data_dir().join("browser.json")
}
