use std::path::PathBuf;

use tokio::io::AsyncReadExt;

use crate::{
    cli::spinner,
    error,
    error::MigrationError,
    info,
    management::HeadersManager,
    success,
    ytmusic::{BrowserHeaders, YtMusicClient},
};

/// Stores YouTube Music browser headers after proving they work.
///
/// Headers come from a `browser.json` style file, a file of raw request
/// headers, or raw headers pasted on stdin when neither is given.
pub async fn setup(browser_json: Option<PathBuf>, headers_file: Option<PathBuf>) {
    let headers = match read_headers(browser_json, headers_file).await {
        Ok(h) => h,
        Err(e) => error!("Cannot read YouTube Music headers. Err: {}", e),
    };

    let client = match YtMusicClient::new(headers) {
        Ok(c) => c,
        Err(e) => error!("Cannot build YouTube Music client. Err: {}", e),
    };

    let pb = spinner("Validating YouTube Music headers...");
    let validation = client.validate().await;
    pb.finish_and_clear();

    if let Err(e) = validation {
        error!("YouTube Music rejected the headers, nothing was saved. Err: {}", e);
    }

    let manager = HeadersManager::default_location();
    if let Err(e) = manager.persist(client.headers()).await {
        error!("Failed to save headers. Err: {}", e);
    }

    success!("YouTube Music set up. Headers saved to {}", manager.path().display());
}

async fn read_headers(
    browser_json: Option<PathBuf>,
    headers_file: Option<PathBuf>,
) -> Result<BrowserHeaders, MigrationError> {
    if let Some(path) = browser_json {
        let content = async_fs::read_to_string(path).await?;
        return BrowserHeaders::from_json(&content);
    }

    let raw = match headers_file {
        Some(path) => async_fs::read_to_string(path).await?,
        None => {
            info!("Paste the request headers of a music.youtube.com request, then press Ctrl-D:");
            let mut raw = String::new();
            tokio::io::stdin().read_to_string(&mut raw).await?;
            raw
        }
    };

    BrowserHeaders::from_raw(&raw)
}
