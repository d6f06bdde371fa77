use std::sync::Arc;

use reqwest::{Client, StatusCode};
use serde_json::Value;
use spot2yt::management::MemoryTokenStore;
use spot2yt::server::{AppState, serve};
use spot2yt::types::Token;
use spot2yt::ytmusic::DestinationState;
use tokio::net::TcpListener;

fn stored_token() -> Token {
    Token {
        access_token: "access".to_string(),
        refresh_token: "refresh".to_string(),
        scope: "playlist-read-private".to_string(),
        expires_in: 3600,
        obtained_at: chrono::Utc::now().timestamp() as u64,
    }
}

// Starts the server on a random port and returns its base URL
async fn start(token: Option<Token>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let state = AppState::new(
        Arc::new(MemoryTokenStore::new(token)),
        DestinationState::Unconfigured,
    );

    tokio::spawn(async move {
        serve(listener, state).await.unwrap();
    });

    format!("http://{}", addr)
}

#[tokio::test]
async fn test_health() {
    let base = start(None).await;

    let res = Client::new().get(format!("{}/health", base)).send().await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_convert_requires_spotify_login() {
    let base = start(None).await;

    let res = Client::new()
        .post(format!("{}/convert", base))
        .form(&[("playlist_url", "https://open.spotify.com/playlist/37i9dQZF1DXcBWIGoYBM5M")])
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Not authenticated with Spotify");
}

#[tokio::test]
async fn test_convert_requires_playlist_url() {
    let base = start(Some(stored_token())).await;
    let client = Client::new();

    let res = client
        .post(format!("{}/convert", base))
        .form(&[("playlist_url", "   ")])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "No playlist URL provided");

    // no form body at all
    let res = client.post(format!("{}/convert", base)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_convert_requires_configured_destination() {
    let base = start(Some(stored_token())).await;

    let res = Client::new()
        .post(format!("{}/convert", base))
        .form(&[("playlist_url", "https://open.spotify.com/playlist/37i9dQZF1DXcBWIGoYBM5M")])
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "YouTube Music not configured");
}

#[tokio::test]
async fn test_logout_drops_spotify_session() {
    let base = start(Some(stored_token())).await;
    let client = Client::new();
    let form = [("playlist_url", "https://open.spotify.com/playlist/37i9dQZF1DXcBWIGoYBM5M")];

    // logged in: gets past the Spotify check to the destination check
    let res = client
        .post(format!("{}/convert", base))
        .form(&form)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);

    let res = client.get(format!("{}/logout", base)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "logged out");

    let res = client
        .post(format!("{}/convert", base))
        .form(&form)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Not authenticated with Spotify");

    // logging out twice is fine
    let res = client.get(format!("{}/logout", base)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}
