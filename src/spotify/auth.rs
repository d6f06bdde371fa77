use std::{sync::Arc, time::Duration};

use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::{
    config, error,
    error::MigrationError,
    server::{AppState, start_api_server},
    success,
    types::{PkceToken, Token},
    utils, warning,
};

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    scope: Option<String>,
    expires_in: Option<u64>,
}

/// Initiates the complete OAuth 2.0 PKCE authentication flow with Spotify.
///
/// This function orchestrates the entire authentication process including:
/// 1. Generating PKCE code verifier and challenge
/// 2. Starting the local server that receives the callback
/// 3. Opening the authorization URL in the user's browser
/// 4. Waiting for the OAuth callback
///
/// The callback handler exchanges the code and stores the token in the
/// application's token store, so once this returns successfully later runs
/// can read from Spotify without logging in again.
///
/// # Error Handling
///
/// - Missing client id or a malformed authorize URL terminate the program
/// - Browser launch failures result in a warning with manual URL instructions
/// - Authentication timeouts terminate with an error message
pub async fn auth(state: AppState) {
    let Some(client_id) = config::spotify_client_id() else {
        error!("SPOTIFY_API_AUTH_CLIENT_ID is not set. Add it to your .env file first.");
    };

    // generate PKCE verifier and challenge
    let code_verifier = utils::generate_code_verifier();
    let code_challenge = utils::generate_code_challenge(&code_verifier);

    let auth_url = match authorize_url(&client_id, &code_challenge) {
        Ok(url) => url,
        Err(e) => error!("Cannot build authorization URL: {}", e),
    };

    // Store verifier in shared state before redirect
    {
        let mut lock = state.pkce.lock().await;
        *lock = Some(PkceToken {
            code_verifier,
            token: None,
        });
    }

    // start API server
    let server_state = state.clone();
    tokio::spawn(async move {
        if let Err(e) = start_api_server(server_state).await {
            warning!("Callback server stopped: {}", e);
        }
    });

    // Open the authorization URL in the default browser
    if webbrowser::open(&auth_url).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            auth_url
        )
    }

    // wait for callback to be hit
    match wait_for_token(Arc::clone(&state.pkce)).await {
        Some(_) => success!("Authentication successful!"),
        None => error!("Authentication failed or timed out."),
    }
}

/// Builds the Spotify authorize URL for the PKCE flow.
pub fn authorize_url(client_id: &str, code_challenge: &str) -> Result<String, String> {
    let url = reqwest::Url::parse_with_params(
        &config::spotify_apiauth_url(),
        &[
            ("client_id", client_id),
            ("response_type", "code"),
            ("redirect_uri", &config::spotify_redirect_uri()),
            ("code_challenge_method", "S256"),
            ("code_challenge", code_challenge),
            ("scope", &config::spotify_scope()),
        ],
    )
    .map_err(|e| e.to_string())?;

    Ok(url.to_string())
}

/// Polls the shared PKCE state for up to 60 seconds until the callback has
/// deposited a token.
async fn wait_for_token(shared_state: Arc<Mutex<Option<PkceToken>>>) -> Option<Token> {
    use std::time::Instant;

    let max_wait = Duration::from_secs(60);
    let start = Instant::now();

    while start.elapsed() < max_wait {
        let lock = shared_state.lock().await;
        if let Some(pkce_token) = lock.as_ref() {
            if let Some(token) = &pkce_token.token {
                return Some(token.clone());
            }
        }
        drop(lock);
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    None
}

/// Refreshes an expired access token using its refresh token.
///
/// Spotify may or may not rotate the refresh token; when the response has
/// none, the current one is kept.
pub async fn refresh_token(
    client: &Client,
    token_url: &str,
    client_id: &str,
    current: &Token,
) -> Result<Token, MigrationError> {
    let res = client
        .post(token_url)
        .form(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", current.refresh_token.as_str()),
            ("client_id", client_id),
        ])
        .send()
        .await?
        .error_for_status()?;

    let json = res.json::<TokenResponse>().await?;
    Ok(into_token(json, Some(current)))
}

/// Exchanges an authorization code for an access token using PKCE.
///
/// The verifier must be the one whose challenge was sent in the authorize
/// request.
pub async fn exchange_code_pkce(
    client: &Client,
    code: &str,
    verifier: &str,
) -> Result<Token, MigrationError> {
    let client_id = config::spotify_client_id().ok_or(MigrationError::NotConfigured("Spotify"))?;
    let redirect_uri = config::spotify_redirect_uri();

    let res = client
        .post(config::spotify_apitoken_url())
        .form(&[
            ("grant_type", "authorization_code"),
            ("client_id", client_id.as_str()),
            ("code", code),
            ("code_verifier", verifier),
            ("redirect_uri", redirect_uri.as_str()),
        ])
        .send()
        .await?
        .error_for_status()?;

    let json = res.json::<TokenResponse>().await?;
    Ok(into_token(json, None))
}

fn into_token(res: TokenResponse, previous: Option<&Token>) -> Token {
    Token {
        access_token: res.access_token,
        refresh_token: res
            .refresh_token
            .or_else(|| previous.map(|t| t.refresh_token.clone()))
            .unwrap_or_default(),
        scope: res
            .scope
            .or_else(|| previous.map(|t| t.scope.clone()))
            .unwrap_or_default(),
        expires_in: res.expires_in.unwrap_or(3600),
        obtained_at: Utc::now().timestamp() as u64,
    }
}
