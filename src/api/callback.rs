use std::collections::HashMap;

use axum::{Extension, extract::Query, response::Html};
use reqwest::Client;

use crate::{management::TokenStore, server::AppState, spotify, warning};

pub async fn callback(
    Query(params): Query<HashMap<String, String>>,
    Extension(state): Extension<AppState>,
) -> Html<&'static str> {
    let Some(code) = params.get("code") else {
        return Html("<h4>Missing authorization code.</h4>");
    };

    let mut pkce = state.pkce.lock().await;
    // Take code verifier from state
    let Some(pkce_state) = pkce.as_mut() else {
        return Html("<h4>Missing PKCE code verifier.</h4>");
    };

    let verifier = pkce_state.code_verifier.clone();

    match spotify::auth::exchange_code_pkce(&Client::new(), code, &verifier).await {
        Ok(token) => {
            if let Err(e) = state.tokens.put(token.clone()).await {
                warning!("Failed to store token: {}", e);
                return Html("<h4>Login failed.</h4>");
            }
            pkce_state.token = Some(token);
            Html("<h2>Authentication successful.</h2><p>You can close this window.</p>")
        }
        Err(e) => {
            warning!("Token exchange failed: {}", e);
            Html("<h4>Login failed.</h4>")
        }
    }
}
