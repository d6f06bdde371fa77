use axum::{
    Extension,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};

use crate::{
    api::api_error,
    config,
    server::AppState,
    spotify,
    types::PkceToken,
    utils, warning,
};

/// Starts the PKCE flow from the browser: remembers a fresh verifier and
/// redirects to Spotify's authorize page.
pub async fn login(Extension(state): Extension<AppState>) -> Response {
    let Some(client_id) = config::spotify_client_id() else {
        return api_error(StatusCode::SERVICE_UNAVAILABLE, "Spotify not configured").into_response();
    };

    let code_verifier = utils::generate_code_verifier();
    let code_challenge = utils::generate_code_challenge(&code_verifier);

    let auth_url = match spotify::auth::authorize_url(&client_id, &code_challenge) {
        Ok(url) => url,
        Err(e) => {
            warning!("Cannot build authorization URL: {}", e);
            return api_error(StatusCode::INTERNAL_SERVER_ERROR, "Login unavailable")
                .into_response();
        }
    };

    *state.pkce.lock().await = Some(PkceToken {
        code_verifier,
        token: None,
    });

    Redirect::to(&auth_url).into_response()
}
