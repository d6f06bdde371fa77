use axum::{Extension, Json, http::StatusCode};
use serde_json::{Value, json};

use crate::{
    api::{ApiError, api_error},
    management::TokenStore,
    server::AppState,
    warning,
};

/// Drops the stored Spotify token and any pending PKCE state.
pub async fn logout(Extension(state): Extension<AppState>) -> Result<Json<Value>, ApiError> {
    state.pkce.lock().await.take();

    if let Err(e) = state.tokens.clear().await {
        warning!("Failed to clear stored token: {}", e);
        return Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, "Logout failed"));
    }

    Ok(Json(json!({ "status": "logged out" })))
}
