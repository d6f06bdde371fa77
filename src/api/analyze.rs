use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::Path,
    http::StatusCode,
};

use crate::{
    analysis::{AnalysisReport, analyze_playlist},
    api::{ApiError, api_error},
    config,
    management::TokenManager,
    server::AppState,
    spotify::SpotifyClient,
    warning,
};

pub async fn analyze(
    Path(playlist_id): Path<String>,
    Extension(state): Extension<AppState>,
) -> Result<Json<AnalysisReport>, ApiError> {
    if config::spotify_client_id().is_none() {
        return Err(api_error(StatusCode::UNAUTHORIZED, "Spotify not configured"));
    }

    let client = SpotifyClient::new(TokenManager::new(Arc::clone(&state.tokens)));
    match analyze_playlist(&client, &playlist_id).await {
        Ok(report) => Ok(Json(report)),
        Err(e) => {
            warning!("Analysis of {} failed: {}", playlist_id, e);
            Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, "Analysis failed"))
        }
    }
}
