use std::{convert::Infallible, sync::Arc};

use axum::{
    Extension, Form,
    extract::rejection::FormRejection,
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::Stream;
use serde::Deserialize;

use crate::{
    api::{ApiError, api_error},
    management::TokenManager,
    migration::{DestinationCatalog, MigrationOrchestrator},
    server::AppState,
    spotify::SpotifyClient,
};

#[derive(Debug, Default, Deserialize)]
pub struct ConvertForm {
    #[serde(default)]
    pub playlist_url: String,
}

/// Starts a migration and streams its progress.
///
/// Every progress event becomes one SSE `data:` line holding the event's JSON.
/// The stream ends after the terminal `completed` or `error` event.
pub async fn convert(
    Extension(state): Extension<AppState>,
    form: Result<Form<ConvertForm>, FormRejection>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let tokens = TokenManager::new(Arc::clone(&state.tokens));
    if !tokens.has_token().await {
        return Err(api_error(
            StatusCode::UNAUTHORIZED,
            "Not authenticated with Spotify",
        ));
    }

    let playlist_url = form
        .map(|Form(f)| f.playlist_url.trim().to_string())
        .unwrap_or_default();
    if playlist_url.is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "No playlist URL provided"));
    }

    let destination: Arc<dyn DestinationCatalog> = state
        .destination
        .client()
        .map_err(|e| api_error(StatusCode::SERVICE_UNAVAILABLE, &e.to_string()))?;

    let source = Arc::new(SpotifyClient::new(tokens));
    let mut rx = MigrationOrchestrator::new(source, destination).spawn(playlist_url);

    let stream = async_stream::stream! {
        while let Some(event) = rx.recv().await {
            yield Ok::<_, Infallible>(Event::default().data(event.to_json().to_string()));
        }
    };

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
