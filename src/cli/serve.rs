use crate::{cli::local_state, config, error, info, server::start_api_server, warning};

pub async fn serve() {
    let state = local_state().await;

    if config::spotify_client_id().is_none() {
        warning!("SPOTIFY_API_AUTH_CLIENT_ID is not set, /login and /analyze are unavailable.");
    }
    if !state.destination.is_configured() {
        warning!("YouTube Music is not set up, /convert will answer 503. Run `spot2yt setup`.");
    }
    info!("Starting server on {}", config::server_addr());

    if let Err(e) = start_api_server(state).await {
        error!("Server stopped. Err: {}", e);
    }
}
