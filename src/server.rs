use axum::{
    Extension, Router,
    routing::{get, post},
};
use std::{net::SocketAddr, str::FromStr, sync::Arc};
use tokio::{net::TcpListener, sync::Mutex};

use crate::{
    Res, api, config, info, management::TokenStore, types::PkceToken, ytmusic::DestinationState,
};

/// Everything the HTTP handlers share.
#[derive(Clone)]
pub struct AppState {
    pub pkce: Arc<Mutex<Option<PkceToken>>>,
    pub tokens: Arc<dyn TokenStore>,
    pub destination: Arc<DestinationState>,
}

impl AppState {
    pub fn new(tokens: Arc<dyn TokenStore>, destination: DestinationState) -> Self {
        AppState {
            pkce: Arc::new(Mutex::new(None)),
            tokens,
            destination: Arc::new(destination),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/login", get(api::login))
        .route("/callback", get(api::callback))
        .route("/logout", get(api::logout))
        .route("/convert", post(api::convert))
        .route("/analyze/{playlist_id}", get(api::analyze))
        .layer(Extension(state))
}

/// Binds the configured address and serves until the process ends.
pub async fn start_api_server(state: AppState) -> Res<()> {
    let addr = SocketAddr::from_str(&config::server_addr())?;
    let listener = TcpListener::bind(&addr).await?;
    serve(listener, state).await
}

pub async fn serve(listener: TcpListener, state: AppState) -> Res<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("Listening on http://{}", addr);
    }
    axum::serve(listener, router(state)).await?;
    Ok(())
}
