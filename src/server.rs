use std::{net::SocketAddr, str::FromStr, sync::Arc};

use axum::{
    Extension, Router,
    routing::{get, post},
};
use tokio::{net::TcpListener, sync::Mutex};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::{
    api::{self, proxy::ProxyState},
    config,
    error::{AppError, Result},
    types::PendingAuth,
};

/// Routes of the local OAuth callback server.
pub fn callback_router(state: Arc<Mutex<Option<PendingAuth>>>) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/callback", get(api::callback))
        .route(
            "/callback/token",
            get(api::callback_token).layer(Extension(state)),
        )
}

/// Routes of the proxy relay. CORS is open so browser clients on any
/// origin can call it.
pub fn proxy_router(state: ProxyState) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/spotify/playlist/{id}", get(api::proxy::playlist))
        .route("/api/token", post(api::proxy::token))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

pub async fn start_callback_server(state: Arc<Mutex<Option<PendingAuth>>>) -> Result<()> {
    serve(&config::server_addr(), callback_router(state)).await
}

pub async fn start_proxy_server(state: ProxyState) -> Result<()> {
    serve(&config::proxy_addr(), proxy_router(state)).await
}

async fn serve(address: &str, app: Router) -> Result<()> {
    let addr = SocketAddr::from_str(address)
        .map_err(|e| AppError::Config(format!("invalid server address {address}: {e}")))?;

    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}
