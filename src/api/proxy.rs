use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
};
use reqwest::Client;
use serde_json::{Value, json};
use tracing::{error, info};

use crate::{
    config,
    error::Result,
    spotify::{auth::client_credentials_json, playlist::check_playlist_id},
    utils::{bearer_token, ensure_success},
};

/// Upstream endpoints and credentials of the relay.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub api_url: String,
    pub token_url: String,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

impl ProxyConfig {
    pub fn from_env() -> Self {
        Self {
            api_url: config::spotify_api_url(),
            token_url: config::spotify_token_url(),
            client_id: config::spotify_client_id().ok(),
            client_secret: config::spotify_client_secret().ok(),
        }
    }
}

/// Shared state of the proxy handlers.
#[derive(Debug, Clone)]
pub struct ProxyState {
    http: Client,
    config: Arc<ProxyConfig>,
}

impl ProxyState {
    pub fn new(config: ProxyConfig) -> Self {
        Self {
            http: Client::new(),
            config: Arc::new(config),
        }
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

/// `GET /spotify/playlist/{id}`: forwards the caller's bearer token to the
/// Spotify playlist endpoint.
pub async fn playlist(
    State(state): State<ProxyState>,
    Path(playlist_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let Some(token) = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(bearer_token)
    else {
        error!("missing access token in request");
        return error_response(StatusCode::UNAUTHORIZED, "Missing access token");
    };

    info!(%playlist_id, "fetching spotify playlist");
    match forward_playlist(&state, token, &playlist_id).await {
        Ok(body) => Json(body).into_response(),
        Err(e) => {
            error!(%playlist_id, error = %e, "error fetching playlist");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

async fn forward_playlist(state: &ProxyState, token: &str, playlist_id: &str) -> Result<Value> {
    check_playlist_id(playlist_id)?;
    let api_url = format!(
        "{}/playlists/{}",
        state.config.api_url.trim_end_matches('/'),
        playlist_id
    );

    let response = state.http.get(&api_url).bearer_auth(token).send().await?;
    let response = ensure_success(response).await?;
    Ok(response.json::<Value>().await?)
}

/// `POST /api/token`: client-credentials exchange with the server-held
/// application credentials.
pub async fn token(State(state): State<ProxyState>) -> Response {
    let (Some(client_id), Some(client_secret)) =
        (&state.config.client_id, &state.config.client_secret)
    else {
        error!("client credentials are not configured");
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch token");
    };

    match client_credentials_json(&state.http, &state.config.token_url, client_id, client_secret)
        .await
    {
        Ok(body) => Json(body).into_response(),
        Err(e) => {
            error!(error = %e, "error fetching spotify token");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch token")
        }
    }
}
