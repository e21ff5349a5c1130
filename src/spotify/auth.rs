use std::{collections::HashMap, sync::Arc, time::Duration};

use reqwest::{Client, Url};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::{
    config,
    error::{AppError, Result},
    management::TokenStore,
    server::start_callback_server,
    success,
    types::{AuthToken, ClientCredentialsToken, PendingAuth},
    utils, warning,
};

/// Token lifetime assumed when the redirect omits `expires_in`.
const DEFAULT_EXPIRES_IN: u64 = 3600;

/// Runs the OAuth implicit grant flow against Spotify.
///
/// The flow:
/// 1. **State**: generates a random `state` value and stores it in the
///    shared state before redirecting
/// 2. **Server Start**: launches the local callback server
/// 3. **Browser Launch**: opens the authorize URL in the default browser
/// 4. **Redirect**: Spotify redirects back with the token in the URL
///    fragment; the callback page forwards it to the server and clears it
/// 5. **Token Persistence**: the token and its absolute expiry are saved
///    through the [`TokenStore`]
///
/// # Errors
///
/// Fails if the client ID is not configured, if the token cannot be
/// persisted, or if no redirect arrives within 60 seconds.
pub async fn auth(
    shared_state: Arc<Mutex<Option<PendingAuth>>>,
    store: &TokenStore,
) -> Result<AuthToken> {
    let state = utils::generate_state();

    let auth_url = authorize_url(
        &config::spotify_auth_url(),
        &config::spotify_client_id()?,
        &config::spotify_redirect_uri(),
        &config::spotify_scope(),
        &state,
    )?;

    // Store state before redirect
    {
        let mut lock = shared_state.lock().await;
        *lock = Some(PendingAuth { state, token: None });
    }

    let server_state = Arc::clone(&shared_state);
    let server = tokio::spawn(async move {
        if let Err(e) = start_callback_server(server_state).await {
            warning!("Callback server stopped: {}", e);
        }
    });

    if webbrowser::open(auth_url.as_str()).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            auth_url
        )
    }

    let token = wait_for_token(shared_state, Duration::from_secs(60)).await;
    server.abort();

    match token {
        Some(t) => {
            store.persist(&t).await?;
            success!("Authentication successful!");
            Ok(t)
        }
        None => Err(AppError::Auth("Authentication failed or timed out.".to_string())),
    }
}

/// Builds the authorize URL for the implicit grant (`response_type=token`).
pub fn authorize_url(
    auth_url: &str,
    client_id: &str,
    redirect_uri: &str,
    scope: &str,
    state: &str,
) -> Result<Url> {
    Url::parse_with_params(
        auth_url,
        &[
            ("client_id", client_id),
            ("response_type", "token"),
            ("redirect_uri", redirect_uri),
            ("scope", scope),
            ("state", state),
        ],
    )
    .map_err(|e| AppError::Config(format!("invalid authorize url {auth_url}: {e}")))
}

/// Polls the shared state once per second until the callback stored a token.
async fn wait_for_token(
    shared_state: Arc<Mutex<Option<PendingAuth>>>,
    max_wait: Duration,
) -> Option<AuthToken> {
    let start = tokio::time::Instant::now();

    while start.elapsed() < max_wait {
        let lock = shared_state.lock().await;
        if let Some(pending) = lock.as_ref() {
            if let Some(token) = &pending.token {
                return Some(token.clone());
            }
        }
        drop(lock);
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    None
}

/// Splits a URL fragment (`access_token=...&expires_in=...`) into pairs.
pub fn parse_fragment(fragment: &str) -> HashMap<String, String> {
    let fragment = fragment.trim_start_matches('#');
    Url::parse(&format!("http://localhost/?{fragment}"))
        .map(|url| url.query_pairs().into_owned().collect())
        .unwrap_or_default()
}

/// Builds a token from the parameters of an OAuth redirect.
///
/// `expected_state` is checked when given. `expires_in` is relative in
/// seconds and is turned into an absolute expiry based on `now_ms`.
pub fn token_from_redirect(
    params: &HashMap<String, String>,
    expected_state: Option<&str>,
    now_ms: i64,
) -> Result<AuthToken> {
    if let Some(error) = params.get("error") {
        return Err(AppError::Auth(format!("authorization denied: {error}")));
    }

    if let Some(expected) = expected_state {
        if params.get("state").map(String::as_str) != Some(expected) {
            return Err(AppError::Auth("state mismatch in redirect".to_string()));
        }
    }

    let access_token = params
        .get("access_token")
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Auth("redirect carries no access token".to_string()))?;

    let expires_in = params
        .get("expires_in")
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(DEFAULT_EXPIRES_IN);

    Ok(AuthToken::expiring_in(access_token.clone(), expires_in, now_ms))
}

/// Builds a token from a full redirect URL pasted by the user.
pub fn token_from_redirect_url(redirect_url: &str, now_ms: i64) -> Result<AuthToken> {
    let url = Url::parse(redirect_url)
        .map_err(|e| AppError::Validation(format!("invalid redirect url: {e}")))?;
    let params = parse_fragment(url.fragment().unwrap_or_default());
    token_from_redirect(&params, None, now_ms)
}

/// Exchanges the application's client credentials for an app token.
///
/// Used by the proxy relay so the client secret stays on the server.
pub async fn client_credentials(
    http: &Client,
    token_url: &str,
    client_id: &str,
    client_secret: &str,
) -> Result<ClientCredentialsToken> {
    let body = client_credentials_json(http, token_url, client_id, client_secret).await?;
    Ok(serde_json::from_value(body)?)
}

/// Same exchange as [`client_credentials`], returning the token endpoint's
/// JSON body untouched.
pub async fn client_credentials_json(
    http: &Client,
    token_url: &str,
    client_id: &str,
    client_secret: &str,
) -> Result<Value> {
    let response = http
        .post(token_url)
        .header(
            reqwest::header::AUTHORIZATION,
            utils::basic_auth_header(client_id, client_secret),
        )
        .form(&[("grant_type", "client_credentials")])
        .send()
        .await?;

    let response = utils::ensure_success(response).await?;
    Ok(response.json::<Value>().await?)
}
