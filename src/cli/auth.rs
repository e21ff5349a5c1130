use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{
    Res, error, info,
    management::{Session, TokenStore},
    spotify, success,
    types::AuthToken,
    utils, warning,
};

/// Authorizes with Spotify.
///
/// Without `redirect_url` the browser based flow runs. With it, the token is
/// taken from the fragment of a redirect URL copied from the browser.
pub async fn auth(redirect_url: Option<String>) {
    let store = TokenStore::from_env();

    match redirect_url {
        Some(url) => {
            let token = match spotify::auth::token_from_redirect_url(&url, utils::now_ms()) {
                Ok(token) => token,
                Err(e) => error!("Cannot read token from redirect. Err: {}", e),
            };
            match store.persist(&token).await {
                Ok(()) => success!("Token saved to {}", store.path().display()),
                Err(e) => error!("Failed to save token. Err: {}", e),
            }
        }
        None => {
            if let Err(e) = authorize(&store).await {
                error!("{}", e);
            }
        }
    }
}

/// Returns a usable token, running the authorization flow first when the
/// stored token is missing or already expired.
pub(crate) async fn ensure_token() -> Res<AuthToken> {
    let store = TokenStore::from_env();

    match store.session(utils::now_ms()).await? {
        Session::Valid(token) => Ok(token),
        Session::Expired(_) => {
            warning!("Spotify token expired. Re-authorizing...");
            authorize(&store).await
        }
        Session::Missing => {
            info!("No Spotify token found. Starting authorization...");
            authorize(&store).await
        }
    }
}

async fn authorize(store: &TokenStore) -> Res<AuthToken> {
    let shared_state = Arc::new(Mutex::new(None));
    Ok(spotify::auth::auth(shared_state, store).await?)
}
