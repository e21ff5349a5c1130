use std::{collections::HashMap, sync::Arc};

use axum::{Extension, extract::Query, response::Html};
use tokio::sync::Mutex;

use crate::{spotify::auth::token_from_redirect, types::PendingAuth, utils, warning};

/// Page served at the redirect URI.
///
/// The implicit grant returns the token in the URL fragment, which never
/// reaches the server. The page moves the fragment into a query string,
/// removes it from the address bar and forwards it to `/callback/token`.
const FORWARD_FRAGMENT_PAGE: &str = r#"<!doctype html>
<html>
  <head><title>weatherplay</title></head>
  <body>
    <h4>Completing login...</h4>
    <script>
      const fragment = window.location.hash.substring(1);
      history.replaceState(null, "", window.location.pathname);
      window.location.replace("/callback/token?" + fragment);
    </script>
  </body>
</html>"#;

pub async fn callback() -> Html<&'static str> {
    Html(FORWARD_FRAGMENT_PAGE)
}

pub async fn callback_token(
    Query(params): Query<HashMap<String, String>>,
    Extension(shared_state): Extension<Arc<Mutex<Option<PendingAuth>>>>,
) -> Html<&'static str> {
    let mut state = shared_state.lock().await;
    let Some(pending) = state.as_mut() else {
        return Html("<h4>No login in progress.</h4>");
    };

    match token_from_redirect(&params, Some(&pending.state), utils::now_ms()) {
        Ok(token) => {
            pending.token = Some(token);
            Html("<h2>Authentication successful.</h2><p>Close browser window.</p>")
        }
        Err(e) => {
            warning!("Login failed: {}", e);
            Html("<h4>Login failed.</h4>")
        }
    }
}
