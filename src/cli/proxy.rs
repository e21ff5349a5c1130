use crate::{
    api::proxy::{ProxyConfig, ProxyState},
    config, error, info, server, warning,
};

/// Runs the proxy relay until the process is stopped.
pub async fn proxy() {
    let proxy_config = ProxyConfig::from_env();
    if proxy_config.client_id.is_none() || proxy_config.client_secret.is_none() {
        warning!("SPOTIFY_CLIENT_ID or SPOTIFY_CLIENT_SECRET is not set, /api/token will fail.");
    }

    info!("Proxy relay listening on {}", config::proxy_addr());
    if let Err(e) = server::start_proxy_server(ProxyState::new(proxy_config)).await {
        error!("Proxy relay stopped. Err: {}", e);
    }
}
