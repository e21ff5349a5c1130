//! Configuration management for weatherplay.
//!
//! This module handles loading and accessing configuration values from
//! environment variables and `.env` files. Endpoints have sensible defaults
//! so the client works out of the box; only the Spotify credentials must be
//! provided by the user.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults (where applicable)

use std::{env, path::PathBuf, time::Duration};

use crate::error::AppError;

pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8888";
pub const DEFAULT_PROXY_ADDRESS: &str = "127.0.0.1:5000";
pub const DEFAULT_REDIRECT_URI: &str = "http://127.0.0.1:8888/callback";
pub const DEFAULT_SCOPE: &str = "streaming user-read-email user-read-private user-read-playback-state user-modify-playback-state user-read-currently-playing user-library-modify";
pub const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com";
pub const DEFAULT_FORECAST_URL: &str = "https://api.open-meteo.com";
pub const DEFAULT_FALLBACK_TRACK: &str = "spotify:track:4cOdK2wGLETKBW3PvgPWqT";

/// Attempts made by the readiness poller before giving up.
pub const READY_POLL_ATTEMPTS: u32 = 5;
/// Pause between two readiness polls.
pub const READY_POLL_INTERVAL: Duration = Duration::from_millis(1500);
/// Wait between queueing the fallback track and retrying playback.
pub const FALLBACK_RETRY_DELAY: Duration = Duration::from_millis(2000);
/// Wait between stopping progress tracking and pausing the device.
pub const PAUSE_DELAY: Duration = Duration::from_millis(300);
/// Period of the playback progress ticker.
pub const PROGRESS_TICK: Duration = Duration::from_secs(1);
/// How often the device watcher re-reads the device list.
pub const DEVICE_POLL_INTERVAL: Duration = Duration::from_secs(3);
/// How long the CLI waits for a device before giving up.
pub const DEVICE_WAIT_TIMEOUT: Duration = Duration::from_secs(15);

/// Loads environment variables from a `.env` file in the local data directory.
///
/// Creates the directory structure if it doesn't exist and loads
/// variables from `weatherplay/.env` under the platform-specific local data
/// directory. A missing `.env` file is not an error: every value can also
/// come from the process environment.
///
/// # Directory Structure
///
/// - Linux: `~/.local/share/weatherplay/.env`
/// - macOS: `~/Library/Application Support/weatherplay/.env`
/// - Windows: `%LOCALAPPDATA%/weatherplay/.env`
///
/// # Errors
///
/// Returns an error if the parent directory cannot be created or the file
/// exists but cannot be parsed.
pub async fn load_env() -> Result<(), String> {
    let path = data_dir().join(".env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    if path.is_file() {
        dotenv::from_path(&path).map_err(|e| e.to_string())?;
    }
    Ok(())
}

/// Returns the application directory below the local data directory.
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("weatherplay");
    path
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn required(key: &str) -> Result<String, AppError> {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::Config(format!("{key} must be set")))
}

/// Returns the address the local OAuth callback server binds to.
///
/// Read from `SERVER_ADDRESS`, e.g. `127.0.0.1:8888`.
pub fn server_addr() -> String {
    var_or("SERVER_ADDRESS", DEFAULT_SERVER_ADDRESS)
}

/// Returns the address the proxy relay binds to (`PROXY_ADDRESS`).
pub fn proxy_addr() -> String {
    var_or("PROXY_ADDRESS", DEFAULT_PROXY_ADDRESS)
}

/// Returns the Spotify API client ID.
///
/// # Errors
///
/// Fails with [`AppError::Config`] if `SPOTIFY_CLIENT_ID` is not set.
pub fn spotify_client_id() -> Result<String, AppError> {
    required("SPOTIFY_CLIENT_ID")
}

/// Returns the Spotify API client secret.
///
/// Only the proxy relay needs it for the client-credentials exchange.
/// The secret should never be logged.
///
/// # Errors
///
/// Fails with [`AppError::Config`] if `SPOTIFY_CLIENT_SECRET` is not set.
pub fn spotify_client_secret() -> Result<String, AppError> {
    required("SPOTIFY_CLIENT_SECRET")
}

/// Returns the OAuth redirect URI registered with Spotify.
pub fn spotify_redirect_uri() -> String {
    var_or("SPOTIFY_REDIRECT_URI", DEFAULT_REDIRECT_URI)
}

/// Returns the space separated scopes requested during authorization.
pub fn spotify_scope() -> String {
    var_or("SPOTIFY_AUTH_SCOPE", DEFAULT_SCOPE)
}

/// Returns the Spotify authorize endpoint.
pub fn spotify_auth_url() -> String {
    var_or("SPOTIFY_AUTH_URL", DEFAULT_AUTH_URL)
}

/// Returns the Spotify token endpoint.
pub fn spotify_token_url() -> String {
    var_or("SPOTIFY_TOKEN_URL", DEFAULT_TOKEN_URL)
}

/// Returns the Spotify Web API base URL, e.g. `https://api.spotify.com/v1`.
pub fn spotify_api_url() -> String {
    var_or("SPOTIFY_API_URL", DEFAULT_API_URL)
}

/// Returns the Open-Meteo geocoding base URL.
pub fn geocoding_url() -> String {
    var_or("WEATHER_GEOCODING_URL", DEFAULT_GEOCODING_URL)
}

/// Returns the Open-Meteo forecast base URL.
pub fn forecast_url() -> String {
    var_or("WEATHER_FORECAST_URL", DEFAULT_FORECAST_URL)
}

/// Returns the proxy base URL playlists should be fetched through, if any.
pub fn playlist_proxy_url() -> Option<String> {
    env::var("WEATHERPLAY_PLAYLIST_PROXY")
        .ok()
        .filter(|v| !v.trim().is_empty())
}

/// Returns the name of the Spotify Connect device to play on, if pinned.
pub fn device_name() -> Option<String> {
    env::var("WEATHERPLAY_DEVICE_NAME")
        .ok()
        .filter(|v| !v.trim().is_empty())
}

/// Returns the track queued when a device never reports a loaded track.
pub fn fallback_track_uri() -> String {
    var_or("WEATHERPLAY_FALLBACK_TRACK", DEFAULT_FALLBACK_TRACK)
}

/// Returns the path of the optional playlist override file.
pub fn playlist_overrides_path() -> PathBuf {
    data_dir().join("playlists.json")
}

/// Returns the path of the persisted token.
pub fn token_path() -> PathBuf {
    data_dir().join("cache/token.json")
}
