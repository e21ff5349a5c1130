use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::json;
use tracing::debug;

use crate::{
    config,
    error::Result,
    spotify::playlist::check_playlist_id,
    types::{CurrentlyPlayingResponse, Device, DevicesResponse, PlayerState, Playlist},
    utils::ensure_success,
};

/// Spotify Web API calls the controller and the devices depend on.
///
/// Every call takes the bearer token explicitly; the client itself holds
/// no credentials.
#[async_trait]
pub trait MusicApi: Send + Sync {
    async fn get_playlist(&self, token: &str, playlist_id: &str) -> Result<Playlist>;

    async fn devices(&self, token: &str) -> Result<Vec<Device>>;

    /// Makes `device_id` the active device without starting playback.
    async fn transfer_playback(&self, token: &str, device_id: &str) -> Result<()>;

    /// Starts `context_uri` on the device, or resumes when `None`.
    async fn start_playback(
        &self,
        token: &str,
        device_id: &str,
        context_uri: Option<&str>,
    ) -> Result<()>;

    async fn pause_playback(&self, token: &str, device_id: &str) -> Result<()>;

    async fn next_track(&self, token: &str, device_id: Option<&str>) -> Result<()>;

    async fn previous_track(&self, token: &str, device_id: Option<&str>) -> Result<()>;

    /// Currently playing track, `None` when nothing is playing.
    async fn currently_playing(&self, token: &str) -> Result<Option<PlayerState>>;

    /// Full playback state including the active device.
    async fn playback_state(&self, token: &str) -> Result<Option<PlayerState>>;

    async fn save_tracks(&self, token: &str, track_ids: &[String]) -> Result<()>;

    async fn set_shuffle(&self, token: &str, enabled: bool, device_id: Option<&str>)
        -> Result<()>;

    async fn add_to_queue(&self, token: &str, uri: &str, device_id: Option<&str>) -> Result<()>;
}

/// HTTP client for the Spotify Web API.
#[derive(Debug, Clone)]
pub struct SpotifyClient {
    http: Client,
    api_url: String,
    playlist_proxy: Option<String>,
}

impl SpotifyClient {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            api_url: api_url.into().trim_end_matches('/').to_string(),
            playlist_proxy: None,
        }
    }

    /// Routes playlist lookups through a proxy relay at `proxy_url`.
    pub fn with_playlist_proxy(mut self, proxy_url: impl Into<String>) -> Self {
        self.playlist_proxy = Some(proxy_url.into().trim_end_matches('/').to_string());
        self
    }

    /// Client configured from the environment.
    pub fn from_env() -> Self {
        let client = Self::new(config::spotify_api_url());
        match config::playlist_proxy_url() {
            Some(proxy) => client.with_playlist_proxy(proxy),
            None => client,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    async fn put_empty(&self, token: &str, path: &str, query: &[(&str, &str)]) -> Result<()> {
        let response = self
            .http
            .put(self.url(path))
            .bearer_auth(token)
            .query(query)
            .header(reqwest::header::CONTENT_LENGTH, 0)
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn post_empty(&self, token: &str, path: &str, query: &[(&str, &str)]) -> Result<()> {
        let response = self
            .http
            .post(self.url(path))
            .bearer_auth(token)
            .query(query)
            .header(reqwest::header::CONTENT_LENGTH, 0)
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn get_player(&self, token: &str, path: &str) -> Result<Option<PlayerState>> {
        let response = self.http.get(self.url(path)).bearer_auth(token).send().await?;

        // 204 means there is no active playback at all
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let response = ensure_success(response).await?;
        let body = response.json::<CurrentlyPlayingResponse>().await?;
        Ok(Some(body.into()))
    }
}

fn device_query(device_id: Option<&str>) -> Vec<(&str, &str)> {
    device_id.map(|id| vec![("device_id", id)]).unwrap_or_default()
}

#[async_trait]
impl MusicApi for SpotifyClient {
    async fn get_playlist(&self, token: &str, playlist_id: &str) -> Result<Playlist> {
        check_playlist_id(playlist_id)?;
        let api_url = match &self.playlist_proxy {
            Some(proxy) => format!("{proxy}/spotify/playlist/{playlist_id}"),
            None => self.url(&format!("/playlists/{playlist_id}")),
        };
        debug!(playlist_id, %api_url, "fetching playlist");

        let response = self.http.get(&api_url).bearer_auth(token).send().await?;
        let response = ensure_success(response).await?;
        Ok(response.json::<Playlist>().await?)
    }

    async fn devices(&self, token: &str) -> Result<Vec<Device>> {
        let response = self
            .http
            .get(self.url("/me/player/devices"))
            .bearer_auth(token)
            .send()
            .await?;
        let response = ensure_success(response).await?;
        Ok(response.json::<DevicesResponse>().await?.devices)
    }

    async fn transfer_playback(&self, token: &str, device_id: &str) -> Result<()> {
        let response = self
            .http
            .put(self.url("/me/player"))
            .bearer_auth(token)
            .json(&json!({ "device_ids": [device_id], "play": false }))
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn start_playback(
        &self,
        token: &str,
        device_id: &str,
        context_uri: Option<&str>,
    ) -> Result<()> {
        let request = self
            .http
            .put(self.url("/me/player/play"))
            .bearer_auth(token)
            .query(&[("device_id", device_id)]);
        let request = match context_uri {
            Some(uri) => request.json(&json!({ "context_uri": uri })),
            None => request.header(reqwest::header::CONTENT_LENGTH, 0),
        };

        let response = request.send().await?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn pause_playback(&self, token: &str, device_id: &str) -> Result<()> {
        self.put_empty(token, "/me/player/pause", &[("device_id", device_id)])
            .await
    }

    async fn next_track(&self, token: &str, device_id: Option<&str>) -> Result<()> {
        self.post_empty(token, "/me/player/next", &device_query(device_id))
            .await
    }

    async fn previous_track(&self, token: &str, device_id: Option<&str>) -> Result<()> {
        self.post_empty(token, "/me/player/previous", &device_query(device_id))
            .await
    }

    async fn currently_playing(&self, token: &str) -> Result<Option<PlayerState>> {
        self.get_player(token, "/me/player/currently-playing").await
    }

    async fn playback_state(&self, token: &str) -> Result<Option<PlayerState>> {
        self.get_player(token, "/me/player").await
    }

    async fn save_tracks(&self, token: &str, track_ids: &[String]) -> Result<()> {
        let ids = track_ids.join(",");
        self.put_empty(token, "/me/tracks", &[("ids", ids.as_str())])
            .await
    }

    async fn set_shuffle(
        &self,
        token: &str,
        enabled: bool,
        device_id: Option<&str>,
    ) -> Result<()> {
        let mut query = vec![("state", if enabled { "true" } else { "false" })];
        query.extend(device_query(device_id));
        self.put_empty(token, "/me/player/shuffle", &query).await
    }

    async fn add_to_queue(&self, token: &str, uri: &str, device_id: Option<&str>) -> Result<()> {
        let mut query = vec![("uri", uri)];
        query.extend(device_query(device_id));
        self.post_empty(token, "/me/player/queue", &query).await
    }
}
