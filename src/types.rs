use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// A Spotify access token together with its absolute expiry.
///
/// Serialized with the two storage keys the client has always used, so a
/// token file is a flat JSON object `{spotify_token, spotify_token_expiry}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthToken {
    #[serde(rename = "spotify_token")]
    pub access_token: String,
    /// Expiry as epoch milliseconds.
    #[serde(rename = "spotify_token_expiry")]
    pub expires_at: i64,
}

impl AuthToken {
    pub fn new(access_token: impl Into<String>, expires_at: i64) -> Self {
        Self {
            access_token: access_token.into(),
            expires_at,
        }
    }

    /// Builds a token that expires `expires_in` seconds after `now_ms`.
    ///
    /// Lifetimes too large to represent saturate at `i64::MAX`.
    pub fn expiring_in(access_token: impl Into<String>, expires_in: u64, now_ms: i64) -> Self {
        let expires_at = i64::try_from(expires_in)
            .ok()
            .and_then(|secs| secs.checked_mul(1000))
            .and_then(|ms| now_ms.checked_add(ms))
            .unwrap_or(i64::MAX);
        Self::new(access_token, expires_at)
    }

    pub fn is_expired(&self, now_ms: i64) -> bool {
        now_ms >= self.expires_at
    }
}

/// State shared between the auth flow and the callback handler.
#[derive(Debug, Clone)]
pub struct PendingAuth {
    /// Random value echoed back by Spotify to bind the redirect to this run.
    pub state: String,
    pub token: Option<AuthToken>,
}

/// Response of the client-credentials token endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientCredentialsToken {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingResponse {
    #[serde(default)]
    pub results: Option<Vec<GeoLocation>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub name: String,
    #[serde(default)]
    pub country: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastResponse {
    pub current_weather: CurrentWeather,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub temperature: f64,
    pub weathercode: i64,
}

/// Geocoded city together with its current weather.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport {
    pub location: GeoLocation,
    pub current: CurrentWeather,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExternalUrls {
    #[serde(default)]
    pub spotify: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    pub uri: String,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub external_urls: ExternalUrls,
    #[serde(default)]
    pub tracks: Option<PlaylistTracks>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistTracks {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub items: Vec<PlaylistItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistItem {
    pub track: Option<Track>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: Option<String>,
    pub name: String,
    pub uri: String,
    #[serde(default)]
    pub duration_ms: u64,
    #[serde(default)]
    pub artists: Vec<TrackArtist>,
}

impl Track {
    /// Comma separated artist names.
    pub fn artist_names(&self) -> String {
        self.artists
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackArtist {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(rename = "type", default)]
    pub kind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DevicesResponse {
    pub devices: Vec<Device>,
}

/// Body of `GET /me/player` and `GET /me/player/currently-playing`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentlyPlayingResponse {
    #[serde(default)]
    pub device: Option<Device>,
    #[serde(default)]
    pub is_playing: bool,
    #[serde(default)]
    pub progress_ms: Option<u64>,
    #[serde(default)]
    pub item: Option<Track>,
}

/// Snapshot reported by a playback device.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerState {
    pub device_id: Option<String>,
    pub is_playing: bool,
    pub track: Option<Track>,
    pub progress_ms: u64,
    pub duration_ms: u64,
}

impl PlayerState {
    pub fn has_track(&self) -> bool {
        self.track.is_some()
    }
}

impl From<CurrentlyPlayingResponse> for PlayerState {
    fn from(res: CurrentlyPlayingResponse) -> Self {
        let duration_ms = res.item.as_ref().map_or(0, |t| t.duration_ms);
        PlayerState {
            device_id: res.device.and_then(|d| d.id),
            is_playing: res.is_playing,
            track: res.item,
            progress_ms: res.progress_ms.unwrap_or(0),
            duration_ms,
        }
    }
}

/// Playback state owned by the controller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaybackState {
    pub device_id: Option<String>,
    pub is_playing: bool,
    pub current_track: Option<Track>,
    pub track_progress: u64,
    pub track_duration: u64,
}

/// Readiness notifications of a playback device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceEvent {
    Ready { device_id: String },
    NotReady { device_id: String },
}

#[derive(Tabled)]
pub struct ThemeTableRow {
    pub code: i64,
    pub theme: String,
    pub playlist: String,
}

#[derive(Tabled)]
pub struct TrackTableRow {
    pub name: String,
    pub artists: String,
    pub duration: String,
}
