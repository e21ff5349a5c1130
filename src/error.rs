//! Error types for weatherplay.

use thiserror::Error;

/// Result type used throughout the library.
pub type Result<T> = std::result::Result<T, AppError>;

/// Everything that can go wrong in a weatherplay operation.
///
/// Failures are terminal for the operation that produced them but never
/// for the process; the controller records them and stays usable.
#[derive(Error, Debug)]
pub enum AppError {
    /// Invalid user input, rejected before any network call
    #[error("{0}")]
    Validation(String),

    /// Geocoding returned no results for the city
    #[error("City not found")]
    CityNotFound,

    /// No usable Spotify access token is available
    #[error("Spotify token is missing")]
    MissingToken,

    /// Token, device or playlist is not available yet
    #[error("Spotify is not ready yet.")]
    NotReady,

    /// No playback device is attached to the controller
    #[error("Spotify Player is not initialized yet.")]
    NoPlayer,

    /// Network or decoding failure from reqwest
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream answered with a non-success status
    #[error("Upstream error: {status} - {body}")]
    Upstream { status: u16, body: String },

    /// I/O failure, e.g. while persisting the token
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failure
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Missing or malformed configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// OAuth flow failure
    #[error("Authentication error: {0}")]
    Auth(String),
}

/// Which call failed, used to pick a short user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Weather,
    Playlist,
    Playback,
    Pause,
    SaveTrack,
    Other,
}

impl AppError {
    /// Message suitable for showing to the user.
    ///
    /// Transport and upstream failures are collapsed to a short message
    /// naming the failed operation; everything else uses its `Display`.
    pub fn friendly_message(&self, op: Operation) -> String {
        match self {
            AppError::Http(_) | AppError::Upstream { .. } => match op {
                Operation::Weather => "Failed to fetch weather data.".to_string(),
                Operation::Playlist => "Failed to fetch playlist.".to_string(),
                Operation::Playback => "Could not start playback.".to_string(),
                Operation::Pause => "Could not pause playback.".to_string(),
                Operation::SaveTrack => "Could not save track.".to_string(),
                Operation::Other => "Something went wrong. Please try again later.".to_string(),
            },
            other => other.to_string(),
        }
    }
}
