//! Weather code to playlist mapping, with optional JSON overrides.

use std::{collections::HashMap, path::Path};

use serde_json::Value;

use crate::error::{AppError, Result};

/// Playlist played when a weather code has no usable mapping.
pub const DEFAULT_PLAYLIST_ID: &str = "37i9dQZF1DX0h0QnLkMBl4";

/// Shortest string accepted as a Spotify playlist ID.
pub const MIN_PLAYLIST_ID_LEN: usize = 10;

/// Built-in weather code to playlist mapping.
pub const WEATHER_PLAYLISTS: &[(i64, &str)] = &[
    (0, "6MWC5kNNDoKJJJx5HlpNjF"),   // sunny day
    (1, "3dGQU3goyFRmETtgxLax4Vx"),  // chill & groove
    (2, "3dGQU3goyFRmETtgxLax4Vx"),  // chill & groove
    (3, "3dGQU3goyFRmETtgxLax4V"),   // lo-fi chill
    (45, "3dGQU3goyFRmETtgxLax4V"),  // misty ambience
    (51, "41RUHgoROnaeyXk65cbRFI"),  // rainy day
    (61, "41RUHgoROnaeyXk65cbRFI"),  // rainy mood
    (71, "5Mc3DhxT4i5ma3xNWhzITr"),  // winter
    (80, "41RUHgoROnaeyXk65cbRFI"),  // light showers
    (95, "59ZYAP4IaizWIk5SOt2RFx"),  // stormy nights
];

/// Mapping from weather code to playlist ID.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaylistTable {
    entries: HashMap<i64, String>,
}

impl PlaylistTable {
    pub fn new(entries: HashMap<i64, String>) -> Self {
        Self { entries }
    }

    /// The built-in [`WEATHER_PLAYLISTS`] table.
    pub fn builtin() -> Self {
        Self::new(
            WEATHER_PLAYLISTS
                .iter()
                .map(|(code, id)| (*code, id.to_string()))
                .collect(),
        )
    }

    /// Built-in table with the entries of a JSON override file merged over it.
    ///
    /// The file maps weather codes to playlist IDs, e.g. `{"95": "..."}`.
    /// A missing file yields the built-in table. Keys that are not integers
    /// and values that are not strings are skipped.
    pub async fn load_overrides(path: &Path) -> Result<Self> {
        let mut table = Self::builtin();
        if !path.is_file() {
            return Ok(table);
        }

        let content = async_fs::read_to_string(path).await?;
        let raw: HashMap<String, Value> = serde_json::from_str(&content)?;
        for (key, value) in raw {
            let Ok(code) = key.trim().parse::<i64>() else {
                tracing::warn!(key, "ignoring non-numeric weather code in playlist overrides");
                continue;
            };
            match value {
                Value::String(id) => {
                    table.entries.insert(code, id);
                }
                other => {
                    tracing::warn!(code, value = %other, "ignoring non-string playlist id");
                }
            }
        }
        Ok(table)
    }

    pub fn get(&self, code: i64) -> Option<&str> {
        self.entries.get(&code).map(String::as_str)
    }

    pub fn insert(&mut self, code: i64, playlist_id: impl Into<String>) {
        self.entries.insert(code, playlist_id.into());
    }

    /// Codes in ascending order.
    pub fn codes(&self) -> Vec<i64> {
        let mut codes: Vec<i64> = self.entries.keys().copied().collect();
        codes.sort_unstable();
        codes
    }
}

/// Returns the playlist mapped to `code`, or `fallback` when the code is
/// unmapped or its ID is shorter than [`MIN_PLAYLIST_ID_LEN`].
pub fn resolve_playlist(code: i64, table: &PlaylistTable, fallback: &str) -> String {
    match table.get(code) {
        Some(id) if is_valid_playlist_id(id) => id.to_string(),
        _ => fallback.to_string(),
    }
}

pub fn is_valid_playlist_id(id: &str) -> bool {
    id.chars().count() >= MIN_PLAYLIST_ID_LEN
}

/// Spotify context URI for a playlist ID.
pub fn playlist_uri(playlist_id: &str) -> String {
    format!("spotify:playlist:{playlist_id}")
}

/// Rejects IDs that would break out of the `/playlists/{id}` path segment.
pub fn check_playlist_id(playlist_id: &str) -> Result<()> {
    if playlist_id.is_empty() || !playlist_id.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(AppError::Validation(format!(
            "Invalid playlist id: {playlist_id}"
        )));
    }
    Ok(())
}
