//! # Spotify Integration Module
//!
//! This module is the integration layer between weatherplay and Spotify.
//! It covers authentication, the Web API player endpoints, the weather code
//! to playlist mapping and the playback devices the controller drives.
//!
//! ## Architecture
//!
//! ```text
//! Application Layer (CLI, Controller)
//!          ↓
//! Spotify Integration Layer
//!     ├── Authentication (OAuth implicit grant, client credentials)
//!     ├── Player (playlists, devices, playback control, library)
//!     ├── Playlist mapping (weather code → playlist ID)
//!     └── Devices (Spotify Connect device + readiness watcher)
//!          ↓
//! HTTP Layer (reqwest, JSON)
//!          ↓
//! Spotify Web API
//! ```
//!
//! ## Core Modules
//!
//! ### Authentication Module
//!
//! [`auth`] - Runs the OAuth implicit grant through a local callback
//! server, parses redirect fragments into tokens and performs the
//! client-credentials exchange used by the proxy relay.
//!
//! ### Player Module
//!
//! [`player`] - The [`player::MusicApi`] trait and its HTTP implementation
//! [`player::SpotifyClient`]:
//! - `GET /playlists/{id}` (optionally through the proxy relay)
//! - `GET /me/player/devices`, `PUT /me/player` (device activation)
//! - `PUT /me/player/play`, `PUT /me/player/pause`
//! - `POST /me/player/next`, `POST /me/player/previous`
//! - `GET /me/player/currently-playing`, `GET /me/player`
//! - `PUT /me/tracks`, `PUT /me/player/shuffle`, `POST /me/player/queue`
//!
//! ### Playlist Module
//!
//! [`playlist`] - The static weather code table, the fallback playlist and
//! [`playlist::resolve_playlist`].
//!
//! ### Device Module
//!
//! [`device`] - The [`device::PlaybackDevice`] trait and
//! [`device::ConnectDevice`], which announces readiness changes as
//! [`crate::types::DeviceEvent`]s on a channel.
//!
//! ## Error Types
//!
//! All functions return [`crate::error::Result`]. Non-2xx responses become
//! [`crate::error::AppError::Upstream`] carrying status and body; transport
//! failures become [`crate::error::AppError::Http`]. No call is retried
//! here; retry policy belongs to the controller.

pub mod auth;
pub mod device;
pub mod player;
pub mod playlist;
