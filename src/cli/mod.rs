//! # CLI Module
//!
//! This module provides the command-line interface layer for weatherplay.
//! It implements all user-facing commands and coordinates between the
//! controller, the Spotify and weather clients and user interaction.
//!
//! ## Command Categories
//!
//! ### Authentication
//!
//! - [`auth`] - Runs the Spotify OAuth redirect flow, or reads the token from
//!   a pasted redirect URL
//!
//! ### Weather
//!
//! - [`weather`] - Shows the current weather of a city and its playlist
//! - [`themes`] - Lists the weather code to theme and playlist mapping
//!
//! ### Playback
//!
//! - [`play`] - Plays the playlist matching a city's weather and follows the
//!   track progress until Ctrl-C
//! - [`pause`], [`resume`], [`next`], [`previous`], [`shuffle`] - Player
//!   controls on the selected device
//! - [`save`] - Saves the playing track to the library
//! - [`now_playing`] - Shows the playing track
//!
//! ### Relay
//!
//! - [`proxy`] - Runs the proxy relay server
//!
//! ## Usage Patterns
//!
//! ```bash
//! weatherplay auth                 # Authenticate with Spotify
//! weatherplay weather Berlin       # Check the weather theme
//! weatherplay play Berlin          # Play the matching playlist
//! weatherplay save                 # Keep the current track
//! ```
//!
//! Commands print through the crate's `info!`, `success!`, `warning!` and
//! `error!` macros. `error!` exits the process, so command functions
//! return nothing.

mod auth;
mod context;
mod control;
mod play;
mod proxy;
mod themes;
mod weather;

pub use auth::auth;
pub use control::{next, now_playing, pause, previous, resume, save, shuffle};
pub use play::play;
pub use proxy::proxy;
pub use themes::themes;
pub use weather::weather;
