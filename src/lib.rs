//! Weather Playlist Library
//!
//! This library looks up the current weather for a city, classifies the
//! weather code into a theme and plays the Spotify playlist mapped to that
//! code. It also contains the proxy relay that forwards Spotify Web API
//! requests so that client credentials never leave the server.
//!
//! # Modules
//!
//! - `api` - HTTP handlers for the auth callback and the proxy relay
//! - `cli` - Command-line interface implementations
//! - `config` - Configuration management and environment variables
//! - `controller` - Application state controller orchestrating all flows
//! - `error` - Error taxonomy shared by the library
//! - `management` - Persisted auth token handling
//! - `playback` - Readiness poller and progress ticker
//! - `server` - Local HTTP servers (auth callback and proxy)
//! - `spotify` - Spotify Web API client, playlist mapping and devices
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers
//! - `weather` - Open-Meteo client and weather classification
//!
//! # Example
//!
//! ```
//! use weatherplay::weather::theme::{classify, ThemeTag};
//!
//! assert_eq!(classify(95), ThemeTag::Stormy);
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod controller;
pub mod error;
pub mod management;
pub mod playback;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;
pub mod weather;

/// A convenient Result type alias for operations that may fail.
///
/// Used by the binary and the CLI layer, where errors from several
/// sources meet and are only ever printed. Library code returns
/// [`error::AppError`] instead.
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints an informational message with a blue bullet point.
///
/// # Example
///
/// ```
/// info!("Fetching weather for {}", city);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// This macro will cause the program to exit immediately after printing
/// the error message. It should only be used for fatal errors where
/// recovery is not possible.
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// Used for recoverable issues, e.g. when playback had to take the
/// fallback path or a cached token has expired.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
