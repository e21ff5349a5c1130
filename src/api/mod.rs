//! # API Module
//!
//! HTTP handlers served by the two local servers of weatherplay.
//!
//! ## Endpoints
//!
//! ### Authentication
//!
//! - [`callback`] - Page served at the OAuth redirect URI. The implicit grant
//!   delivers the token in the URL fragment, so the page forwards the
//!   fragment to [`callback_token`] and scrubs it from the address bar.
//! - [`callback_token`] - Validates the `state` and stores the token for the
//!   waiting auth flow.
//!
//! ### Proxy relay
//!
//! - [`proxy::playlist`] - `GET /spotify/playlist/{id}`, forwards the
//!   caller's bearer token to the Spotify playlist endpoint.
//! - [`proxy::token`] - `POST /api/token`, client-credentials exchange so
//!   the client secret never leaves the server.
//!
//! ### Monitoring
//!
//! - [`health`] - Returns application status and version information.
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use axum::{Router, routing::get};
//! use weatherplay::api::{callback, health};
//!
//! let app = Router::new()
//!     .route("/callback", get(callback))
//!     .route("/health", get(health));
//! ```

mod callback;
mod health;
pub mod proxy;

pub use callback::{callback, callback_token};
pub use health::health;
