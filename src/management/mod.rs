mod auth;

pub use auth::Session;
pub use auth::TokenStore;
