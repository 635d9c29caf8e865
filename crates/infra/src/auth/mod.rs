//! OAuth2 token exchange and refresh

pub mod refresh;

pub use refresh::OAuthRefreshClient;
