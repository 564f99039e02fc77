//! Spotify Web API client

mod client;
mod http_client;
mod token;

pub use client::{SpotifyClient, SpotifyClientConfig, DEFAULT_API_BASE_URL, DEFAULT_TOKEN_URL};
pub use http_client::{HttpClient, HttpClientTrait};
pub use token::{AccessToken, ClientCredentials, TokenResponse};

#[cfg(test)]
pub use http_client::mock;
