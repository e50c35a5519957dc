//! Spotify authorization code flow.

use rand::distr::Alphanumeric;
use rand::Rng;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::catalog_provider::{error_for_response, CatalogError};

pub const DEFAULT_SPOTIFY_ACCOUNTS_URL: &str = "https://accounts.spotify.com";
pub const LOGIN_SCOPE: &str = "user-top-read";
pub const STATE_LENGTH: usize = 16;

/// Authorization URL plus the state value the callback must echo back.
#[derive(Clone, Debug, PartialEq)]
pub struct LoginParams {
    pub auth_url: String,
    pub state: String,
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

fn generate_state() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(STATE_LENGTH)
        .map(char::from)
        .collect()
}

pub struct SpotifyAuthClient {
    client: reqwest::Client,
    accounts_url: String,
    client_id: String,
    client_secret: String,
}

impl SpotifyAuthClient {
    pub fn new(
        accounts_url: &str,
        client_id: String,
        client_secret: String,
        timeout_sec: u64,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_sec))
            .build()?;

        Ok(Self {
            client,
            accounts_url: accounts_url.trim_end_matches('/').to_string(),
            client_id,
            client_secret,
        })
    }

    pub fn login_params(&self, redirect_uri: &str) -> anyhow::Result<LoginParams> {
        let state = generate_state();
        let auth_url = reqwest::Url::parse_with_params(
            &format!("{}/authorize", self.accounts_url),
            &[
                ("response_type", "code"),
                ("client_id", self.client_id.as_str()),
                ("scope", LOGIN_SCOPE),
                ("redirect_uri", redirect_uri),
                ("state", state.as_str()),
            ],
        )?;

        Ok(LoginParams {
            auth_url: auth_url.into(),
            state,
        })
    }

    /// Trades an authorization code for an access token.
    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<TokenResponse, CatalogError> {
        let url = format!("{}/api/token", self.accounts_url);
        debug!("Exchanging authorization code at {}", url);
        let response = self
            .client
            .post(&url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[
                ("code", code),
                ("redirect_uri", redirect_uri),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|err| CatalogError::Transport(err.to_string()))?;
        let response = error_for_response(response).await?;

        response
            .json()
            .await
            .map_err(|err| CatalogError::Decode(err.to_string()))
    }
}
