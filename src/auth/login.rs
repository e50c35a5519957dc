use serde::{Deserialize, Serialize};
use tracing::info;

use super::claims::SessionClaims;
use super::error::AuthError;
use super::spotify_auth::SpotifyAuthClient;
use super::token::TokenSigner;
use crate::aggregation::CatalogRatingsService;
use crate::rating_store::UserProfile;

#[derive(Clone, Debug, Deserialize)]
pub struct LoginRequest {
    pub code: String,
    pub redirect_uri: String,
    #[serde(default)]
    pub state: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[serde(rename = "auth_token")]
    pub auth_token: String,
    pub profile_url: Option<String>,
    pub user_id: String,
    pub display_name: String,
    pub expires_at: i64,
}

/// Completes a login: the callback state must match the one handed out with the
/// authorization URL.
pub async fn login(
    auth_client: &SpotifyAuthClient,
    service: &CatalogRatingsService,
    signer: &TokenSigner,
    request: &LoginRequest,
    expected_state: Option<&str>,
) -> Result<LoginResponse, AuthError> {
    match (request.state.as_deref(), expected_state) {
        (Some(state), Some(expected)) if state == expected => {}
        _ => return Err(AuthError::StateMismatch),
    }

    let token = auth_client
        .exchange_code(&request.code, &request.redirect_uri)
        .await?;
    let user = service.catalog().current_user(&token.access_token).await?;
    let display_name = user.display_name.clone().unwrap_or_else(|| user.id.clone());

    service.remember_user(&UserProfile {
        id: user.id.clone(),
        name: display_name.clone(),
        avatar_url: user.image_url.clone(),
    })?;

    let claims = SessionClaims {
        access_token: token.access_token,
        user_id: user.id.clone(),
        user_name: display_name.clone(),
        profile_url: user.image_url.clone(),
        exp: signer.expiry_from_now(),
    };
    let auth_token = signer.sign(&claims)?;
    info!("User {} logged in", user.id);

    Ok(LoginResponse {
        auth_token,
        profile_url: user.image_url,
        user_id: user.id,
        display_name,
        expires_at: claims.exp,
    })
}
