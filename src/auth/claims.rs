use serde::{Deserialize, Serialize};

use crate::aggregation::UserContext;

/// Payload of the session token handed to clients after login.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionClaims {
    /// Spotify access token, used for every catalog call of the session.
    #[serde(rename = "access_token")]
    pub access_token: String,
    pub user_id: String,
    pub user_name: String,
    #[serde(default)]
    pub profile_url: Option<String>,
    /// Expiry as seconds since the epoch.
    pub exp: i64,
}

impl SessionClaims {
    pub fn user_context(&self) -> UserContext {
        UserContext {
            user_id: self.user_id.clone(),
            user_name: self.user_name.clone(),
            profile_url: self.profile_url.clone(),
            access_token: self.access_token.clone(),
        }
    }
}
