use super::state::ServerState;
use crate::aggregation::UserContext;
use crate::auth::SessionClaims;

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::debug;

/// Verified session of the requesting user.
#[derive(Debug)]
pub struct Session {
    pub claims: SessionClaims,
}

impl Session {
    pub fn user(&self) -> UserContext {
        self.claims.user_context()
    }
}

#[derive(Debug, PartialEq)]
pub enum SessionExtractionError {
    NoAuthorizationHeader,
    WrongAuthorizationHeader,
    TokenNotVerified,
}

impl SessionExtractionError {
    fn message(&self) -> &'static str {
        match self {
            SessionExtractionError::NoAuthorizationHeader => "no authorization header",
            SessionExtractionError::WrongAuthorizationHeader => "wrong authorization header",
            SessionExtractionError::TokenNotVerified => "token cannot be verified",
        }
    }
}

impl IntoResponse for SessionExtractionError {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": self.message() })),
        )
            .into_response()
    }
}

/// Token of an `Authorization: Bearer <token>` header.
fn extract_bearer_token(parts: &Parts) -> Result<&str, SessionExtractionError> {
    let value = parts
        .headers
        .get(header::AUTHORIZATION)
        .ok_or(SessionExtractionError::NoAuthorizationHeader)?
        .to_str()
        .map_err(|_| SessionExtractionError::WrongAuthorizationHeader)?;

    let mut split = value.split(' ');
    match (split.next(), split.next(), split.next()) {
        (Some("Bearer"), Some(token), None) if !token.is_empty() => Ok(token),
        _ => Err(SessionExtractionError::WrongAuthorizationHeader),
    }
}

impl FromRequestParts<ServerState> for Session {
    type Rejection = SessionExtractionError;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(parts)?;
        match ctx.token_signer.verify(token) {
            Ok(claims) => Ok(Session { claims }),
            Err(err) => {
                debug!("Rejected session token: {}", err);
                Err(SessionExtractionError::TokenNotVerified)
            }
        }
    }
}
