mod claims;
mod error;
mod login;
mod spotify_auth;
mod token;

pub use claims::SessionClaims;
pub use error::AuthError;
pub use login::{login, LoginRequest, LoginResponse};
pub use spotify_auth::{
    LoginParams, SpotifyAuthClient, TokenResponse, DEFAULT_SPOTIFY_ACCOUNTS_URL, LOGIN_SCOPE,
};
pub use token::TokenSigner;
