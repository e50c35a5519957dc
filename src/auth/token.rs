use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use super::claims::SessionClaims;

/// Signs and verifies HS256 session tokens.
#[derive(Clone)]
pub struct TokenSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_sec: u64,
}

impl TokenSigner {
    pub fn new(secret: &str, ttl_sec: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl_sec,
        }
    }

    pub fn ttl_sec(&self) -> u64 {
        self.ttl_sec
    }

    /// Expiry timestamp for a token issued now.
    pub fn expiry_from_now(&self) -> i64 {
        chrono::Utc::now().timestamp() + self.ttl_sec as i64
    }

    pub fn sign(&self, claims: &SessionClaims) -> Result<String, jsonwebtoken::errors::Error> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
    }

    /// Checks signature and expiry.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, jsonwebtoken::errors::Error> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<SessionClaims>(token, &self.decoding_key, &validation).map(|data| data.claims)
    }
}
