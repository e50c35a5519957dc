use thiserror::Error;

use crate::aggregation::AggregationError;
use crate::catalog_provider::CatalogError;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("state mismatch")]
    StateMismatch,

    #[error("Spotify authorization failed: {0}")]
    Provider(#[from] CatalogError),

    #[error("Session token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error(transparent)]
    Aggregation(#[from] AggregationError),
}
