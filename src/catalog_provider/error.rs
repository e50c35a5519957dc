use thiserror::Error;

/// Failure reported by the catalog provider.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum CatalogError {
    #[error("Catalog item not found")]
    NotFound,

    #[error("Rate limited by the catalog provider (retry after {retry_after:?})")]
    RateLimited { retry_after: Option<String> },

    #[error("Catalog provider responded {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Catalog provider unreachable: {0}")]
    Transport(String),

    #[error("Unexpected catalog provider response: {0}")]
    Decode(String),
}

impl CatalogError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, CatalogError::NotFound)
    }
}
