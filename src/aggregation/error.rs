use serde::Serialize;
use thiserror::Error;

use crate::catalog_provider::CatalogError;
use crate::rating_store::StoreError;

/// Failure of an aggregation workflow.
#[derive(Debug, Error)]
pub enum AggregationError {
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Rating store error: {0}")]
    RatingStore(#[from] StoreError),
}

/// Collaborator a failure came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorOrigin {
    Catalog,
    RatingStore,
}

/// Client facing description of a failed workflow.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetail {
    pub source: ErrorOrigin,
    /// HTTP status the failure maps to.
    pub status: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<String>,
}

impl AggregationError {
    pub fn origin(&self) -> ErrorOrigin {
        match self {
            AggregationError::Catalog(_) => ErrorOrigin::Catalog,
            AggregationError::RatingStore(_) => ErrorOrigin::RatingStore,
        }
    }

    pub fn detail(&self) -> ErrorDetail {
        let (status, message, retry_after) = match self {
            AggregationError::Catalog(err) => match err {
                CatalogError::NotFound => (404, err.to_string(), None),
                CatalogError::RateLimited { retry_after } => {
                    (429, err.to_string(), retry_after.clone())
                }
                CatalogError::Status { status, message } => (*status, message.clone(), None),
                CatalogError::Transport(_) | CatalogError::Decode(_) => (502, err.to_string(), None),
            },
            AggregationError::RatingStore(err) => (500, err.to_string(), None),
        };
        ErrorDetail {
            source: self.origin(),
            status,
            message,
            retry_after,
        }
    }
}

/// Uniform workflow outcome handed to the HTTP layer.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    pub succeeded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<ErrorDetail>,
}

impl<T> From<Result<T, AggregationError>> for Envelope<T> {
    fn from(result: Result<T, AggregationError>) -> Self {
        match result {
            Ok(payload) => Envelope {
                succeeded: true,
                payload: Some(payload),
                error_detail: None,
            },
            Err(err) => Envelope {
                succeeded: false,
                payload: None,
                error_detail: Some(err.detail()),
            },
        }
    }
}
