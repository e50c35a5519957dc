//! Chunes server library
//!
//! Spotify catalog data merged with locally stored user ratings. The modules
//! are exposed for the binary and for the end-to-end tests.

pub mod aggregation;
pub mod auth;
pub mod catalog;
pub mod catalog_provider;
pub mod config;
pub mod rating_store;
pub mod server;
pub mod sqlite_persistence;

// Re-export commonly used types for convenience
pub use aggregation::CatalogRatingsService;
pub use catalog_provider::{CatalogProvider, InMemoryCatalogProvider, SpotifyClient};
pub use rating_store::{RatingStore, SqliteRatingStore};
pub use server::{run_server, RequestsLoggingLevel};
