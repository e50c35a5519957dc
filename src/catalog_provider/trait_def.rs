//! CatalogProvider trait definition.

use async_trait::async_trait;
use serde::Serialize;

use super::error::CatalogError;
use crate::catalog::{Album, Artist, Item, ItemKind, Track};

/// Maximum number of ids the provider accepts in a single multi-item fetch.
pub const MAX_IDS_PER_REQUEST: usize = 20;

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SearchResults {
    pub albums: Vec<Album>,
    pub tracks: Vec<Track>,
}

/// Profile of the user owning a provider access token.
#[derive(Clone, Debug, PartialEq)]
pub struct ProviderUser {
    pub id: String,
    pub display_name: Option<String>,
    pub image_url: Option<String>,
}

/// External music catalog.
///
/// Every call is made on behalf of a user and authenticated with that
/// user's provider access token.
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Fetches a single item.
    async fn fetch_one(&self, token: &str, kind: ItemKind, id: &str) -> Result<Item, CatalogError>;

    /// Fetches up to [`MAX_IDS_PER_REQUEST`] items of the same kind.
    async fn fetch_many(
        &self,
        token: &str,
        kind: ItemKind,
        ids: &[String],
    ) -> Result<Vec<Item>, CatalogError>;

    async fn search(
        &self,
        token: &str,
        query: &str,
        limit: usize,
    ) -> Result<SearchResults, CatalogError>;

    /// The user's most listened artists.
    async fn top_artists(&self, token: &str, limit: usize) -> Result<Vec<Artist>, CatalogError>;

    /// Tracks recommended from the given seed artists.
    async fn recommendations(
        &self,
        token: &str,
        seed_artist_ids: &[String],
        limit: usize,
    ) -> Result<Vec<Track>, CatalogError>;

    /// The user's most listened tracks over the short term.
    async fn top_tracks(&self, token: &str, limit: usize) -> Result<Vec<Track>, CatalogError>;

    async fn new_releases(&self, token: &str) -> Result<Vec<Album>, CatalogError>;

    async fn current_user(&self, token: &str) -> Result<ProviderUser, CatalogError>;
}
