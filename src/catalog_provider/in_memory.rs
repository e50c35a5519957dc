//! Catalog provider backed by in-process maps.
//!
//! Used to run the server without network access and as the provider double
//! in tests. Every call is recorded so callers can assert on request shapes.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::error::CatalogError;
use super::trait_def::{CatalogProvider, ProviderUser, SearchResults};
use crate::catalog::{Album, Artist, Item, ItemKind, Track};

#[derive(Clone, Debug, PartialEq)]
pub enum ProviderCall {
    FetchOne { kind: ItemKind, id: String },
    FetchMany { kind: ItemKind, ids: Vec<String> },
    Search { query: String, limit: usize },
    TopArtists { limit: usize },
    Recommendations { seed_artist_ids: Vec<String>, limit: usize },
    TopTracks { limit: usize },
    NewReleases,
    CurrentUser,
}

#[derive(Default)]
pub struct InMemoryCatalogProvider {
    albums: Mutex<HashMap<String, Album>>,
    tracks: Mutex<HashMap<String, Track>>,
    top_artists: Mutex<Vec<Artist>>,
    recommendations: Mutex<Vec<Track>>,
    top_tracks: Mutex<Vec<Track>>,
    new_releases: Mutex<Vec<Album>>,
    users: Mutex<HashMap<String, ProviderUser>>,
    failures: Mutex<HashMap<String, CatalogError>>,
    calls: Mutex<Vec<ProviderCall>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl InMemoryCatalogProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_album(&self, album: Album) {
        lock(&self.albums).insert(album.id.clone(), album);
    }

    pub fn add_track(&self, track: Track) {
        lock(&self.tracks).insert(track.id.clone(), track);
    }

    pub fn set_top_artists(&self, artists: Vec<Artist>) {
        *lock(&self.top_artists) = artists;
    }

    pub fn set_recommendations(&self, tracks: Vec<Track>) {
        *lock(&self.recommendations) = tracks;
    }

    pub fn set_top_tracks(&self, tracks: Vec<Track>) {
        *lock(&self.top_tracks) = tracks;
    }

    pub fn set_new_releases(&self, albums: Vec<Album>) {
        *lock(&self.new_releases) = albums;
    }

    /// Registers the profile returned for `token`.
    pub fn add_user(&self, token: &str, user: ProviderUser) {
        lock(&self.users).insert(token.to_string(), user);
    }

    /// Any fetch touching `id` fails with `error`.
    pub fn fail_on(&self, id: &str, error: CatalogError) {
        lock(&self.failures).insert(id.to_string(), error);
    }

    pub fn calls(&self) -> Vec<ProviderCall> {
        lock(&self.calls).clone()
    }

    pub fn clear_calls(&self) {
        lock(&self.calls).clear();
    }

    fn record(&self, call: ProviderCall) {
        lock(&self.calls).push(call);
    }

    fn check_failures<'a>(&self, ids: impl IntoIterator<Item = &'a str>) -> Result<(), CatalogError> {
        let failures = lock(&self.failures);
        for id in ids {
            if let Some(error) = failures.get(id) {
                return Err(error.clone());
            }
        }
        Ok(())
    }

    fn lookup(&self, kind: ItemKind, id: &str) -> Option<Item> {
        match kind {
            ItemKind::Album => lock(&self.albums).get(id).cloned().map(Item::from),
            ItemKind::Track => lock(&self.tracks).get(id).cloned().map(Item::from),
        }
    }
}

#[async_trait]
impl CatalogProvider for InMemoryCatalogProvider {
    async fn fetch_one(&self, _token: &str, kind: ItemKind, id: &str) -> Result<Item, CatalogError> {
        self.record(ProviderCall::FetchOne {
            kind,
            id: id.to_string(),
        });
        self.check_failures([id])?;
        self.lookup(kind, id).ok_or(CatalogError::NotFound)
    }

    /// A batch where none of the ids resolve is reported as not found.
    async fn fetch_many(
        &self,
        _token: &str,
        kind: ItemKind,
        ids: &[String],
    ) -> Result<Vec<Item>, CatalogError> {
        self.record(ProviderCall::FetchMany {
            kind,
            ids: ids.to_vec(),
        });
        self.check_failures(ids.iter().map(String::as_str))?;
        let items: Vec<Item> = ids.iter().filter_map(|id| self.lookup(kind, id)).collect();
        if items.is_empty() {
            return Err(CatalogError::NotFound);
        }
        Ok(items)
    }

    async fn search(
        &self,
        _token: &str,
        query: &str,
        limit: usize,
    ) -> Result<SearchResults, CatalogError> {
        self.record(ProviderCall::Search {
            query: query.to_string(),
            limit,
        });
        let needle = query.to_lowercase();
        let matches = |name: &str| name.to_lowercase().contains(&needle);

        let mut albums: Vec<Album> = lock(&self.albums)
            .values()
            .filter(|album| matches(&album.name))
            .cloned()
            .collect();
        let mut tracks: Vec<Track> = lock(&self.tracks)
            .values()
            .filter(|track| matches(&track.name))
            .cloned()
            .collect();
        albums.sort_by(|a, b| a.id.cmp(&b.id));
        tracks.sort_by(|a, b| a.id.cmp(&b.id));
        albums.truncate(limit);
        tracks.truncate(limit);

        Ok(SearchResults { albums, tracks })
    }

    async fn top_artists(&self, _token: &str, limit: usize) -> Result<Vec<Artist>, CatalogError> {
        self.record(ProviderCall::TopArtists { limit });
        Ok(lock(&self.top_artists).iter().take(limit).cloned().collect())
    }

    /// Returns the configured tracks sharing an artist with the seeds.
    async fn recommendations(
        &self,
        _token: &str,
        seed_artist_ids: &[String],
        limit: usize,
    ) -> Result<Vec<Track>, CatalogError> {
        self.record(ProviderCall::Recommendations {
            seed_artist_ids: seed_artist_ids.to_vec(),
            limit,
        });
        let seeds: HashSet<&str> = seed_artist_ids.iter().map(String::as_str).collect();
        Ok(lock(&self.recommendations)
            .iter()
            .filter(|track| {
                track.artists.is_empty()
                    || track
                        .artists
                        .iter()
                        .any(|artist| seeds.contains(artist.id.as_str()))
            })
            .take(limit)
            .cloned()
            .collect())
    }

    async fn top_tracks(&self, _token: &str, limit: usize) -> Result<Vec<Track>, CatalogError> {
        self.record(ProviderCall::TopTracks { limit });
        Ok(lock(&self.top_tracks).iter().take(limit).cloned().collect())
    }

    async fn new_releases(&self, _token: &str) -> Result<Vec<Album>, CatalogError> {
        self.record(ProviderCall::NewReleases);
        Ok(lock(&self.new_releases).clone())
    }

    async fn current_user(&self, token: &str) -> Result<ProviderUser, CatalogError> {
        self.record(ProviderCall::CurrentUser);
        lock(&self.users).get(token).cloned().ok_or(CatalogError::Status {
            status: 401,
            message: "Invalid access token".to_string(),
        })
    }
}
