//! Aggregation workflows joining catalog items with stored ratings.
//!
//! Every workflow stops at the first failing step and returns that failure,
//! nothing partially aggregated ever reaches the caller.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use super::averages::{apply_averages, attach_averages, fetch_averages};
use super::batch::fetch_items;
use super::error::AggregationError;
use super::merge::{attach_ratings, merge_ratings, AttachMode};
use crate::catalog::{Album, Item, ItemKey, ItemKind, Rateable, Track};
use crate::catalog_provider::{CatalogError, CatalogProvider, SearchResults};
use crate::rating_store::{
    NewRating, Rating, RatingQuery, RatingStore, RatingSubmission, UserProfile,
};

pub const DETAIL_RATINGS_LIMIT: usize = 20;
pub const MY_RATINGS_LIMIT: usize = 1000;
pub const LATEST_RATINGS_LIMIT: usize = 50;
pub const RATINGS_PER_RATED_ITEM: usize = 20;
/// Upper bound of the recent ratings shown next to "my rated items".
pub const MY_ITEMS_RECENT_RATINGS_CAP: usize = 1000;
pub const TOP_ARTISTS_LIMIT: usize = 5;
pub const RECOMMENDATIONS_LIMIT: usize = 50;
pub const SEARCH_LIMIT: usize = 50;
pub const TOP_TRACKS_LIMIT: usize = 30;

/// The user a workflow runs for.
#[derive(Clone, Debug, PartialEq)]
pub struct UserContext {
    pub user_id: String,
    pub user_name: String,
    pub profile_url: Option<String>,
    /// Catalog provider access token of the user.
    pub access_token: String,
}

impl UserContext {
    fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.user_id.clone(),
            name: self.user_name.clone(),
            avatar_url: self.profile_url.clone(),
        }
    }
}

/// Albums of `tracks`, one per album id. A later copy of an album replaces
/// an earlier one but keeps its position.
pub(crate) fn albums_of_tracks(tracks: Vec<Track>) -> Vec<Album> {
    let mut albums: Vec<Album> = Vec::new();
    let mut position: HashMap<String, usize> = HashMap::new();
    for track in tracks {
        let Some(album) = track.album else {
            continue;
        };
        match position.get(&album.id) {
            Some(&index) => albums[index] = *album,
            None => {
                position.insert(album.id.clone(), albums.len());
                albums.push(*album);
            }
        }
    }
    albums
}

#[derive(Clone)]
pub struct CatalogRatingsService {
    catalog: Arc<dyn CatalogProvider>,
    ratings: Arc<dyn RatingStore>,
}

impl CatalogRatingsService {
    pub fn new(catalog: Arc<dyn CatalogProvider>, ratings: Arc<dyn RatingStore>) -> Self {
        Self { catalog, ratings }
    }

    pub fn catalog(&self) -> &Arc<dyn CatalogProvider> {
        &self.catalog
    }

    /// Fetches the albums and tracks referenced by `ratings`, albums first.
    async fn fetch_rated_items(
        &self,
        token: &str,
        ratings: &[Rating],
    ) -> Result<Vec<Item>, CatalogError> {
        let ids_of = |kind: ItemKind| -> Vec<String> {
            ratings
                .iter()
                .filter(|rating| rating.kind == kind)
                .map(|rating| rating.item_id.clone())
                .collect()
        };
        let album_ids = ids_of(ItemKind::Album);
        let track_ids = ids_of(ItemKind::Track);

        let (mut items, tracks) = futures::try_join!(
            fetch_items(self.catalog.as_ref(), token, ItemKind::Album, &album_ids),
            fetch_items(self.catalog.as_ref(), token, ItemKind::Track, &track_ids),
        )?;
        items.extend(tracks);
        Ok(items)
    }

    /// Item with its average, its 20 most recent ratings and the user's own rating.
    pub async fn item_details(
        &self,
        user: &UserContext,
        kind: ItemKind,
        id: &str,
    ) -> Result<Item, AggregationError> {
        let mut item = self.catalog.fetch_one(&user.access_token, kind, id).await?;
        attach_averages(self.ratings.as_ref(), std::slice::from_mut(&mut item))?;

        let key = item.key();
        let recent = self.ratings.query_ratings(
            &RatingQuery::latest(DETAIL_RATINGS_LIMIT).for_items(vec![key.clone()]),
        )?;
        let mine = self.ratings.query_ratings(
            &RatingQuery::latest(1)
                .for_items(vec![key])
                .by_user(user.user_id.as_str()),
        )?;

        let attached = item.ratings_mut();
        attached.ratings = Some(recent);
        attached.my_rating = mine.into_iter().next();
        Ok(item)
    }

    /// Everything the user rated, most recently rated first.
    pub async fn my_rated_items(&self, user: &UserContext) -> Result<Vec<Item>, AggregationError> {
        let mine = self.ratings.query_ratings(
            &RatingQuery::latest(MY_RATINGS_LIMIT).by_user(user.user_id.as_str()),
        )?;
        let pool = self.fetch_rated_items(&user.access_token, &mine).await?;
        let mut items = merge_ratings(&mine, pool, AttachMode::SetSingle);
        attach_averages(self.ratings.as_ref(), &mut items)?;

        let limit = (items.len() * RATINGS_PER_RATED_ITEM).min(MY_ITEMS_RECENT_RATINGS_CAP);
        let keys = items.iter().map(Rateable::key).collect();
        let recent = self
            .ratings
            .query_ratings(&RatingQuery::latest(limit).for_items(keys))?;
        attach_ratings(&recent, &mut items, AttachMode::Append);

        debug!(
            "User {} rated {} items, {} still in the catalog",
            user.user_id,
            mine.len(),
            items.len()
        );
        Ok(items)
    }

    /// Items of the 50 most recent ratings by anyone, marked with the user's own ratings.
    pub async fn latest_ratings(&self, user: &UserContext) -> Result<Vec<Item>, AggregationError> {
        let latest = self
            .ratings
            .query_ratings(&RatingQuery::latest(LATEST_RATINGS_LIMIT))?;
        let pool = self.fetch_rated_items(&user.access_token, &latest).await?;
        let mut items = merge_ratings(&latest, pool, AttachMode::Append);
        attach_averages(self.ratings.as_ref(), &mut items)?;

        let mine = self.ratings.query_ratings(
            &RatingQuery::latest(MY_RATINGS_LIMIT).by_user(user.user_id.as_str()),
        )?;
        attach_ratings(&mine, &mut items, AttachMode::SetSingle);
        Ok(items)
    }

    /// Albums of tracks recommended from the user's top artists, newest first.
    pub async fn recommended_albums(
        &self,
        user: &UserContext,
    ) -> Result<Vec<Album>, AggregationError> {
        let token = &user.access_token;
        let artists = self.catalog.top_artists(token, TOP_ARTISTS_LIMIT).await?;
        if artists.is_empty() {
            debug!("No top artists for {}, nothing to recommend", user.user_id);
            return Ok(Vec::new());
        }

        let seeds: Vec<String> = artists.into_iter().map(|artist| artist.id).collect();
        let tracks = self
            .catalog
            .recommendations(token, &seeds, RECOMMENDATIONS_LIMIT)
            .await?;
        let mut albums = albums_of_tracks(tracks);
        albums.sort_by(|a, b| b.release_year.cmp(&a.release_year));
        attach_averages(self.ratings.as_ref(), &mut albums)?;
        Ok(albums)
    }

    pub async fn search(
        &self,
        user: &UserContext,
        query: &str,
    ) -> Result<SearchResults, AggregationError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(SearchResults::default());
        }

        let mut results = self
            .catalog
            .search(&user.access_token, query, SEARCH_LIMIT)
            .await?;
        let keys = results
            .albums
            .iter()
            .map(Rateable::key)
            .chain(results.tracks.iter().map(Rateable::key));
        let averages = fetch_averages(self.ratings.as_ref(), keys)?;
        apply_averages(&averages, &mut results.albums);
        apply_averages(&averages, &mut results.tracks);
        Ok(results)
    }

    pub async fn top_tracks(&self, user: &UserContext) -> Result<Vec<Track>, AggregationError> {
        let mut tracks = self
            .catalog
            .top_tracks(&user.access_token, TOP_TRACKS_LIMIT)
            .await?;
        attach_averages(self.ratings.as_ref(), &mut tracks)?;
        Ok(tracks)
    }

    pub async fn new_releases(&self, user: &UserContext) -> Result<Vec<Album>, AggregationError> {
        let mut albums = self.catalog.new_releases(&user.access_token).await?;
        attach_averages(self.ratings.as_ref(), &mut albums)?;
        Ok(albums)
    }

    /// Stores the user's rating of `item`, replacing any previous one.
    ///
    /// The review follows the submission: stored when it has text, removed otherwise.
    pub fn rate_item(
        &self,
        user: &UserContext,
        item: ItemKey,
        submission: &RatingSubmission,
    ) -> Result<Rating, AggregationError> {
        self.ratings.upsert_user(&user.profile())?;
        let mut rating = self.ratings.upsert_rating(&NewRating::now(
            item,
            user.user_id.as_str(),
            submission.score,
        ))?;

        match submission.review_text() {
            Some(text) => {
                self.ratings.upsert_review(rating.id, text)?;
                rating.review = Some(text.to_string());
            }
            None => {
                self.ratings.delete_review(rating.id)?;
                rating.review = None;
            }
        }
        Ok(rating)
    }

    pub fn delete_rating(&self, user: &UserContext, item: &ItemKey) -> Result<(), AggregationError> {
        self.ratings.delete_rating(item, &user.user_id)?;
        Ok(())
    }

    pub fn remember_user(&self, profile: &UserProfile) -> Result<(), AggregationError> {
        self.ratings.upsert_user(profile)?;
        Ok(())
    }
}
