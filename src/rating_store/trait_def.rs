//! RatingStore trait definition.

use std::collections::HashMap;

use super::error::StoreError;
use super::models::{NewRating, Rating, RatingQuery, UserProfile};
use crate::catalog::ItemKey;

/// Persistent storage of user ratings, their reviews and the users' display profiles.
///
/// A rating is unique per `(item id, item kind, user id)`. Reviews are keyed by
/// the id of the rating they belong to and disappear with it.
pub trait RatingStore: Send + Sync {
    /// Returns the ratings matching `query`, newest first, at most `query.limit` of them.
    fn query_ratings(&self, query: &RatingQuery) -> Result<Vec<Rating>, StoreError>;

    /// Returns the mean score of every item in `items` that has at least one rating.
    /// Unrated items are absent from the map.
    fn average_scores(&self, items: &[ItemKey]) -> Result<HashMap<ItemKey, f64>, StoreError>;

    /// Inserts the rating, or overwrites score and timestamp of the user's
    /// existing rating for the same item. Returns the stored row.
    fn upsert_rating(&self, rating: &NewRating) -> Result<Rating, StoreError>;

    /// Deletes the user's rating of `item`, if any.
    fn delete_rating(&self, item: &ItemKey, user_id: &str) -> Result<(), StoreError>;

    fn upsert_review(&self, rating_id: i64, text: &str) -> Result<(), StoreError>;

    fn delete_review(&self, rating_id: i64) -> Result<(), StoreError>;

    /// Inserts or refreshes the display profile used when listing a user's ratings.
    fn upsert_user(&self, user: &UserProfile) -> Result<(), StoreError>;
}
