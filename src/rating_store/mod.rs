mod error;
mod models;
mod schema;
mod sqlite_rating_store;
mod trait_def;

pub use error::StoreError;
pub use models::{NewRating, Rating, RatingQuery, RatingSubmission, UserProfile};
pub use schema::RATING_VERSIONED_SCHEMAS;
pub use sqlite_rating_store::SqliteRatingStore;
pub use trait_def::RatingStore;
