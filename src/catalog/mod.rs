mod identity;
mod models;

pub use identity::{ItemKey, ItemKind};
pub use models::{Album, Artist, Item, ItemRatings, Rateable, Track};
