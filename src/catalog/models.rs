//! Catalog item models.
//!
//! Items are fetched from the catalog provider on every request and never
//! persisted. Ratings coming from the rating store are attached to them
//! through the [`ItemRatings`] block shared by both kinds.

use serde::{Deserialize, Serialize};

use super::identity::{ItemKey, ItemKind};
use crate::rating_store::Rating;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Artist {
    pub id: String,
    pub name: String,
    pub url: Option<String>,
}

/// Ratings attached to an item by the aggregation workflows.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRatings {
    /// Mean score over every stored rating of the item, 0 when unrated.
    /// Unset on items nobody aggregated, such as an album nested in a track.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ratings: Option<Vec<Rating>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub my_rating: Option<Rating>,
}

impl ItemRatings {
    pub fn push_rating(&mut self, rating: Rating) {
        self.ratings.get_or_insert_with(Vec::new).push(rating);
    }

    pub fn ratings_count(&self) -> usize {
        self.ratings.as_ref().map(Vec::len).unwrap_or(0)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    pub id: String,
    #[serde(rename = "type")]
    kind: ItemKind,
    pub name: String,
    pub image: Option<String>,
    pub url: Option<String>,
    pub release_year: Option<i32>,
    #[serde(default)]
    pub artists: Vec<Artist>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tracks: Vec<Track>,
    #[serde(flatten)]
    pub ratings: ItemRatings,
}

impl Album {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: ItemKind::Album,
            name: name.into(),
            image: None,
            url: None,
            release_year: None,
            artists: Vec::new(),
            tracks: Vec::new(),
            ratings: ItemRatings::default(),
        }
    }

    pub fn with_release_year(mut self, year: i32) -> Self {
        self.release_year = Some(year);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: String,
    #[serde(rename = "type")]
    kind: ItemKind,
    pub name: String,
    pub image: Option<String>,
    pub url: Option<String>,
    pub release_year: Option<i32>,
    #[serde(default)]
    pub artists: Vec<Artist>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album: Option<Box<Album>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_url: Option<String>,
    #[serde(flatten)]
    pub ratings: ItemRatings,
}

impl Track {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: ItemKind::Track,
            name: name.into(),
            image: None,
            url: None,
            release_year: None,
            artists: Vec::new(),
            album: None,
            preview_url: None,
            ratings: ItemRatings::default(),
        }
    }

    pub fn with_album(mut self, album: Album) -> Self {
        self.image = album.image.clone();
        self.release_year = album.release_year;
        self.album = Some(Box::new(album));
        self
    }
}

/// A catalog item of either kind.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Item {
    Album(Album),
    Track(Track),
}

impl Item {
    pub fn name(&self) -> &str {
        match self {
            Item::Album(album) => &album.name,
            Item::Track(track) => &track.name,
        }
    }

    pub fn as_album(&self) -> Option<&Album> {
        match self {
            Item::Album(album) => Some(album),
            Item::Track(_) => None,
        }
    }

    pub fn as_track(&self) -> Option<&Track> {
        match self {
            Item::Track(track) => Some(track),
            Item::Album(_) => None,
        }
    }
}

impl From<Album> for Item {
    fn from(album: Album) -> Self {
        Item::Album(album)
    }
}

impl From<Track> for Item {
    fn from(track: Track) -> Self {
        Item::Track(track)
    }
}

/// Identity plus rating attachment, shared by every item shape.
pub trait Rateable {
    fn id(&self) -> &str;
    fn kind(&self) -> ItemKind;
    fn ratings(&self) -> &ItemRatings;
    fn ratings_mut(&mut self) -> &mut ItemRatings;

    fn key(&self) -> ItemKey {
        ItemKey::new(self.id(), self.kind())
    }
}

impl Rateable for Album {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> ItemKind {
        ItemKind::Album
    }

    fn ratings(&self) -> &ItemRatings {
        &self.ratings
    }

    fn ratings_mut(&mut self) -> &mut ItemRatings {
        &mut self.ratings
    }
}

impl Rateable for Track {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> ItemKind {
        ItemKind::Track
    }

    fn ratings(&self) -> &ItemRatings {
        &self.ratings
    }

    fn ratings_mut(&mut self) -> &mut ItemRatings {
        &mut self.ratings
    }
}

impl Rateable for Item {
    fn id(&self) -> &str {
        match self {
            Item::Album(album) => album.id(),
            Item::Track(track) => track.id(),
        }
    }

    fn kind(&self) -> ItemKind {
        match self {
            Item::Album(_) => ItemKind::Album,
            Item::Track(_) => ItemKind::Track,
        }
    }

    fn ratings(&self) -> &ItemRatings {
        match self {
            Item::Album(album) => album.ratings(),
            Item::Track(track) => track.ratings(),
        }
    }

    fn ratings_mut(&mut self) -> &mut ItemRatings {
        match self {
            Item::Album(album) => album.ratings_mut(),
            Item::Track(track) => track.ratings_mut(),
        }
    }
}
