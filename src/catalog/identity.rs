//! Identity of a catalog item.
//!
//! Catalog ids are only unique within their kind, an album and a track can
//! share the same id. Every join and de-duplication goes through [`ItemKey`].

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Album,
    Track,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Album => "album",
            ItemKind::Track => "track",
        }
    }

    /// Integer code stored in the `item_type` column.
    pub fn to_db_code(&self) -> i64 {
        match self {
            ItemKind::Album => 0,
            ItemKind::Track => 1,
        }
    }

    pub fn from_db_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(ItemKind::Album),
            1 => Some(ItemKind::Track),
            _ => None,
        }
    }

    /// Parses the plural path segment used by the HTTP routes (`albums`, `tracks`).
    pub fn from_path_segment(segment: &str) -> Option<Self> {
        match segment {
            "albums" => Some(ItemKind::Album),
            "tracks" => Some(ItemKind::Track),
            _ => None,
        }
    }

    /// Collection name used by the catalog provider (`albums/{id}`, `tracks?ids=`).
    pub fn collection_name(&self) -> &'static str {
        match self {
            ItemKind::Album => "albums",
            ItemKind::Track => "tracks",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compound identity `(id, kind)` of a catalog item.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemKey {
    pub id: String,
    pub kind: ItemKind,
}

impl ItemKey {
    pub fn new(id: impl Into<String>, kind: ItemKind) -> Self {
        Self {
            id: id.into(),
            kind,
        }
    }

    pub fn album(id: impl Into<String>) -> Self {
        Self::new(id, ItemKind::Album)
    }

    pub fn track(id: impl Into<String>) -> Self {
        Self::new(id, ItemKind::Track)
    }

    /// Flat string form, `<kind>:<id>`.
    ///
    /// The kind prefix comes from a closed set without `:`, so two different
    /// keys never produce the same string.
    pub fn to_key_string(&self) -> String {
        format!("{}:{}", self.kind.as_str(), self.id)
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.as_str(), self.id)
    }
}
