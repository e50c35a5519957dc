use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::{ItemKey, ItemKind};

/// A user's rating of a catalog item, as returned by the rating store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    pub id: i64,
    pub item_id: String,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    pub user_id: String,
    pub user_name: String,
    pub profile_url: Option<String>,
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review: Option<String>,
    /// RFC 3339 UTC timestamp of the last write.
    pub created_at: String,
}

impl Rating {
    pub fn item_key(&self) -> ItemKey {
        ItemKey::new(self.item_id.clone(), self.kind)
    }

    #[cfg(test)]
    pub fn sample(id: i64, key: ItemKey, user_id: &str, score: f64) -> Self {
        Rating {
            id,
            item_id: key.id,
            kind: key.kind,
            user_id: user_id.to_string(),
            user_name: user_id.to_string(),
            profile_url: None,
            score,
            review: None,
            created_at: format!("2024-01-01T00:00:{:02}.000Z", id % 60),
        }
    }
}

/// Filter for [`super::RatingStore::query_ratings`].
///
/// Results are always ordered newest first.
#[derive(Clone, Debug, PartialEq)]
pub struct RatingQuery {
    /// Restrict to these items. `Some(vec![])` matches nothing.
    pub items: Option<Vec<ItemKey>>,
    pub user_id: Option<String>,
    pub limit: usize,
}

impl RatingQuery {
    pub fn latest(limit: usize) -> Self {
        Self {
            items: None,
            user_id: None,
            limit,
        }
    }

    pub fn for_items(mut self, items: Vec<ItemKey>) -> Self {
        self.items = Some(items);
        self
    }

    pub fn by_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }
}

/// Row written by [`super::RatingStore::upsert_rating`].
#[derive(Clone, Debug, PartialEq)]
pub struct NewRating {
    pub item: ItemKey,
    pub user_id: String,
    pub score: f64,
    pub created_at: String,
}

impl NewRating {
    /// A rating written now.
    pub fn now(item: ItemKey, user_id: impl Into<String>, score: f64) -> Self {
        Self {
            item,
            user_id: user_id.into(),
            score,
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

/// Body of a rating submission.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct RatingSubmission {
    pub score: f64,
    #[serde(default)]
    pub review: Option<String>,
}

impl RatingSubmission {
    /// Review text worth storing, blank reviews count as no review.
    pub fn review_text(&self) -> Option<&str> {
        self.review
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub avatar_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_review_is_no_review() {
        let submission: RatingSubmission =
            serde_json::from_str(r#"{"score": 3, "review": "   "}"#).unwrap();
        assert_eq!(submission.score, 3.0);
        assert_eq!(submission.review_text(), None);

        let submission: RatingSubmission = serde_json::from_str(r#"{"score": 7}"#).unwrap();
        assert_eq!(submission.review_text(), None);

        let submission: RatingSubmission =
            serde_json::from_str(r#"{"score": 7, "review": " great "}"#).unwrap();
        assert_eq!(submission.review_text(), Some("great"));
    }

    #[test]
    fn new_rating_timestamp_has_millis_in_utc() {
        let rating = NewRating::now(ItemKey::album("a"), "u1", 5.0);

        assert_eq!(rating.created_at.len(), "2024-01-01T00:00:00.000Z".len());
        assert!(rating.created_at.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(&rating.created_at).is_ok());
    }

    #[test]
    fn rating_serializes_kind_as_type() {
        let rating = Rating::sample(4, ItemKey::track("t9"), "u1", 8.0);
        let value = serde_json::to_value(&rating).unwrap();

        assert_eq!(value["type"], "track");
        assert_eq!(value["itemId"], "t9");
        assert_eq!(value["userName"], "u1");
        assert!(value.get("review").is_none());
        assert_eq!(rating.item_key(), ItemKey::track("t9"));
    }
}
