use anyhow::Context;
use rusqlite::{params, params_from_iter, types::Value, Connection, Row};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};

use super::error::StoreError;
use super::models::{NewRating, Rating, RatingQuery, UserProfile};
use super::schema::RATING_VERSIONED_SCHEMAS;
use super::trait_def::RatingStore;
use crate::catalog::{ItemKey, ItemKind};
use crate::sqlite_persistence::open_versioned;

const RATING_COLUMNS: &str = "r.id, r.item_id, r.item_type, r.user_id, u.user_name, \
    u.avatar_url, r.score, rv.review, r.created_at";
const RATING_SOURCE: &str = "ratings r \
    LEFT JOIN users u ON u.id = r.user_id \
    LEFT JOIN reviews rv ON rv.id = r.id";

/// A WHERE fragment with its positional parameters.
#[derive(Debug, PartialEq)]
struct SqlFilter {
    clause: String,
    params: Vec<Value>,
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

fn kind_membership(kind: ItemKind, ids: &[&str], params: &mut Vec<Value>) -> String {
    params.push(Value::Integer(kind.to_db_code()));
    params.extend(ids.iter().map(|id| Value::Text(id.to_string())));
    format!(
        "r.item_type = ? AND r.item_id IN ({})",
        placeholders(ids.len())
    )
}

/// Restricts `ratings r` to the given item keys.
///
/// Keys are partitioned by kind: when both kinds are present the two
/// membership tests are OR-ed, otherwise a single kind test is emitted.
/// Returns `None` for an empty key set.
fn item_filter(items: &[ItemKey]) -> Option<SqlFilter> {
    let albums: Vec<&str> = items
        .iter()
        .filter(|key| key.kind == ItemKind::Album)
        .map(|key| key.id.as_str())
        .collect();
    let tracks: Vec<&str> = items
        .iter()
        .filter(|key| key.kind == ItemKind::Track)
        .map(|key| key.id.as_str())
        .collect();

    let mut params = Vec::with_capacity(items.len() + 2);
    let clause = match (albums.is_empty(), tracks.is_empty()) {
        (true, true) => return None,
        (false, false) => {
            let albums_clause = kind_membership(ItemKind::Album, &albums, &mut params);
            let tracks_clause = kind_membership(ItemKind::Track, &tracks, &mut params);
            format!("(({}) OR ({}))", albums_clause, tracks_clause)
        }
        (false, true) => kind_membership(ItemKind::Album, &albums, &mut params),
        (true, false) => kind_membership(ItemKind::Track, &tracks, &mut params),
    };

    Some(SqlFilter { clause, params })
}

fn item_kind_from_row(row: &Row, index: usize) -> rusqlite::Result<ItemKind> {
    let code: i64 = row.get(index)?;
    ItemKind::from_db_code(code).ok_or(rusqlite::Error::IntegralValueOutOfRange(index, code))
}

fn rating_from_row(row: &Row) -> rusqlite::Result<Rating> {
    let user_id: String = row.get(3)?;
    let user_name: Option<String> = row.get(4)?;
    Ok(Rating {
        id: row.get(0)?,
        item_id: row.get(1)?,
        kind: item_kind_from_row(row, 2)?,
        user_name: user_name.unwrap_or_else(|| user_id.clone()),
        user_id,
        profile_url: row.get(5)?,
        score: row.get(6)?,
        review: row.get(7)?,
        created_at: row.get(8)?,
    })
}

pub struct SqliteRatingStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteRatingStore {
    pub fn new<T: AsRef<Path>>(db_path: T) -> anyhow::Result<Self> {
        let db_path = db_path.as_ref();
        let is_new = !db_path.exists();
        let conn = Connection::open(db_path)
            .with_context(|| format!("Failed to open ratings database {:?}", db_path))?;
        open_versioned(&conn, RATING_VERSIONED_SCHEMAS, is_new)?;
        if is_new {
            info!("Created ratings database at {:?}", db_path);
        }

        Ok(SqliteRatingStore {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    fn get_rating(conn: &Connection, rating_id: i64) -> Result<Rating, StoreError> {
        let sql = format!(
            "SELECT {} FROM {} WHERE r.id = ?1",
            RATING_COLUMNS, RATING_SOURCE
        );
        Ok(conn.query_row(&sql, params![rating_id], rating_from_row)?)
    }
}

impl RatingStore for SqliteRatingStore {
    fn query_ratings(&self, query: &RatingQuery) -> Result<Vec<Rating>, StoreError> {
        if query.limit == 0 || query.items.as_ref().is_some_and(Vec::is_empty) {
            return Ok(Vec::new());
        }

        let mut clauses = Vec::new();
        let mut params = Vec::new();
        if let Some(filter) = query.items.as_deref().and_then(item_filter) {
            clauses.push(filter.clause);
            params.extend(filter.params);
        }
        if let Some(user_id) = &query.user_id {
            clauses.push("r.user_id = ?".to_string());
            params.push(Value::Text(user_id.clone()));
        }
        params.push(Value::Integer(query.limit as i64));

        let where_clause = if clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", clauses.join(" AND "))
        };
        let sql = format!(
            "SELECT {} FROM {}{} ORDER BY r.created_at DESC, r.id DESC LIMIT ?",
            RATING_COLUMNS, RATING_SOURCE, where_clause
        );

        let conn = self.lock()?;
        let mut stmt = conn.prepare(&sql)?;
        let ratings = stmt
            .query_map(params_from_iter(params.iter()), rating_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        debug!(
            "Rating query {:?} returned {} rows",
            query.user_id,
            ratings.len()
        );
        Ok(ratings)
    }

    fn average_scores(&self, items: &[ItemKey]) -> Result<HashMap<ItemKey, f64>, StoreError> {
        let Some(filter) = item_filter(items) else {
            return Ok(HashMap::new());
        };
        let sql = format!(
            "SELECT r.item_id, r.item_type, AVG(r.score) FROM ratings r WHERE {} \
             GROUP BY r.item_id, r.item_type",
            filter.clause
        );

        let conn = self.lock()?;
        let mut stmt = conn.prepare(&sql)?;
        let averages = stmt
            .query_map(params_from_iter(filter.params.iter()), |row| {
                Ok((
                    ItemKey::new(row.get::<_, String>(0)?, item_kind_from_row(row, 1)?),
                    row.get::<_, f64>(2)?,
                ))
            })?
            .collect::<Result<HashMap<_, _>, _>>()?;
        Ok(averages)
    }

    fn upsert_rating(&self, rating: &NewRating) -> Result<Rating, StoreError> {
        let conn = self.lock()?;
        let rating_id: i64 = conn.query_row(
            "INSERT INTO ratings (item_id, item_type, user_id, score, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5) \
             ON CONFLICT(item_id, item_type, user_id) \
             DO UPDATE SET score = excluded.score, created_at = excluded.created_at \
             RETURNING id",
            params![
                rating.item.id,
                rating.item.kind.to_db_code(),
                rating.user_id,
                rating.score,
                rating.created_at
            ],
            |row| row.get(0),
        )?;
        debug!(
            "Upserted rating {} of {} by {}",
            rating_id, rating.item, rating.user_id
        );
        Self::get_rating(&conn, rating_id)
    }

    fn delete_rating(&self, item: &ItemKey, user_id: &str) -> Result<(), StoreError> {
        let conn = self.lock()?;
        let deleted = conn.execute(
            "DELETE FROM ratings WHERE item_id = ?1 AND item_type = ?2 AND user_id = ?3",
            params![item.id, item.kind.to_db_code(), user_id],
        )?;
        debug!("Deleted {} rating(s) of {} by {}", deleted, item, user_id);
        Ok(())
    }

    fn upsert_review(&self, rating_id: i64, text: &str) -> Result<(), StoreError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO reviews (id, review) VALUES (?1, ?2) \
             ON CONFLICT(id) DO UPDATE SET review = excluded.review",
            params![rating_id, text],
        )?;
        Ok(())
    }

    fn delete_review(&self, rating_id: i64) -> Result<(), StoreError> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM reviews WHERE id = ?1", params![rating_id])?;
        Ok(())
    }

    fn upsert_user(&self, user: &UserProfile) -> Result<(), StoreError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO users (id, user_name, avatar_url) VALUES (?1, ?2, ?3) \
             ON CONFLICT(id) DO UPDATE SET \
             user_name = excluded.user_name, avatar_url = excluded.avatar_url",
            params![user.id, user.name, user.avatar_url],
        )?;
        Ok(())
    }
}
