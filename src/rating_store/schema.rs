use anyhow::Result;
use rusqlite::Connection;

use crate::sqlite_column;
use crate::sqlite_persistence::{
    ForeignKey, ForeignKeyOnChange, SqlType, Table, VersionedSchema, DEFAULT_TIMESTAMP,
};

/// V 0
const USERS_TABLE_V_0: Table = Table {
    name: "users",
    columns: &[
        sqlite_column!("id", &SqlType::Text, is_primary_key = true),
        sqlite_column!("user_name", &SqlType::Text),
        sqlite_column!("avatar_url", &SqlType::Text),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[],
    unique_constraints: &[],
};

const RATINGS_TABLE_V_0: Table = Table {
    name: "ratings",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("item_id", &SqlType::Text, non_null = true),
        sqlite_column!("item_type", &SqlType::Integer, non_null = true),
        sqlite_column!("user_id", &SqlType::Text, non_null = true),
        sqlite_column!("score", &SqlType::Real, non_null = true),
        sqlite_column!("created_at", &SqlType::Text, non_null = true),
    ],
    indices: &[],
    unique_constraints: &[&["item_id", "item_type", "user_id"]],
};

const REVIEWS_TABLE_V_0: Table = Table {
    name: "reviews",
    columns: &[
        sqlite_column!(
            "id",
            &SqlType::Integer,
            is_primary_key = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "ratings",
                foreign_column: "id",
                on_delete: ForeignKeyOnChange::Cascade,
            })
        ),
        sqlite_column!("review", &SqlType::Text, non_null = true),
    ],
    indices: &[],
    unique_constraints: &[],
};

/// V 1
const RATINGS_TABLE_V_1: Table = Table {
    name: "ratings",
    columns: RATINGS_TABLE_V_0.columns,
    indices: &[
        ("idx_ratings_created_at", "created_at"),
        ("idx_ratings_user_id", "user_id"),
    ],
    unique_constraints: RATINGS_TABLE_V_0.unique_constraints,
};

fn migrate_v0_to_v1(conn: &Connection) -> Result<()> {
    RATINGS_TABLE_V_1.create_index(conn, "idx_ratings_created_at")?;
    RATINGS_TABLE_V_1.create_index(conn, "idx_ratings_user_id")
}

pub const RATING_VERSIONED_SCHEMAS: &[VersionedSchema] = &[
    VersionedSchema {
        version: 0,
        tables: &[USERS_TABLE_V_0, RATINGS_TABLE_V_0, REVIEWS_TABLE_V_0],
        migration: None,
    },
    VersionedSchema {
        version: 1,
        tables: &[USERS_TABLE_V_0, RATINGS_TABLE_V_1, REVIEWS_TABLE_V_0],
        migration: Some(migrate_v0_to_v1),
    },
];
