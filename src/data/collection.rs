//! Collection data access object

use super::database::{Database, DatabaseError};
use super::models::{parse_timestamp, AggregatedCollection, Collection};
use chrono::Utc;
use rusqlite::params;

/// Per-collection aggregation: one row per collection with its nodes packed
/// into a JSON array. Collections without nodes yield `[]`.
const SELECT_WITH_NODES: &str = r#"
    SELECT
        c.id,
        c.name,
        CASE
            WHEN COUNT(n.id) = 0 THEN '[]'
            ELSE json_group_array(
                json_object(
                    'node_id', n.id,
                    'name', n.name,
                    'is_folder', n.is_folder,
                    'parent_id', n.parent_id,
                    'collection_id', n.collection_id
                )
            )
        END AS nodes
    FROM collections AS c
    LEFT JOIN nodes AS n ON n.collection_id = c.id
    GROUP BY c.id, c.name
    ORDER BY c.name ASC, c.id ASC
"#;

/// Data access object for Collection operations
#[derive(Clone)]
pub struct CollectionStore {
    db: Database,
}

impl CollectionStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Insert a new collection and return its id
    pub fn create(&self, name: &str) -> Result<i64, DatabaseError> {
        let now = Utc::now().to_rfc3339();
        self.db.with_connection(|conn| {
            conn.query_row(
                "INSERT INTO collections (name, created_at, updated_at) VALUES (?1, ?2, ?2)
                 RETURNING id",
                params![name, now],
                |row| row.get(0),
            )
        })
    }

    /// Get a collection by ID
    pub fn get_by_id(&self, id: i64) -> Result<Option<Collection>, DatabaseError> {
        self.db.with_connection(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, created_at, updated_at FROM collections WHERE id = ?1",
            )?;
            let mut rows = stmt.query(params![id])?;
            match rows.next()? {
                Some(row) => Ok(Some(Self::row_to_collection(row)?)),
                None => Ok(None),
            }
        })
    }

    /// Get all collections, sorted by name
    pub fn get_all(&self) -> Result<Vec<Collection>, DatabaseError> {
        self.db.with_connection(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, created_at, updated_at FROM collections ORDER BY name, id",
            )?;
            let collections = stmt
                .query_map([], Self::row_to_collection)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(collections)
        })
    }

    /// Get every collection with its node descriptors still JSON-encoded
    pub fn get_all_with_nodes(&self) -> Result<Vec<AggregatedCollection>, DatabaseError> {
        self.db.with_connection(|conn| {
            let mut stmt = conn.prepare(SELECT_WITH_NODES)?;
            let collections = stmt
                .query_map([], |row| {
                    Ok(AggregatedCollection {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        nodes: row.get(2)?,
                    })
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(collections)
        })
    }

    /// Rename a collection, returning the number of rows touched
    pub fn rename(&self, id: i64, name: &str) -> Result<usize, DatabaseError> {
        self.db.with_connection(|conn| {
            conn.execute(
                "UPDATE collections SET name = ?2, updated_at = ?3 WHERE id = ?1",
                params![id, name, Utc::now().to_rfc3339()],
            )
        })
    }

    /// Delete a collection (cascades to its nodes)
    pub fn delete(&self, id: i64) -> Result<usize, DatabaseError> {
        self.db.with_connection(|conn| {
            conn.execute("DELETE FROM collections WHERE id = ?1", params![id])
        })
    }

    fn row_to_collection(row: &rusqlite::Row) -> rusqlite::Result<Collection> {
        let created_at: String = row.get(2)?;
        let updated_at: String = row.get(3)?;
        Ok(Collection {
            id: row.get(0)?,
            name: row.get(1)?,
            created_at: parse_timestamp(&created_at),
            updated_at: parse_timestamp(&updated_at),
        })
    }
}
