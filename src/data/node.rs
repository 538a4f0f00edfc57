//! Node (folder / request) data access object

use super::database::{Database, DatabaseError};
use super::models::{parse_timestamp, NewNode, Node};
use crate::core::UpdateStatement;
use chrono::Utc;
use rusqlite::{params, params_from_iter};

const NODE_COLUMNS: &str = "id, name, collection_id, is_folder, parent_id, method, url, headers, body, created_at, updated_at";

/// Data access object for Node operations
#[derive(Clone)]
pub struct NodeStore {
    db: Database,
}

impl NodeStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Insert a new folder or request and return its id
    pub fn create(&self, node: &NewNode) -> Result<i64, DatabaseError> {
        let now = Utc::now().to_rfc3339();
        self.db.with_connection(|conn| {
            conn.query_row(
                "INSERT INTO nodes (collection_id, parent_id, is_folder, name, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?5)
                 RETURNING id",
                params![
                    node.collection_id,
                    node.parent_id,
                    node.is_folder,
                    node.name,
                    now
                ],
                |row| row.get(0),
            )
        })
    }

    /// Get a node, request fields included
    pub fn get_by_id(&self, id: i64) -> Result<Option<Node>, DatabaseError> {
        self.db.with_connection(|conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {} FROM nodes WHERE id = ?1", NODE_COLUMNS))?;
            let mut rows = stmt.query(params![id])?;
            match rows.next()? {
                Some(row) => Ok(Some(Self::row_to_node(row)?)),
                None => Ok(None),
            }
        })
    }

    /// Nesting level of a node, top level being 1, counted no higher than `limit`.
    /// `None` when the node does not exist.
    pub fn depth(&self, id: i64, limit: usize) -> Result<Option<usize>, DatabaseError> {
        self.db.with_connection(|conn| {
            let depth: Option<i64> = conn.query_row(
                "WITH RECURSIVE chain(id, parent_id, depth) AS (
                     SELECT id, parent_id, 1 FROM nodes WHERE id = ?1
                     UNION ALL
                     SELECT n.id, n.parent_id, chain.depth + 1
                     FROM nodes n JOIN chain ON n.id = chain.parent_id
                     WHERE chain.depth < ?2
                 )
                 SELECT MAX(depth) FROM chain",
                params![id, limit as i64],
                |row| row.get(0),
            )?;
            Ok(depth.map(|d| d as usize))
        })
    }

    /// Apply a prepared partial update as one transaction, returning rows touched
    pub fn update(&self, statement: &UpdateStatement) -> Result<usize, DatabaseError> {
        self.db.with_connection_mut(|conn| {
            let tx = conn.transaction()?;
            let changed = tx.execute(statement.sql(), params_from_iter(statement.params()))?;
            tx.commit()?;
            Ok(changed)
        })
    }

    /// Delete a node (cascades to its descendants)
    pub fn delete(&self, id: i64) -> Result<usize, DatabaseError> {
        self.db
            .with_connection(|conn| conn.execute("DELETE FROM nodes WHERE id = ?1", params![id]))
    }

    fn row_to_node(row: &rusqlite::Row) -> rusqlite::Result<Node> {
        let created_at: String = row.get(9)?;
        let updated_at: String = row.get(10)?;
        Ok(Node {
            id: row.get(0)?,
            name: row.get(1)?,
            collection_id: row.get(2)?,
            is_folder: row.get(3)?,
            parent_id: row.get(4)?,
            method: row.get(5)?,
            url: row.get(6)?,
            headers: row.get(7)?,
            body: row.get(8)?,
            created_at: parse_timestamp(&created_at),
            updated_at: parse_timestamp(&updated_at),
        })
    }
}
