//! Core operations shared by every frontend.

use std::time::Duration;

use crate::config::Config;
use crate::data::{Collection, CollectionStore, Database, NewNode, Node, NodeStore};

use super::error::PostoError;
use super::replay::{ReplayEngine, RequestOutcome};
use super::tree::{materialize, CollectionTree, MAX_DEPTH};
use super::update::NodeUpdate;

/// Owns the database, the DAO stores and the replay engine.
///
/// Storage calls serialize on the database connection. `replay_node` loads the
/// node under that lock and releases it before any network I/O starts.
pub struct PostoCore {
    config: Config,
    database: Database,
    collections: CollectionStore,
    nodes: NodeStore,
    replay: ReplayEngine,
}

impl PostoCore {
    pub fn new(config: Config, database: Database) -> Result<Self, PostoError> {
        let replay = ReplayEngine::new(&config.replay)?;
        Ok(Self {
            collections: CollectionStore::new(database.clone()),
            nodes: NodeStore::new(database.clone()),
            config,
            database,
            replay,
        })
    }

    /// Open the database in the data directory (~/.posto/posto.db)
    pub fn open_default(config: Config) -> Result<Self, PostoError> {
        let database = Database::open_default()?;
        Self::new(config, database)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn list_collections(&self) -> Result<Vec<Collection>, PostoError> {
        Ok(self.collections.get_all()?)
    }

    /// Every collection with its nested folder / request tree
    pub fn collection_tree(&self) -> Result<Vec<CollectionTree>, PostoError> {
        let aggregated = self.collections.get_all_with_nodes()?;
        materialize(aggregated)
    }

    pub fn create_collection(&self, name: &str) -> Result<i64, PostoError> {
        let name = validate_name(name)?;
        let id = self.collections.create(name)?;
        tracing::info!(collection_id = id, collection_name = name, "Created collection");
        Ok(id)
    }

    pub fn rename_collection(&self, id: i64, name: &str) -> Result<(), PostoError> {
        let name = validate_name(name)?;
        if self.collections.rename(id, name)? == 0 {
            return Err(PostoError::NotFound(format!("Collection {}", id)));
        }
        Ok(())
    }

    /// Delete a collection and, through the schema, all of its nodes
    pub fn delete_collection(&self, id: i64) -> Result<(), PostoError> {
        if self.collections.delete(id)? == 0 {
            return Err(PostoError::NotFound(format!("Collection {}", id)));
        }
        tracing::info!(collection_id = id, "Deleted collection");
        Ok(())
    }

    /// Create a folder or request. A parent must be a folder of the same collection.
    pub fn create_node(&self, node: &NewNode) -> Result<i64, PostoError> {
        let node = &NewNode {
            name: validate_name(&node.name)?.to_string(),
            ..node.clone()
        };

        if self.collections.get_by_id(node.collection_id)?.is_none() {
            return Err(PostoError::NotFound(format!(
                "Collection {}",
                node.collection_id
            )));
        }

        if let Some(parent_id) = node.parent_id {
            let parent = self.nodes.get_by_id(parent_id)?.ok_or_else(|| {
                PostoError::InvalidParent(format!("node {} does not exist", parent_id))
            })?;
            if parent.collection_id != node.collection_id {
                return Err(PostoError::InvalidParent(format!(
                    "node {} belongs to collection {}",
                    parent_id, parent.collection_id
                )));
            }
            if !parent.is_folder {
                return Err(PostoError::InvalidParent(format!(
                    "node {} is not a folder",
                    parent_id
                )));
            }
            let parent_depth = self.nodes.depth(parent_id, MAX_DEPTH)?.unwrap_or(1);
            if parent_depth >= MAX_DEPTH {
                return Err(PostoError::InvalidParent(format!(
                    "node {} is nested {} levels deep, the maximum",
                    parent_id, MAX_DEPTH
                )));
            }
        }

        let id = self.nodes.create(node)?;
        tracing::info!(
            node_id = id,
            collection_id = node.collection_id,
            parent_id = ?node.parent_id,
            is_folder = node.is_folder,
            "Created node"
        );
        Ok(id)
    }

    pub fn get_node(&self, id: i64) -> Result<Node, PostoError> {
        self.nodes
            .get_by_id(id)?
            .ok_or_else(|| PostoError::NotFound(format!("Node {}", id)))
    }

    /// Apply a partial update and return the number of rows it touched.
    ///
    /// An id that matches no row is not an error; the caller sees `0`.
    pub fn update_node(&self, id: i64, update: &NodeUpdate) -> Result<usize, PostoError> {
        let trimmed;
        let update = match &update.name {
            Some(name) => {
                trimmed = NodeUpdate {
                    name: Some(validate_name(name)?.to_string()),
                    ..update.clone()
                };
                &trimmed
            }
            None => update,
        };
        let statement = update.statement(id)?;
        let changed = self.nodes.update(&statement)?;
        tracing::debug!(node_id = id, changed, "Updated node");
        Ok(changed)
    }

    /// Delete a node and, through the schema, its descendants
    pub fn delete_node(&self, id: i64) -> Result<(), PostoError> {
        if self.nodes.delete(id)? == 0 {
            return Err(PostoError::NotFound(format!("Node {}", id)));
        }
        Ok(())
    }

    /// Execute a stored request. `timeout` overrides the configured deadline.
    pub async fn replay_node(
        &self,
        id: i64,
        timeout: Option<Duration>,
    ) -> Result<RequestOutcome, PostoError> {
        let node = self.get_node(id)?;
        self.replay.replay(&node, timeout).await
    }
}

impl std::fmt::Debug for PostoCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostoCore")
            .field("database", &self.database)
            .finish()
    }
}

fn validate_name(name: &str) -> Result<&str, PostoError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(PostoError::InvalidInput("name must not be empty".to_string()));
    }
    Ok(trimmed)
}
