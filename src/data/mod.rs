//! Data persistence layer for Posto
//!
//! This module provides SQLite-based storage for collections and their nodes.

mod collection;
mod database;
mod migrations;
mod models;
mod node;

pub use collection::CollectionStore;
pub use database::{Database, DatabaseError};
pub use models::{AggregatedCollection, Collection, NewNode, Node, NodeRow};
pub use node::NodeStore;
