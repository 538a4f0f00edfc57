//! Data models for collections and nodes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A named top-level grouping of folders and requests
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Collection {
    /// Unique identifier
    pub id: i64,
    /// Display name
    pub name: String,
    /// When the collection was created
    pub created_at: DateTime<Utc>,
    /// Last time the collection was modified
    pub updated_at: DateTime<Utc>,
}

/// A folder or a saved request inside a collection.
///
/// Request fields are only meaningful when `is_folder` is false.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Node {
    pub id: i64,
    pub name: String,
    pub collection_id: i64,
    pub is_folder: bool,
    /// Parent folder (None = top level of the collection)
    pub parent_id: Option<i64>,
    pub method: Option<String>,
    pub url: Option<String>,
    /// JSON object of header name to value, as stored
    pub headers: Option<String>,
    pub body: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Parameters for creating a folder or request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewNode {
    pub collection_id: i64,
    #[serde(default)]
    pub parent_id: Option<i64>,
    #[serde(default)]
    pub is_folder: bool,
    pub name: String,
}

impl NewNode {
    pub fn folder(collection_id: i64, parent_id: Option<i64>, name: impl Into<String>) -> Self {
        Self {
            collection_id,
            parent_id,
            is_folder: true,
            name: name.into(),
        }
    }

    pub fn request(collection_id: i64, parent_id: Option<i64>, name: impl Into<String>) -> Self {
        Self {
            collection_id,
            parent_id,
            is_folder: false,
            name: name.into(),
        }
    }
}

/// One node descriptor as emitted by the per-collection aggregation query.
///
/// `node_id` is null for the placeholder row a collection without nodes produces.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NodeRow {
    pub node_id: Option<i64>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub is_folder: bool,
    #[serde(default)]
    pub parent_id: Option<i64>,
    #[serde(default)]
    pub collection_id: Option<i64>,
}

/// One collection row from the aggregation query, node descriptors still encoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatedCollection {
    pub id: i64,
    pub name: String,
    /// JSON array of [`NodeRow`]
    pub nodes: String,
}

/// SQLite hands booleans back as 0/1 inside JSON; accept both spellings.
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
        Null(()),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(value) => value,
        Flag::Int(value) => value != 0,
        Flag::Null(()) => false,
    })
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

pub(crate) fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
