//! Builds the nested collection / folder / request tree from flat,
//! parent-linked node rows.
//!
//! Rows that cannot be reached from a root are left out: a `parent_id` that
//! names no node of the same collection, a node that is its own parent, and
//! every member of a parent cycle. Duplicate rows keep their first occurrence.
//! Nodes nested deeper than [`MAX_DEPTH`] levels are dropped with their subtree.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;

use super::error::PostoError;
use crate::data::{AggregatedCollection, NodeRow};

/// Deepest nesting level kept in a tree; top-level nodes are level 1.
pub const MAX_DEPTH: usize = 64;

/// A folder or request with its children attached
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TreeNode {
    pub id: i64,
    pub name: String,
    pub is_folder: bool,
    pub parent_id: Option<i64>,
    pub collection_id: i64,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Number of nodes in this subtree, self included
    pub fn subtree_size(&self) -> usize {
        1 + self.children.iter().map(TreeNode::subtree_size).sum::<usize>()
    }
}

/// One collection and its ordered forest of top-level nodes
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CollectionTree {
    pub id: i64,
    pub name: String,
    pub nodes: Vec<TreeNode>,
}

/// Decode every collection's node payload and build its forest.
///
/// Collections come back sorted by name; rows for the same collection id are
/// merged. Fails only when a payload is not a JSON array of node rows.
pub fn materialize(
    collections: Vec<AggregatedCollection>,
) -> Result<Vec<CollectionTree>, PostoError> {
    let mut grouped: BTreeMap<i64, (String, Vec<NodeRow>)> = BTreeMap::new();
    for collection in collections {
        let rows: Vec<NodeRow> = serde_json::from_str(&collection.nodes)?;
        grouped
            .entry(collection.id)
            .or_insert_with(|| (collection.name, Vec::new()))
            .1
            .extend(rows);
    }

    let mut trees: Vec<CollectionTree> = grouped
        .into_iter()
        .map(|(id, (name, rows))| CollectionTree {
            id,
            name,
            nodes: build_forest(id, &rows),
        })
        .collect();
    trees.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));

    Ok(trees)
}

#[derive(Debug)]
struct Member<'a> {
    id: i64,
    row: &'a NodeRow,
}

/// Folders before requests, then by name; id breaks ties so output is stable.
fn presentation_order(a: &Member<'_>, b: &Member<'_>) -> Ordering {
    b.row
        .is_folder
        .cmp(&a.row.is_folder)
        .then_with(|| a.row.name.cmp(&b.row.name))
        .then(a.id.cmp(&b.id))
}

/// Arrange one collection's rows into an ordered forest.
pub fn build_forest(collection_id: i64, rows: &[NodeRow]) -> Vec<TreeNode> {
    let mut seen = HashSet::new();
    let members: Vec<Member<'_>> = rows
        .iter()
        .filter_map(|row| {
            let id = row.node_id?;
            if row.collection_id.is_some_and(|owner| owner != collection_id) {
                return None;
            }
            seen.insert(id).then_some(Member { id, row })
        })
        .collect();

    let mut roots = Vec::new();
    let mut children: HashMap<i64, Vec<&Member<'_>>> = HashMap::new();
    for member in &members {
        match member.row.parent_id {
            None => roots.push(member),
            Some(parent) => children.entry(parent).or_default().push(member),
        }
    }
    roots.sort_by(|a, b| presentation_order(a, b));
    for siblings in children.values_mut() {
        siblings.sort_by(|a, b| presentation_order(a, b));
    }

    // Local to this pass; nothing on the rows themselves is mutated.
    let mut placed = HashSet::new();
    let forest: Vec<TreeNode> = roots
        .into_iter()
        .filter_map(|root| attach(root, 1, collection_id, &children, &mut placed))
        .collect();

    let unplaced = members.len() - placed.len();
    let skipped = rows.iter().filter(|r| r.node_id.is_some()).count() - members.len();
    if unplaced > 0 || skipped > 0 {
        tracing::debug!(
            collection_id,
            unplaced,
            skipped,
            "Dropped unreachable, too deep, duplicate or foreign node rows"
        );
    }

    forest
}

fn attach(
    member: &Member<'_>,
    depth: usize,
    collection_id: i64,
    children: &HashMap<i64, Vec<&Member<'_>>>,
    placed: &mut HashSet<i64>,
) -> Option<TreeNode> {
    if depth > MAX_DEPTH || !placed.insert(member.id) {
        return None;
    }

    let attached: Vec<TreeNode> = children
        .get(&member.id)
        .map(|siblings| {
            siblings
                .iter()
                .filter_map(|child| attach(child, depth + 1, collection_id, children, placed))
                .collect()
        })
        .unwrap_or_default();

    Some(TreeNode {
        id: member.id,
        name: member.row.name.clone(),
        is_folder: member.row.is_folder,
        parent_id: member.row.parent_id,
        collection_id,
        children: attached,
    })
}
