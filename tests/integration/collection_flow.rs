//! Integration tests for building and editing collections
//!
//! Covers persistence, the materialized tree and partial updates against an
//! on-disk database.

use super::common::create_test_core;
use posto::{Database, NewNode, NodeUpdate, PostoCore, PostoError};
use std::collections::BTreeMap;

fn names(nodes: &[posto::TreeNode]) -> Vec<&str> {
    nodes.iter().map(|n| n.name.as_str()).collect()
}

#[test]
fn test_tree_survives_reopen() {
    let (core, dir) = create_test_core();
    let api = core.create_collection("api").unwrap();
    let admin = core.create_collection("admin").unwrap();
    let users = core.create_node(&NewNode::folder(api, None, "users")).unwrap();
    core.create_node(&NewNode::request(api, Some(users), "get user"))
        .unwrap();
    core.create_node(&NewNode::folder(api, Some(users), "roles"))
        .unwrap();
    core.create_node(&NewNode::request(api, None, "health"))
        .unwrap();
    core.create_node(&NewNode::request(admin, None, "stats"))
        .unwrap();
    drop(core);

    let db = Database::open(dir.path().join("posto.db")).unwrap();
    let core = PostoCore::new(posto::Config::default(), db).unwrap();
    let tree = core.collection_tree().unwrap();

    assert_eq!(tree.len(), 2);
    assert_eq!(tree[0].name, "admin");
    assert_eq!(names(&tree[0].nodes), vec!["stats"]);

    assert_eq!(tree[1].name, "api");
    assert_eq!(names(&tree[1].nodes), vec!["users", "health"]);
    assert_eq!(names(&tree[1].nodes[0].children), vec!["roles", "get user"]);
}

#[test]
fn test_empty_collection_has_empty_forest() {
    let (core, _dir) = create_test_core();
    core.create_collection("empty").unwrap();

    let tree = core.collection_tree().unwrap();
    assert_eq!(tree.len(), 1);
    assert!(tree[0].nodes.is_empty());
}

#[test]
fn test_corrupted_parent_links_do_not_hang() {
    let (core, _dir) = create_test_core();
    let c = core.create_collection("c").unwrap();
    let a = core.create_node(&NewNode::folder(c, None, "a")).unwrap();
    let b = core.create_node(&NewNode::folder(c, Some(a), "b")).unwrap();
    let ok = core.create_node(&NewNode::request(c, None, "ok")).unwrap();

    // Close the loop a -> b -> a behind the core's back.
    core.database()
        .with_connection(|conn| {
            conn.execute(
                "UPDATE nodes SET parent_id = ?1 WHERE id = ?2",
                rusqlite::params![b, a],
            )
        })
        .unwrap();

    let tree = core.collection_tree().unwrap();
    assert_eq!(tree[0].nodes.len(), 1);
    assert_eq!(tree[0].nodes[0].id, ok);
}

#[test]
fn test_partial_updates_accumulate() {
    let (core, _dir) = create_test_core();
    let c = core.create_collection("c").unwrap();
    let id = core.create_node(&NewNode::request(c, None, "login")).unwrap();

    core.update_node(
        id,
        &NodeUpdate {
            method: Some("POST".to_string()),
            url: Some("http://x/login".to_string()),
            ..Default::default()
        },
    )
    .unwrap();
    core.update_node(
        id,
        &NodeUpdate {
            headers: Some(BTreeMap::from([(
                "Authorization".to_string(),
                "Bearer t".to_string(),
            )])),
            ..Default::default()
        },
    )
    .unwrap();
    core.update_node(
        id,
        &NodeUpdate {
            body: Some("{}".to_string()),
            ..Default::default()
        },
    )
    .unwrap();

    let node = core.get_node(id).unwrap();
    assert_eq!(node.name, "login");
    assert_eq!(node.method.as_deref(), Some("POST"));
    assert_eq!(node.url.as_deref(), Some("http://x/login"));
    assert_eq!(
        node.headers.as_deref(),
        Some(r#"{"Authorization":"Bearer t"}"#)
    );
    assert_eq!(node.body.as_deref(), Some("{}"));
    assert!(node.updated_at >= node.created_at);
}

#[test]
fn test_no_fields_is_a_caller_error() {
    let (core, _dir) = create_test_core();
    let c = core.create_collection("c").unwrap();
    let id = core.create_node(&NewNode::request(c, None, "r")).unwrap();

    let err = core.update_node(id, &NodeUpdate::default()).unwrap_err();
    assert!(matches!(err, PostoError::NoFieldsProvided));
}

#[test]
fn test_deleting_collection_removes_its_nodes() {
    let (core, _dir) = create_test_core();
    let c = core.create_collection("c").unwrap();
    let folder = core.create_node(&NewNode::folder(c, None, "f")).unwrap();
    let leaf = core
        .create_node(&NewNode::request(c, Some(folder), "r"))
        .unwrap();

    core.delete_collection(c).unwrap();
    assert!(matches!(core.get_node(leaf), Err(PostoError::NotFound(_))));
    assert!(core.collection_tree().unwrap().is_empty());
}
