pub mod config;
pub mod core;
pub mod data;
pub mod util;
pub mod web;

pub use crate::core::{
    CollectionTree, NodeUpdate, PostoCore, PostoError, RequestOutcome, TransportError,
    TransportErrorKind, TreeNode,
};
pub use config::Config;
pub use data::{Collection, CollectionStore, Database, NewNode, Node, NodeStore};
pub use web::{ApiResponse, WebAppState};
