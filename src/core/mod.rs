//! Core module: the operations the UI shell calls.
//!
//! - Tree materialization of collections and their nodes
//! - Partial updates of request fields
//! - Replay of stored requests over HTTP

mod error;
mod posto_core;
pub mod replay;
pub mod tree;
mod update;

pub use error::{PostoError, TransportError, TransportErrorKind};
pub use posto_core::PostoCore;
pub use replay::{ReplayEngine, RequestOutcome};
pub use tree::{CollectionTree, TreeNode};
pub use update::{NodeUpdate, UpdateBuilder, UpdateStatement};
