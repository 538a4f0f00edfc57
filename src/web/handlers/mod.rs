//! REST API handlers.

pub mod collections;
pub mod nodes;
