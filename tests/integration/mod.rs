//! Integration tests for Posto
//!
//! These tests verify that storage, tree building and replay work together.

#[path = "../common/mod.rs"]
pub mod common;

pub mod collection_flow;
pub mod replay_flow;
