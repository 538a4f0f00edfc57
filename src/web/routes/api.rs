//! REST API route definitions.

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::web::handlers::{collections, nodes};
use crate::web::state::WebAppState;

/// Build the API router with all REST endpoints.
pub fn api_routes() -> Router<WebAppState> {
    Router::new()
        // Collection routes
        .route(
            "/collections",
            get(collections::list_collections).post(collections::create_collection),
        )
        .route("/collections/tree", get(collections::collection_tree))
        .route(
            "/collections/{id}",
            patch(collections::rename_collection)
                .delete(collections::delete_collection),
        )
        // Node routes
        .route("/nodes", post(nodes::create_node))
        .route(
            "/nodes/{id}",
            get(nodes::get_node)
                .patch(nodes::update_node)
                .delete(nodes::delete_node),
        )
        .route("/nodes/{id}/replay", post(nodes::replay_node))
}
