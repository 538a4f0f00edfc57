//! Collection handlers for the Posto web API.

use axum::{
    extract::{rejection::JsonRejection, rejection::PathRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::core::CollectionTree;
use crate::data::Collection;
use crate::web::envelope::ApiResponse;
use crate::web::error::WebError;
use crate::web::state::WebAppState;

/// Request body for creating or renaming a collection.
#[derive(Debug, Deserialize)]
pub struct CollectionNameRequest {
    pub name: String,
}

/// Id of a newly created record.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreatedResponse {
    pub id: i64,
}

/// List all collections, sorted by name.
pub async fn list_collections(
    State(state): State<WebAppState>,
) -> Result<ApiResponse<Vec<Collection>>, WebError> {
    let collections = state
        .core()
        .list_collections()
        .map_err(WebError::context("Failed to fetch collections"))?;

    Ok(ApiResponse::ok("Collections fetched successfully", collections))
}

/// All collections with their nested folders and requests.
pub async fn collection_tree(
    State(state): State<WebAppState>,
) -> Result<ApiResponse<Vec<CollectionTree>>, WebError> {
    let tree = state
        .core()
        .collection_tree()
        .map_err(WebError::context("Failed to fetch collections"))?;

    Ok(ApiResponse::ok("Collections fetched successfully", tree))
}

/// Create a new collection.
pub async fn create_collection(
    State(state): State<WebAppState>,
    req: Result<Json<CollectionNameRequest>, JsonRejection>,
) -> Result<(StatusCode, ApiResponse<CreatedResponse>), WebError> {
    let Json(req) = req.map_err(WebError::rejected)?;
    let id = state
        .core()
        .create_collection(&req.name)
        .map_err(WebError::context("Failed to create collection"))?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::ok("Collection created successfully", CreatedResponse { id }),
    ))
}

/// Rename a collection.
pub async fn rename_collection(
    State(state): State<WebAppState>,
    id: Result<Path<i64>, PathRejection>,
    req: Result<Json<CollectionNameRequest>, JsonRejection>,
) -> Result<ApiResponse<()>, WebError> {
    let Path(id) = id.map_err(WebError::rejected)?;
    let Json(req) = req.map_err(WebError::rejected)?;
    state
        .core()
        .rename_collection(id, &req.name)
        .map_err(WebError::context("Failed to rename collection"))?;

    Ok(ApiResponse::ok("Collection renamed successfully", ()))
}

/// Delete a collection with everything inside it.
pub async fn delete_collection(
    State(state): State<WebAppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<ApiResponse<()>, WebError> {
    let Path(id) = id.map_err(WebError::rejected)?;
    state
        .core()
        .delete_collection(id)
        .map_err(WebError::context("Failed to delete collection"))?;

    Ok(ApiResponse::ok("Collection deleted successfully", ()))
}
