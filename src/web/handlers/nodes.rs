//! Folder / request handlers for the Posto web API.

use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, rejection::PathRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::core::{NodeUpdate, RequestOutcome};
use crate::data::{NewNode, Node};
use crate::web::envelope::ApiResponse;
use crate::web::error::WebError;
use crate::web::handlers::collections::CreatedResponse;
use crate::web::state::WebAppState;

/// Result of a partial update. `rows_affected` is 0 when no node had the id.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateNodeResponse {
    pub rows_affected: usize,
}

/// Optional body for a replay call; an empty body means defaults.
#[derive(Debug, Default, Deserialize)]
pub struct ReplayRequest {
    /// Per-call deadline; falls back to the configured default
    pub timeout_ms: Option<u64>,
}

/// Create a folder or request.
pub async fn create_node(
    State(state): State<WebAppState>,
    req: Result<Json<NewNode>, JsonRejection>,
) -> Result<(StatusCode, ApiResponse<CreatedResponse>), WebError> {
    let Json(req) = req.map_err(WebError::rejected)?;
    let id = state
        .core()
        .create_node(&req)
        .map_err(WebError::context("Failed to create file or folder"))?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::ok("File or folder created successfully", CreatedResponse { id }),
    ))
}

/// Fetch one node with its request fields.
pub async fn get_node(
    State(state): State<WebAppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<ApiResponse<Node>, WebError> {
    let Path(id) = id.map_err(WebError::rejected)?;
    let node = state
        .core()
        .get_node(id)
        .map_err(WebError::context("Failed to fetch request"))?;

    Ok(ApiResponse::ok("Request fetched successfully", node))
}

/// Change only the supplied request fields.
pub async fn update_node(
    State(state): State<WebAppState>,
    id: Result<Path<i64>, PathRejection>,
    req: Result<Json<NodeUpdate>, JsonRejection>,
) -> Result<ApiResponse<UpdateNodeResponse>, WebError> {
    let Path(id) = id.map_err(WebError::rejected)?;
    let Json(update) = req.map_err(WebError::rejected)?;
    let rows_affected = state
        .core()
        .update_node(id, &update)
        .map_err(WebError::context("Failed to update request"))?;

    Ok(ApiResponse::ok(
        "Request updated successfully",
        UpdateNodeResponse { rows_affected },
    ))
}

/// Delete a node with its descendants.
pub async fn delete_node(
    State(state): State<WebAppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<ApiResponse<()>, WebError> {
    let Path(id) = id.map_err(WebError::rejected)?;
    state
        .core()
        .delete_node(id)
        .map_err(WebError::context("Failed to delete file or folder"))?;

    Ok(ApiResponse::ok("File or folder deleted successfully", ()))
}

/// Execute the stored request and return the classified response.
pub async fn replay_node(
    State(state): State<WebAppState>,
    id: Result<Path<i64>, PathRejection>,
    body: Bytes,
) -> Result<ApiResponse<RequestOutcome>, WebError> {
    let Path(id) = id.map_err(WebError::rejected)?;
    let req: ReplayRequest = if body.iter().all(u8::is_ascii_whitespace) {
        ReplayRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(WebError::rejected)?
    };
    let timeout = req.timeout_ms.map(Duration::from_millis);

    let outcome = state
        .core()
        .replay_node(id, timeout)
        .await
        .map_err(WebError::context("Failed to send request"))?;

    Ok(ApiResponse::ok("Request sent successfully", outcome))
}
