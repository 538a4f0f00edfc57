//! Axum web server implementation for Posto.

use std::net::SocketAddr;

use axum::{
    http::{header, Method},
    routing::get,
    Router,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::envelope::ApiResponse;
use super::routes::api::api_routes;
use super::state::WebAppState;
use crate::config::ServerConfig;

/// Health check payload.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Health check endpoint handler.
async fn health() -> ApiResponse<HealthResponse> {
    ApiResponse::ok(
        "ok",
        HealthResponse {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
        },
    )
}

/// Build the Axum router with all routes.
pub fn build_router(state: WebAppState, cors_permissive: bool) -> Router {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PATCH,
        Method::DELETE,
    ];
    let cors = if cors_permissive {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers([header::CONTENT_TYPE])
    } else {
        CorsLayer::new()
            .allow_methods(methods)
            .allow_headers([header::CONTENT_TYPE])
    };

    let core_routes = Router::new().route("/health", get(health));

    Router::new()
        .nest("/api", core_routes.merge(api_routes()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the web server.
///
/// This starts the Axum server and blocks until shutdown.
pub async fn run_server(state: WebAppState, config: &ServerConfig) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let app = build_router(state, config.cors_permissive);

    tracing::info!("Starting web server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Web server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::core::PostoCore;
    use crate::data::Database;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn test_app() -> Router {
        let core = PostoCore::new(Config::default(), Database::open_in_memory().unwrap()).unwrap();
        build_router(WebAppState::new(core), true)
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        let response = app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = test_app();
        let (status, json) = send(&app, Method::GET, "/api/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["status"], "ok");
    }

    #[tokio::test]
    async fn test_collection_and_node_flow() {
        let app = test_app();

        let (status, json) = send(
            &app,
            Method::POST,
            "/api/collections",
            Some(json!({"name": "Petstore"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let collection_id = json["data"]["id"].as_i64().unwrap();

        let (_, json) = send(
            &app,
            Method::POST,
            "/api/nodes",
            Some(json!({"collection_id": collection_id, "is_folder": true, "name": "pets"})),
        )
        .await;
        let folder_id = json["data"]["id"].as_i64().unwrap();

        let (status, json) = send(
            &app,
            Method::POST,
            "/api/nodes",
            Some(json!({"collection_id": collection_id, "parent_id": folder_id, "name": "list pets"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let request_id = json["data"]["id"].as_i64().unwrap();

        let (status, json) = send(
            &app,
            Method::PATCH,
            &format!("/api/nodes/{}", request_id),
            Some(json!({"url": "http://example.invalid/pets"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["rows_affected"], 1);

        let (_, json) = send(&app, Method::GET, "/api/collections/tree", None).await;
        assert_eq!(json["success"], true);
        let tree = &json["data"][0];
        assert_eq!(tree["name"], "Petstore");
        assert_eq!(tree["nodes"][0]["name"], "pets");
        assert_eq!(tree["nodes"][0]["children"][0]["name"], "list pets");

        let (_, json) = send(&app, Method::GET, &format!("/api/nodes/{}", request_id), None).await;
        assert_eq!(json["data"]["url"], "http://example.invalid/pets");
        assert_eq!(json["data"]["method"], Value::Null);
    }

    #[tokio::test]
    async fn test_failures_use_the_envelope() {
        let app = test_app();

        let (status, json) = send(&app, Method::PATCH, "/api/nodes/1", Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "Failed to update request");
        assert_eq!(json["error"], "No fields provided for update");
        assert_eq!(json["data"], Value::Null);

        let (status, json) = send(&app, Method::GET, "/api/nodes/77", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["success"], false);

        let (status, json) = send(&app, Method::GET, "/api/nodes/not-a-number", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], "Invalid request");

        let (status, json) = send(
            &app,
            Method::POST,
            "/api/collections",
            Some(json!({"title": "wrong field"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["success"], false);
    }

    #[tokio::test]
    async fn test_replay_folder_is_rejected() {
        let app = test_app();
        let (_, json) = send(&app, Method::POST, "/api/collections", Some(json!({"name": "c"}))).await;
        let collection_id = json["data"]["id"].as_i64().unwrap();
        let (_, json) = send(
            &app,
            Method::POST,
            "/api/nodes",
            Some(json!({"collection_id": collection_id, "is_folder": true, "name": "f"})),
        )
        .await;
        let folder_id = json["data"]["id"].as_i64().unwrap();

        let (status, json) = send(
            &app,
            Method::POST,
            &format!("/api/nodes/{}/replay", folder_id),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], "Failed to send request");
        assert!(json["error"].as_str().unwrap().contains("is a folder"));
    }
}
