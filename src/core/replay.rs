//! Replays a stored request node as a live HTTP call.

use std::time::Duration;

use base64::engine::general_purpose;
use base64::Engine as _;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method};
use serde::Serialize;

use super::error::{PostoError, TransportError, TransportErrorKind};
use crate::config::ReplayConfig;
use crate::data::Node;

const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// Result of one replay. Never persisted.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RequestOutcome {
    pub status: u16,
    /// Content-Type the server declared ("" when absent)
    pub content_type: String,
    /// UTF-8 text, or base64 when `is_binary` is set
    pub body: String,
    pub is_binary: bool,
}

/// A request resolved from stored fields, ready to send
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<String>,
}

/// Resolve a node's stored fields into a sendable request.
pub fn prepare(node: &Node) -> Result<PreparedRequest, PostoError> {
    if node.is_folder {
        return Err(PostoError::NotARequest(node.id));
    }

    let url = node
        .url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .ok_or(PostoError::EmptyUrl)?
        .to_string();

    let method = match node.method.as_deref().map(str::trim) {
        None | Some("") => Method::GET,
        Some(raw) => Method::from_bytes(raw.to_ascii_uppercase().as_bytes())
            .map_err(|_| PostoError::InvalidMethod(raw.to_string()))?,
    };

    let body = match node.body.as_deref() {
        Some(body) if method != Method::GET && !body.is_empty() => Some(body.to_string()),
        _ => None,
    };

    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(DEFAULT_CONTENT_TYPE));
    for (name, value) in stored_headers(node) {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(&value),
        ) {
            (Ok(name), Ok(value)) => {
                headers.insert(name, value);
            }
            _ => {
                tracing::warn!(node_id = node.id, header = %name, "Skipping invalid stored header");
            }
        }
    }

    Ok(PreparedRequest {
        method,
        url,
        headers,
        body,
    })
}

/// Decode the stored header object. A malformed payload means "no headers";
/// it is logged rather than failing the replay.
fn stored_headers(node: &Node) -> Vec<(String, String)> {
    let Some(raw) = node.headers.as_deref().filter(|raw| !raw.trim().is_empty()) else {
        return Vec::new();
    };

    match serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(raw) {
        Ok(map) => map
            .into_iter()
            .filter_map(|(name, value)| match value {
                serde_json::Value::String(value) => Some((name, value)),
                serde_json::Value::Number(n) => Some((name, n.to_string())),
                serde_json::Value::Bool(b) => Some((name, b.to_string())),
                _ => None,
            })
            .collect(),
        Err(e) => {
            tracing::warn!(node_id = node.id, error = %e, "Ignoring malformed stored headers");
            Vec::new()
        }
    }
}

/// Whether a declared content type is shown as text.
fn is_textual(content_type: &str) -> bool {
    let lowered = content_type.to_ascii_lowercase();
    lowered.contains("application/json") || lowered.trim_start().starts_with("text/")
}

/// Pick the body representation from the declared content type alone.
/// Returns the body and whether it was base64-encoded.
pub fn classify(content_type: &str, bytes: &[u8]) -> (String, bool) {
    if is_textual(content_type) {
        (String::from_utf8_lossy(bytes).into_owned(), false)
    } else {
        (general_purpose::STANDARD.encode(bytes), true)
    }
}

/// Executes prepared requests. No retries and no caching; every call hits the network.
#[derive(Debug, Clone)]
pub struct ReplayEngine {
    client: Client,
    default_timeout: Option<Duration>,
}

impl ReplayEngine {
    pub fn new(config: &ReplayConfig) -> Result<Self, PostoError> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| TransportError::from_reqwest(e, false))?;

        Ok(Self {
            client,
            default_timeout: config.timeout,
        })
    }

    pub fn default_timeout(&self) -> Option<Duration> {
        self.default_timeout
    }

    /// Replay `node`. `timeout` overrides the configured default for this call.
    pub async fn replay(
        &self,
        node: &Node,
        timeout: Option<Duration>,
    ) -> Result<RequestOutcome, PostoError> {
        let prepared = prepare(node)?;
        let deadline = timeout.or(self.default_timeout);

        tracing::info!(
            node_id = node.id,
            method = %prepared.method,
            url = %prepared.url,
            has_body = prepared.body.is_some(),
            "Replaying request"
        );

        let call = self.execute(prepared);
        let outcome = match deadline {
            Some(limit) => tokio::time::timeout(limit, call).await.unwrap_or_else(|_| {
                Err(TransportError::new(
                    TransportErrorKind::Timeout,
                    format!("no complete response within {} ms", limit.as_millis()),
                ))
            }),
            None => call.await,
        };

        match &outcome {
            Ok(outcome) => tracing::info!(
                node_id = node.id,
                status = outcome.status,
                is_binary = outcome.is_binary,
                "Replay completed"
            ),
            Err(e) => tracing::warn!(node_id = node.id, error = %e, "Replay failed"),
        }

        outcome.map_err(PostoError::from)
    }

    async fn execute(&self, prepared: PreparedRequest) -> Result<RequestOutcome, TransportError> {
        let mut request = self
            .client
            .request(prepared.method, &prepared.url)
            .headers(prepared.headers);
        if let Some(body) = prepared.body {
            request = request.body(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| TransportError::from_reqwest(e, false))?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();

        let bytes = response
            .bytes()
            .await
            .map_err(|e| TransportError::from_reqwest(e, true))?;
        let (body, is_binary) = classify(&content_type, &bytes);

        Ok(RequestOutcome {
            status,
            content_type,
            body,
            is_binary,
        })
    }
}
