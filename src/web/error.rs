//! Web error type: every failure leaves as a failure envelope.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::core::{PostoError, TransportErrorKind};
use crate::web::envelope::ApiResponse;

/// A failed operation plus the human-readable context it failed in.
#[derive(Debug, thiserror::Error)]
#[error("{message}: {source}")]
pub struct WebError {
    message: String,
    #[source]
    source: PostoError,
}

impl WebError {
    pub fn new(message: impl Into<String>, source: PostoError) -> Self {
        Self {
            message: message.into(),
            source,
        }
    }

    /// Adapter for `map_err`: `.map_err(WebError::context("Failed to ..."))`
    pub fn context(message: &'static str) -> impl FnOnce(PostoError) -> WebError {
        move |source| WebError::new(message, source)
    }

    /// An extractor rejected the request (bad JSON, bad path segment).
    pub fn rejected(rejection: impl std::fmt::Display) -> Self {
        WebError::new(
            "Invalid request",
            PostoError::InvalidInput(rejection.to_string()),
        )
    }

    pub fn source_error(&self) -> &PostoError {
        &self.source
    }

    pub fn status(&self) -> StatusCode {
        match &self.source {
            PostoError::NoFieldsProvided
            | PostoError::NotARequest(_)
            | PostoError::EmptyUrl
            | PostoError::InvalidMethod(_)
            | PostoError::InvalidParent(_)
            | PostoError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            PostoError::NotFound(_) => StatusCode::NOT_FOUND,
            PostoError::Transport(e) if e.kind == TransportErrorKind::Timeout => {
                StatusCode::GATEWAY_TIMEOUT
            }
            PostoError::Transport(_) => StatusCode::BAD_GATEWAY,
            PostoError::Decode(_) | PostoError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(message = %self.message, error = %self.source, "Request failed");
        } else {
            tracing::debug!(message = %self.message, error = %self.source, "Request rejected");
        }

        let body = ApiResponse::<()>::failure(self.message, self.source.to_string());
        (status, body).into_response()
    }
}
