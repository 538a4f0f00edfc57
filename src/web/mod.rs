//! HTTP API that the UI shell talks to.

pub mod envelope;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod state;

pub use envelope::ApiResponse;
pub use error::WebError;
pub use server::{build_router, run_server};
pub use state::WebAppState;
