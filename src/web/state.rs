//! Shared state handed to every handler.

use std::sync::Arc;

use crate::core::PostoCore;

#[derive(Clone)]
pub struct WebAppState {
    core: Arc<PostoCore>,
}

impl WebAppState {
    pub fn new(core: PostoCore) -> Self {
        Self {
            core: Arc::new(core),
        }
    }

    pub fn core(&self) -> &PostoCore {
        &self.core
    }
}
