//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use std::sync::Arc;
use std::time::Instant;

use crate::tree::IndexedTree;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Ranked query tree, built once at startup
    pub tree: Arc<IndexedTree>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    pub fn new(tree: Arc<IndexedTree>) -> Self {
        Self {
            tree,
            start_time: Instant::now(),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
