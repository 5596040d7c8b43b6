//! Engine configuration loaded from JSON.
//!
//! Every field is optional; missing fields fall back to their defaults:
//!
//! ```json
//! {
//!   "history_capacity": 32,
//!   "filter": { "threshold": 100, "kernel_radius": 2 }
//! }
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::buffer::PixelBuffer;
use crate::error::FilterResult;
use crate::filters::{self, FilterKind, FilterParams};
use crate::history::{StateManager, DEFAULT_CAPACITY};

fn default_history_capacity() -> usize {
    DEFAULT_CAPACITY
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Maximum number of undo snapshots
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
    /// Parameters handed to every filter
    #[serde(default)]
    pub filter: FilterParams,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            history_capacity: default_history_capacity(),
            filter: FilterParams::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> FilterResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        debug!(history_capacity = config.history_capacity, "engine config loaded");
        Ok(config)
    }

    pub fn to_json(&self) -> FilterResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Empty history sized by `history_capacity`.
    pub fn new_history(&self) -> StateManager {
        StateManager::new(self.history_capacity)
    }

    /// Run a filter with the configured parameters.
    pub fn apply(&self, kind: FilterKind, input: &PixelBuffer) -> FilterResult<PixelBuffer> {
        filters::apply(kind, input, &self.filter)
    }
}
