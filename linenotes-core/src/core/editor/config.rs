//! Tunables for the editor session.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How eagerly the search-as-you-type assist fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
    /// Quiet period after the last keystroke before a search is sent.
    pub search_debounce_ms: u64,
    /// Shortest last token (in characters) that triggers a search.
    pub min_search_token_chars: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            search_debounce_ms: 3_000,
            min_search_token_chars: 2,
        }
    }
}

impl EditorConfig {
    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }
}
