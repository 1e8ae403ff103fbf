use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Timing of the autosave scheduler.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct AutosaveConfig {
    /// Quiet window after the last mutation before a flush is triggered.
    pub debounce_window: Duration,
    /// Shortened window used after a record removal, so closing the app
    /// right after a deletion cannot resurrect the deleted record.
    pub removal_window: Duration,
    /// How often the fallback timer checks for a starved debounce.
    pub fallback_interval: Duration,
    /// Unflushed changes older than this are flushed by the fallback timer.
    pub fallback_threshold: Duration,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            debounce_window: Duration::from_millis(500),
            removal_window: Duration::from_millis(100),
            fallback_interval: Duration::from_secs(5 * 60),
            fallback_threshold: Duration::from_secs(2 * 60),
        }
    }
}
