use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HandoffConfig {
    /// How long a prepared shadow connection may wait for a commit.
    pub prepare_window_ms: u64,
}

impl Default for HandoffConfig {
    fn default() -> Self {
        Self {
            prepare_window_ms: 60_000,
        }
    }
}

impl HandoffConfig {
    pub fn prepare_window(&self) -> Duration {
        Duration::from_millis(self.prepare_window_ms)
    }
}
