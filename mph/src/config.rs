use serde::{Deserialize, Serialize};

/// Search limits for [`crate::MphBuilder`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MphConfig {
    /// How many salt pairs to try before giving up on a key set
    pub max_attempts: usize,
}

impl MphConfig {
    pub const DEFAULT_MAX_ATTEMPTS: usize = 10_000;

    pub const fn new() -> Self {
        Self { max_attempts: Self::DEFAULT_MAX_ATTEMPTS }
    }

    /// Override the number of salt pairs tried per key set
    pub const fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }
}

impl Default for MphConfig {
    fn default() -> Self {
        Self::new()
    }
}
