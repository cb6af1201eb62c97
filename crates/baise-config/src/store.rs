//! Document store write-time checks.

use serde::{Deserialize, Serialize};

const fn default_enforce_unique() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    /// Reject writes that collide on a unique field (e.g. `email`).
    #[serde(default = "default_enforce_unique")]
    pub enforce_unique: bool,

    /// Reject writes whose references point at missing documents.
    #[serde(default)]
    pub check_references: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            enforce_unique: default_enforce_unique(),
            check_references: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = StoreConfig::default();
        assert!(config.enforce_unique);
        assert!(!config.check_references);
    }
}
