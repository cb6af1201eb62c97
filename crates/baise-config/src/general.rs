//! General application configuration.

use serde::{Deserialize, Serialize};

fn default_log_filter() -> String {
    "warn".to_string()
}

fn default_export_dir() -> String {
    "schemas".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// `tracing` filter directive used when `BAISE_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    /// Directory `baise schema export` writes to when `--dir` is omitted.
    #[serde(default = "default_export_dir")]
    pub export_dir: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter(),
            export_dir: default_export_dir(),
        }
    }
}
