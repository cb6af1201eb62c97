//! # baise-config
//!
//! Layered configuration loading for BAISE tooling using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`BAISE_*` prefix, `__` as separator)
//! 2. Project-level `.baise/config.toml`
//! 3. User-level `~/.config/baise/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `BAISE_STORE__ENFORCE_UNIQUE` -> `store.enforce_unique`,
//! `BAISE_GENERAL__EXPORT_DIR` -> `general.export_dir`, etc.
//! The `__` (double underscore) separates nested config sections.
//!
//! # Usage
//!
//! ```no_run
//! use baise_config::BaiseConfig;
//!
//! // Load from all sources (dotenvy + TOML + env):
//! let config = BaiseConfig::load_with_dotenv().expect("config");
//!
//! if config.store.check_references {
//!     println!("dangling references are rejected at write");
//! }
//! ```

mod error;
mod general;
mod store;

pub use error::ConfigError;
pub use general::GeneralConfig;
pub use store::StoreConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Project-local config file, relative to the working directory.
pub const LOCAL_CONFIG_PATH: &str = ".baise/config.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BaiseConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub general: GeneralConfig,
}

impl BaiseConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy`; use [`Self::load_with_dotenv`] if you need
    /// `.env` file loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Figment` if a source cannot be parsed or
    /// `ConfigError::InvalidValue` if a loaded value is unusable.
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment().extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with `.env` file support.
    ///
    /// # Errors
    ///
    /// Same as [`Self::load`].
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        Self::load_dotenv();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// This is public so tests can inspect the figment directly or add
    /// additional providers on top.
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        // Layer 2: Project-local config
        let local_path = PathBuf::from(LOCAL_CONFIG_PATH);
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Environment variables (highest priority)
        figment.merge(Env::prefixed("BAISE_").split("__"))
    }

    /// Reject values that load cleanly but cannot be used.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.general.log_filter.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "general.log_filter".into(),
                reason: "must not be empty".into(),
            });
        }
        if self.general.export_dir.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "general.export_dir".into(),
                reason: "must not be empty".into(),
            });
        }
        Ok(())
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("baise").join("config.toml"))
    }

    /// Load `.env` from the current directory or its parents.
    /// Silently does nothing if none is found.
    fn load_dotenv() {
        let _ = dotenvy::dotenv();
    }
}
