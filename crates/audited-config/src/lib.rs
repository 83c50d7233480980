//! # audited-config
//!
//! Layered configuration loading for audited using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`AUDITED_*` prefix, `__` as separator)
//! 2. Project-level `.audited/config.toml`
//! 3. User-level `~/.config/audited/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `AUDITED_DATABASE__PATH` -> `database.path`,
//! `AUDITED_AUDIT__ROLE_FIELD` -> `audit.role_field`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use audited_config::AuditedConfig;
//!
//! let config = AuditedConfig::load_with_dotenv().expect("config");
//! if config.audit.enabled {
//!     println!("current user key: {}", config.audit.context_key);
//! }
//! ```

mod audit;
mod database;
mod error;

pub use audit::AuditSection;
pub use database::DatabaseConfig;
pub use error::ConfigError;

use std::path::PathBuf;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct AuditedConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub audit: AuditSection,
}

impl AuditedConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy`; use [`AuditedConfig::load_with_dotenv`] for
    /// `.env` file loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Figment` if a source cannot be parsed, or
    /// `ConfigError::InvalidValue` if the audit section is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(&Self::figment())
    }

    /// Load configuration with `.env` file support.
    ///
    /// # Errors
    ///
    /// See [`AuditedConfig::load`].
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        Self::load_dotenv_from_workspace();
        Self::load()
    }

    /// Extract and validate a config from an arbitrary figment.
    ///
    /// # Errors
    ///
    /// See [`AuditedConfig::load`].
    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract()?;
        config.audit.validate()?;
        Ok(config)
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment or layer providers on top.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        let local_path = PathBuf::from(".audited/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("AUDITED_").split("__"))
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("audited").join("config.toml"))
    }

    /// Load `.env` from the workspace root, falling back to the current dir.
    /// Silently does nothing if no `.env` is found.
    fn load_dotenv_from_workspace() {
        if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
            let mut dir = PathBuf::from(manifest_dir);
            // crate -> crates/ -> workspace root
            for _ in 0..3 {
                let env_path = dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                    return;
                }
                if !dir.pop() {
                    break;
                }
            }
        }

        let _ = dotenvy::dotenv();
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AuditedConfig::default();
        assert!(config.audit.enabled);
        assert_eq!(config.database.path, ".audited/audited.db");
        config.audit.validate().unwrap();
    }

    #[test]
    fn figment_builds_without_files() {
        figment::Jail::expect_with(|_jail| {
            let config = AuditedConfig::from_figment(&AuditedConfig::figment()).unwrap();
            assert_eq!(config.audit.context_key, "audited:current_user");
            Ok(())
        });
    }
}
