//! # crew-config
//!
//! Layered configuration loading for Crew using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`CREW_*` prefix, `__` as separator)
//! 2. Project-level `.crew/config.toml`
//! 3. User-level `~/.config/crew/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `CREW_COORDINATION__STALE_AFTER_SECS` -> `coordination.stale_after_secs`,
//! `CREW_STORE__URL` -> `store.url`, `CREW_GENERAL__ACTOR` -> `general.actor`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use crew_config::CrewConfig;
//!
//! let config = CrewConfig::load_with_dotenv(None).expect("config");
//! let policy = config.coordination.stale_policy().expect("valid policy");
//! println!("claims go stale after {:?}", policy.threshold());
//! ```

mod admin;
mod coordination;
mod error;
mod general;
mod store;

pub use admin::AdminConfig;
pub use coordination::CoordinationConfig;
pub use error::ConfigError;
pub use general::GeneralConfig;
pub use store::StoreConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the per-project directory holding the database and config.
pub const PROJECT_DIR: &str = ".crew";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CrewConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub coordination: CoordinationConfig,
    #[serde(default)]
    pub admin: AdminConfig,
    #[serde(default)]
    pub general: GeneralConfig,
}

impl CrewConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// `project_root` selects the project-level `.crew/config.toml`; `None`
    /// uses the current directory. Does NOT call `dotenvy`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a source fails to parse or a value is invalid.
    pub fn load(project_root: Option<&Path>) -> Result<Self, ConfigError> {
        let config: Self = Self::figment(project_root).extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with `.env` file support.
    ///
    /// Loads `.env` from the project root (or current directory) before
    /// building the figment.
    ///
    /// # Errors
    ///
    /// See [`CrewConfig::load`].
    pub fn load_with_dotenv(project_root: Option<&Path>) -> Result<Self, ConfigError> {
        match project_root.map(|root| root.join(".env")) {
            Some(env_path) if env_path.exists() => {
                let _ = dotenvy::from_path(&env_path);
            }
            _ => {
                let _ = dotenvy::dotenv();
            }
        }
        Self::load(project_root)
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment directly or add providers on top.
    #[must_use]
    pub fn figment(project_root: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(global_path));
        }

        // Layer 2: Project-local config
        let local_path = project_root
            .map_or_else(|| PathBuf::from(PROJECT_DIR), |root| root.join(PROJECT_DIR))
            .join("config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Environment variables (highest priority)
        figment.merge(Env::prefixed("CREW_").split("__"))
    }

    /// Check cross-field constraints that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.coordination.stale_policy()?;
        self.coordination.poll_interval()?;
        if self.general.default_limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "general.default_limit".into(),
                reason: "must be at least 1".into(),
            });
        }
        if !self.store.url.is_empty() && self.store.auth_token.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "store.auth_token".into(),
                reason: "required when store.url is set".into(),
            });
        }
        Ok(())
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("crew").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = CrewConfig::default();
        assert!(config.validate().is_ok());
        assert!(!config.store.is_remote());
        assert!(!config.admin.is_enforced());
        assert_eq!(config.coordination.stale_after_secs, 7200);
        assert_eq!(config.coordination.poll_interval_secs, 15);
    }

    #[test]
    fn url_without_token_is_invalid() {
        let mut config = CrewConfig::default();
        config.store.url = "libsql://crew.turso.io".into();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field, .. }) if field == "store.auth_token"
        ));
    }

    #[test]
    fn zero_limit_is_invalid() {
        let mut config = CrewConfig::default();
        config.general.default_limit = 0;
        assert!(config.validate().is_err());
    }
}
