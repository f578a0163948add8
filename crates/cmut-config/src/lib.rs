//! # cmut-config
//!
//! Layered configuration loading for cmut using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`CMUT_*` prefix, `__` as separator)
//! 2. Project-level `.cmut/config.toml`
//! 3. User-level `~/.config/cmut/config.toml`
//! 4. Built-in defaults
//!
//! `CMUT_INCLUDE_PATH` is handled separately: it is a colon-separated list
//! appended to `frontend.include_paths` rather than replacing it.
//!
//! # Environment Variable Mapping
//!
//! Figment maps `CMUT_MUTATE__STRATEGY` -> `mutate.strategy`,
//! `CMUT_FRONTEND__SUPPRESS_DIAGNOSTICS` -> `frontend.suppress_diagnostics`.
//!
//! # Usage
//!
//! ```no_run
//! use cmut_config::CmutConfig;
//!
//! let config = CmutConfig::load_with_dotenv().expect("config");
//! println!("strategy: {}", config.mutate.strategy);
//! ```

mod error;
mod frontend;
mod mutate;

pub use error::ConfigError;
pub use frontend::{FrontendConfig, split_include_path};
pub use mutate::MutateConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable holding extra include directories.
pub const INCLUDE_PATH_ENV: &str = "CMUT_INCLUDE_PATH";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CmutConfig {
    #[serde(default)]
    pub mutate: MutateConfig,
    #[serde(default)]
    pub frontend: FrontendConfig,
}

impl CmutConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy`; use [`Self::load_with_dotenv`] for `.env`
    /// file loading.
    ///
    /// # Errors
    /// `Figment` for malformed sources, `InvalidValue` when validation fails.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config: Self = Self::figment().extract()?;
        if let Ok(value) = std::env::var(INCLUDE_PATH_ENV) {
            config
                .frontend
                .include_paths
                .extend(split_include_path(&value));
        }
        config.mutate.validate()?;
        Ok(config)
    }

    /// Load `.env` from the current directory, then [`Self::load`].
    ///
    /// # Errors
    /// Same as [`Self::load`].
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment or add providers on top.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        let local_path = PathBuf::from(".cmut/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(
            Env::prefixed("CMUT_")
                .ignore(&["INCLUDE_PATH", "LOG"])
                .split("__"),
        )
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("cmut").join("config.toml"))
    }
}
