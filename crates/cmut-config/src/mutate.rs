//! Mutation strategy and retention settings.

use cmut_core::RetentionPolicy;
use cmut_rewrite::{CollisionPolicy, PlannerOptions, Strategy};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

fn default_alias_suffix() -> String {
    "_proxy".to_string()
}

fn default_unused_suffix() -> String {
    "_unused".to_string()
}

#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MutateConfig {
    #[serde(default)]
    pub strategy: Strategy,

    /// Appended to a global's name to form its alias.
    #[serde(default = "default_alias_suffix")]
    pub alias_suffix: String,

    /// Appended to a local's name to form the unused variable.
    #[serde(default = "default_unused_suffix")]
    pub unused_suffix: String,

    #[serde(default)]
    pub on_collision: CollisionPolicy,

    /// Treat function parameters as eligible declarations.
    #[serde(default)]
    pub include_parameters: bool,

    /// Treat declarations from included files as eligible.
    #[serde(default)]
    pub include_foreign: bool,
}

impl Default for MutateConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            alias_suffix: default_alias_suffix(),
            unused_suffix: default_unused_suffix(),
            on_collision: CollisionPolicy::default(),
            include_parameters: false,
            include_foreign: false,
        }
    }
}

impl MutateConfig {
    #[must_use]
    pub fn planner_options(&self) -> PlannerOptions {
        PlannerOptions {
            strategy: self.strategy,
            alias_suffix: self.alias_suffix.clone(),
            unused_suffix: self.unused_suffix.clone(),
            on_collision: self.on_collision,
        }
    }

    #[must_use]
    pub const fn retention(&self) -> RetentionPolicy {
        RetentionPolicy {
            include_parameters: self.include_parameters,
            include_foreign: self.include_foreign,
        }
    }

    /// Suffixes must keep synthesized names valid C identifiers.
    ///
    /// # Errors
    /// `InvalidValue` naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, suffix) in [
            ("mutate.alias_suffix", &self.alias_suffix),
            ("mutate.unused_suffix", &self.unused_suffix),
        ] {
            if suffix.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    reason: "must not be empty".to_string(),
                });
            }
            if !suffix.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_') {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    reason: format!("`{suffix}` is not a valid identifier suffix"),
                });
            }
        }
        Ok(())
    }
}
