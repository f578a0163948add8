//! Front-end setup options.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FrontendConfig {
    /// Extra `#include` search directories. `CMUT_INCLUDE_PATH` entries are
    /// appended after these.
    #[serde(default)]
    pub include_paths: Vec<PathBuf>,

    /// Refuse to start when an include directory does not exist.
    #[serde(default)]
    pub strict_include_paths: bool,

    /// Do not log parser diagnostics.
    #[serde(default)]
    pub suppress_diagnostics: bool,
}

/// Split a colon-separated search path, skipping empty entries.
#[must_use]
pub fn split_include_path(value: &str) -> Vec<PathBuf> {
    value
        .split(':')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(PathBuf::from)
        .collect()
}
