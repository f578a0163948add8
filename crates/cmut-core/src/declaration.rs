//! Declaration records and the retention rule applied while walking.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::location::SourceLoc;

/// Storage class of a declared variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageKind {
    /// Static storage duration: file-scope, or block-scope `static`/`extern`.
    Global,
    /// Automatic storage inside a block.
    Local,
    /// Function parameter.
    Parameter,
}

impl StorageKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Global => "global",
            Self::Local => "local",
            Self::Parameter => "parameter",
        }
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Syntactic position a declaration was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclSite {
    /// A declaration statement (file scope or block item).
    Statement,
    /// The initializer clause of a `for` header.
    ForInit,
    /// A function parameter list.
    ParameterList,
}

/// One variable declaration seen by the walker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    pub name: String,
    /// Type with qualifiers stripped and arrays folded, see [`crate::normalize_type`].
    pub normalized_type: String,
    /// Last byte of the declarator, before the terminator.
    pub end_location: SourceLoc,
    pub storage: StorageKind,
    pub site: DeclSite,
    pub is_canonical: bool,
    pub is_valid: bool,
    pub in_primary_file: bool,
}

impl Declaration {
    /// Whether this record passes the retention rule under `policy`.
    ///
    /// Redeclarations and erroneous declarations are never retained.
    /// Parameters and declarations from other files are retained only when
    /// the policy opts in.
    #[must_use]
    pub const fn is_retained(&self, policy: &RetentionPolicy) -> bool {
        self.is_canonical
            && self.is_valid
            && (policy.include_parameters || !matches!(self.storage, StorageKind::Parameter))
            && (policy.include_foreign || self.in_primary_file)
    }
}

/// Which otherwise-excluded declarations the walker keeps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionPolicy {
    #[serde(default)]
    pub include_parameters: bool,
    #[serde(default)]
    pub include_foreign: bool,
}
