//! Cross-cutting error types for cmut.
//!
//! Domain-specific errors (`ParserError`, `RewriteError`, `ConfigError`) live
//! in their respective crates. They converge into `anyhow` in `cmut-cli`.

use thiserror::Error;

use crate::scope::ScopeId;

/// Errors raised by the core data structures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// A scope handle that does not belong to this tree.
    #[error("Unknown scope: {0}")]
    UnknownScope(ScopeId),

    /// A declaration or child was added to a scope after the walker left it.
    #[error("Scope {0} is frozen")]
    ScopeFrozen(ScopeId),
}
