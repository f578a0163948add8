use cmut_core::{CoreError, ScopeId};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RewriteError {
    /// A synthesized identifier is already taken in its scope.
    #[error("synthesized name `{name}` for `{second}` collides with `{first}` in scope {scope}")]
    NameCollision {
        name: String,
        scope: ScopeId,
        /// The identifier that already owns the name, or the declaration an
        /// earlier edit was synthesized from.
        first: String,
        /// The declaration whose edit was rejected.
        second: String,
    },
    #[error("rewrite context is already initialized")]
    AlreadyInitialized,
    #[error("rewrite context used before initialization")]
    NotInitialized,
    #[error(transparent)]
    Core(#[from] CoreError),
}
