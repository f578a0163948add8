//! Planned text insertions.

use serde::{Deserialize, Serialize};

use crate::location::SourceLoc;

/// The C declaration terminator.
pub const DECL_TERMINATOR: u8 = b';';

/// One text insertion planned against the original buffer.
///
/// The insertion point is one byte past the first `terminator` at or after
/// `anchor`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingEdit {
    pub anchor: SourceLoc,
    pub text: String,
    pub terminator: u8,
}

impl PendingEdit {
    /// An insertion after the declaration ending at `anchor`.
    #[must_use]
    pub fn after_declaration(anchor: SourceLoc, text: impl Into<String>) -> Self {
        Self {
            anchor,
            text: text.into(),
            terminator: DECL_TERMINATOR,
        }
    }
}
