//! The per-run rewrite context.
//!
//! The driver creates one empty context, binds it to the translation unit
//! with [`RewriteContext::initialize`], applies the planned edits and then
//! consumes it with [`RewriteContext::finish`]. A context is bound to one
//! buffer's coordinate space and cannot be rebound.

use cmut_core::PendingEdit;
use cmut_parser::TranslationUnit;
use serde::Serialize;

use crate::buffer::RewriteBuffer;
use crate::error::RewriteError;

/// Counts from one [`RewriteContext::apply`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ApplyReport {
    pub applied: usize,
    /// No terminator between the anchor and the end of the buffer.
    pub dropped: usize,
}

/// The final text, tagged with whether any edit was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewriteOutcome {
    Changed(Vec<u8>),
    /// Byte-identical to the input.
    Unchanged(Vec<u8>),
}

impl RewriteOutcome {
    #[must_use]
    pub const fn is_changed(&self) -> bool {
        matches!(self, Self::Changed(_))
    }

    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        match self {
            Self::Changed(bytes) | Self::Unchanged(bytes) => bytes,
        }
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Self::Changed(bytes) | Self::Unchanged(bytes) => bytes,
        }
    }

    /// Status line for the user.
    #[must_use]
    pub const fn status(&self) -> &'static str {
        match self {
            Self::Changed(_) => "file changed",
            Self::Unchanged(_) => "file unchanged",
        }
    }
}

#[derive(Debug, Default)]
pub struct RewriteContext {
    buffer: Option<RewriteBuffer>,
}

impl RewriteContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.buffer.is_some()
    }

    /// Bind the context to the original text of `unit`.
    ///
    /// # Errors
    /// `AlreadyInitialized` on every call after the first.
    pub fn initialize(&mut self, unit: &TranslationUnit) -> Result<(), RewriteError> {
        self.initialize_with(unit.source().as_bytes())
    }

    /// Bind the context to raw bytes.
    ///
    /// # Errors
    /// `AlreadyInitialized` on every call after the first.
    pub fn initialize_with(&mut self, original: &[u8]) -> Result<(), RewriteError> {
        if self.buffer.is_some() {
            return Err(RewriteError::AlreadyInitialized);
        }
        self.buffer = Some(RewriteBuffer::new(original));
        Ok(())
    }

    /// Apply `edits` against the original buffer. The order of `edits` does
    /// not affect the result except for edits resolving to the same
    /// insertion point, which keep their relative order.
    ///
    /// # Errors
    /// `NotInitialized` before [`RewriteContext::initialize`].
    pub fn apply(&mut self, edits: &[PendingEdit]) -> Result<ApplyReport, RewriteError> {
        let buffer = self.buffer.as_mut().ok_or(RewriteError::NotInitialized)?;
        let mut report = ApplyReport::default();
        for edit in edits {
            let inserted = buffer
                .insertion_point(edit.anchor.offset, edit.terminator)
                .is_some_and(|offset| buffer.insert(offset, edit.text.as_str()));
            if inserted {
                report.applied += 1;
            } else {
                tracing::warn!(
                    anchor = %edit.anchor,
                    terminator = %char::from(edit.terminator),
                    "no terminator after anchor; dropping edit"
                );
                report.dropped += 1;
            }
        }
        tracing::debug!(applied = report.applied, dropped = report.dropped, "applied edits");
        Ok(report)
    }

    /// The patched text, or the original when nothing was applied.
    ///
    /// # Errors
    /// `NotInitialized` before [`RewriteContext::initialize`].
    pub fn finish(self) -> Result<RewriteOutcome, RewriteError> {
        let buffer = self.buffer.ok_or(RewriteError::NotInitialized)?;
        Ok(if buffer.is_modified() {
            RewriteOutcome::Changed(buffer.into_rendered())
        } else {
            RewriteOutcome::Unchanged(buffer.into_rendered())
        })
    }
}
