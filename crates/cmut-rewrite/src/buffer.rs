//! Offset-keyed insertion buffer over an immutable original.

use std::collections::BTreeMap;

/// The original bytes plus every pending insertion, keyed by original offset.
///
/// Insertions never renumber each other: each one is stored against the
/// coordinate space of the unmodified input, and [`RewriteBuffer::render`]
/// splices them in during one ascending pass.
#[derive(Debug, Clone, Default)]
pub struct RewriteBuffer {
    original: Vec<u8>,
    inserts: BTreeMap<usize, Vec<String>>,
}

impl RewriteBuffer {
    #[must_use]
    pub fn new(original: impl Into<Vec<u8>>) -> Self {
        Self {
            original: original.into(),
            inserts: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn original(&self) -> &[u8] {
        &self.original
    }

    /// One past the first `terminator` at or after `anchor`.
    ///
    /// `None` when the buffer ends first. The scan is purely textual: a
    /// terminator inside a comment or string literal counts.
    #[must_use]
    pub fn insertion_point(&self, anchor: usize, terminator: u8) -> Option<usize> {
        let tail = self.original.get(anchor..)?;
        tail.iter()
            .position(|byte| *byte == terminator)
            .map(|pos| anchor + pos + 1)
    }

    /// Queue `text` at `offset`. Later insertions at the same offset land
    /// after earlier ones.
    ///
    /// Returns `false` when `offset` lies past the end of the buffer.
    pub fn insert(&mut self, offset: usize, text: impl Into<String>) -> bool {
        if offset > self.original.len() {
            return false;
        }
        self.inserts.entry(offset).or_default().push(text.into());
        true
    }

    #[must_use]
    pub fn is_modified(&self) -> bool {
        !self.inserts.is_empty()
    }

    /// Number of queued insertions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inserts.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inserts.is_empty()
    }

    /// The final text.
    #[must_use]
    pub fn render(&self) -> Vec<u8> {
        let extra: usize = self.inserts.values().flatten().map(String::len).sum();
        let mut out = Vec::with_capacity(self.original.len() + extra);
        let mut cursor = 0;
        for (offset, texts) in &self.inserts {
            out.extend_from_slice(&self.original[cursor..*offset]);
            for text in texts {
                out.extend_from_slice(text.as_bytes());
            }
            cursor = *offset;
        }
        out.extend_from_slice(&self.original[cursor..]);
        out
    }

    /// Consume the buffer, returning the original untouched when nothing was
    /// queued.
    #[must_use]
    pub fn into_rendered(self) -> Vec<u8> {
        if self.inserts.is_empty() {
            self.original
        } else {
            self.render()
        }
    }
}
