//! File attribution for preprocessed input.
//!
//! Preprocessor output carries line markers such as `# 12 "list.h" 1` or
//! `#line 40 "main.c"`. Every byte after a marker belongs to the file the
//! marker names, until the next marker. Bytes before the first marker belong
//! to the primary file.

/// Byte ranges of the buffer attributed to source files.
#[derive(Debug, Clone, Default)]
pub struct FileMap {
    primary: String,
    /// `(offset where the attribution starts, file name)`, ascending.
    markers: Vec<(usize, String)>,
}

impl FileMap {
    /// Scan `source` for line markers.
    ///
    /// The primary file is the one named by the first marker when present,
    /// `fallback` otherwise.
    #[must_use]
    pub fn scan(source: &str, fallback: &str) -> Self {
        let mut markers = Vec::new();
        let mut line_start = 0;
        for line in source.split_inclusive('\n') {
            if let Some(file) = parse_marker(line) {
                markers.push((line_start + line.len(), file.to_string()));
            }
            line_start += line.len();
        }
        let primary = markers
            .first()
            .map_or_else(|| fallback.to_string(), |(_, file)| file.clone());
        Self { primary, markers }
    }

    #[must_use]
    pub fn primary(&self) -> &str {
        &self.primary
    }

    #[must_use]
    pub fn has_markers(&self) -> bool {
        !self.markers.is_empty()
    }

    /// File the byte at `offset` belongs to.
    #[must_use]
    pub fn file_at(&self, offset: usize) -> &str {
        let idx = self.markers.partition_point(|(start, _)| *start <= offset);
        if idx == 0 {
            &self.primary
        } else {
            &self.markers[idx - 1].1
        }
    }

    #[must_use]
    pub fn is_primary(&self, offset: usize) -> bool {
        self.file_at(offset) == self.primary
    }
}

/// Parse `# <digits> "<file>" ...` or `#line <digits> "<file>"`.
fn parse_marker(line: &str) -> Option<&str> {
    let rest = line.trim_start().strip_prefix('#')?.trim_start();
    let rest = match rest.strip_prefix("line") {
        Some(after) if after.starts_with(|c: char| c.is_ascii_whitespace()) => after.trim_start(),
        Some(_) => return None,
        None => rest,
    };
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let rest = rest[digits..].trim_start().strip_prefix('"')?;
    let end = rest.find('"')?;
    Some(&rest[..end])
}
