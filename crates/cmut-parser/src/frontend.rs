//! Front-end setup and the parsed translation unit handle.

use std::path::{Path, PathBuf};

use ast_grep_language::SupportLang;
use cmut_core::SourceLoc;
use serde::Serialize;

use crate::error::ParserError;
use crate::line_markers::FileMap;
use crate::parser::{AstTree, CNode, detect_language, parse_source};

/// Front-end configuration, fixed for the lifetime of a [`Frontend`].
#[derive(Debug, Clone, Default)]
pub struct FrontendOptions {
    /// Extra directories searched for `#include` resolution.
    pub include_paths: Vec<PathBuf>,
    /// Fail setup when an include directory does not exist.
    pub strict_include_paths: bool,
    /// Do not log syntax diagnostics.
    pub suppress_diagnostics: bool,
}

/// A syntax problem reported by the parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub location: SourceLoc,
    pub message: String,
}

/// An `#include` directive of the primary file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Include {
    pub spelled: String,
    /// `<...>` form.
    pub system: bool,
    pub line: u32,
    pub resolved: Option<PathBuf>,
}

/// Configured C front end.
#[derive(Debug, Clone)]
pub struct Frontend {
    options: FrontendOptions,
}

impl Frontend {
    /// Set up the front end.
    ///
    /// # Errors
    /// `IncludePath` when `strict_include_paths` is set and a configured
    /// include path is not a directory.
    pub fn new(options: FrontendOptions) -> Result<Self, ParserError> {
        for dir in &options.include_paths {
            if !dir.is_dir() {
                if options.strict_include_paths {
                    return Err(ParserError::IncludePath(dir.clone()));
                }
                tracing::debug!(path = %dir.display(), "include path is not a directory");
            }
        }
        Ok(Self { options })
    }

    #[must_use]
    pub const fn options(&self) -> &FrontendOptions {
        &self.options
    }

    /// Read and parse a C file.
    ///
    /// # Errors
    /// `UnsupportedLanguage` for non-C extensions, `Io` when the file cannot
    /// be read, `NotUtf8` for undecodable input.
    pub fn parse_file(&self, path: &Path) -> Result<TranslationUnit, ParserError> {
        let display = path.to_string_lossy();
        if detect_language(&display).is_none() {
            return Err(ParserError::UnsupportedLanguage(display.into_owned()));
        }
        let bytes = std::fs::read(path)?;
        let source = String::from_utf8(bytes).map_err(|_| ParserError::NotUtf8 {
            path: path.to_path_buf(),
        })?;
        Ok(self.parse(path, source))
    }

    /// Parse already-loaded source text attributed to `path`.
    #[must_use]
    pub fn parse(&self, path: impl Into<PathBuf>, source: String) -> TranslationUnit {
        let path = path.into();
        let tree = parse_source(&source, SupportLang::C);
        let files = FileMap::scan(&source, &path.to_string_lossy());
        let line_starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();

        let mut unit = TranslationUnit {
            path,
            source,
            tree,
            files,
            line_starts,
            diagnostics: Vec::new(),
            includes: Vec::new(),
        };
        unit.diagnostics = collect_diagnostics(&unit);
        unit.includes = self.resolve_includes(&unit);

        if !self.options.suppress_diagnostics {
            for diag in &unit.diagnostics {
                tracing::warn!(
                    file = %unit.path.display(),
                    location = %diag.location,
                    "{}",
                    diag.message
                );
            }
        }
        tracing::debug!(
            file = %unit.path.display(),
            bytes = unit.source.len(),
            diagnostics = unit.diagnostics.len(),
            includes = unit.includes.len(),
            "parsed translation unit"
        );
        unit
    }

    fn resolve_includes(&self, unit: &TranslationUnit) -> Vec<Include> {
        let mut nodes = Vec::new();
        collect_kind(&unit.root(), "preproc_include", &mut nodes);

        let local_dir = unit.path.parent().map(Path::to_path_buf);
        nodes
            .iter()
            .filter(|node| unit.is_primary(unit.loc(node.range().start)))
            .filter_map(|node| {
                let path_node = node.field("path")?;
                let raw = path_node.text();
                let system = path_node.kind().as_ref() == "system_lib_string";
                let spelled = raw.trim_matches(|c: char| matches!(c, '"' | '<' | '>')).to_string();

                let local = if system { None } else { local_dir.as_deref() };
                let resolved = local
                    .into_iter()
                    .chain(self.options.include_paths.iter().map(PathBuf::as_path))
                    .map(|dir| dir.join(&spelled))
                    .find(|candidate| candidate.is_file());
                if resolved.is_none() {
                    tracing::debug!(include = %spelled, "include not found on search path");
                }

                Some(Include {
                    spelled,
                    system,
                    line: unit.loc(node.range().start).line,
                    resolved,
                })
            })
            .collect()
    }
}

/// Parsed-program handle for one input file.
///
/// Owns the original text; every offset handed out refers to it unmodified.
pub struct TranslationUnit {
    path: PathBuf,
    source: String,
    tree: AstTree,
    files: FileMap,
    line_starts: Vec<usize>,
    diagnostics: Vec<Diagnostic>,
    includes: Vec<Include>,
}

impl std::fmt::Debug for TranslationUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslationUnit")
            .field("path", &self.path)
            .field("bytes", &self.source.len())
            .field("diagnostics", &self.diagnostics.len())
            .finish_non_exhaustive()
    }
}

impl TranslationUnit {
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The original buffer.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Root `translation_unit` node.
    #[must_use]
    pub fn root(&self) -> CNode<'_> {
        self.tree.root()
    }

    /// Raw byte of the original buffer.
    #[must_use]
    pub fn char_at(&self, offset: usize) -> Option<u8> {
        self.source.as_bytes().get(offset).copied()
    }

    /// Location handle for a byte offset.
    #[must_use]
    pub fn loc(&self, offset: usize) -> SourceLoc {
        let offset = offset.min(self.source.len());
        let line_idx = self.line_starts.partition_point(|start| *start <= offset) - 1;
        let line = u32::try_from(line_idx + 1).unwrap_or(u32::MAX);
        let column = u32::try_from(offset - self.line_starts[line_idx] + 1).unwrap_or(u32::MAX);
        SourceLoc::new(offset, line, column)
    }

    /// Whether `loc` lies in the primary input file rather than in text
    /// pulled in from another file.
    #[must_use]
    pub fn is_primary(&self, loc: SourceLoc) -> bool {
        self.files.is_primary(loc.offset)
    }

    #[must_use]
    pub const fn files(&self) -> &FileMap {
        &self.files
    }

    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    #[must_use]
    pub fn includes(&self) -> &[Include] {
        &self.includes
    }
}

/// A zero-width token is one the parser inserted to recover.
pub(crate) fn is_missing(node: &CNode<'_>) -> bool {
    node.range().is_empty() && node.kind().as_ref() != "translation_unit"
}

pub(crate) fn has_error(node: &CNode<'_>) -> bool {
    node.kind().as_ref() == "ERROR" || is_missing(node) || node.children().any(|c| has_error(&c))
}

fn collect_kind<'r>(node: &CNode<'r>, kind: &str, out: &mut Vec<CNode<'r>>) {
    for child in node.children() {
        if child.kind().as_ref() == kind {
            out.push(child);
        } else {
            collect_kind(&child, kind, out);
        }
    }
}

fn collect_diagnostics(unit: &TranslationUnit) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    visit_errors(&unit.root(), unit, &mut diagnostics);
    diagnostics
}

fn visit_errors(node: &CNode<'_>, unit: &TranslationUnit, out: &mut Vec<Diagnostic>) {
    for child in node.children() {
        if child.kind().as_ref() == "ERROR" {
            let snippet: String = child
                .text()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
                .chars()
                .take(40)
                .collect();
            out.push(Diagnostic {
                location: unit.loc(child.range().start),
                message: format!("syntax error near `{snippet}`"),
            });
        } else if is_missing(&child) {
            out.push(Diagnostic {
                location: unit.loc(child.range().start),
                message: format!("missing `{}`", child.kind()),
            });
        } else {
            visit_errors(&child, unit, out);
        }
    }
}
