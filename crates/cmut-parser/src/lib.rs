//! # cmut-parser
//!
//! C front end for cmut, built on ast-grep's tree-sitter C grammar.
//!
//! - [`frontend`]: parse a file into a [`TranslationUnit`] handle exposing raw
//!   byte access, primary-file tests, diagnostics and resolved includes
//! - [`walker`]: traverse a unit and build the [`cmut_core::ScopeTree`]
//!
//! The front end performs no semantic analysis. Canonical and validity flags
//! are derived from the syntax tree during the walk.

mod c;
pub mod error;
pub mod frontend;
pub mod line_markers;
pub mod parser;
pub mod walker;

pub use error::ParserError;
pub use frontend::{Diagnostic, Frontend, FrontendOptions, Include, TranslationUnit};
pub use walker::{Collected, WalkStats, walk};
