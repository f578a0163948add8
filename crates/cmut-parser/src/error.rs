//! Parser error types for cmut-parser.

use std::path::PathBuf;

/// Errors that can occur while setting up the front end or loading input.
#[derive(Debug, thiserror::Error)]
pub enum ParserError {
    #[error("Language not supported: {0}")]
    UnsupportedLanguage(String),

    #[error("Input {path} is not valid UTF-8")]
    NotUtf8 { path: PathBuf },

    #[error("Include path {0} is not a directory")]
    IncludePath(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
