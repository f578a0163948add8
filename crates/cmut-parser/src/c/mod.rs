//! C syntax helpers: declaration specifiers and declarator chains.

mod declarators;
mod specifiers;

pub(crate) use declarators::{describe_declarator, is_declarator_kind};
pub(crate) use specifiers::{base_type, detect_storage_class, typedef_names};
