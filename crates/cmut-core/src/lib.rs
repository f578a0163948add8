//! # cmut-core
//!
//! Core types shared across all cmut crates:
//! - Declaration records collected from a translation unit
//! - The arena-backed scope tree built by the walker
//! - Pending text edits produced by the planner
//! - Type string normalization for synthesized declarations
//! - Cross-cutting error types

pub mod declaration;
pub mod edit;
pub mod errors;
pub mod location;
pub mod normalize;
pub mod scope;

pub use declaration::{DeclSite, Declaration, RetentionPolicy, StorageKind};
pub use edit::{DECL_TERMINATOR, PendingEdit};
pub use errors::CoreError;
pub use location::SourceLoc;
pub use normalize::normalize_type;
pub use scope::{Scope, ScopeId, ScopeKind, ScopeTree, ScopeView};
