//! # cmut-rewrite
//!
//! Turns a collected scope tree into source insertions and applies them.
//!
//! - [`planner`] picks declarations from the tree and synthesizes the text
//!   to insert after each one, according to a [`Strategy`]
//! - [`buffer`] records insertions against the unmodified input and renders
//!   the result in a single pass
//! - [`context`] is the once-per-run owner of that buffer
//!
//! Every offset refers to the original input; applying one edit never moves
//! another.

pub mod buffer;
pub mod context;
pub mod error;
pub mod planner;

pub use buffer::RewriteBuffer;
pub use context::{ApplyReport, RewriteContext, RewriteOutcome};
pub use error::RewriteError;
pub use planner::{CollisionPolicy, PlannerOptions, Strategy, plan};
