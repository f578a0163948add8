//! Insertion planning.
//!
//! A [`Strategy`] decides which retained declarations get an edit and what
//! text is synthesized for each. The planner walks scopes in pre-order so the
//! returned edits follow source order within each scope, and rejects any
//! synthesized name that is already taken in the scope receiving it.

use std::collections::HashMap;

use cmut_core::{
    CoreError, DeclSite, Declaration, PendingEdit, Scope, ScopeId, ScopeTree, StorageKind,
};
use serde::{Deserialize, Serialize};

use crate::error::RewriteError;

/// What to insert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// After every global, a pointer alias initialized with its address.
    #[default]
    AliasGlobals,
    /// After the first statement-level local of each scope, an unused
    /// variable of the same type.
    UnusedLocals,
}

impl Strategy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AliasGlobals => "alias-globals",
            Self::UnusedLocals => "unused-locals",
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to do when a synthesized name is already taken.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CollisionPolicy {
    /// Abort planning with [`RewriteError::NameCollision`].
    #[default]
    Fail,
    /// Drop the colliding edit and keep going.
    Skip,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerOptions {
    pub strategy: Strategy,
    pub alias_suffix: String,
    pub unused_suffix: String,
    pub on_collision: CollisionPolicy,
}

impl Default for PlannerOptions {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            alias_suffix: "_proxy".to_string(),
            unused_suffix: "_unused".to_string(),
            on_collision: CollisionPolicy::default(),
        }
    }
}

/// One edit the strategy wants, before the collision check.
struct Candidate<'t> {
    source: &'t Declaration,
    name: String,
    text: String,
}

/// Plan the edits for every scope of `tree`.
///
/// # Errors
/// `NameCollision` when a synthesized name is taken and the policy is
/// [`CollisionPolicy::Fail`].
pub fn plan(tree: &ScopeTree, options: &PlannerOptions) -> Result<Vec<PendingEdit>, RewriteError> {
    let mut edits = Vec::new();
    for id in tree.preorder() {
        let scope = tree.get(id).ok_or(CoreError::UnknownScope(id))?;
        let candidates = match options.strategy {
            Strategy::AliasGlobals => alias_globals(scope, &options.alias_suffix),
            Strategy::UnusedLocals => unused_locals(scope, &options.unused_suffix),
        };
        plan_scope(id, scope, candidates, options.on_collision, &mut edits)?;
    }
    tracing::debug!(strategy = %options.strategy, edits = edits.len(), "planned edits");
    Ok(edits)
}

fn plan_scope(
    id: ScopeId,
    scope: &Scope,
    candidates: Vec<Candidate<'_>>,
    on_collision: CollisionPolicy,
    edits: &mut Vec<PendingEdit>,
) -> Result<(), RewriteError> {
    // synthesized name -> declaration it came from
    let mut synthesized: HashMap<String, &str> = HashMap::new();
    for candidate in candidates {
        let owner = if scope.declares(&candidate.name) {
            Some(candidate.name.clone())
        } else {
            synthesized.get(candidate.name.as_str()).map(ToString::to_string)
        };

        if let Some(first) = owner {
            let error = RewriteError::NameCollision {
                name: candidate.name,
                scope: id,
                first,
                second: candidate.source.name.clone(),
            };
            match on_collision {
                CollisionPolicy::Fail => return Err(error),
                CollisionPolicy::Skip => {
                    tracing::warn!(%error, "skipping edit");
                    continue;
                }
            }
        }

        synthesized.insert(candidate.name, &candidate.source.name);
        edits.push(PendingEdit::after_declaration(
            candidate.source.end_location,
            candidate.text,
        ));
    }
    Ok(())
}

fn alias_globals<'t>(scope: &'t Scope, suffix: &str) -> Vec<Candidate<'t>> {
    scope
        .declarations()
        .iter()
        .filter(|decl| decl.storage == StorageKind::Global)
        .map(|decl| {
            let name = format!("{}{suffix}", decl.name);
            let text = format!("{} *{name} = &{};", decl.normalized_type, decl.name);
            Candidate {
                source: decl,
                name,
                text,
            }
        })
        .collect()
}

fn unused_locals<'t>(scope: &'t Scope, suffix: &str) -> Vec<Candidate<'t>> {
    scope
        .declarations()
        .iter()
        .find(|decl| decl.storage == StorageKind::Local && decl.site == DeclSite::Statement)
        .map(|decl| {
            let name = format!("{}{suffix}", decl.name);
            let text = format!("{} {name};", decl.normalized_type);
            Candidate {
                source: decl,
                name,
                text,
            }
        })
        .into_iter()
        .collect()
}
