//! Arena-backed lexical scope tree.
//!
//! Scopes live in one `Vec` and refer to each other through [`ScopeId`]
//! indices. The root is always the translation unit. The walker opens a child
//! when it enters a block-structuring construct and freezes it on exit;
//! a frozen scope accepts no further declarations or children.

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

use crate::declaration::{DeclSite, Declaration};
use crate::errors::CoreError;

/// Stable handle to a scope inside a [`ScopeTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ScopeId(usize);

impl ScopeId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Construct that introduced a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeKind {
    TranslationUnit,
    Function,
    Loop,
    Then,
    Else,
    Case,
    Block,
}

/// One lexical region and the declarations retained in it.
#[derive(Debug, Clone)]
pub struct Scope {
    pub kind: ScopeKind,
    parent: Option<ScopeId>,
    children: Vec<ScopeId>,
    declarations: Vec<Declaration>,
    /// Every identifier declared here, retained or not.
    names: BTreeSet<String>,
    frozen: bool,
}

impl Scope {
    const fn new(kind: ScopeKind, parent: Option<ScopeId>) -> Self {
        Self {
            kind,
            parent,
            children: Vec::new(),
            declarations: Vec::new(),
            names: BTreeSet::new(),
            frozen: false,
        }
    }

    #[must_use]
    pub const fn parent(&self) -> Option<ScopeId> {
        self.parent
    }

    #[must_use]
    pub fn children(&self) -> &[ScopeId] {
        &self.children
    }

    /// Retained declarations in source order.
    #[must_use]
    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    #[must_use]
    pub fn declares(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    #[must_use]
    pub const fn names(&self) -> &BTreeSet<String> {
        &self.names
    }

    #[must_use]
    pub const fn is_frozen(&self) -> bool {
        self.frozen
    }
}

/// Single-rooted tree of scopes.
#[derive(Debug, Clone)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeTree {
    const ROOT: ScopeId = ScopeId(0);

    /// A tree holding only the translation-unit scope.
    #[must_use]
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::new(ScopeKind::TranslationUnit, None)],
        }
    }

    #[must_use]
    pub const fn root(&self) -> ScopeId {
        Self::ROOT
    }

    /// Number of scopes, root included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: ScopeId) -> Option<&Scope> {
        self.scopes.get(id.0)
    }

    fn get_mut(&mut self, id: ScopeId) -> Result<&mut Scope, CoreError> {
        self.scopes.get_mut(id.0).ok_or(CoreError::UnknownScope(id))
    }

    fn open_mut(&mut self, id: ScopeId) -> Result<&mut Scope, CoreError> {
        let scope = self.get_mut(id)?;
        if scope.frozen {
            return Err(CoreError::ScopeFrozen(id));
        }
        Ok(scope)
    }

    /// Open a new child of `parent`.
    ///
    /// # Errors
    /// `UnknownScope` for a foreign handle, `ScopeFrozen` if `parent` was
    /// already exited.
    pub fn open(&mut self, parent: ScopeId, kind: ScopeKind) -> Result<ScopeId, CoreError> {
        let id = ScopeId(self.scopes.len());
        self.open_mut(parent)?.children.push(id);
        self.scopes.push(Scope::new(kind, Some(parent)));
        Ok(id)
    }

    /// Mark `id` as exited.
    ///
    /// # Errors
    /// `UnknownScope` for a foreign handle.
    pub fn freeze(&mut self, id: ScopeId) -> Result<(), CoreError> {
        self.get_mut(id)?.frozen = true;
        Ok(())
    }

    /// Record an identifier as declared in `id`.
    ///
    /// Returns `true` when the name was not declared there before.
    ///
    /// # Errors
    /// `UnknownScope` or `ScopeFrozen`.
    pub fn bind_name(&mut self, id: ScopeId, name: &str) -> Result<bool, CoreError> {
        Ok(self.open_mut(id)?.names.insert(name.to_string()))
    }

    /// Append a retained declaration to `id`.
    ///
    /// A `for`-header declaration is filed here but its name belongs to the
    /// loop, so it is not bound in `id`.
    ///
    /// # Errors
    /// `UnknownScope` or `ScopeFrozen`.
    pub fn declare(&mut self, id: ScopeId, decl: Declaration) -> Result<(), CoreError> {
        let scope = self.open_mut(id)?;
        if decl.site != DeclSite::ForInit {
            scope.names.insert(decl.name.clone());
        }
        scope.declarations.push(decl);
        Ok(())
    }

    /// Scope ids in pre-order (parents before children, siblings in source
    /// order).
    #[must_use]
    pub fn preorder(&self) -> Vec<ScopeId> {
        let mut order = Vec::with_capacity(self.scopes.len());
        let mut stack = vec![Self::ROOT];
        while let Some(id) = stack.pop() {
            order.push(id);
            if let Some(scope) = self.get(id) {
                stack.extend(scope.children.iter().rev().copied());
            }
        }
        order
    }

    /// Every retained declaration with its scope, in pre-order.
    pub fn declarations(&self) -> impl Iterator<Item = (ScopeId, &Declaration)> {
        self.preorder().into_iter().flat_map(move |id| {
            self.scopes[id.0]
                .declarations
                .iter()
                .map(move |decl| (id, decl))
        })
    }

    /// Nesting depth of `id`; the root is 0.
    #[must_use]
    pub fn depth(&self, id: ScopeId) -> usize {
        let mut depth = 0;
        let mut cursor = self.get(id).and_then(Scope::parent);
        while let Some(parent) = cursor {
            depth += 1;
            cursor = self.get(parent).and_then(Scope::parent);
        }
        depth
    }

    /// Owned nested view for reporting.
    #[must_use]
    pub fn view(&self) -> ScopeView {
        self.view_of(Self::ROOT)
    }

    fn view_of(&self, id: ScopeId) -> ScopeView {
        let scope = &self.scopes[id.0];
        ScopeView {
            id,
            kind: scope.kind,
            declarations: scope.declarations.clone(),
            children: scope.children.iter().map(|c| self.view_of(*c)).collect(),
        }
    }
}

impl std::ops::Index<ScopeId> for ScopeTree {
    type Output = Scope;

    fn index(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0]
    }
}

/// Nested, serializable snapshot of a scope tree.
#[derive(Debug, Clone, Serialize)]
pub struct ScopeView {
    pub id: ScopeId,
    pub kind: ScopeKind,
    pub declarations: Vec<Declaration>,
    pub children: Vec<Self>,
}
