//! Scope-aware traversal of a parsed translation unit.
//!
//! The walker keeps a stack of open scopes mirroring the block structure it
//! is inside of:
//! - a function definition opens one `Function` scope; parameters and the
//!   body's block items land there
//! - `for`/`while`/`do` open a `Loop` scope for the body only; the header is
//!   walked in the enclosing scope
//! - `if` opens a `Then` scope and an `Else` scope, even for single-statement
//!   branches; the condition stays in the enclosing scope
//! - every `case`/`default` arm of a `switch` opens its own `Case` scope
//! - any other nested `{ ... }` opens a `Block` scope
//!
//! A compound statement that is the body of one of these constructs, braced
//! case arms included, does not open a second scope.
//!
//! Every declarator is bound by name in the innermost scope, except names
//! declared in a `for` header: those are filed in the enclosing scope but
//! belong to the loop, so they are checked against the loop's own name set. Only records
//! passing [`Declaration::is_retained`] are stored. Declarators whose end or
//! type cannot be resolved are skipped. The walk never fails.

use cmut_core::{
    DeclSite, Declaration, RetentionPolicy, ScopeId, ScopeKind, ScopeTree, StorageKind,
    normalize_type,
};
use serde::Serialize;
use std::collections::HashSet;

use crate::c::{base_type, describe_declarator, detect_storage_class, is_declarator_kind, typedef_names};
use crate::frontend::{TranslationUnit, has_error};
use crate::parser::CNode;

/// Per-walk counters, reported by the driver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WalkStats {
    /// Object declarators seen.
    pub declarators: usize,
    pub retained: usize,
    pub redeclared: usize,
    pub invalid: usize,
    /// No end position or no spellable type.
    pub unresolved: usize,
    /// Parameters or foreign-file declarations left out by policy.
    pub excluded: usize,
}

/// Result of walking one translation unit.
#[derive(Debug, Clone)]
pub struct Collected {
    pub tree: ScopeTree,
    pub stats: WalkStats,
}

/// Build the scope tree of `unit`.
#[must_use]
pub fn walk(unit: &TranslationUnit, policy: RetentionPolicy) -> Collected {
    let mut walker = ScopeWalker::new(unit, policy);
    walker.visit_children(&unit.root());
    let root = walker.tree.root();
    if let Err(error) = walker.tree.freeze(root) {
        tracing::debug!(%error, "failed to freeze root scope");
    }
    tracing::debug!(
        scopes = walker.tree.len(),
        retained = walker.stats.retained,
        declarators = walker.stats.declarators,
        "collected declarations"
    );
    Collected {
        tree: walker.tree,
        stats: walker.stats,
    }
}

struct ScopeWalker<'u> {
    unit: &'u TranslationUnit,
    policy: RetentionPolicy,
    tree: ScopeTree,
    stack: Vec<ScopeId>,
    stats: WalkStats,
    /// Depth of enclosing `ERROR` nodes.
    error_depth: usize,
    /// Names declared by each enclosing loop header.
    loop_headers: Vec<HashSet<String>>,
}

impl<'u> ScopeWalker<'u> {
    fn new(unit: &'u TranslationUnit, policy: RetentionPolicy) -> Self {
        let tree = ScopeTree::new();
        let root = tree.root();
        Self {
            unit,
            policy,
            tree,
            stack: vec![root],
            stats: WalkStats::default(),
            error_depth: 0,
            loop_headers: Vec::new(),
        }
    }

    fn current(&self) -> ScopeId {
        self.stack.last().copied().unwrap_or_else(|| self.tree.root())
    }

    /// Run `body` inside a fresh child of the current scope.
    fn in_scope(&mut self, kind: ScopeKind, body: impl FnOnce(&mut Self)) {
        let parent = self.current();
        match self.tree.open(parent, kind) {
            Ok(id) => {
                self.stack.push(id);
                body(self);
                self.stack.pop();
                if let Err(error) = self.tree.freeze(id) {
                    tracing::debug!(%error, "failed to freeze scope");
                }
            }
            Err(error) => {
                tracing::debug!(%error, ?kind, "cannot open scope; walking in parent");
                body(self);
            }
        }
    }

    fn bind(&mut self, name: &str) -> bool {
        let scope = self.current();
        match self.tree.bind_name(scope, name) {
            Ok(fresh) => fresh,
            Err(error) => {
                tracing::debug!(%error, name, "cannot bind name");
                false
            }
        }
    }

    fn visit_children(&mut self, node: &CNode<'u>) {
        for child in node.children() {
            self.visit(&child);
        }
    }

    fn visit(&mut self, node: &CNode<'u>) {
        match node.kind().as_ref() {
            "function_definition" => self.visit_function(node),
            "declaration" => self.visit_declaration(node, DeclSite::Statement),
            "type_definition" => self.visit_type_definition(node),
            "for_statement" | "while_statement" | "do_statement" => self.visit_loop(node),
            "if_statement" => self.visit_if(node),
            "switch_statement" => self.visit_switch(node),
            "case_statement" => self.visit_case(node),
            "compound_statement" => self.in_scope(ScopeKind::Block, |w| w.visit_children(node)),
            "enumerator" => {
                if let Some(name) = node.field("name") {
                    self.bind(&name.text());
                }
            }
            "ERROR" => {
                self.error_depth += 1;
                self.visit_children(node);
                self.error_depth -= 1;
            }
            _ => self.visit_children(node),
        }
    }

    /// Walk the body of a construct that already opened its scope.
    fn visit_body(&mut self, body: &CNode<'u>) {
        if body.kind().as_ref() == "compound_statement" {
            self.visit_children(body);
        } else {
            self.visit(body);
        }
    }

    fn visit_function(&mut self, node: &CNode<'u>) {
        let Some(declarator) = node.field("declarator") else {
            self.visit_children(node);
            return;
        };
        if let Some(shape) = describe_declarator(&declarator) {
            self.bind(&shape.name);
        }
        if let Some(ty) = node.field("type") {
            self.visit_type_specifier(&ty);
        }
        let params = find_parameter_list(&declarator);
        let body = node.field("body");

        self.in_scope(ScopeKind::Function, |w| {
            if let Some(params) = params {
                for param in params.children() {
                    if param.kind().as_ref() == "parameter_declaration" {
                        w.visit_parameter(&param);
                    }
                }
            }
            if let Some(body) = body {
                w.visit_body(&body);
            }
        });
    }

    fn visit_loop(&mut self, node: &CNode<'u>) {
        let body_range = node.field("body").map(|b| b.range());
        self.loop_headers.push(HashSet::new());
        for child in node.children() {
            if Some(child.range()) == body_range {
                self.in_scope(ScopeKind::Loop, |w| w.visit_body(&child));
            } else if child.kind().as_ref() == "declaration" {
                self.visit_declaration(&child, DeclSite::ForInit);
            } else {
                self.visit(&child);
            }
        }
        self.loop_headers.pop();
    }

    fn visit_if(&mut self, node: &CNode<'u>) {
        let then_range = node.field("consequence").map(|n| n.range());
        let else_range = node.field("alternative").map(|n| n.range());
        for child in node.children() {
            let range = Some(child.range());
            if range == then_range {
                self.in_scope(ScopeKind::Then, |w| w.visit_body(&child));
            } else if range == else_range {
                let branch = if child.kind().as_ref() == "else_clause" {
                    child
                        .children()
                        .find(|c| !matches!(c.kind().as_ref(), "else" | "comment"))
                } else {
                    Some(child.clone())
                };
                if let Some(branch) = branch {
                    self.in_scope(ScopeKind::Else, |w| w.visit_body(&branch));
                }
            } else {
                self.visit(&child);
            }
        }
    }

    fn visit_switch(&mut self, node: &CNode<'u>) {
        let body_range = node.field("body").map(|b| b.range());
        for child in node.children() {
            if Some(child.range()) == body_range && child.kind().as_ref() == "compound_statement" {
                // Arms get their own scopes; the switch body itself does not.
                self.visit_children(&child);
            } else {
                self.visit(&child);
            }
        }
    }

    fn visit_case(&mut self, node: &CNode<'u>) {
        let value_range = node.field("value").map(|v| v.range());
        self.in_scope(ScopeKind::Case, |w| {
            for child in node.children() {
                if Some(child.range()) != value_range {
                    w.visit_body(&child);
                }
            }
        });
    }

    fn visit_type_definition(&mut self, node: &CNode<'u>) {
        if let Some(ty) = node.field("type") {
            self.visit_type_specifier(&ty);
        }
        for name in typedef_names(node) {
            self.bind(&name);
        }
    }

    /// Enumerators declared inline in a type specifier are ordinary
    /// identifiers of the enclosing scope.
    fn visit_type_specifier(&mut self, ty: &CNode<'u>) {
        if matches!(
            ty.kind().as_ref(),
            "enum_specifier" | "struct_specifier" | "union_specifier"
        ) {
            self.visit_children(ty);
        }
    }

    fn visit_declaration(&mut self, node: &CNode<'u>, site: DeclSite) {
        let type_node = node.field("type");
        if let Some(ty) = &type_node {
            self.visit_type_specifier(ty);
        }
        let type_range = type_node.map(|t| t.range());

        let storage_class = detect_storage_class(node);
        let storage = if self.stack.len() <= 1 || storage_class.is_static_duration() {
            StorageKind::Global
        } else {
            StorageKind::Local
        };
        let is_valid = self.error_depth == 0 && !has_error(node);
        let base = base_type(node);

        for child in node.children() {
            if Some(child.range()) == type_range || !is_declarator_kind(child.kind().as_ref()) {
                continue;
            }
            self.record(&child, base.as_deref(), storage, site, is_valid);
        }
    }

    fn visit_parameter(&mut self, node: &CNode<'u>) {
        let Some(declarator) = node.field("declarator") else {
            return;
        };
        let is_valid = self.error_depth == 0 && !has_error(node);
        let base = base_type(node);
        self.record(
            &declarator,
            base.as_deref(),
            StorageKind::Parameter,
            DeclSite::ParameterList,
            is_valid,
        );
    }

    /// Bind one declarator and store it if it passes the retention rule.
    fn record(
        &mut self,
        declarator: &CNode<'u>,
        base: Option<&str>,
        storage: StorageKind,
        site: DeclSite,
        is_valid: bool,
    ) {
        let Some(shape) = describe_declarator(declarator) else {
            return;
        };
        let header = if site == DeclSite::ForInit {
            self.loop_headers.last_mut()
        } else {
            None
        };
        let is_canonical = match header {
            Some(header) => header.insert(shape.name.clone()),
            None => self.bind(&shape.name),
        };
        if shape.is_prototype() {
            return;
        }
        self.stats.declarators += 1;

        let range = declarator.range();
        let spelled = base.and_then(|b| shape.spell_type(b));
        let (Some(spelled), false) = (spelled, range.is_empty()) else {
            tracing::debug!(name = %shape.name, "skipping declarator without end or spellable type");
            self.stats.unresolved += 1;
            return;
        };

        let end_location = self.unit.loc(range.end - 1);
        let decl = Declaration {
            name: shape.name,
            normalized_type: normalize_type(&spelled),
            end_location,
            storage,
            site,
            is_canonical,
            is_valid,
            in_primary_file: self.unit.is_primary(end_location),
        };

        if !decl.is_canonical {
            self.stats.redeclared += 1;
        } else if !decl.is_valid {
            self.stats.invalid += 1;
        } else if !decl.is_retained(&self.policy) {
            self.stats.excluded += 1;
        }
        if !decl.is_retained(&self.policy) {
            return;
        }

        let scope = self.current();
        match self.tree.declare(scope, decl) {
            Ok(()) => self.stats.retained += 1,
            Err(error) => tracing::debug!(%error, "cannot store declaration"),
        }
    }
}

/// The parameter list of the function declarator inside `declarator`.
fn find_parameter_list<'r>(declarator: &CNode<'r>) -> Option<CNode<'r>> {
    if declarator.kind().as_ref() == "function_declarator" {
        return declarator.field("parameters");
    }
    declarator
        .children()
        .filter(|c| is_declarator_kind(c.kind().as_ref()))
        .find_map(|c| find_parameter_list(&c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::{Frontend, FrontendOptions};
    use pretty_assertions::assert_eq;

    fn collect(source: &str) -> Collected {
        collect_with(source, RetentionPolicy::default())
    }

    fn collect_with(source: &str, policy: RetentionPolicy) -> Collected {
        let unit = Frontend::new(FrontendOptions {
            suppress_diagnostics: true,
            ..FrontendOptions::default()
        })
        .expect("frontend")
        .parse("test.c", source.to_string());
        walk(&unit, policy)
    }

    fn names(tree: &ScopeTree, id: ScopeId) -> Vec<String> {
        tree[id].declarations().iter().map(|d| d.name.clone()).collect()
    }

    #[test]
    fn globals_land_in_root() {
        let c = collect("int x;\nstatic long y = 2;\n");
        let root = c.tree.root();
        assert_eq!(names(&c.tree, root), vec!["x", "y"]);
        assert!(
            c.tree[root]
                .declarations()
                .iter()
                .all(|d| d.storage == StorageKind::Global)
        );
    }

    #[test]
    fn end_location_is_last_declarator_byte() {
        let source = "int counter = 42;\n";
        let c = collect(source);
        let decl = &c.tree[c.tree.root()].declarations()[0];
        assert_eq!(decl.end_location.offset, source.find("42").unwrap() + 1);
        assert_eq!(decl.end_location.line, 1);
    }

    #[test]
    fn function_opens_one_scope() {
        let c = collect("int f(int p) { int a; int b; return a + b; }\n");
        let root = c.tree.root();
        assert_eq!(c.tree[root].children().len(), 1);
        let f = c.tree[root].children()[0];
        assert_eq!(c.tree[f].kind, ScopeKind::Function);
        assert_eq!(names(&c.tree, f), vec!["a", "b"]);
        assert!(c.tree[f].children().is_empty());
        assert!(c.tree[f].declares("p"));
        assert!(c.tree[root].declares("f"));
    }

    #[test]
    fn parameters_retained_on_request() {
        let policy = RetentionPolicy {
            include_parameters: true,
            ..RetentionPolicy::default()
        };
        let c = collect_with("void f(int p, char *q) { }\n", policy);
        let f = c.tree[c.tree.root()].children()[0];
        let decls = c.tree[f].declarations();
        assert_eq!(decls.len(), 2);
        assert_eq!(decls[1].storage, StorageKind::Parameter);
        assert_eq!(decls[1].normalized_type, "char*");
    }

    #[test]
    fn if_else_branches_are_isolated() {
        let c = collect("void f(int c) {\n  if (c) { int a = 1; } else { int b = 2; }\n}\n");
        let root = c.tree.root();
        let f = c.tree[root].children()[0];
        let branches = c.tree[f].children();
        assert_eq!(branches.len(), 2);
        assert_eq!(c.tree[branches[0]].kind, ScopeKind::Then);
        assert_eq!(c.tree[branches[1]].kind, ScopeKind::Else);
        assert_eq!(names(&c.tree, branches[0]), vec!["a"]);
        assert_eq!(names(&c.tree, branches[1]), vec!["b"]);
        assert!(c.tree[f].declarations().is_empty());
    }

    #[test]
    fn single_statement_branch_gets_scope() {
        let c = collect("void f(int c) { if (c) return; }\n");
        let f = c.tree[c.tree.root()].children()[0];
        let kinds: Vec<_> = c.tree[f].children().iter().map(|s| c.tree[*s].kind).collect();
        assert_eq!(kinds, vec![ScopeKind::Then]);
    }

    #[test]
    fn else_if_nests_under_else() {
        let c = collect("void f(int c) { if (c) {} else if (c > 1) { int z; } }\n");
        let f = c.tree[c.tree.root()].children()[0];
        let outer_else = c.tree[f].children()[1];
        assert_eq!(c.tree[outer_else].kind, ScopeKind::Else);
        let nested = c.tree[outer_else].children();
        assert_eq!(nested.len(), 1);
        assert_eq!(names(&c.tree, nested[0]), vec!["z"]);
    }

    #[test]
    fn for_header_stays_in_enclosing_scope() {
        let c = collect("void f(void) { for (int i = 0; i < 4; i++) { int sq = i * i; } }\n");
        let f = c.tree[c.tree.root()].children()[0];
        assert_eq!(names(&c.tree, f), vec!["i"]);
        assert_eq!(c.tree[f].declarations()[0].site, DeclSite::ForInit);
        let body = c.tree[f].children()[0];
        assert_eq!(c.tree[body].kind, ScopeKind::Loop);
        assert_eq!(names(&c.tree, body), vec!["sq"]);
    }

    #[test]
    fn for_header_name_does_not_hide_later_local() {
        let c = collect(
            "void g(void) { for (int i = 0; i < 2; i++) { } int i = 5; (void)i; }\n",
        );
        let g = c.tree[c.tree.root()].children()[0];
        let sites: Vec<_> = c.tree[g]
            .declarations()
            .iter()
            .map(|d| (d.name.as_str(), d.site))
            .collect();
        assert_eq!(
            sites,
            vec![("i", DeclSite::ForInit), ("i", DeclSite::Statement)]
        );
        assert_eq!(c.stats.redeclared, 0);
        assert!(c.tree[g].declares("i"));
    }

    #[test]
    fn sibling_loops_reuse_header_names() {
        let c = collect(
            "void g(void) { for (int i = 0; i < 2; i++) { } for (int i = 0; i < 3; i++) { } }\n",
        );
        let g = c.tree[c.tree.root()].children()[0];
        assert_eq!(names(&c.tree, g), vec!["i", "i"]);
        assert_eq!(c.stats.redeclared, 0);
        assert!(!c.tree[g].declares("i"));
    }

    #[test]
    fn while_and_do_bodies_open_loop_scopes() {
        let c = collect("void f(int n) { while (n) { int w; n--; } do { int d; } while (0); }\n");
        let f = c.tree[c.tree.root()].children()[0];
        let loops = c.tree[f].children();
        assert_eq!(loops.len(), 2);
        assert_eq!(names(&c.tree, loops[0]), vec!["w"]);
        assert_eq!(names(&c.tree, loops[1]), vec!["d"]);
        assert!(loops.iter().all(|l| c.tree[*l].kind == ScopeKind::Loop));
    }

    #[test]
    fn switch_arms_are_sibling_scopes() {
        let source = "void f(int k) {\n  switch (k) {\n  case 0: int a = 0; break;\n  case 1: int b = 1; break;\n  default: int c = 2; break;\n  }\n}\n";
        let c = collect(source);
        let f = c.tree[c.tree.root()].children()[0];
        let arms = c.tree[f].children();
        assert_eq!(arms.len(), 3);
        assert!(arms.iter().all(|a| c.tree[*a].kind == ScopeKind::Case));
        assert_eq!(names(&c.tree, arms[0]), vec!["a"]);
        assert_eq!(names(&c.tree, arms[1]), vec!["b"]);
        assert_eq!(names(&c.tree, arms[2]), vec!["c"]);
    }

    #[test]
    fn braced_switch_arms_hold_their_declarations() {
        let source = "void f(int k) {\n  switch (k) {\n  case 0: { int a = 0; break; }\n  case 1: { int b = 1; break; }\n  default: { int c = 2; }\n  }\n}\n";
        let c = collect(source);
        let f = c.tree[c.tree.root()].children()[0];
        let arms = c.tree[f].children();
        assert_eq!(arms.len(), 3);
        assert!(arms.iter().all(|a| c.tree[*a].kind == ScopeKind::Case));
        assert!(arms.iter().all(|a| c.tree[*a].children().is_empty()));
        assert_eq!(names(&c.tree, arms[0]), vec!["a"]);
        assert_eq!(names(&c.tree, arms[1]), vec!["b"]);
        assert_eq!(names(&c.tree, arms[2]), vec!["c"]);
    }

    #[test]
    fn bare_block_opens_block_scope() {
        let c = collect("void f(void) { int a; { int b; } }\n");
        let f = c.tree[c.tree.root()].children()[0];
        assert_eq!(names(&c.tree, f), vec!["a"]);
        let block = c.tree[f].children()[0];
        assert_eq!(c.tree[block].kind, ScopeKind::Block);
        assert_eq!(names(&c.tree, block), vec!["b"]);
    }

    #[test]
    fn static_local_has_global_storage() {
        let c = collect("int f(void) { static int calls; int tmp; return calls + tmp; }\n");
        let f = c.tree[c.tree.root()].children()[0];
        let decls = c.tree[f].declarations();
        assert_eq!(decls[0].storage, StorageKind::Global);
        assert_eq!(decls[1].storage, StorageKind::Local);
    }

    #[test]
    fn redeclaration_is_not_canonical() {
        let c = collect("extern int shared;\nint shared = 3;\n");
        assert_eq!(names(&c.tree, c.tree.root()), vec!["shared"]);
        assert_eq!(c.stats.redeclared, 1);
    }

    #[test]
    fn prototypes_and_typedefs_only_bind_names() {
        let c = collect("typedef int count_t;\nint add(int a, int b);\ncount_t total;\n");
        let root = c.tree.root();
        assert_eq!(names(&c.tree, root), vec!["total"]);
        assert!(c.tree[root].declares("count_t"));
        assert!(c.tree[root].declares("add"));
        assert_eq!(c.tree[root].declarations()[0].normalized_type, "count_t");
    }

    #[test]
    fn enumerators_bind_names() {
        let c = collect("enum color { RED, GREEN };\nenum color paint;\n");
        let root = c.tree.root();
        assert!(c.tree[root].declares("RED"));
        assert!(c.tree[root].declares("GREEN"));
        assert_eq!(c.tree[root].declarations()[0].normalized_type, "enum color");
    }

    #[test]
    fn unspellable_types_are_skipped() {
        let c = collect("void (*handler)(int);\nstruct { int x; } anon;\nint ok;\n");
        assert_eq!(names(&c.tree, c.tree.root()), vec!["ok"]);
        assert_eq!(c.stats.unresolved, 2);
    }

    #[test]
    fn invalid_declarations_are_excluded() {
        let c = collect("int good;\nint bad = ;\n");
        assert_eq!(names(&c.tree, c.tree.root()), vec!["good"]);
    }

    #[test]
    fn array_and_qualified_types_are_normalized() {
        let c = collect("const char *labels[3];\nvolatile unsigned int flags;\n");
        let decls = c.tree[c.tree.root()].declarations();
        assert_eq!(decls[0].normalized_type, "char**");
        assert_eq!(decls[1].normalized_type, "unsigned int");
    }

    #[test]
    fn empty_unit_has_only_root() {
        let c = collect("");
        assert_eq!(c.tree.len(), 1);
        assert_eq!(c.stats, WalkStats::default());
    }
}
