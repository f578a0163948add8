//! Storage classes and base type spelling of C declarations.

use ast_grep_core::Node;

use super::declarators::is_declarator_kind;

/// Storage class specifiers on a declaration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct StorageClass {
    pub(crate) is_static: bool,
    pub(crate) is_extern: bool,
    pub(crate) is_thread_local: bool,
}

impl StorageClass {
    /// Static storage duration even at block scope.
    pub(crate) const fn is_static_duration(self) -> bool {
        self.is_static || self.is_extern || self.is_thread_local
    }
}

pub(crate) fn detect_storage_class<D: ast_grep_core::Doc>(node: &Node<D>) -> StorageClass {
    let mut sc = StorageClass::default();
    for child in node.children() {
        if child.kind().as_ref() != "storage_class_specifier" {
            continue;
        }
        match child.text().as_ref() {
            "static" => sc.is_static = true,
            "extern" => sc.is_extern = true,
            "_Thread_local" | "__thread" | "thread_local" => sc.is_thread_local = true,
            _ => {}
        }
    }
    sc
}

/// Spell the specifier part of a declaration as a C type printer would.
///
/// Storage classes and attributes are dropped. Returns `None` when the type
/// cannot be named in a new declaration: anonymous `struct`/`union`/`enum`,
/// macro-expanded type specifiers, or no type at all.
pub(crate) fn base_type<D: ast_grep_core::Doc>(node: &Node<D>) -> Option<String> {
    let mut parts = Vec::new();
    let mut has_type = false;
    for child in node.children() {
        let kind = child.kind();
        match kind.as_ref() {
            "type_qualifier" => parts.push(child.text().to_string()),
            "primitive_type" | "type_identifier" | "sized_type_specifier" => {
                has_type = true;
                parts.push(child.text().split_whitespace().collect::<Vec<_>>().join(" "));
            }
            "struct_specifier" | "union_specifier" | "enum_specifier" => {
                let name = child.field("name")?;
                let keyword = kind.trim_end_matches("_specifier");
                has_type = true;
                parts.push(format!("{keyword} {}", name.text()));
            }
            "macro_type_specifier" => return None,
            ";" | "=" => break,
            k if is_declarator_kind(k) => break,
            _ => {}
        }
    }
    has_type.then(|| parts.join(" "))
}

/// Names introduced by a `type_definition`.
pub(crate) fn typedef_names<D: ast_grep_core::Doc>(node: &Node<D>) -> Vec<String> {
    let type_range = node.field("type").map(|t| t.range());
    node.children()
        .filter(|c| Some(c.range()) != type_range)
        .filter(|c| is_declarator_kind(c.kind().as_ref()) || c.kind().as_ref() == "type_identifier")
        .filter_map(|c| first_type_identifier(&c))
        .collect()
}

fn first_type_identifier<D: ast_grep_core::Doc>(node: &Node<D>) -> Option<String> {
    if node.kind().as_ref() == "type_identifier" {
        return Some(node.text().to_string());
    }
    node.children().find_map(|c| first_type_identifier(&c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ast_grep_language::{LanguageExt, SupportLang};
    use pretty_assertions::assert_eq;

    fn first_of_kind(source: &str, kind: &str) -> (Option<String>, StorageClass) {
        let root = SupportLang::C.ast_grep(source);
        let node = root
            .root()
            .children()
            .find(|c| c.kind().as_ref() == kind)
            .expect("node of kind");
        (base_type(&node), detect_storage_class(&node))
    }

    #[test]
    fn primitive_with_qualifier() {
        let (ty, _) = first_of_kind("const int x = 1;", "declaration");
        assert_eq!(ty.as_deref(), Some("const int"));
    }

    #[test]
    fn sized_specifier_whitespace_collapsed() {
        let (ty, _) = first_of_kind("unsigned   long  counter;", "declaration");
        assert_eq!(ty.as_deref(), Some("unsigned long"));
    }

    #[test]
    fn named_struct_keeps_tag() {
        let (ty, _) = first_of_kind("struct node head;", "declaration");
        assert_eq!(ty.as_deref(), Some("struct node"));
    }

    #[test]
    fn struct_with_body_uses_tag_only() {
        let (ty, _) = first_of_kind("struct pt { int x; int y; } origin;", "declaration");
        assert_eq!(ty.as_deref(), Some("struct pt"));
    }

    #[test]
    fn anonymous_struct_is_unnamed() {
        let (ty, _) = first_of_kind("struct { int x; } anon;", "declaration");
        assert_eq!(ty, None);
    }

    #[test]
    fn storage_class_detected() {
        let (ty, sc) = first_of_kind("static volatile int ticks;", "declaration");
        assert_eq!(ty.as_deref(), Some("volatile int"));
        assert!(sc.is_static);
        assert!(sc.is_static_duration());
        assert!(!sc.is_extern);
    }

    #[test]
    fn register_is_automatic() {
        let root = SupportLang::C.ast_grep("void f(void) { register int r; }");
        let decl = find_kind(&root.root(), "declaration").expect("local declaration");
        let sc = detect_storage_class(&decl);
        assert_eq!(sc, StorageClass::default());
        assert!(!sc.is_static_duration());
    }

    #[test]
    fn typedef_names_found() {
        let root = SupportLang::C.ast_grep("typedef unsigned int u32, *u32_ptr;");
        let node = root
            .root()
            .children()
            .find(|c| c.kind().as_ref() == "type_definition")
            .expect("typedef");
        assert_eq!(typedef_names(&node), vec!["u32", "u32_ptr"]);
    }

    fn find_kind<'r, D: ast_grep_core::Doc>(node: &Node<'r, D>, kind: &str) -> Option<Node<'r, D>> {
        node.children().find_map(|c| {
            if c.kind().as_ref() == kind {
                Some(c)
            } else {
                find_kind(&c, kind)
            }
        })
    }
}
