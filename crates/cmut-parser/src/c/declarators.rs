//! Declarator chain analysis for C declarations.
//!
//! A declarator like `*const table[4]` wraps the identifier in nested
//! `pointer_declarator` / `array_declarator` nodes. Walking the chain from
//! the outside in yields the name and the type derivations applied to the
//! base type.

use ast_grep_core::Node;

/// Node kinds that can appear as a declaration's declarator.
const DECLARATOR_KINDS: &[&str] = &[
    "identifier",
    "init_declarator",
    "pointer_declarator",
    "array_declarator",
    "function_declarator",
    "parenthesized_declarator",
    "attributed_declarator",
];

pub(crate) fn is_declarator_kind(kind: &str) -> bool {
    DECLARATOR_KINDS.contains(&kind)
}

/// Name and derivations of one declarator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct DeclaratorShape {
    pub(crate) name: String,
    /// One entry per `*`, outermost first, with its qualifiers (`"*const"`).
    pub(crate) pointers: Vec<String>,
    /// Array extents, outermost first.
    pub(crate) extents: Vec<String>,
    pub(crate) is_function: bool,
    pub(crate) is_parenthesized: bool,
}

impl DeclaratorShape {
    /// A function prototype rather than an object.
    pub(crate) const fn is_prototype(&self) -> bool {
        self.is_function && !self.is_parenthesized
    }

    /// Spell the full type given the specifier part.
    ///
    /// Function pointers and pointers to arrays need the declarator nested
    /// inside the type and cannot be spelled as a prefix; they yield `None`.
    pub(crate) fn spell_type(&self, base: &str) -> Option<String> {
        if self.is_function || self.is_parenthesized {
            return None;
        }
        let mut ty = base.to_string();
        if !self.pointers.is_empty() {
            ty.push(' ');
            ty.push_str(&self.pointers.join(" "));
        }
        if !self.extents.is_empty() && self.pointers.is_empty() {
            ty.push(' ');
        }
        for extent in self.extents.iter().rev() {
            ty.push('[');
            ty.push_str(extent);
            ty.push(']');
        }
        Some(ty)
    }
}

/// Walk a declarator chain down to its identifier.
///
/// Returns `None` for abstract declarators (no identifier) and for chains
/// the parser could not make sense of.
pub(crate) fn describe_declarator<D: ast_grep_core::Doc>(node: &Node<D>) -> Option<DeclaratorShape> {
    let mut shape = DeclaratorShape::default();
    let mut current = node.clone();
    loop {
        let next = match current.kind().as_ref() {
            "identifier" => {
                shape.name = current.text().to_string();
                return Some(shape);
            }
            "init_declarator" => current.field("declarator")?,
            "pointer_declarator" => {
                let quals: Vec<_> = current
                    .children()
                    .filter(|c| c.kind().as_ref() == "type_qualifier")
                    .map(|c| c.text().to_string())
                    .collect();
                shape.pointers.push(format!("*{}", quals.join(" ")));
                current.field("declarator")?
            }
            "array_declarator" => {
                let extent = current
                    .field("size")
                    .map(|s| s.text().split_whitespace().collect::<Vec<_>>().join(" "))
                    .unwrap_or_default();
                shape.extents.push(extent);
                current.field("declarator")?
            }
            "function_declarator" => {
                shape.is_function = true;
                current.field("declarator")?
            }
            "parenthesized_declarator" | "attributed_declarator" => {
                if current.kind().as_ref() == "parenthesized_declarator" {
                    shape.is_parenthesized = true;
                }
                current
                    .children()
                    .find(|c| is_declarator_kind(c.kind().as_ref()))?
            }
            _ => return None,
        };
        current = next;
    }
}
