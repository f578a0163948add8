//! Type string normalization for synthesized declarations.
//!
//! Turns a printed C type such as `const unsigned int *[4]` into a form that
//! can lead a new declaration (`unsigned int**`). Qualifiers are dropped,
//! array extents become pointer markers and whitespace is canonicalized.

/// Qualifier keywords removed from type strings.
const QUALIFIERS: &[&str] = &["const", "volatile", "restrict", "__restrict", "__restrict__"];

/// Normalize a printed type for reuse as a declaration's leading type.
///
/// Steps, in order:
/// 1. drop qualifier keywords (whole identifiers only)
/// 2. replace each `[...]` (shortest match) with `*`
/// 3. trim
/// 4. collapse whitespace runs to one space
/// 5. drop the space before each `*`
///
/// The transform is idempotent.
#[must_use]
pub fn normalize_type(raw: &str) -> String {
    let unqualified = strip_qualifiers(raw);
    let folded = fold_array_extents(&unqualified);
    let collapsed = folded.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.replace(" *", "*")
}

const fn is_ident_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

fn strip_qualifiers(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut word = String::new();
    for ch in raw.chars() {
        if is_ident_char(ch) {
            word.push(ch);
            continue;
        }
        flush_word(&mut out, &mut word);
        out.push(ch);
    }
    flush_word(&mut out, &mut word);
    out
}

fn flush_word(out: &mut String, word: &mut String) {
    if !QUALIFIERS.contains(&word.as_str()) {
        out.push_str(word);
    }
    word.clear();
}

fn fold_array_extents(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(open) = rest.find('[') {
        let Some(close) = rest[open..].find(']') else {
            break;
        };
        out.push_str(&rest[..open]);
        out.push('*');
        rest = &rest[open + close + 1..];
    }
    out.push_str(rest);
    out
}
