use std::io::Write;

use cmut_core::{DeclSite, RetentionPolicy, ScopeKind, StorageKind};
use cmut_parser::{Frontend, FrontendOptions, ParserError, TranslationUnit, walk};
use pretty_assertions::assert_eq;

const SCOPES: &str = include_str!("fixtures/scopes.c");
const MARKERS: &str = include_str!("fixtures/markers.i");

fn frontend() -> Frontend {
    Frontend::new(FrontendOptions {
        suppress_diagnostics: true,
        ..FrontendOptions::default()
    })
    .expect("default frontend")
}

fn parse(path: &str, source: &str) -> TranslationUnit {
    frontend().parse(path, source.to_string())
}

/// `(kind, names)` for every scope in pre-order.
fn outline(unit: &TranslationUnit, policy: RetentionPolicy) -> Vec<(ScopeKind, Vec<String>)> {
    let tree = walk(unit, policy).tree;
    tree.preorder()
        .into_iter()
        .map(|id| {
            let names = tree[id]
                .declarations()
                .iter()
                .map(|d| d.name.clone())
                .collect();
            (tree[id].kind, names)
        })
        .collect()
}

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(ToString::to_string).collect()
}

#[test]
fn fixture_scope_outline() {
    let unit = parse("scopes.c", SCOPES);
    assert!(unit.diagnostics().is_empty(), "{:?}", unit.diagnostics());

    let expected = vec![
        (ScopeKind::TranslationUnit, owned(&["hits", "banner"])),
        (ScopeKind::Function, owned(&["result", "calls", "i"])),
        (ScopeKind::Then, owned(&["positive"])),
        (ScopeKind::Else, owned(&["negative"])),
        (ScopeKind::Loop, owned(&["acc"])),
        (ScopeKind::Case, owned(&["one"])),
        (ScopeKind::Case, owned(&[])),
        (ScopeKind::Case, owned(&["other"])),
        (ScopeKind::Block, owned(&["scratch"])),
    ];
    assert_eq!(outline(&unit, RetentionPolicy::default()), expected);
}

#[test]
fn fixture_records_carry_types_and_storage() {
    let unit = parse("scopes.c", SCOPES);
    let collected = walk(&unit, RetentionPolicy::default());
    let records: Vec<_> = collected
        .tree
        .declarations()
        .map(|(_, d)| (d.name.as_str(), d.normalized_type.as_str(), d.storage, d.site))
        .collect();

    assert_eq!(records[0], ("hits", "int", StorageKind::Global, DeclSite::Statement));
    assert_eq!(records[1], ("banner", "char*", StorageKind::Global, DeclSite::Statement));
    assert_eq!(records[2], ("result", "int", StorageKind::Local, DeclSite::Statement));
    assert_eq!(records[3], ("calls", "int", StorageKind::Global, DeclSite::Statement));
    assert_eq!(records[4], ("i", "int", StorageKind::Local, DeclSite::ForInit));
    assert_eq!(records[7], ("acc", "long", StorageKind::Local, DeclSite::Statement));
    assert_eq!(records[10], ("scratch", "double", StorageKind::Local, DeclSite::Statement));
}

#[test]
fn string_initializer_does_not_move_end_location() {
    let unit = parse("scopes.c", SCOPES);
    let collected = walk(&unit, RetentionPolicy::default());
    let banner = collected
        .tree
        .declarations()
        .map(|(_, d)| d)
        .find(|d| d.name == "banner")
        .expect("banner retained");
    let literal_end = SCOPES.find("\"count: ;\"").expect("literal") + "\"count: ;\"".len() - 1;
    assert_eq!(banner.end_location.offset, literal_end);
    assert_eq!(unit.char_at(literal_end + 1), Some(b';'));
}

#[test]
fn enumerators_and_functions_are_bound_at_file_scope() {
    let unit = parse("scopes.c", SCOPES);
    let tree = walk(&unit, RetentionPolicy::default()).tree;
    let root = &tree[tree.root()];
    for name in ["MODE_IDLE", "MODE_RUN", "classify", "hits"] {
        assert!(root.declares(name), "{name} not bound");
    }
}

#[test]
fn foreign_declarations_follow_policy() {
    let unit = parse("main.i", MARKERS);
    assert_eq!(unit.files().primary(), "main.c");

    let default = outline(&unit, RetentionPolicy::default());
    assert_eq!(default[0], (ScopeKind::TranslationUnit, owned(&["local_total"])));
    assert_eq!(default[1], (ScopeKind::Function, owned(&["frames"])));

    let with_foreign = RetentionPolicy {
        include_foreign: true,
        ..RetentionPolicy::default()
    };
    let all = outline(&unit, with_foreign);
    assert_eq!(
        all[0],
        (
            ScopeKind::TranslationUnit,
            owned(&["shim_limit", "shim_table", "local_total"])
        )
    );
}

#[test]
fn foreign_records_are_flagged() {
    let unit = parse("main.i", MARKERS);
    let policy = RetentionPolicy {
        include_foreign: true,
        ..RetentionPolicy::default()
    };
    let tree = walk(&unit, policy).tree;
    let flags: Vec<_> = tree
        .declarations()
        .map(|(_, d)| (d.name.as_str(), d.in_primary_file))
        .collect();
    assert_eq!(
        flags,
        vec![
            ("shim_limit", false),
            ("shim_table", false),
            ("local_total", true),
            ("frames", true),
        ]
    );
}

#[test]
fn walk_stats_count_exclusions() {
    let unit = parse("main.i", MARKERS);
    let stats = walk(&unit, RetentionPolicy::default()).stats;
    assert_eq!(stats.declarators, 4);
    assert_eq!(stats.retained, 2);
    assert_eq!(stats.excluded, 2);
}

#[test]
fn parse_file_reads_from_disk() {
    let mut file = tempfile::Builder::new()
        .suffix(".c")
        .tempfile()
        .expect("tempfile");
    file.write_all(b"int on_disk;\n").expect("write");

    let unit = frontend().parse_file(file.path()).expect("parse");
    let tree = walk(&unit, RetentionPolicy::default()).tree;
    assert_eq!(tree[tree.root()].declarations()[0].name, "on_disk");
}

#[test]
fn parse_file_rejects_invalid_utf8() {
    let mut file = tempfile::Builder::new()
        .suffix(".c")
        .tempfile()
        .expect("tempfile");
    file.write_all(&[b'i', b'n', b't', b' ', 0xff, 0xfe, b';'])
        .expect("write");

    let result = frontend().parse_file(file.path());
    assert!(matches!(result, Err(ParserError::NotUtf8 { .. })));
}

#[test]
fn parse_file_rejects_unknown_extension() {
    let file = tempfile::Builder::new()
        .suffix(".txt")
        .tempfile()
        .expect("tempfile");
    let result = frontend().parse_file(file.path());
    assert!(matches!(result, Err(ParserError::UnsupportedLanguage(_))));
}

#[test]
fn quoted_include_resolves_next_to_input() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("list.h"), "int list_len;\n").expect("header");
    let main = dir.path().join("main.c");
    std::fs::write(&main, "#include \"list.h\"\n#include <nowhere.h>\nint x;\n").expect("main");

    let unit = frontend().parse_file(&main).expect("parse");
    let includes = unit.includes();
    assert_eq!(includes.len(), 2);
    assert_eq!(includes[0].resolved, Some(dir.path().join("list.h")));
    assert_eq!(includes[1].resolved, None);
}
