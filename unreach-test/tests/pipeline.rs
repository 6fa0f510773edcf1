//! End-to-end scenarios over hand-built declaration/index fixtures,
//! covering the chain-of-entry-points, unused-property, extension-merge,
//! closure-attribution, and self-recursion cases.

use unreach_core::config::AnalysisConfig;
use unreach_core::index::IndexSymbolKind;
use unreach_core::types::{AccessLevel, DeclKind, EntryPointReason};
use unreach_test::{called_by, decl, decl_range, decl_range_entry, definition, property_decl, reference, Fixture};

fn base_names(
    usrs: impl IntoIterator<Item = unreach_core::types::Usr>,
    report: &unreach_core::pipeline::AnalysisReport,
) -> Vec<String> {
    usrs.into_iter()
        .map(|usr| report.graph.usr_to_decl[&usr].decl.base_name().to_string())
        .collect()
}

#[test]
fn entry_point_chain_leaves_nothing_dead() {
    let file = "App.swift";
    let decls = vec![
        decl("App", DeclKind::Class, file, 1, vec![EntryPointReason::FrameworkRoot]),
        decl("App.run", DeclKind::Function, file, 2, vec![EntryPointReason::NonPrivateClassMember]),
        decl("App.helper1", DeclKind::Function, file, 3, vec![]),
        decl("App.helper2", DeclKind::Function, file, 4, vec![]),
    ];

    let fixture = Fixture::new(vec![
        definition("s:App", "App", IndexSymbolKind::Class, file, 1),
        definition("s:run", "run", IndexSymbolKind::InstanceMethod, file, 2),
        definition("s:helper1", "helper1", IndexSymbolKind::InstanceMethod, file, 3),
        definition("s:helper2", "helper2", IndexSymbolKind::InstanceMethod, file, 4),
        reference("s:helper1", file, 2, vec![called_by("s:run")]),
        reference("s:helper2", file, 3, vec![called_by("s:helper1")]),
    ]);

    let report = fixture.run(decls, &AnalysisConfig::default()).unwrap();
    assert!(report.dead_symbols.is_empty(), "expected no dead symbols, got {:?}", report.dead_symbols);
}

#[test]
fn container_with_unused_property_prunes_and_reports_three() {
    let file = "A.swift";
    let decls = vec![
        decl_range_entry("A", DeclKind::Struct, file, 1, 10, vec![EntryPointReason::PublicModifier]),
        decl("A.m", DeclKind::Function, file, 3, vec![EntryPointReason::PublicModifier]),
        property_decl("A.t", file, 5, "T", AccessLevel::Internal),
        decl_range("T", DeclKind::Struct, file, 20, 30),
        decl("T.mt", DeclKind::Function, file, 25, vec![]),
    ];

    let fixture = Fixture::new(vec![
        definition("s:A", "A", IndexSymbolKind::Struct, file, 1),
        definition("s:A.m", "m", IndexSymbolKind::InstanceMethod, file, 3),
        definition("s:A.t", "t", IndexSymbolKind::InstanceProperty, file, 5),
        definition("s:T", "T", IndexSymbolKind::Struct, file, 20),
        definition("s:T.mt", "mt", IndexSymbolKind::InstanceMethod, file, 25),
        // The stored property's type mention, falling to Tier B containment
        // inside A's range (line 6, outside both A.m's and A.t's own lines).
        reference("s:T", file, 6, vec![]),
    ]);

    let mut config = AnalysisConfig::default();
    config.reachability.respect_public_api = false;
    let report = fixture.run(decls, &config).unwrap();

    let dead_names: std::collections::HashSet<String> =
        base_names(report.dead_symbols.iter().map(|d| d.usr.clone()), &report).into_iter().collect();
    assert_eq!(dead_names, ["mt", "T", "t"].into_iter().map(String::from).collect());
}

#[test]
fn extension_and_type_merge_collapses_to_one_declaration() {
    let decls = vec![
        decl("X", DeclKind::Struct, "X.swift", 1, vec![EntryPointReason::PublicModifier]),
        decl("X", DeclKind::Struct, "X+Extra.swift", 1, vec![]),
    ];

    let fixture = Fixture::new(vec![
        definition("s:X", "X", IndexSymbolKind::Struct, "X.swift", 1),
        definition("s:X", "X", IndexSymbolKind::Struct, "X+Extra.swift", 1),
    ]);

    let report = fixture.run(decls, &AnalysisConfig::default()).unwrap();

    assert_eq!(report.hydrated.len(), 2);
    assert!(report.hydrated.iter().all(|hd| hd.usr.as_ref().map(|u| u.0.as_str()) == Some("s:X")));
    assert_eq!(report.graph.node_count(), 1);
    assert_eq!(report.graph.usr_to_decl.len(), 1);
}

#[test]
fn closure_passed_from_reachable_function_resolves_via_tier_a() {
    let file = "F.swift";
    let decls = vec![
        decl("f", DeclKind::Function, file, 1, vec![EntryPointReason::PublicModifier]),
        decl("_h", DeclKind::Function, file, 10, vec![]),
    ];

    let fixture = Fixture::new(vec![
        definition("s:f", "f", IndexSymbolKind::Function, file, 1),
        definition("s:_h", "_h", IndexSymbolKind::Function, file, 10),
        // Synthetic closure definition: not a parsed Declaration, only
        // known to the index, containedBy f.
        unreach_core::index::ReferenceOccurrence {
            target_usr: unreach_core::types::Usr("s:closure1".to_string()),
            symbol_name: "closure#1".to_string(),
            symbol_kind: IndexSymbolKind::Function,
            file: file.into(),
            line: 2,
            column: 1,
            roles: vec![unreach_core::index::Role::Definition],
            relations: vec![unreach_core::index::Relation {
                role: unreach_core::index::Role::ContainedBy,
                related_usr: unreach_core::types::Usr("s:f".to_string()),
            }],
        },
        reference("s:_h", file, 2, vec![called_by("s:closure1")]),
    ]);

    let report = fixture.run(decls, &AnalysisConfig::default()).unwrap();

    let dead_names = base_names(report.dead_symbols.iter().map(|d| d.usr.clone()), &report);
    assert!(!dead_names.contains(&"_h".to_string()));
    assert!(report
        .graph
        .out_edges
        .get(&unreach_core::types::Usr("s:f".to_string()))
        .is_some_and(|callees| callees.contains(&unreach_core::types::Usr("s:_h".to_string()))));
}

#[test]
fn self_recursive_function_with_no_external_caller_is_dead() {
    let file = "R.swift";
    let decls = vec![decl("r", DeclKind::Function, file, 1, vec![])];

    let fixture = Fixture::new(vec![
        definition("s:r", "r", IndexSymbolKind::Function, file, 1),
        reference("s:r", file, 1, vec![called_by("s:r")]),
    ]);

    let report = fixture.run(decls, &AnalysisConfig::default()).unwrap();

    let r_usr = unreach_core::types::Usr("s:r".to_string());
    assert!(report.dead_symbols.iter().any(|d| d.usr == r_usr));
    assert!(report.graph.out_edges.get(&r_usr).is_none_or(|s| s.is_empty()));
}
