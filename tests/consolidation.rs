use std::path::PathBuf;

use stratum::core::{Dependency, Language, Node, NodeKind, NodePath, TypeRef, UsageKind};
use stratum::parsers::consolidate;

fn node(path: &str, kind: NodeKind) -> Node {
    Node::new(
        NodePath::parse(path).unwrap(),
        PathBuf::from("geo/shape.hpp"),
        kind,
        Language::Cpp,
    )
}

#[test]
fn partial_declarations_merge_by_union() {
    let mut forward = node("geo.Circle", NodeKind::Unknown);
    forward.add_dependency(Dependency::wildcard(NodePath::new("math")));

    let mut definition = node("geo.Circle", NodeKind::Class);
    definition.add_used_type(TypeRef::simple("Vector2", UsageKind::Usage));
    definition.add_dependency(Dependency::wildcard(NodePath::new("math")));

    let merged = consolidate(vec![forward, definition]);
    assert_eq!(merged.len(), 1);
    let circle = &merged[0];
    // The declared kind replaces the placeholder from the forward declaration.
    assert_eq!(circle.kind, NodeKind::Class);
    assert_eq!(circle.dependencies.len(), 1);
    assert_eq!(circle.used_types.len(), 1);
}

#[test]
fn distinct_paths_stay_separate_in_input_order() {
    let merged = consolidate(vec![
        node("geo.Circle", NodeKind::Class),
        node("geo.Square", NodeKind::Class),
        node("geo.Circle", NodeKind::Class),
    ]);
    let paths: Vec<String> = merged.iter().map(|n| n.path.dotted()).collect();
    assert_eq!(paths, vec!["geo.Circle".to_string(), "geo.Square".to_string()]);
}

#[test]
fn same_type_with_different_usages_keeps_both_entries() {
    let mut first = node("geo.Circle.scale", NodeKind::Function);
    first.add_used_type(TypeRef::simple("Vector2", UsageKind::Argument));

    let mut second = node("geo.Circle.scale", NodeKind::Function);
    second.add_used_type(TypeRef::simple("Vector2", UsageKind::ReturnValue));
    second.add_used_type(TypeRef::simple("Vector2", UsageKind::Argument));

    let merged = consolidate(vec![first, second]);
    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].used_types.len(), 2);
}
