use std::path::PathBuf;

use stratum::core::{
    Dependency, Language, Node, NodeKind, NodePath, TypeRef, TypeResolver, UsageKind,
};

fn class(path: &str) -> Node {
    Node::new(
        NodePath::parse(path).unwrap(),
        PathBuf::from("src/lib.cs"),
        NodeKind::Class,
        Language::CSharp,
    )
}

fn wildcard(path: &str) -> Dependency {
    Dependency::wildcard(NodePath::parse(path).unwrap())
}

#[test]
fn exact_match_needs_no_dependencies() {
    let resolver = TypeResolver::new(&[class("A.B.Problem")]);
    let resolved = resolver.resolve_name(&[], Language::CSharp, "A.B.Problem");
    assert_eq!(resolved.dotted(), "A.B.Problem");
}

#[test]
fn unqualified_name_resolves_through_wildcard_dependency() {
    let resolver = TypeResolver::new(&[class("A.B.Problem")]);
    let resolved = resolver.resolve_name(&[wildcard("B")], Language::CSharp, "Problem");
    assert_eq!(resolved.dotted(), "A.B.Problem");
}

#[test]
fn suffix_match_is_anchored_per_segment() {
    // `Foo.Problem` must not satisfy a reference expecting namespace `B`.
    let resolver = TypeResolver::new(&[class("Foo.Problem")]);
    let resolved = resolver.resolve_name(&[wildcard("B")], Language::CSharp, "Problem");
    assert!(resolved.is_unknown());
    assert_eq!(resolved.name(), "Problem");
}

#[test]
fn unqualified_name_ignores_non_wildcard_dependencies() {
    let resolver = TypeResolver::new(&[class("A.B.Problem")]);
    let plain = Dependency::new(NodePath::parse("B").unwrap());
    let resolved = resolver.resolve_name(&[plain], Language::CSharp, "Problem");
    assert!(resolved.is_unknown());
}

#[test]
fn qualified_name_resolves_through_plain_dependency() {
    let resolver = TypeResolver::new(&[class("A.X.T")]);
    let plain = Dependency::new(NodePath::parse("A").unwrap());
    let resolved = resolver.resolve_name(&[plain], Language::CSharp, "X.T");
    assert_eq!(resolved.dotted(), "A.X.T");
}

#[test]
fn dot_import_admits_unqualified_names() {
    let resolver = TypeResolver::new(&[class("pkg.strings.Builder")]);
    let dot = Dependency::dot_import(NodePath::parse("pkg.strings").unwrap());
    let resolved = resolver.resolve_name(&[dot], Language::Go, "Builder");
    assert_eq!(resolved.dotted(), "pkg.strings.Builder");
}

#[test]
fn first_matching_dependency_wins() {
    let nodes = [class("A.X.T"), class("B.Y.T")];
    let resolver = TypeResolver::new(&nodes);

    let resolved = resolver.resolve_name(
        &[wildcard("X"), wildcard("Y")],
        Language::CSharp,
        "T",
    );
    assert_eq!(resolved.dotted(), "A.X.T");

    let resolved = resolver.resolve_name(
        &[wildcard("Y"), wildcard("X")],
        Language::CSharp,
        "T",
    );
    assert_eq!(resolved.dotted(), "B.Y.T");
}

#[test]
fn builtins_resolve_when_project_is_silent() {
    let resolver = TypeResolver::new(&[]);
    let resolved = resolver.resolve_name(&[], Language::CSharp, "int");
    assert_eq!(resolved.dotted(), "int");
    assert!(!resolved.is_unknown());
}

#[test]
fn project_declarations_shadow_builtins() {
    let resolver = TypeResolver::new(&[class("My.Lib.Task")]);
    let resolved = resolver.resolve_name(&[wildcard("Lib")], Language::CSharp, "Task");
    assert_eq!(resolved.dotted(), "My.Lib.Task");
}

#[test]
fn resolution_is_total_over_used_types() {
    let mut node = class("App.Service");
    node.add_used_type(TypeRef::simple("Mystery", UsageKind::Usage));
    node.add_used_type(TypeRef::generic(
        "List",
        vec![TypeRef::simple("Mystery", UsageKind::Usage)],
        UsageKind::ReturnValue,
    ));

    let resolver = TypeResolver::new(std::slice::from_ref(&node));
    let resolved = resolver.resolve_node(node);

    for type_ref in &resolved.used_types {
        assert!(type_ref.resolved.is_some());
        for argument in type_ref.arguments() {
            assert!(argument.resolved.is_some());
        }
    }
    // The unknown outcome joins the dependency set for graph rollup.
    assert!(resolved
        .dependencies
        .iter()
        .any(|d| d.path.is_unknown() && d.path.name() == "Mystery"));
}
