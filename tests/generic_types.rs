use stratum::core::{TypeRefKind, UsageKind};
use stratum::parsers::common::{flatten_generic, parse_type_expression};

#[test]
fn nested_generic_round_trips_through_flattening() {
    let (type_ref, _) = parse_type_expression("a<b<c>, e>", UsageKind::Usage).unwrap();
    let (name, arguments) = flatten_generic(&type_ref);
    assert_eq!(name, "a");
    assert_eq!(arguments, vec!["b<c>".to_string(), "e".to_string()]);
}

#[test]
fn qualifiers_are_stripped_into_wildcard_dependencies() {
    let (type_ref, dependencies) =
        parse_type_expression("ns::vector<std::string>", UsageKind::ReturnValue).unwrap();
    assert_eq!(type_ref.name, "vector");
    assert_eq!(type_ref.usage, UsageKind::ReturnValue);
    let arguments = type_ref.arguments();
    assert_eq!(arguments.len(), 1);
    assert_eq!(arguments[0].name, "string");

    let paths: Vec<String> = dependencies.iter().map(|d| d.path.dotted()).collect();
    assert_eq!(paths, vec!["ns".to_string(), "std".to_string()]);
    assert!(dependencies.iter().all(|d| d.is_wildcard));
}

#[test]
fn decorations_are_ignored() {
    let (type_ref, _) =
        parse_type_expression("const std::shared_ptr<Widget>&", UsageKind::Argument).unwrap();
    assert_eq!(type_ref.name, "shared_ptr");
    assert_eq!(type_ref.arguments()[0].name, "Widget");

    let (slice, _) = parse_type_expression("[]*pkg.Record", UsageKind::Usage).unwrap();
    assert_eq!(slice.name, "Record");
    assert!(matches!(slice.kind, TypeRefKind::Simple));
}

#[test]
fn plain_names_yield_simple_references() {
    let (type_ref, dependencies) = parse_type_expression("Widget", UsageKind::Usage).unwrap();
    assert_eq!(type_ref.name, "Widget");
    assert!(matches!(type_ref.kind, TypeRefKind::Simple));
    assert!(dependencies.is_empty());
    assert!(parse_type_expression("", UsageKind::Usage).is_none());
}
