use stratum::core::{NodePath, UNKNOWN_SEGMENT};

#[test]
fn parses_dotted_and_scope_qualified_names() {
    let dotted = NodePath::parse("a.b.C").unwrap();
    let scoped = NodePath::parse("a::b::C").unwrap();
    assert_eq!(dotted, scoped);
    assert_eq!(dotted.segments(), ["a", "b", "C"]);
    assert_eq!(dotted.dotted(), "a.b.C");
    assert_eq!(dotted.name(), "C");
}

#[test]
fn empty_input_yields_no_path() {
    assert!(NodePath::parse("").is_none());
    assert!(NodePath::from_segments(Vec::<String>::new()).is_none());
}

#[test]
fn parent_drops_final_segment() {
    let path = NodePath::parse("a.b.C").unwrap();
    assert_eq!(path.parent().unwrap().dotted(), "a.b");
    assert!(NodePath::new("solo").parent().is_none());
}

#[test]
fn suffix_match_is_segment_aligned() {
    let path = NodePath::parse("A.B.C").unwrap();
    assert!(path.ends_with(&["B".to_string(), "C".to_string()]));
    assert!(!path.ends_with(&["AB".to_string(), "C".to_string()]));
    assert!(path.ends_with(&[]));
}

#[test]
fn unknown_paths_are_marked() {
    let unknown = NodePath::unknown("Widget");
    assert!(unknown.is_unknown());
    assert_eq!(unknown.segments()[0], UNKNOWN_SEGMENT);
    assert_eq!(unknown.name(), "Widget");
    assert!(!NodePath::parse("a.b").unwrap().is_unknown());
}
