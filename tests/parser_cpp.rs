use std::path::PathBuf;

use stratum::core::{Language, Node, NodeKind, UsageKind};
use stratum::parsers::cpp::CppExtractor;
use stratum::parsers::{consolidate, LanguageExtractor, SourceFile};

fn extract_from(path: &str, source: &str) -> Vec<Node> {
    let file = SourceFile::new(PathBuf::from(path), Language::Cpp, source.to_string());
    CppExtractor::new().extract(&file).unwrap()
}

fn extract(source: &str) -> Vec<Node> {
    extract_from("geo/shapes.hpp", source)
}

fn find<'a>(nodes: &'a [Node], dotted: &str) -> &'a Node {
    nodes
        .iter()
        .find(|n| n.path.dotted() == dotted)
        .unwrap_or_else(|| panic!("missing node {dotted}"))
}

fn used_names(node: &Node, usage: UsageKind) -> Vec<&str> {
    node.used_types
        .iter()
        .filter(|t| t.usage == usage)
        .map(|t| t.name.as_str())
        .collect()
}

#[test]
fn extracts_classes_methods_and_includes() {
    let nodes = extract(
        r#"
#include "util/strings.hpp"
#include <vector>

namespace geo {

class Shape {
public:
    virtual double area() const;
};

class Circle : public Shape {
private:
    math::Vector2<double> center;
};

enum Color { Red, Blue };

}
"#,
    );

    let shape = find(&nodes, "geo.Shape");
    assert_eq!(shape.kind, NodeKind::Class);
    assert!(shape
        .dependencies
        .iter()
        .any(|d| d.is_wildcard && d.path.dotted() == "util.strings"));
    assert!(shape
        .dependencies
        .iter()
        .any(|d| d.is_wildcard && d.path.dotted() == "vector"));

    let area = find(&nodes, "geo.Shape.area");
    assert_eq!(area.kind, NodeKind::Function);
    assert_eq!(used_names(area, UsageKind::ReturnValue), vec!["double"]);

    let circle = find(&nodes, "geo.Circle");
    assert_eq!(used_names(circle, UsageKind::Inheritance), vec!["Shape"]);
    let vector2 = circle
        .used_types
        .iter()
        .find(|t| t.name == "Vector2")
        .expect("field type");
    assert_eq!(vector2.arguments()[0].name, "double");
    assert!(circle
        .dependencies
        .iter()
        .any(|d| d.is_wildcard && d.path.dotted() == "math"));

    assert_eq!(find(&nodes, "geo.Color").kind, NodeKind::Enum);
}

#[test]
fn out_of_line_definition_merges_with_prototype() {
    let nodes = extract(
        r#"
namespace geo {
class Circle {
public:
    double area() const;
};
}

double geo::Circle::area() const { return 0.0; }
"#,
    );

    let merged = consolidate(nodes);
    let definitions: Vec<_> = merged
        .iter()
        .filter(|n| n.path.dotted() == "geo.Circle.area")
        .collect();
    assert_eq!(definitions.len(), 1);
    assert_eq!(definitions[0].kind, NodeKind::Function);
}

#[test]
fn nested_namespace_opens_one_scope_per_segment() {
    let nodes = extract(
        r#"
namespace net::http {
class Request {};
}
"#,
    );
    assert_eq!(find(&nodes, "net.http.Request").kind, NodeKind::Class);
}

#[test]
fn using_directives_become_wildcard_dependencies() {
    let nodes = extract(
        r#"
using namespace std;
using geo::Shape;

namespace app {
class Runner {};
}
"#,
    );

    let runner = find(&nodes, "app.Runner");
    let wildcards: Vec<String> = runner
        .dependencies
        .iter()
        .filter(|d| d.is_wildcard)
        .map(|d| d.path.dotted())
        .collect();
    assert!(wildcards.contains(&"std".to_string()));
    // `using geo::Shape;` widens to the enclosing namespace.
    assert!(wildcards.contains(&"geo".to_string()));
}

#[test]
fn scope_qualified_constant_access_names_the_type() {
    let nodes = extract(
        r#"
namespace app {
void paint() {
    int c = Color::Red;
}
}
"#,
    );

    let paint = find(&nodes, "app.paint");
    assert_eq!(used_names(paint, UsageKind::ConstantAccess), vec!["Color"]);
}

#[test]
fn bare_declarations_take_the_file_scope() {
    let nodes = extract_from("geo/shapes.hpp", "class Shape {};\n");
    assert_eq!(find(&nodes, "geo.shapes.Shape").kind, NodeKind::Class);
}

#[test]
fn instantiations_are_collected_from_bodies() {
    let nodes = extract(
        r#"
namespace app {
void build() {
    auto widget = new Widget();
}
}
"#,
    );

    let build = find(&nodes, "app.build");
    assert_eq!(used_names(build, UsageKind::Instantiation), vec!["Widget"]);
}
