use std::path::PathBuf;

use stratum::core::{Language, Node, NodeKind, UsageKind};
use stratum::parsers::csharp::CSharpExtractor;
use stratum::parsers::{LanguageExtractor, SourceFile};

fn extract(source: &str) -> Vec<Node> {
    let file = SourceFile::new(
        PathBuf::from("src/App.cs"),
        Language::CSharp,
        source.to_string(),
    );
    CSharpExtractor::new().extract(&file).unwrap()
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
fn extracts_classes_and_methods_with_namespace() {
    let nodes = extract(
        r#"
using System.Collections;

namespace Billing.Core
{
    public class Invoice
    {
        private Ledger ledger;

        public Total ComputeTotal(LineItem item)
        {
            return new Total();
        }
    }
}
"#,
    );

    let invoice = find(&nodes, "Billing.Core.Invoice");
    assert_eq!(invoice.kind, NodeKind::Class);
    assert_eq!(invoice.language, Language::CSharp);
    assert_eq!(used_names(invoice, UsageKind::Usage), vec!["Ledger"]);
    assert!(invoice
        .dependencies
        .iter()
        .any(|d| d.is_wildcard && d.path.dotted() == "System.Collections"));

    let method = find(&nodes, "Billing.Core.Invoice.ComputeTotal");
    assert_eq!(method.kind, NodeKind::Function);
    assert_eq!(used_names(method, UsageKind::ReturnValue), vec!["Total"]);
    assert_eq!(used_names(method, UsageKind::Argument), vec!["LineItem"]);
    assert_eq!(used_names(method, UsageKind::Instantiation), vec!["Total"]);
}

#[test]
fn records_and_interfaces_share_the_namespace_scope() {
    let nodes = extract(
        r#"
namespace Billing.Models
{
    public record LineItem
    {
        public decimal Amount;
    }

    public interface IPriced
    {
        decimal Price();
    }
}
"#,
    );

    assert_eq!(find(&nodes, "Billing.Models.LineItem").kind, NodeKind::Class);
    assert_eq!(
        find(&nodes, "Billing.Models.IPriced").kind,
        NodeKind::Interface
    );
}

#[test]
fn malformed_top_level_syntax_fails_the_file() {
    // The pinned grammar has no production for this form; dropping the
    // declarations silently would poison resolution, so the file is fatal.
    let file = SourceFile::new(
        PathBuf::from("src/App.cs"),
        Language::CSharp,
        "namespace Billing.Models;\n\npublic class Invoice { }\n".to_string(),
    );
    let result = CSharpExtractor::new().extract(&file);
    assert!(result.is_err());
}

#[test]
fn bare_declarations_fall_back_to_file_scope() {
    let nodes = extract("public class Orphan { }");
    // `src/App.cs` supplies the namespace when the file declares none.
    assert_eq!(find(&nodes, "src.App.Orphan").kind, NodeKind::Class);
}

#[test]
fn inheritance_and_enums_are_recorded() {
    let nodes = extract(
        r#"
namespace Shop
{
    public enum Color { Red, Green }

    public class Cart : BaseCart, IAuditable
    {
        public void Paint()
        {
            var c = Color.Red;
        }
    }
}
"#,
    );

    assert_eq!(find(&nodes, "Shop.Color").kind, NodeKind::Enum);
    let cart = find(&nodes, "Shop.Cart");
    assert_eq!(
        used_names(cart, UsageKind::Inheritance),
        vec!["BaseCart", "IAuditable"]
    );
    let paint = find(&nodes, "Shop.Cart.Paint");
    assert_eq!(used_names(paint, UsageKind::ConstantAccess), vec!["Color"]);
}

#[test]
fn generic_usages_keep_their_arguments() {
    let nodes = extract(
        r#"
namespace Shop
{
    public class Catalog
    {
        public Dictionary<string, Item> Lookup(List<Item> items)
        {
            return null;
        }
    }
}
"#,
    );

    let lookup = find(&nodes, "Shop.Catalog.Lookup");
    let dictionary = lookup
        .used_types
        .iter()
        .find(|t| t.name == "Dictionary")
        .unwrap();
    assert_eq!(dictionary.usage, UsageKind::ReturnValue);
    let argument_names: Vec<&str> = dictionary
        .arguments()
        .iter()
        .map(|a| a.name.as_str())
        .collect();
    assert_eq!(argument_names, vec!["string", "Item"]);
}
