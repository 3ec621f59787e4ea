use anyhow::Result;
use tree_sitter::Node as TSNode;

use super::common::{extract_text, find_child_by_kind, ExtractionError, TreeSitterParser};
use super::{note_type, ExtractionContext, LanguageExtractor, SourceFile};
use crate::core::{Dependency, Language, Node, NodeKind, NodePath, UsageKind};

pub struct CppExtractor;

impl CppExtractor {
    pub fn new() -> Self {
        Self
    }

    fn walk_block(
        &self,
        block: &TSNode,
        source: &[u8],
        file: &SourceFile,
        ctx: &mut ExtractionContext,
        nodes: &mut Vec<Node>,
    ) -> Result<()> {
        let mut cursor = block.walk();
        for child in block.children(&mut cursor) {
            match child.kind() {
                "preproc_include" => self.process_include(&child, source, ctx),
                "namespace_definition" => {
                    self.process_namespace(&child, source, file, ctx, nodes)?
                }
                "using_declaration" => self.process_using(&child, source, ctx),
                "alias_declaration" | "type_definition" => {
                    if let Some(ty) = child.child_by_field_name("type") {
                        note_type(ctx, extract_text(&ty, source), UsageKind::Usage);
                    }
                }
                "class_specifier" => {
                    self.process_record(&child, source, file, NodeKind::Class, ctx, nodes)?
                }
                "struct_specifier" | "union_specifier" => {
                    self.process_record(&child, source, file, NodeKind::ValueType, ctx, nodes)?
                }
                "enum_specifier" => {
                    self.process_enum(&child, source, file, ctx, nodes)?
                }
                "function_definition" => {
                    self.process_function(&child, source, file, ctx, nodes)?
                }
                "declaration" => self.process_declaration(&child, source, file, ctx, nodes)?,
                "template_declaration" => {
                    // Unwrap and process the templated entity itself.
                    self.walk_block(&child, source, file, ctx, nodes)?
                }
                _ => self.collect_expressions(&child, source, ctx),
            }
        }
        Ok(())
    }

    fn process_include(&self, node: &TSNode, source: &[u8], ctx: &mut ExtractionContext) {
        // `#include "util/strings.hpp"` lines up with the fallback scope the
        // included file's bare declarations get qualified under.
        if let Some(path_node) = node.child_by_field_name("path") {
            let raw = extract_text(&path_node, source)
                .trim_matches(|c| c == '"' || c == '<' || c == '>')
                .to_string();
            let without_ext = raw.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(&raw);
            if let Some(path) = NodePath::from_segments(without_ext.split('/')) {
                ctx.add_dependency(Dependency::wildcard(path));
            }
        }
    }

    fn process_namespace(
        &self,
        node: &TSNode,
        source: &[u8],
        file: &SourceFile,
        ctx: &mut ExtractionContext,
        nodes: &mut Vec<Node>,
    ) -> Result<()> {
        // `namespace A::B { ... }` opens two nested scopes, not one segment.
        let path = node
            .child_by_field_name("name")
            .and_then(|name| NodePath::parse(extract_text(&name, source)));
        let body = node
            .child_by_field_name("body")
            .ok_or_else(|| ExtractionError::grammar_shape(&file.path, node, source))?;

        let mut inner = ctx.child();
        if let Some(path) = path {
            inner.enter_namespace(&path);
        }
        self.walk_block(&body, source, file, &mut inner, nodes)
    }

    fn process_using(&self, node: &TSNode, source: &[u8], ctx: &mut ExtractionContext) {
        let text = extract_text(node, source);
        let target = text
            .trim_start_matches("using")
            .trim_start_matches(char::is_whitespace)
            .trim_start_matches("namespace")
            .trim_end_matches(';')
            .trim();
        if let Some(path) = NodePath::parse(target) {
            if text.contains("namespace") {
                // `using namespace X;` — everything under X usable unqualified.
                ctx.add_dependency(Dependency::wildcard(path));
            } else if let Some(parent) = path.parent() {
                // `using X::Y;` widens to the enclosing namespace.
                ctx.add_dependency(Dependency::wildcard(parent));
            } else {
                ctx.add_dependency(Dependency::wildcard(path));
            }
        }
    }

    fn process_record(
        &self,
        node: &TSNode,
        source: &[u8],
        file: &SourceFile,
        kind: NodeKind,
        ctx: &mut ExtractionContext,
        nodes: &mut Vec<Node>,
    ) -> Result<()> {
        let name = match node.child_by_field_name("name") {
            Some(name_node) => extract_text(&name_node, source).to_string(),
            // Anonymous record: only its member types matter.
            None => {
                self.collect_expressions(node, source, ctx);
                return Ok(());
            }
        };

        let mut inner = ctx.child();
        let declared = inner.declared_path(&name);

        if let Some(bases) = find_child_by_kind(node, "base_class_clause") {
            let mut cursor = bases.walk();
            for base in bases.children(&mut cursor) {
                match base.kind() {
                    "type_identifier" | "qualified_identifier" | "template_type" => {
                        note_type(&mut inner, extract_text(&base, source), UsageKind::Inheritance);
                    }
                    _ => {}
                }
            }
        }

        inner.enter_declaration(&name);
        let mut members: Vec<Node> = Vec::new();
        if let Some(body) = node.child_by_field_name("body") {
            self.walk_members(&body, source, file, &mut inner, &mut members)?;
        }

        // A body-less specifier is a forward declaration; it still produces a
        // (partial) node and consolidation merges it with the definition.
        let mut declared_node = Node::new(declared, file.path.clone(), kind, Language::Cpp);
        inner.drain_into(&mut declared_node);
        nodes.push(declared_node);
        nodes.extend(members);
        Ok(())
    }

    fn walk_members(
        &self,
        body: &TSNode,
        source: &[u8],
        file: &SourceFile,
        ctx: &mut ExtractionContext,
        nodes: &mut Vec<Node>,
    ) -> Result<()> {
        let mut cursor = body.walk();
        for member in body.children(&mut cursor) {
            match member.kind() {
                "field_declaration" => {
                    if find_child_by_kind(&member, "function_declarator").is_some() {
                        // Method prototype inside the class body.
                        self.process_function(&member, source, file, ctx, nodes)?;
                    } else if let Some(ty) = member.child_by_field_name("type") {
                        note_type(ctx, extract_text(&ty, source), UsageKind::Usage);
                        self.collect_expressions(&member, source, ctx);
                    }
                }
                "function_definition" => {
                    self.process_function(&member, source, file, ctx, nodes)?
                }
                "class_specifier" => {
                    self.process_record(&member, source, file, NodeKind::Class, ctx, nodes)?
                }
                "struct_specifier" | "union_specifier" => {
                    self.process_record(&member, source, file, NodeKind::ValueType, ctx, nodes)?
                }
                "enum_specifier" => self.process_enum(&member, source, file, ctx, nodes)?,
                "template_declaration" => self.walk_members(&member, source, file, ctx, nodes)?,
                _ => self.collect_expressions(&member, source, ctx),
            }
        }
        Ok(())
    }

    fn process_enum(
        &self,
        node: &TSNode,
        source: &[u8],
        file: &SourceFile,
        ctx: &mut ExtractionContext,
        nodes: &mut Vec<Node>,
    ) -> Result<()> {
        let name = match node.child_by_field_name("name") {
            Some(name_node) => extract_text(&name_node, source).to_string(),
            None => return Ok(()),
        };
        let mut inner = ctx.child();
        let declared = inner.declared_path(&name);
        let mut enum_node = Node::new(declared, file.path.clone(), NodeKind::Enum, Language::Cpp);
        inner.drain_into(&mut enum_node);
        nodes.push(enum_node);
        Ok(())
    }

    /// Function definitions and prototypes. The declarator carries the name
    /// (possibly `ns::`-qualified for out-of-line definitions) and the
    /// parameter list; a callable shape without a parameter list is a fatal
    /// grammar mismatch.
    fn process_function(
        &self,
        node: &TSNode,
        source: &[u8],
        file: &SourceFile,
        ctx: &mut ExtractionContext,
        nodes: &mut Vec<Node>,
    ) -> Result<()> {
        let declarator = find_function_declarator(node)
            .ok_or_else(|| ExtractionError::grammar_shape(&file.path, node, source))?;
        let parameters = declarator
            .child_by_field_name("parameters")
            .ok_or_else(|| ExtractionError::grammar_shape(&file.path, node, source))?;
        let name_text = declarator
            .child_by_field_name("declarator")
            .map(|n| extract_text(&n, source).to_string())
            .ok_or_else(|| ExtractionError::grammar_shape(&file.path, node, source))?;

        let mut inner = ctx.child();
        let declared = match NodePath::parse(&name_text) {
            Some(path) if path.len() > 1 => {
                // `void ns::run()` defines `run` inside `ns`.
                let qualifier = path.parent().unwrap_or_else(|| path.clone());
                inner.declared_path_qualified(&qualifier, path.name())
            }
            Some(path) => inner.declared_path(path.name()),
            None => {
                // Operators, destructors: keep the raw spelling as one segment.
                inner.declared_path(&name_text)
            }
        };

        if let Some(return_type) = node.child_by_field_name("type") {
            note_type(&mut inner, extract_text(&return_type, source), UsageKind::ReturnValue);
        }
        let mut cursor = parameters.walk();
        for parameter in parameters.children(&mut cursor) {
            if parameter.kind() == "parameter_declaration" {
                if let Some(ty) = parameter.child_by_field_name("type") {
                    note_type(&mut inner, extract_text(&ty, source), UsageKind::Argument);
                }
            }
        }
        if let Some(body) = node.child_by_field_name("body") {
            self.collect_expressions(&body, source, &mut inner);
        }

        let mut function = Node::new(declared, file.path.clone(), NodeKind::Function, Language::Cpp);
        inner.drain_into(&mut function);
        nodes.push(function);
        Ok(())
    }

    /// Plain declarations: function prototypes route to the function
    /// processor, variable declarations become variable nodes.
    fn process_declaration(
        &self,
        node: &TSNode,
        source: &[u8],
        file: &SourceFile,
        ctx: &mut ExtractionContext,
        nodes: &mut Vec<Node>,
    ) -> Result<()> {
        if find_child_by_kind(node, "function_declarator").is_some() {
            return self.process_function(node, source, file, ctx, nodes);
        }
        if let Some(declarator) = find_child_by_kind(node, "init_declarator")
            .and_then(|d| d.child_by_field_name("declarator"))
            .or_else(|| node.child_by_field_name("declarator"))
        {
            if declarator.kind() == "identifier" {
                let name = extract_text(&declarator, source).to_string();
                let mut inner = ctx.child();
                let declared = inner.declared_path(&name);
                if let Some(ty) = node.child_by_field_name("type") {
                    note_type(&mut inner, extract_text(&ty, source), UsageKind::Usage);
                }
                self.collect_expressions(node, source, &mut inner);
                let mut variable =
                    Node::new(declared, file.path.clone(), NodeKind::Variable, Language::Cpp);
                inner.drain_into(&mut variable);
                nodes.push(variable);
                return Ok(());
            }
        }
        self.collect_expressions(node, source, ctx);
        Ok(())
    }

    /// Default processor: instantiations and scope-qualified constant access
    /// anywhere in a subtree.
    fn collect_expressions(&self, node: &TSNode, source: &[u8], ctx: &mut ExtractionContext) {
        match node.kind() {
            "new_expression" => {
                if let Some(ty) = node.child_by_field_name("type") {
                    note_type(ctx, extract_text(&ty, source), UsageKind::Instantiation);
                }
            }
            "qualified_identifier" => {
                // `Color::Red` — the scope names the type being accessed.
                let text = extract_text(node, source);
                if let Some(path) = NodePath::parse(text) {
                    if let Some(scope) = path.parent() {
                        if scope.name().chars().next().is_some_and(char::is_uppercase) {
                            note_type(ctx, &scope.dotted(), UsageKind::ConstantAccess);
                        }
                    }
                }
            }
            _ => {}
        }
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.collect_expressions(&child, source, ctx);
        }
    }
}

fn find_function_declarator<'tree>(node: &TSNode<'tree>) -> Option<TSNode<'tree>> {
    if node.kind() == "function_declarator" {
        return Some(*node);
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if let Some(found) = find_function_declarator(&child) {
            return Some(found);
        }
    }
    None
}

impl LanguageExtractor for CppExtractor {
    fn language(&self) -> Language {
        Language::Cpp
    }

    fn extract(&self, file: &SourceFile) -> Result<Vec<Node>> {
        let mut parser = TreeSitterParser::new(tree_sitter_cpp::language())?;
        let tree = parser.parse_source(&file.text, &file.path, "cpp")?;
        let source = file.text.as_bytes();

        let mut ctx = ExtractionContext::for_file(file);
        let mut nodes = Vec::new();
        self.walk_block(&tree.root_node(), source, file, &mut ctx, &mut nodes)?;
        Ok(nodes)
    }
}
