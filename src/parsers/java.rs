use anyhow::Result;
use tree_sitter::Node as TSNode;

use super::common::{extract_text, find_child_by_kind, ExtractionError, TreeSitterParser};
use super::{note_type, ExtractionContext, LanguageExtractor, SourceFile};
use crate::core::{Dependency, Language, Node, NodeKind, NodePath, UsageKind};

pub struct JavaExtractor;

impl JavaExtractor {
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
                "package_declaration" => {
                    if let Some(path) = find_child_by_kind(&child, "scoped_identifier")
                        .or_else(|| find_child_by_kind(&child, "identifier"))
                        .and_then(|n| NodePath::parse(extract_text(&n, source)))
                    {
                        ctx.enter_namespace(&path);
                    }
                }
                "import_declaration" => self.process_import(&child, source, ctx),
                "class_declaration" | "record_declaration" => {
                    self.process_type(&child, source, file, NodeKind::Class, ctx, nodes)?
                }
                "interface_declaration" => {
                    self.process_type(&child, source, file, NodeKind::Interface, ctx, nodes)?
                }
                "enum_declaration" => {
                    self.process_type(&child, source, file, NodeKind::Enum, ctx, nodes)?
                }
                "annotation_type_declaration" => {
                    self.process_type(&child, source, file, NodeKind::Annotation, ctx, nodes)?
                }
                _ => self.collect_expressions(&child, source, ctx),
            }
        }
        Ok(())
    }

    fn process_import(&self, node: &TSNode, source: &[u8], ctx: &mut ExtractionContext) {
        let Some(target) = find_child_by_kind(node, "scoped_identifier")
            .map(|n| extract_text(&n, source).to_string())
        else {
            return;
        };
        let Some(path) = NodePath::parse(&target) else {
            return;
        };
        if find_child_by_kind(node, "asterisk").is_some() {
            ctx.add_dependency(Dependency::wildcard(path));
        } else if let Some(parent) = path.parent() {
            // Single-type imports widen to the enclosing package; the model
            // has no per-symbol import form.
            ctx.add_dependency(Dependency::wildcard(parent));
        } else {
            ctx.add_dependency(Dependency::wildcard(path));
        }
    }

    fn process_type(
        &self,
        node: &TSNode,
        source: &[u8],
        file: &SourceFile,
        kind: NodeKind,
        ctx: &mut ExtractionContext,
        nodes: &mut Vec<Node>,
    ) -> Result<()> {
        let name_node = node
            .child_by_field_name("name")
            .ok_or_else(|| ExtractionError::grammar_shape(&file.path, node, source))?;
        let name = extract_text(&name_node, source).to_string();

        let mut inner = ctx.child();
        let declared = inner.declared_path(&name);

        if let Some(superclass) = node.child_by_field_name("superclass") {
            // `superclass` wraps the single extended type.
            let mut cursor = superclass.walk();
            for base in superclass.children(&mut cursor) {
                if base.kind() != "extends" {
                    note_type(&mut inner, extract_text(&base, source), UsageKind::Inheritance);
                }
            }
        }
        if let Some(interfaces) = node.child_by_field_name("interfaces") {
            if let Some(list) = find_child_by_kind(&interfaces, "type_list") {
                let mut cursor = list.walk();
                for base in list.children(&mut cursor) {
                    if base.kind() != "," {
                        note_type(&mut inner, extract_text(&base, source), UsageKind::Inheritance);
                    }
                }
            }
        }

        inner.enter_declaration(&name);
        let mut members: Vec<Node> = Vec::new();
        if let Some(body) = node.child_by_field_name("body") {
            self.walk_members(&body, source, file, &mut inner, &mut members)?;
        }

        let mut declared_node = Node::new(declared, file.path.clone(), kind, Language::Java);
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
                "method_declaration" | "constructor_declaration" => {
                    self.process_method(&member, source, file, ctx, nodes)?
                }
                "field_declaration" => {
                    if let Some(ty) = member.child_by_field_name("type") {
                        note_type(ctx, extract_text(&ty, source), UsageKind::Usage);
                    }
                    self.collect_expressions(&member, source, ctx);
                }
                "class_declaration" | "record_declaration" => {
                    self.process_type(&member, source, file, NodeKind::Class, ctx, nodes)?
                }
                "interface_declaration" => {
                    self.process_type(&member, source, file, NodeKind::Interface, ctx, nodes)?
                }
                "enum_declaration" => {
                    self.process_type(&member, source, file, NodeKind::Enum, ctx, nodes)?
                }
                "annotation_type_declaration" => {
                    self.process_type(&member, source, file, NodeKind::Annotation, ctx, nodes)?
                }
                _ => self.collect_expressions(&member, source, ctx),
            }
        }
        Ok(())
    }

    fn process_method(
        &self,
        node: &TSNode,
        source: &[u8],
        file: &SourceFile,
        ctx: &mut ExtractionContext,
        nodes: &mut Vec<Node>,
    ) -> Result<()> {
        let name_node = node
            .child_by_field_name("name")
            .ok_or_else(|| ExtractionError::grammar_shape(&file.path, node, source))?;
        let parameters = node
            .child_by_field_name("parameters")
            .ok_or_else(|| ExtractionError::grammar_shape(&file.path, node, source))?;
        let name = extract_text(&name_node, source).to_string();

        let mut inner = ctx.child();
        let declared = inner.declared_path(&name);

        if let Some(return_type) = node.child_by_field_name("type") {
            note_type(&mut inner, extract_text(&return_type, source), UsageKind::ReturnValue);
        }
        let mut cursor = parameters.walk();
        for parameter in parameters.children(&mut cursor) {
            if parameter.kind() == "formal_parameter" || parameter.kind() == "spread_parameter" {
                if let Some(ty) = parameter.child_by_field_name("type") {
                    note_type(&mut inner, extract_text(&ty, source), UsageKind::Argument);
                }
            }
        }
        if let Some(body) = node.child_by_field_name("body") {
            self.collect_expressions(&body, source, &mut inner);
        }

        let mut method = Node::new(declared, file.path.clone(), NodeKind::Function, Language::Java);
        inner.drain_into(&mut method);
        nodes.push(method);
        Ok(())
    }

    /// Default processor: object creation and static field access.
    fn collect_expressions(&self, node: &TSNode, source: &[u8], ctx: &mut ExtractionContext) {
        match node.kind() {
            "object_creation_expression" => {
                if let Some(ty) = node.child_by_field_name("type") {
                    note_type(ctx, extract_text(&ty, source), UsageKind::Instantiation);
                }
            }
            "field_access" => {
                // `Color.RED` — a capitalized bare receiver is a type.
                if let Some(receiver) = node.child_by_field_name("object") {
                    if receiver.kind() == "identifier" {
                        let text = extract_text(&receiver, source);
                        if text.chars().next().is_some_and(char::is_uppercase) {
                            note_type(ctx, text, UsageKind::ConstantAccess);
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

impl LanguageExtractor for JavaExtractor {
    fn language(&self) -> Language {
        Language::Java
    }

    fn extract(&self, file: &SourceFile) -> Result<Vec<Node>> {
        let mut parser = TreeSitterParser::new(tree_sitter_java::language())?;
        let tree = parser.parse_source(&file.text, &file.path, "java")?;
        let source = file.text.as_bytes();

        let mut ctx = ExtractionContext::for_file(file);
        let mut nodes = Vec::new();
        self.walk_block(&tree.root_node(), source, file, &mut ctx, &mut nodes)?;
        Ok(nodes)
    }
}
