use anyhow::Result;
use tree_sitter::Node as TSNode;

use super::common::{extract_text, find_child_by_kind, ExtractionError, TreeSitterParser};
use super::{note_type, ExtractionContext, LanguageExtractor, SourceFile};
use crate::core::{Dependency, Language, Node, NodeKind, NodePath, UsageKind};

pub struct CSharpExtractor;

impl CSharpExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Process the children of one block. Siblings share the evolving
    /// context, so a `using` directive affects everything after it.
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
                "using_directive" => self.process_using(&child, source, ctx),
                "namespace_declaration" => {
                    self.process_namespace(&child, source, file, ctx, nodes)?
                }
                // A malformed top-level construct would otherwise drop its
                // declarations without a trace.
                "ERROR" => {
                    return Err(ExtractionError::grammar_shape(&file.path, &child, source).into())
                }
                "class_declaration" | "record_declaration" => {
                    self.process_type(&child, source, file, NodeKind::Class, ctx, nodes)?
                }
                "interface_declaration" => {
                    self.process_type(&child, source, file, NodeKind::Interface, ctx, nodes)?
                }
                "struct_declaration" => {
                    self.process_type(&child, source, file, NodeKind::ValueType, ctx, nodes)?
                }
                "enum_declaration" => {
                    self.process_type(&child, source, file, NodeKind::Enum, ctx, nodes)?
                }
                "delegate_declaration" => {
                    self.process_delegate(&child, source, file, ctx, nodes)?
                }
                _ => self.collect_expressions(&child, source, ctx),
            }
        }
        Ok(())
    }

    fn process_using(&self, node: &TSNode, source: &[u8], ctx: &mut ExtractionContext) {
        // `using A.B;` makes every declaration under A.B usable unqualified.
        let name = find_child_by_kind(node, "qualified_name")
            .or_else(|| find_child_by_kind(node, "identifier"))
            .map(|n| extract_text(&n, source).to_string());
        if let Some(path) = name.as_deref().and_then(NodePath::parse) {
            ctx.add_dependency(Dependency::wildcard(path));
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
        let name = node
            .child_by_field_name("name")
            .map(|n| extract_text(&n, source).to_string())
            .ok_or_else(|| ExtractionError::grammar_shape(&file.path, node, source))?;
        let path = NodePath::parse(&name)
            .ok_or_else(|| ExtractionError::grammar_shape(&file.path, node, source))?;

        let body = node
            .child_by_field_name("body")
            .ok_or_else(|| ExtractionError::grammar_shape(&file.path, node, source))?;

        // `namespace A.B` opens one nested scope per segment.
        let mut inner = ctx.child();
        inner.enter_namespace(&path);
        self.walk_block(&body, source, file, &mut inner, nodes)
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

        if let Some(bases) = find_child_by_kind(node, "base_list") {
            let mut cursor = bases.walk();
            for base in bases.children(&mut cursor) {
                match base.kind() {
                    "identifier" | "qualified_name" | "generic_name" => {
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

        let mut declared_node = Node::new(declared, file.path.clone(), kind, Language::CSharp);
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
                "field_declaration" => self.process_field(&member, source, ctx),
                "property_declaration" => {
                    if let Some(ty) = member.child_by_field_name("type") {
                        note_type(ctx, extract_text(&ty, source), UsageKind::Usage);
                    }
                }
                "class_declaration" | "record_declaration" => {
                    self.process_type(&member, source, file, NodeKind::Class, ctx, nodes)?
                }
                "interface_declaration" => {
                    self.process_type(&member, source, file, NodeKind::Interface, ctx, nodes)?
                }
                "struct_declaration" => {
                    self.process_type(&member, source, file, NodeKind::ValueType, ctx, nodes)?
                }
                "enum_declaration" => {
                    self.process_type(&member, source, file, NodeKind::Enum, ctx, nodes)?
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
        let name = extract_text(&name_node, source).to_string();

        // A callable with no discoverable parameter list means the grammar
        // shape drifted; fail the file instead of guessing.
        let parameters = node
            .child_by_field_name("parameters")
            .or_else(|| find_child_by_kind(node, "parameter_list"))
            .ok_or_else(|| ExtractionError::grammar_shape(&file.path, node, source))?;

        let mut inner = ctx.child();
        let declared = inner.declared_path(&name);

        if let Some(return_type) = node.child_by_field_name("type") {
            note_type(&mut inner, extract_text(&return_type, source), UsageKind::ReturnValue);
        }
        let mut cursor = parameters.walk();
        for parameter in parameters.children(&mut cursor) {
            if parameter.kind() == "parameter" {
                if let Some(ty) = parameter.child_by_field_name("type") {
                    note_type(&mut inner, extract_text(&ty, source), UsageKind::Argument);
                }
            }
        }
        if let Some(body) = node.child_by_field_name("body") {
            self.collect_expressions(&body, source, &mut inner);
        }

        let mut method = Node::new(declared, file.path.clone(), NodeKind::Function, Language::CSharp);
        inner.drain_into(&mut method);
        nodes.push(method);
        Ok(())
    }

    fn process_field(&self, node: &TSNode, source: &[u8], ctx: &mut ExtractionContext) {
        if let Some(declaration) = find_child_by_kind(node, "variable_declaration") {
            if let Some(ty) = declaration.child_by_field_name("type") {
                note_type(ctx, extract_text(&ty, source), UsageKind::Usage);
            }
            self.collect_expressions(&declaration, source, ctx);
        }
    }

    /// Default processor: scan an arbitrary subtree for instantiations and
    /// constant accesses.
    fn collect_expressions(&self, node: &TSNode, source: &[u8], ctx: &mut ExtractionContext) {
        match node.kind() {
            "object_creation_expression" => {
                if let Some(ty) = node.child_by_field_name("type") {
                    note_type(ctx, extract_text(&ty, source), UsageKind::Instantiation);
                }
            }
            "member_access_expression" => {
                // `Color.Red` style static/constant access: the receiver is a
                // bare capitalized name, not a further expression.
                if let Some(receiver) = node.child_by_field_name("expression") {
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

    fn process_delegate(
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
        let name = extract_text(&name_node, source).to_string();
        let mut inner = ctx.child();
        let declared = inner.declared_path(&name);
        if let Some(return_type) = node.child_by_field_name("type") {
            note_type(&mut inner, extract_text(&return_type, source), UsageKind::ReturnValue);
        }
        let mut delegate = Node::new(declared, file.path.clone(), NodeKind::Function, Language::CSharp);
        inner.drain_into(&mut delegate);
        nodes.push(delegate);
        Ok(())
    }
}

impl LanguageExtractor for CSharpExtractor {
    fn language(&self) -> Language {
        Language::CSharp
    }

    fn extract(&self, file: &SourceFile) -> Result<Vec<Node>> {
        let mut parser = TreeSitterParser::new(tree_sitter_c_sharp::language())?;
        let tree = parser.parse_source(&file.text, &file.path, "csharp")?;
        let source = file.text.as_bytes();

        let mut ctx = ExtractionContext::for_file(file);
        let mut nodes = Vec::new();
        self.walk_block(&tree.root_node(), source, file, &mut ctx, &mut nodes)?;
        Ok(nodes)
    }
}
