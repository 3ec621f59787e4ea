use anyhow::Result;
use tree_sitter::Node as TSNode;

use super::common::{extract_text, find_child_by_kind, ExtractionError, TreeSitterParser};
use super::{note_type, ExtractionContext, LanguageExtractor, SourceFile};
use crate::core::{Dependency, Language, Node, NodeKind, NodePath, UsageKind};

pub struct GoExtractor;

impl GoExtractor {
    pub fn new() -> Self {
        Self
    }

    fn walk_file(
        &self,
        root: &TSNode,
        source: &[u8],
        file: &SourceFile,
        ctx: &mut ExtractionContext,
        nodes: &mut Vec<Node>,
    ) -> Result<()> {
        let mut cursor = root.walk();
        for child in root.children(&mut cursor) {
            match child.kind() {
                "package_clause" => {
                    if let Some(name) = find_child_by_kind(&child, "package_identifier") {
                        ctx.enter_namespace(&NodePath::new(extract_text(&name, source)));
                    }
                }
                "import_declaration" => self.process_imports(&child, source, ctx),
                "type_declaration" => self.process_types(&child, source, file, ctx, nodes)?,
                "function_declaration" => self.process_function(&child, source, file, ctx, nodes)?,
                "method_declaration" => self.process_method(&child, source, file, ctx, nodes)?,
                "var_declaration" | "const_declaration" => {
                    self.process_values(&child, source, file, ctx, nodes)
                }
                _ => self.collect_expressions(&child, source, ctx),
            }
        }
        Ok(())
    }

    fn process_imports(&self, node: &TSNode, source: &[u8], ctx: &mut ExtractionContext) {
        let mut specs = Vec::new();
        if node.kind() == "import_spec" {
            specs.push(*node);
        }
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "import_spec" => specs.push(child),
                "import_spec_list" => {
                    let mut inner = child.walk();
                    specs.extend(
                        child
                            .children(&mut inner)
                            .filter(|spec| spec.kind() == "import_spec"),
                    );
                }
                _ => {}
            }
        }

        for spec in specs {
            let Some(path_node) = spec.child_by_field_name("path") else {
                continue;
            };
            let raw = extract_text(&path_node, source).trim_matches('"').to_string();
            let Some(path) = NodePath::from_segments(raw.split('/')) else {
                continue;
            };
            let is_dot = spec
                .child_by_field_name("name")
                .map(|name| name.kind() == "dot" || extract_text(&name, source) == ".")
                .unwrap_or(false);
            if is_dot {
                // `import . "p"` — exported symbols usable unqualified.
                ctx.add_dependency(Dependency::dot_import(path));
            } else {
                ctx.add_dependency(Dependency::new(path));
            }
        }
    }

    fn process_types(
        &self,
        node: &TSNode,
        source: &[u8],
        file: &SourceFile,
        ctx: &mut ExtractionContext,
        nodes: &mut Vec<Node>,
    ) -> Result<()> {
        let mut cursor = node.walk();
        for spec in node.children(&mut cursor) {
            if spec.kind() != "type_spec" && spec.kind() != "type_alias" {
                continue;
            }
            let name_node = spec
                .child_by_field_name("name")
                .ok_or_else(|| ExtractionError::grammar_shape(&file.path, &spec, source))?;
            let name = extract_text(&name_node, source).to_string();

            let mut inner = ctx.child();
            let declared = inner.declared_path(&name);

            let (kind, type_node) = match spec.child_by_field_name("type") {
                Some(ty) if ty.kind() == "struct_type" => (NodeKind::ValueType, Some(ty)),
                Some(ty) if ty.kind() == "interface_type" => (NodeKind::Interface, Some(ty)),
                Some(ty) => (NodeKind::Class, Some(ty)),
                None => (NodeKind::Unknown, None),
            };

            if let Some(ty) = type_node {
                match ty.kind() {
                    "struct_type" => self.collect_struct_fields(&ty, source, &mut inner),
                    "interface_type" => self.collect_interface_members(&ty, source, &mut inner),
                    _ => note_type(&mut inner, extract_text(&ty, source), UsageKind::Usage),
                }
            }

            let mut declared_node = Node::new(declared, file.path.clone(), kind, Language::Go);
            inner.drain_into(&mut declared_node);
            nodes.push(declared_node);
        }
        Ok(())
    }

    fn collect_struct_fields(&self, ty: &TSNode, source: &[u8], ctx: &mut ExtractionContext) {
        let Some(fields) = find_child_by_kind(ty, "field_declaration_list") else {
            return;
        };
        let mut cursor = fields.walk();
        for field in fields.children(&mut cursor) {
            if field.kind() != "field_declaration" {
                continue;
            }
            let named = field.child_by_field_name("name").is_some();
            if let Some(field_type) = field.child_by_field_name("type") {
                // An unnamed field is an embedding, Go's inheritance analogue.
                let usage = if named {
                    UsageKind::Usage
                } else {
                    UsageKind::Inheritance
                };
                note_type(ctx, extract_text(&field_type, source), usage);
            }
        }
    }

    fn collect_interface_members(&self, ty: &TSNode, source: &[u8], ctx: &mut ExtractionContext) {
        let mut cursor = ty.walk();
        for member in ty.children(&mut cursor) {
            match member.kind() {
                "method_spec" => {
                    if let Some(parameters) = member.child_by_field_name("parameters") {
                        self.collect_parameters(&parameters, source, ctx);
                    }
                    if let Some(result) = member.child_by_field_name("result") {
                        self.collect_result(&result, source, ctx);
                    }
                }
                "type_identifier" | "qualified_type" => {
                    note_type(ctx, extract_text(&member, source), UsageKind::Inheritance);
                }
                _ => {}
            }
        }
    }

    fn process_function(
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
        self.collect_parameters(&parameters, source, &mut inner);
        if let Some(result) = node.child_by_field_name("result") {
            self.collect_result(&result, source, &mut inner);
        }
        if let Some(body) = node.child_by_field_name("body") {
            self.collect_expressions(&body, source, &mut inner);
        }

        let mut function = Node::new(declared, file.path.clone(), NodeKind::Function, Language::Go);
        inner.drain_into(&mut function);
        nodes.push(function);
        Ok(())
    }

    /// Methods hang under their receiver type: `func (s *Server) Run()`
    /// declares `pkg.Server.Run`.
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
        if let Some(receiver) = node.child_by_field_name("receiver") {
            if let Some(receiver_type) = find_child_by_kind(&receiver, "parameter_declaration")
                .and_then(|p| p.child_by_field_name("type"))
            {
                let receiver_name = extract_text(&receiver_type, source)
                    .trim_start_matches(['*', ' '])
                    .to_string();
                if !receiver_name.is_empty() {
                    inner.enter_declaration(&receiver_name);
                }
            }
        }
        let declared = inner.declared_path(&name);

        self.collect_parameters(&parameters, source, &mut inner);
        if let Some(result) = node.child_by_field_name("result") {
            self.collect_result(&result, source, &mut inner);
        }
        if let Some(body) = node.child_by_field_name("body") {
            self.collect_expressions(&body, source, &mut inner);
        }

        let mut method = Node::new(declared, file.path.clone(), NodeKind::Function, Language::Go);
        inner.drain_into(&mut method);
        nodes.push(method);
        Ok(())
    }

    fn process_values(
        &self,
        node: &TSNode,
        source: &[u8],
        file: &SourceFile,
        ctx: &mut ExtractionContext,
        nodes: &mut Vec<Node>,
    ) {
        let mut cursor = node.walk();
        for spec in node.children(&mut cursor) {
            if spec.kind() != "var_spec" && spec.kind() != "const_spec" {
                continue;
            }
            let mut inner = ctx.child();
            if let Some(ty) = spec.child_by_field_name("type") {
                note_type(&mut inner, extract_text(&ty, source), UsageKind::Usage);
            }
            self.collect_expressions(&spec, source, &mut inner);

            let mut names = Vec::new();
            let mut spec_cursor = spec.walk();
            for child in spec.children(&mut spec_cursor) {
                if child.kind() == "identifier" {
                    names.push(extract_text(&child, source).to_string());
                }
            }
            for name in names {
                let declared = inner.declared_path(&name);
                let mut variable =
                    Node::new(declared, file.path.clone(), NodeKind::Variable, Language::Go);
                let mut scratch = inner.clone();
                scratch.drain_into(&mut variable);
                nodes.push(variable);
            }
        }
    }

    fn collect_parameters(&self, parameters: &TSNode, source: &[u8], ctx: &mut ExtractionContext) {
        let mut cursor = parameters.walk();
        for parameter in parameters.children(&mut cursor) {
            match parameter.kind() {
                "parameter_declaration" | "variadic_parameter_declaration" => {
                    if let Some(ty) = parameter.child_by_field_name("type") {
                        note_type(ctx, extract_text(&ty, source), UsageKind::Argument);
                    }
                }
                _ => {}
            }
        }
    }

    fn collect_result(&self, result: &TSNode, source: &[u8], ctx: &mut ExtractionContext) {
        if result.kind() == "parameter_list" {
            let mut cursor = result.walk();
            for parameter in result.children(&mut cursor) {
                if parameter.kind() == "parameter_declaration" {
                    if let Some(ty) = parameter.child_by_field_name("type") {
                        note_type(ctx, extract_text(&ty, source), UsageKind::ReturnValue);
                    }
                }
            }
        } else {
            note_type(ctx, extract_text(result, source), UsageKind::ReturnValue);
        }
    }

    /// Default processor: composite literals are instantiations; selector
    /// expressions with an exported field are constant/symbol accesses.
    fn collect_expressions(&self, node: &TSNode, source: &[u8], ctx: &mut ExtractionContext) {
        match node.kind() {
            "composite_literal" => {
                if let Some(ty) = node.child_by_field_name("type") {
                    note_type(ctx, extract_text(&ty, source), UsageKind::Instantiation);
                }
            }
            "selector_expression" => {
                let operand = node.child_by_field_name("operand");
                let field = node.child_by_field_name("field");
                if let (Some(operand), Some(field)) = (operand, field) {
                    let field_text = extract_text(&field, source);
                    if operand.kind() == "identifier"
                        && field_text.chars().next().is_some_and(char::is_uppercase)
                    {
                        note_type(
                            ctx,
                            extract_text(node, source),
                            UsageKind::ConstantAccess,
                        );
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

impl LanguageExtractor for GoExtractor {
    fn language(&self) -> Language {
        Language::Go
    }

    fn extract(&self, file: &SourceFile) -> Result<Vec<Node>> {
        let mut parser = TreeSitterParser::new(tree_sitter_go::language())?;
        let tree = parser.parse_source(&file.text, &file.path, "go")?;
        let source = file.text.as_bytes();

        let mut ctx = ExtractionContext::for_file(file);
        let mut nodes = Vec::new();
        self.walk_file(&tree.root_node(), source, file, &mut ctx, &mut nodes)?;
        Ok(nodes)
    }
}
