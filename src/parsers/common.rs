use anyhow::Result;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tree_sitter::{Language as TSLanguage, Node as TSNode, Parser, Tree};

use crate::core::{Dependency, NodePath, TypeRef, UsageKind};

const EXCERPT_LIMIT: usize = 120;

/// Fatal extraction failure. Grammar-shape drift must be caught immediately,
/// not silently dropped, so every variant carries enough context to locate
/// the offending construct.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("grammar shape mismatch in {path}: `{node_kind}` missing expected structure near: {excerpt}")]
    GrammarShape {
        path: PathBuf,
        node_kind: String,
        excerpt: String,
    },
    #[error("failed to parse {path} as {language}")]
    Parse { path: PathBuf, language: String },
}

impl ExtractionError {
    pub fn grammar_shape(path: &Path, node: &TSNode, source: &[u8]) -> Self {
        ExtractionError::GrammarShape {
            path: path.to_path_buf(),
            node_kind: node.kind().to_string(),
            excerpt: excerpt(node, source),
        }
    }
}

/// Short source excerpt for diagnostics, truncated on a char boundary.
pub fn excerpt(node: &TSNode, source: &[u8]) -> String {
    let text = extract_text(node, source);
    if text.len() <= EXCERPT_LIMIT {
        return text.to_string();
    }
    let mut end = EXCERPT_LIMIT;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}

pub struct TreeSitterParser {
    parser: Parser,
}

impl TreeSitterParser {
    pub fn new(language: TSLanguage) -> Result<Self> {
        let mut parser = Parser::new();
        parser.set_language(language)?;
        Ok(Self { parser })
    }

    pub fn parse_source(&mut self, source: &str, path: &Path, language: &str) -> Result<Tree> {
        self.parser.parse(source, None).ok_or_else(|| {
            ExtractionError::Parse {
                path: path.to_path_buf(),
                language: language.to_string(),
            }
            .into()
        })
    }
}

pub fn extract_text<'a>(node: &TSNode, source: &'a [u8]) -> &'a str {
    std::str::from_utf8(&source[node.byte_range()]).unwrap_or("")
}

pub fn find_child_by_kind<'tree>(node: &TSNode<'tree>, kind: &str) -> Option<TSNode<'tree>> {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).find(|child| child.kind() == kind);
    found
}

/// Parse a textual type expression (`ns::Outer<ns2::Inner, e>`, `a.b.C`,
/// `[]*pkg.T`) into a recursive type reference.
///
/// Scope-qualifier prefixes on the outer name and on every nested argument
/// are stripped from the reference name and returned as wildcard dependencies
/// for the qualifier path. Returns `None` when no type name is present.
pub fn parse_type_expression(raw: &str, usage: UsageKind) -> Option<(TypeRef, Vec<Dependency>)> {
    let mut dependencies = Vec::new();
    let mut cursor = TypeCursor::new(raw);
    let type_ref = cursor.parse_expr(usage, &mut dependencies)?;
    Some((type_ref, dependencies))
}

/// Flatten a parsed generic back into `(name, ordered argument renderings)`.
/// The inverse of `parse_type_expression` for one nesting level.
pub fn flatten_generic(type_ref: &TypeRef) -> (String, Vec<String>) {
    let arguments = type_ref.arguments().iter().map(render_type).collect();
    (type_ref.name.clone(), arguments)
}

fn render_type(type_ref: &TypeRef) -> String {
    let args = type_ref.arguments();
    if args.is_empty() {
        type_ref.name.clone()
    } else {
        let rendered: Vec<String> = args.iter().map(render_type).collect();
        format!("{}<{}>", type_ref.name, rendered.join(", "))
    }
}

struct TypeCursor<'a> {
    src: &'a [u8],
    pos: usize,
}

impl<'a> TypeCursor<'a> {
    fn new(raw: &'a str) -> Self {
        Self {
            src: raw.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    fn rest(&self) -> &str {
        std::str::from_utf8(&self.src[self.pos..]).unwrap_or("")
    }

    fn skip_noise(&mut self) {
        // Whitespace plus the decoration tokens that wrap a named type in the
        // supported languages: pointers, references, Go slice brackets.
        loop {
            let before = self.pos;
            while let Some(c) = self.peek() {
                match c {
                    b' ' | b'\t' | b'\n' | b'\r' | b'*' | b'&' => self.pos += 1,
                    b'[' if self.src.get(self.pos + 1) == Some(&b']') => self.pos += 2,
                    _ => break,
                }
            }
            for keyword in ["const ", "struct ", "typename "] {
                if self.rest().starts_with(keyword) {
                    self.pos += keyword.len();
                }
            }
            if self.pos == before {
                break;
            }
        }
    }

    fn parse_ident(&mut self) -> Option<String> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == b'_' {
                self.pos += 1;
            } else {
                break;
            }
        }
        if self.pos == start {
            return None;
        }
        std::str::from_utf8(&self.src[start..self.pos])
            .ok()
            .map(str::to_string)
    }

    /// `ident (('::' | '.') ident)*` — yields the simple name plus any
    /// qualifier segments preceding it.
    fn parse_qualified_name(&mut self) -> Option<(String, Vec<String>)> {
        let mut segments = vec![self.parse_ident()?];
        loop {
            if self.rest().starts_with("::") {
                self.pos += 2;
            } else if self.peek() == Some(b'.') {
                self.pos += 1;
            } else {
                break;
            }
            match self.parse_ident() {
                Some(segment) => segments.push(segment),
                None => break,
            }
        }
        let name = segments.pop()?;
        Some((name, segments))
    }

    fn parse_expr(
        &mut self,
        usage: UsageKind,
        dependencies: &mut Vec<Dependency>,
    ) -> Option<TypeRef> {
        self.skip_noise();
        let (name, qualifier) = self.parse_qualified_name()?;
        if let Some(path) = NodePath::from_segments(qualifier) {
            let dependency = Dependency::wildcard(path);
            if !dependencies.contains(&dependency) {
                dependencies.push(dependency);
            }
        }
        self.skip_noise();
        if self.peek() != Some(b'<') {
            return Some(TypeRef::simple(name, usage));
        }
        self.pos += 1;
        let mut arguments = Vec::new();
        loop {
            // Nested arguments are full type references, recursively; their
            // own qualifiers also surface as wildcard dependencies.
            if let Some(argument) = self.parse_expr(UsageKind::Usage, dependencies) {
                arguments.push(argument);
            }
            self.skip_noise();
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b'>') => {
                    self.pos += 1;
                    break;
                }
                _ => break,
            }
        }
        Some(TypeRef::generic(name, arguments, usage))
    }
}
