pub mod common;
pub mod cpp;
pub mod csharp;
pub mod go;
pub mod java;

use anyhow::Result;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::core::{Dependency, Language, Node, NodePath, TypeRef};

/// One file handed to an extractor: physical path, language tag, source text.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub language: Language,
    pub text: String,
}

impl SourceFile {
    pub fn new(path: PathBuf, language: Language, text: String) -> Self {
        Self {
            path,
            language,
            text,
        }
    }
}

/// Traversal state threaded through one file's extraction.
///
/// Siblings within one block share a single evolving context, so an earlier
/// import/using directive affects later siblings. Descending into a nested
/// block goes through `child()`, which copies the context; inner declarations
/// cannot leak aliases or imports back out.
#[derive(Debug, Clone)]
pub struct ExtractionContext {
    /// Deterministic scope derived from the physical file path; applied to
    /// declarations that never saw an enclosing namespace construct.
    fallback: NodePath,
    /// Logical scope: namespace segments plus enclosing declaration names.
    scope: Option<NodePath>,
    in_namespace: bool,
    pub dependencies: Vec<Dependency>,
    pub used_types: Vec<TypeRef>,
}

impl ExtractionContext {
    pub fn for_file(file: &SourceFile) -> Self {
        Self {
            fallback: scope_from_file_path(&file.path),
            scope: None,
            in_namespace: false,
            dependencies: Vec::new(),
            used_types: Vec::new(),
        }
    }

    /// Copy for a nested block: scope and accumulated dependencies carry in,
    /// used types start fresh for the inner declaration.
    pub fn child(&self) -> Self {
        Self {
            fallback: self.fallback.clone(),
            scope: self.scope.clone(),
            in_namespace: self.in_namespace,
            dependencies: self.dependencies.clone(),
            used_types: Vec::new(),
        }
    }

    /// Enter a namespace/package construct. Multi-segment forms (`A::B`,
    /// dotted package names) prepend one scope segment each.
    pub fn enter_namespace(&mut self, path: &NodePath) {
        self.scope = Some(match &self.scope {
            Some(scope) => scope.join(path),
            None => path.clone(),
        });
        self.in_namespace = true;
    }

    /// Enter a named declaration (class body, nested type) without namespace
    /// semantics.
    pub fn enter_declaration(&mut self, name: &str) {
        self.scope = Some(match &self.scope {
            Some(scope) => scope.child(name),
            None => NodePath::new(name),
        });
    }

    /// Fully-qualified path for a declaration named `name` in this context.
    /// Bare declarations (no namespace construct seen) are qualified under
    /// the file-derived fallback scope.
    pub fn declared_path(&self, name: &str) -> NodePath {
        let logical = match &self.scope {
            Some(scope) => scope.child(name),
            None => NodePath::new(name),
        };
        if self.in_namespace {
            logical
        } else {
            self.fallback.join(&logical)
        }
    }

    /// Path for a declaration whose own name carries namespace qualifiers
    /// (`void ns::run() { ... }`). The qualifier supplies the namespace, so
    /// the file fallback never applies.
    pub fn declared_path_qualified(&self, qualifier: &NodePath, name: &str) -> NodePath {
        match &self.scope {
            Some(scope) => scope.join(qualifier).child(name),
            None => qualifier.child(name),
        }
    }

    pub fn add_dependency(&mut self, dependency: Dependency) {
        if !self.dependencies.contains(&dependency) {
            self.dependencies.push(dependency);
        }
    }

    pub fn add_used_type(&mut self, used_type: TypeRef) {
        if !self.used_types.contains(&used_type) {
            self.used_types.push(used_type);
        }
    }

    /// Move this context's accumulated references onto a freshly declared
    /// node.
    pub fn drain_into(&mut self, node: &mut Node) {
        for dependency in self.dependencies.iter().cloned() {
            node.add_dependency(dependency);
        }
        for used_type in self.used_types.drain(..) {
            node.add_used_type(used_type);
        }
    }
}

/// Deterministic namespace fallback derived from a physical file path:
/// sanitized path components, extension stripped from the final one.
pub fn scope_from_file_path(path: &Path) -> NodePath {
    let mut segments: Vec<String> = path
        .components()
        .filter_map(|component| match component {
            std::path::Component::Normal(part) => Some(sanitize_segment(&part.to_string_lossy())),
            _ => None,
        })
        .filter(|segment| !segment.is_empty())
        .collect();
    if let Some(last) = segments.last_mut() {
        let stem = last
            .rsplit_once('_')
            .filter(|(_, ext)| is_known_extension(ext))
            .map(|(stem, _)| stem.to_string());
        if let Some(stem) = stem {
            *last = stem;
        }
    }
    NodePath::from_segments(segments).unwrap_or_else(|| NodePath::new("<file>"))
}

fn sanitize_segment(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}

fn is_known_extension(ext: &str) -> bool {
    matches!(
        ext,
        "cpp" | "cxx" | "cc" | "hpp" | "h" | "cs" | "java" | "go"
    )
}

/// Record one textual type occurrence in the context: parse it, surface
/// qualifier wildcards as dependencies, keep the usage tag.
pub fn note_type(ctx: &mut ExtractionContext, raw: &str, usage: crate::core::UsageKind) {
    if let Some((type_ref, dependencies)) = common::parse_type_expression(raw, usage) {
        for dependency in dependencies {
            ctx.add_dependency(dependency);
        }
        ctx.add_used_type(type_ref);
    }
}

/// Shared per-language extraction contract: one syntax tree in, a list of
/// uniform entity nodes out. Dispatch inside each implementation is a closed
/// match over syntax-node kinds.
pub trait LanguageExtractor {
    fn language(&self) -> Language;
    fn extract(&self, file: &SourceFile) -> Result<Vec<Node>>;
}

pub struct ExtractorFactory;

impl ExtractorFactory {
    pub fn new() -> Self {
        Self
    }

    pub fn get_extractor(
        &self,
        language: Language,
    ) -> Result<Box<dyn LanguageExtractor + Send + Sync>> {
        match language {
            Language::Cpp => Ok(Box::new(cpp::CppExtractor::new())),
            Language::CSharp => Ok(Box::new(csharp::CSharpExtractor::new())),
            Language::Java => Ok(Box::new(java::JavaExtractor::new())),
            Language::Go => Ok(Box::new(go::GoExtractor::new())),
        }
    }
}

impl Default for ExtractorFactory {
    fn default() -> Self {
        Self::new()
    }
}

/// Group extracted nodes by final path and reduce each group by set-union of
/// dependencies and used types. Order-independent: merging A into B equals
/// merging B into A up to insertion order of the surviving node.
pub fn consolidate(nodes: Vec<Node>) -> Vec<Node> {
    let mut order: Vec<NodePath> = Vec::new();
    let mut merged: HashMap<NodePath, Node> = HashMap::with_capacity(nodes.len());

    for node in nodes {
        match merged.get_mut(&node.path) {
            Some(existing) => existing.merge(node),
            None => {
                order.push(node.path.clone());
                merged.insert(node.path.clone(), node);
            }
        }
    }

    order
        .into_iter()
        .filter_map(|path| merged.remove(&path))
        .collect()
}
