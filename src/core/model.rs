use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::path::NodePath;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    Cpp,
    CSharp,
    Java,
    Go,
}

impl Language {
    pub fn as_str(self) -> &'static str {
        match self {
            Language::Cpp => "cpp",
            Language::CSharp => "csharp",
            Language::Java => "java",
            Language::Go => "go",
        }
    }

    pub fn from_name(name: &str) -> Option<Language> {
        match name {
            "cpp" | "c++" => Some(Language::Cpp),
            "csharp" | "c#" => Some(Language::CSharp),
            "java" => Some(Language::Java),
            "go" => Some(Language::Go),
            _ => None,
        }
    }
}

/// Closed set of declared-entity categories shared across languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    Class,
    Interface,
    Enum,
    ValueType,
    Annotation,
    Function,
    Variable,
    Unknown,
}

/// Syntactic role of a used-type occurrence. The tag is part of the
/// reference's identity so it survives consolidation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UsageKind {
    Usage,
    Argument,
    ReturnValue,
    Instantiation,
    Inheritance,
    ConstantAccess,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeRefKind {
    Simple,
    /// Ordered generic arguments, each a full type reference, recursively.
    Generic(Vec<TypeRef>),
}

/// A reference to a type at a use site. `name` is qualifier-stripped during
/// extraction; `resolved` is absent until resolution runs and never absent
/// afterward.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeRef {
    pub name: String,
    pub kind: TypeRefKind,
    pub usage: UsageKind,
    pub resolved: Option<NodePath>,
}

impl TypeRef {
    pub fn simple(name: impl Into<String>, usage: UsageKind) -> Self {
        Self {
            name: name.into(),
            kind: TypeRefKind::Simple,
            usage,
            resolved: None,
        }
    }

    pub fn generic(name: impl Into<String>, arguments: Vec<TypeRef>, usage: UsageKind) -> Self {
        Self {
            name: name.into(),
            kind: TypeRefKind::Generic(arguments),
            usage,
            resolved: None,
        }
    }

    pub fn with_usage(mut self, usage: UsageKind) -> Self {
        self.usage = usage;
        self
    }

    pub fn arguments(&self) -> &[TypeRef] {
        match &self.kind {
            TypeRefKind::Simple => &[],
            TypeRefKind::Generic(args) => args,
        }
    }
}

/// A raw or resolved reference to another namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dependency {
    pub path: NodePath,
    /// All declarations under `path` are usable unqualified.
    pub is_wildcard: bool,
    /// All exported symbols of the target become usable unqualified,
    /// independent of wildcard semantics (language-specific import style).
    pub is_dot_import: bool,
}

impl Dependency {
    pub fn new(path: NodePath) -> Self {
        Self {
            path,
            is_wildcard: false,
            is_dot_import: false,
        }
    }

    pub fn wildcard(path: NodePath) -> Self {
        Self {
            path,
            is_wildcard: true,
            is_dot_import: false,
        }
    }

    pub fn dot_import(path: NodePath) -> Self {
        Self {
            path,
            is_wildcard: false,
            is_dot_import: true,
        }
    }
}

/// One declared code entity with its raw/resolved references.
///
/// After consolidation `path` is unique per Node in the project; partial
/// declarations mapping to the same path merge by set-union of dependencies
/// and used types. The dependency list is ordered and deduplicated so that
/// first-match resolution stays deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub path: NodePath,
    pub physical_path: PathBuf,
    pub kind: NodeKind,
    pub language: Language,
    pub dependencies: Vec<Dependency>,
    pub used_types: Vec<TypeRef>,
}

impl Node {
    pub fn new(path: NodePath, physical_path: PathBuf, kind: NodeKind, language: Language) -> Self {
        Self {
            path,
            physical_path,
            kind,
            language,
            dependencies: Vec::new(),
            used_types: Vec::new(),
        }
    }

    /// Ordered-set insert: ignored if an equal dependency is already present.
    pub fn add_dependency(&mut self, dependency: Dependency) {
        if !self.dependencies.contains(&dependency) {
            self.dependencies.push(dependency);
        }
    }

    /// Ordered-set insert; identity includes the usage tag, so the same type
    /// used as argument and as return value keeps both entries.
    pub fn add_used_type(&mut self, used_type: TypeRef) {
        if !self.used_types.contains(&used_type) {
            self.used_types.push(used_type);
        }
    }

    /// Union another partial declaration of the same entity into this one.
    pub fn merge(&mut self, other: Node) {
        for dependency in other.dependencies {
            self.add_dependency(dependency);
        }
        for used_type in other.used_types {
            self.add_used_type(used_type);
        }
        if self.kind == NodeKind::Unknown {
            self.kind = other.kind;
        }
    }
}
