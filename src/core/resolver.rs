use log::debug;
use rayon::prelude::*;
use std::collections::HashMap;

use crate::core::{Dependency, Language, Node, NodePath, TypeRef, TypeRefKind};

/// Every declared node's simple name mapped to its possible full paths.
/// Ambiguity is preserved; candidate order is insertion order over the
/// path-sorted node list, hence deterministic.
#[derive(Debug, Default)]
pub struct ProjectDictionary {
    by_simple_name: HashMap<String, Vec<NodePath>>,
}

impl ProjectDictionary {
    pub fn build(nodes: &[Node]) -> Self {
        let mut by_simple_name: HashMap<String, Vec<NodePath>> =
            HashMap::with_capacity(nodes.len());
        for node in nodes {
            let entry = by_simple_name
                .entry(node.path.name().to_string())
                .or_default();
            if !entry.contains(&node.path) {
                entry.push(node.path.clone());
            }
        }
        Self { by_simple_name }
    }

    pub fn candidates(&self, simple_name: &str) -> &[NodePath] {
        self.by_simple_name
            .get(simple_name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.by_simple_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_simple_name.is_empty()
    }
}

/// Built-in/primitive names per language. Entries are single-segment paths so
/// the exact-match step resolves a bare primitive name directly; project
/// declarations shadow builtins because the project dictionary is consulted
/// first.
#[derive(Debug)]
pub struct LanguageDictionary {
    builtins: HashMap<Language, HashMap<&'static str, NodePath>>,
}

impl LanguageDictionary {
    pub fn new() -> Self {
        let mut builtins = HashMap::new();
        builtins.insert(Language::Cpp, builtin_map(CPP_BUILTINS));
        builtins.insert(Language::CSharp, builtin_map(CSHARP_BUILTINS));
        builtins.insert(Language::Java, builtin_map(JAVA_BUILTINS));
        builtins.insert(Language::Go, builtin_map(GO_BUILTINS));
        Self { builtins }
    }

    pub fn lookup(&self, language: Language, simple_name: &str) -> Option<&NodePath> {
        self.builtins.get(&language)?.get(simple_name)
    }
}

impl Default for LanguageDictionary {
    fn default() -> Self {
        Self::new()
    }
}

fn builtin_map(names: &[&'static str]) -> HashMap<&'static str, NodePath> {
    names
        .iter()
        .map(|name| (*name, NodePath::new(*name)))
        .collect()
}

const CPP_BUILTINS: &[&str] = &[
    "void", "bool", "char", "wchar_t", "short", "int", "long", "float", "double", "signed",
    "unsigned", "auto", "size_t", "ssize_t", "int8_t", "int16_t", "int32_t", "int64_t", "uint8_t",
    "uint16_t", "uint32_t", "uint64_t", "string", "vector", "map", "set", "unordered_map",
    "unordered_set", "pair", "tuple", "optional", "shared_ptr", "unique_ptr", "weak_ptr",
];

const CSHARP_BUILTINS: &[&str] = &[
    "void", "bool", "byte", "sbyte", "char", "decimal", "double", "float", "int", "uint", "long",
    "ulong", "short", "ushort", "object", "string", "var", "dynamic", "List", "Dictionary",
    "IEnumerable", "IList", "IDictionary", "Task", "Action", "Func", "Exception", "Console",
    "Math", "DateTime", "TimeSpan", "Guid", "Nullable",
];

const JAVA_BUILTINS: &[&str] = &[
    "void", "boolean", "byte", "char", "short", "int", "long", "float", "double", "String",
    "Object", "Integer", "Long", "Double", "Boolean", "Character", "List", "Map", "Set",
    "ArrayList", "HashMap", "HashSet", "Optional", "Iterable", "Iterator", "Exception",
    "RuntimeException", "Throwable", "System", "Math", "Thread", "StringBuilder",
];

const GO_BUILTINS: &[&str] = &[
    "bool", "string", "int", "int8", "int16", "int32", "int64", "uint", "uint8", "uint16",
    "uint32", "uint64", "uintptr", "byte", "rune", "float32", "float64", "complex64",
    "complex128", "error", "any",
];

/// Turns raw type references into fully-qualified paths against the
/// project-wide symbol table. Resolution is total: it never errors, and every
/// reference comes back resolved or explicitly `<unknown>`.
pub struct TypeResolver {
    project: ProjectDictionary,
    language: LanguageDictionary,
}

impl TypeResolver {
    /// Build the dictionaries from all extracted nodes. This is the
    /// synchronization barrier: no node resolves before every node has been
    /// indexed.
    pub fn new(nodes: &[Node]) -> Self {
        Self {
            project: ProjectDictionary::build(nodes),
            language: LanguageDictionary::new(),
        }
    }

    pub fn project_dictionary(&self) -> &ProjectDictionary {
        &self.project
    }

    /// Resolve every node in parallel; the dictionaries are read-only after
    /// construction.
    pub fn resolve_all(&self, nodes: Vec<Node>) -> Vec<Node> {
        nodes
            .into_par_iter()
            .map(|node| self.resolve_node(node))
            .collect()
    }

    pub fn resolve_node(&self, mut node: Node) -> Node {
        let used_types = std::mem::take(&mut node.used_types);
        let mut resolved_paths = Vec::new();
        let resolved_types: Vec<TypeRef> = used_types
            .into_iter()
            .map(|type_ref| {
                self.resolve_type(&node.dependencies, node.language, type_ref, &mut resolved_paths)
            })
            .collect();
        node.used_types = resolved_types;

        // The levelizer works off actual resolved targets, unknown sinks
        // included, so each outcome joins the dependency set.
        for path in resolved_paths {
            node.add_dependency(Dependency::new(path));
        }
        node
    }

    fn resolve_type(
        &self,
        dependencies: &[Dependency],
        language: Language,
        type_ref: TypeRef,
        resolved_paths: &mut Vec<NodePath>,
    ) -> TypeRef {
        let resolved = self.resolve_name(dependencies, language, &type_ref.name);
        resolved_paths.push(resolved.clone());

        let kind = match type_ref.kind {
            TypeRefKind::Simple => TypeRefKind::Simple,
            TypeRefKind::Generic(arguments) => TypeRefKind::Generic(
                arguments
                    .into_iter()
                    .map(|argument| {
                        self.resolve_type(dependencies, language, argument, resolved_paths)
                    })
                    .collect(),
            ),
        };

        TypeRef {
            name: type_ref.name,
            kind,
            usage: type_ref.usage,
            resolved: Some(resolved),
        }
    }

    /// The total resolution function. Qualifier segments are split off the
    /// name; candidates come from the project dictionary, falling back to the
    /// language builtins only when the project declares nothing by that name.
    pub fn resolve_name(
        &self,
        dependencies: &[Dependency],
        language: Language,
        name: &str,
    ) -> NodePath {
        let Some(full) = NodePath::parse(name) else {
            return NodePath::unknown(name);
        };
        let simple_name = full.name().to_string();
        let qualifier = &full.segments()[..full.len() - 1];

        let project_candidates = self.project.candidates(&simple_name);
        let builtin = if project_candidates.is_empty() {
            self.language.lookup(language, &simple_name)
        } else {
            None
        };
        let candidates: &[NodePath] = if !project_candidates.is_empty() {
            project_candidates
        } else if let Some(builtin) = builtin {
            std::slice::from_ref(builtin)
        } else {
            &[]
        };

        // Exact match ignores the dependency list entirely.
        for candidate in candidates {
            if candidate == &full {
                return candidate.clone();
            }
        }

        // Anchored suffix match through the node's dependencies, first match
        // in dependency order wins (documented coarse policy).
        for dependency in dependencies {
            // Unqualified names resolve through a dependency only when it is
            // a wildcard or dot import; dot imports apply regardless of
            // whether the reference carries a qualifier.
            if qualifier.is_empty() && !dependency.is_wildcard && !dependency.is_dot_import {
                continue;
            }
            let mut target: Vec<String> = dependency.path.segments().to_vec();
            target.extend(qualifier.iter().cloned());

            for candidate in candidates {
                let Some(namespace) = candidate.parent() else {
                    continue;
                };
                if namespace.ends_with(&target) {
                    return candidate.clone();
                }
            }
        }

        debug!("unresolved reference `{name}` ({})", language.as_str());
        NodePath::unknown(&simple_name)
    }
}
