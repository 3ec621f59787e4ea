pub mod levelizer;

use std::collections::{HashMap, HashSet};

use crate::core::{Node, NodePath};

/// One entry in the containment forest: a namespace container or a leaf
/// standing for exactly one resolved entity node.
///
/// Parent and child references are arena indices, never owning pointers in
/// both directions.
#[derive(Debug, Clone)]
pub struct GraphNode {
    pub id: String,
    pub path: NodePath,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    pub level: Option<u32>,
    pub is_leaf: bool,
}

/// Aggregated leaf-to-leaf dependency edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DependencyEdge {
    pub source: usize,
    pub target: usize,
    pub weight: u32,
}

/// Containment forest plus the aggregated dependency edges between leaves.
/// Built fresh from resolved nodes at the start of levelization; never fed
/// back into extraction or resolution.
#[derive(Debug, Default)]
pub struct GraphArena {
    nodes: Vec<GraphNode>,
    index: HashMap<String, usize>,
    leaf_by_path: HashMap<NodePath, usize>,
    roots: Vec<usize>,
    edges: Vec<DependencyEdge>,
}

impl GraphArena {
    /// Roll resolved entity nodes up into the containment hierarchy: one leaf
    /// per node, containers for every namespace prefix, and leaves for the
    /// `<unknown>` sinks resolution produced.
    pub fn from_nodes(nodes: &[Node]) -> Self {
        let mut arena = GraphArena::default();

        // Containers first: a leaf whose path doubles as another leaf's
        // namespace must find the container already present to take the
        // disambiguating id.
        for node in nodes {
            if let Some(parent) = node.path.parent() {
                arena.ensure_container(&parent);
            }
        }
        for node in nodes {
            arena.ensure_leaf(&node.path);
        }

        // Unknown sinks become leaves too so degraded resolution stays
        // observable downstream; other non-project targets (builtins) do not.
        for node in nodes {
            for dependency in &node.dependencies {
                if dependency.path.is_unknown() {
                    arena.ensure_leaf(&dependency.path);
                }
            }
        }

        let mut weights: HashMap<(usize, usize), u32> = HashMap::new();
        for node in nodes {
            let Some(&source) = arena.leaf_by_path.get(&node.path) else {
                continue;
            };
            for target_path in resolved_targets(node) {
                let Some(&target) = arena.leaf_by_path.get(target_path) else {
                    continue;
                };
                if target != source {
                    *weights.entry((source, target)).or_insert(0) += 1;
                }
            }
        }
        let mut edges: Vec<DependencyEdge> = weights
            .into_iter()
            .map(|((source, target), weight)| DependencyEdge {
                source,
                target,
                weight,
            })
            .collect();
        edges.sort_by_key(|edge| (edge.source, edge.target));
        arena.edges = edges;
        arena
    }

    fn ensure_container(&mut self, path: &NodePath) -> usize {
        let id = path.dotted();
        if let Some(&idx) = self.index.get(&id) {
            return idx;
        }
        let parent = path.parent().map(|parent| self.ensure_container(&parent));
        let idx = self.push_node(GraphNode {
            id: id.clone(),
            path: path.clone(),
            parent,
            children: Vec::new(),
            level: None,
            is_leaf: false,
        });
        self.index.insert(id, idx);
        self.attach(parent, idx);
        idx
    }

    fn ensure_leaf(&mut self, path: &NodePath) -> usize {
        if let Some(&idx) = self.leaf_by_path.get(path) {
            return idx;
        }
        let parent = path.parent().map(|parent| self.ensure_container(&parent));
        // A container of the same name may exist (an entity that also
        // contains members); the leaf id gets a suffix to stay distinct.
        let dotted = path.dotted();
        let id = if self.index.contains_key(&dotted) {
            format!("{dotted}#leaf")
        } else {
            dotted
        };
        let idx = self.push_node(GraphNode {
            id: id.clone(),
            path: path.clone(),
            parent,
            children: Vec::new(),
            level: None,
            is_leaf: true,
        });
        self.leaf_by_path.insert(path.clone(), idx);
        self.attach(parent, idx);
        idx
    }

    fn push_node(&mut self, node: GraphNode) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    fn attach(&mut self, parent: Option<usize>, child: usize) {
        match parent {
            Some(parent) => self.nodes[parent].children.push(child),
            None => self.roots.push(child),
        }
    }

    pub fn node(&self, idx: usize) -> &GraphNode {
        &self.nodes[idx]
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn roots(&self) -> &[usize] {
        &self.roots
    }

    pub fn edges(&self) -> &[DependencyEdge] {
        &self.edges
    }

    pub fn leaf_for_path(&self, path: &NodePath) -> Option<usize> {
        self.leaf_by_path.get(path).copied()
    }

    pub fn set_level(&mut self, idx: usize, level: u32) {
        self.nodes[idx].level = Some(level);
    }

    /// Ancestor chain from `idx` up to its forest root, inclusive.
    pub fn ancestors(&self, idx: usize) -> Vec<usize> {
        let mut chain = vec![idx];
        let mut current = idx;
        while let Some(parent) = self.nodes[current].parent {
            chain.push(parent);
            current = parent;
        }
        chain
    }

    /// Forest root above `idx`.
    pub fn root_of(&self, idx: usize) -> usize {
        let mut current = idx;
        while let Some(parent) = self.nodes[current].parent {
            current = parent;
        }
        current
    }
}

/// Every resolved target path a node points at: its used types (including
/// nested generic arguments) carry the multiplicity; plain dependency entries
/// not already covered by a used type add one occurrence each.
fn resolved_targets(node: &Node) -> impl Iterator<Item = &NodePath> {
    let mut targets: Vec<&NodePath> = Vec::new();
    let mut pending: Vec<&crate::core::TypeRef> = node.used_types.iter().collect();
    while let Some(type_ref) = pending.pop() {
        if let Some(resolved) = &type_ref.resolved {
            targets.push(resolved);
        }
        pending.extend(type_ref.arguments());
    }
    let covered: HashSet<&NodePath> = targets.iter().copied().collect();
    for dependency in &node.dependencies {
        if !dependency.is_wildcard
            && !dependency.is_dot_import
            && !covered.contains(&dependency.path)
        {
            targets.push(&dependency.path);
        }
    }
    targets.into_iter()
}
