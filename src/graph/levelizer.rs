use anyhow::{bail, Result};
use log::debug;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, HashSet};

use super::GraphArena;

/// An edge removed to make a sibling group acyclic. Recorded with the ids of
/// the group members it ran between, which may be containers, not the
/// underlying leaves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackEdge {
    pub source: String,
    pub target: String,
    pub weight: u32,
    /// Both endpoints are leaves, not containers standing in for their
    /// subtrees.
    pub among_leaves: bool,
}

/// A leaf-to-leaf dependency whose direction contradicts the computed
/// levels: the source's side of the hierarchy sits at or below the target's.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayeringViolation {
    pub source: String,
    pub target: String,
    pub weight: u32,
}

/// Assigns a level to every node in the forest, group by group from the
/// roots down, and returns the edges that had to be cut to do so.
pub fn levelize(arena: &mut GraphArena) -> Vec<FeedbackEdge> {
    let mut feedback = Vec::new();
    let roots = arena.roots().to_vec();
    levelize_group(arena, &roots, &mut feedback);
    feedback
}

/// Aggregated edge between two members of one sibling group.
#[derive(Debug, Clone, Copy)]
struct LocalEdge {
    source: usize,
    target: usize,
    weight: u32,
}

fn levelize_group(arena: &mut GraphArena, group: &[usize], feedback: &mut Vec<FeedbackEdge>) {
    if group.is_empty() {
        return;
    }
    let mut members = group.to_vec();
    members.sort_by(|a, b| arena.node(*a).id.cmp(&arena.node(*b).id));

    let mut local = project_edges(arena, &members);
    break_cycles(arena, &members, &mut local, feedback);
    assign_levels(arena, &members, &local);

    for member in members {
        let children = arena.node(member).children.clone();
        levelize_group(arena, &children, feedback);
    }
}

/// Project the global leaf edges onto one sibling group: each endpoint is
/// replaced by its ancestor inside the group, parallel projections merge by
/// weight, and edges that collapse onto a single member disappear.
fn project_edges(arena: &GraphArena, members: &[usize]) -> Vec<LocalEdge> {
    let member_set: HashSet<usize> = members.iter().copied().collect();
    let mut weights: HashMap<(usize, usize), u32> = HashMap::new();
    for edge in arena.edges() {
        let (Some(source), Some(target)) = (
            ancestor_in(arena, edge.source, &member_set),
            ancestor_in(arena, edge.target, &member_set),
        ) else {
            continue;
        };
        if source != target {
            *weights.entry((source, target)).or_insert(0) += edge.weight;
        }
    }
    let mut local: Vec<LocalEdge> = weights
        .into_iter()
        .map(|((source, target), weight)| LocalEdge {
            source,
            target,
            weight,
        })
        .collect();
    local.sort_by(|a, b| {
        let left = (&arena.node(a.source).id, &arena.node(a.target).id);
        let right = (&arena.node(b.source).id, &arena.node(b.target).id);
        left.cmp(&right)
    });
    local
}

fn ancestor_in(arena: &GraphArena, idx: usize, member_set: &HashSet<usize>) -> Option<usize> {
    let mut current = Some(idx);
    while let Some(node) = current {
        if member_set.contains(&node) {
            return Some(node);
        }
        current = arena.node(node).parent;
    }
    None
}

/// Remove edges until the local graph is acyclic. Each pass detects the
/// strongly connected components, walks an explicit cycle inside the first
/// cyclic one, and cuts the cycle edge whose target has the least total
/// incoming weight in the group. Ties fall back to target id, then source id.
fn break_cycles(
    arena: &GraphArena,
    members: &[usize],
    local: &mut Vec<LocalEdge>,
    feedback: &mut Vec<FeedbackEdge>,
) {
    loop {
        let Some(cycle) = find_cycle(members, local) else {
            return;
        };

        let mut incoming: HashMap<usize, u32> = HashMap::new();
        for edge in local.iter() {
            *incoming.entry(edge.target).or_insert(0) += edge.weight;
        }
        let Some(victim) = cycle
            .iter()
            .copied()
            .min_by_key(|edge| {
                (
                    incoming.get(&edge.target).copied().unwrap_or(0),
                    arena.node(edge.target).id.clone(),
                    arena.node(edge.source).id.clone(),
                )
            })
        else {
            return;
        };

        local.retain(|edge| !(edge.source == victim.source && edge.target == victim.target));
        debug!(
            "feedback edge {} -> {} (weight {})",
            arena.node(victim.source).id,
            arena.node(victim.target).id,
            victim.weight
        );
        feedback.push(FeedbackEdge {
            source: arena.node(victim.source).id.clone(),
            target: arena.node(victim.target).id.clone(),
            weight: victim.weight,
            among_leaves: arena.node(victim.source).is_leaf && arena.node(victim.target).is_leaf,
        });
    }
}

/// Find one cycle among the local edges, as the list of edges along it.
/// Detection runs over the condensation; the walk inside the cyclic
/// component starts from its smallest member and always follows the
/// smallest-id successor that stays inside the component.
fn find_cycle(members: &[usize], local: &[LocalEdge]) -> Option<Vec<LocalEdge>> {
    let mut graph: DiGraph<usize, u32> = DiGraph::new();
    let mut petgraph_index: HashMap<usize, NodeIndex> = HashMap::new();
    for member in members {
        petgraph_index.insert(*member, graph.add_node(*member));
    }
    for edge in local {
        graph.add_edge(
            petgraph_index[&edge.source],
            petgraph_index[&edge.target],
            edge.weight,
        );
    }

    let cyclic: HashSet<usize> = tarjan_scc(&graph)
        .into_iter()
        .filter(|component| component.len() > 1)
        .min_by_key(|component| component.iter().map(|ix| graph[*ix]).min())
        .map(|component| component.into_iter().map(|ix| graph[ix]).collect())
        .unwrap_or_default();
    if cyclic.is_empty() {
        return None;
    }

    let mut adjacency: HashMap<usize, Vec<LocalEdge>> = HashMap::new();
    for edge in local {
        if cyclic.contains(&edge.source) && cyclic.contains(&edge.target) {
            adjacency.entry(edge.source).or_default().push(*edge);
        }
    }

    // Walk successor chains until a member repeats; members within the
    // component all have at least one in-component successor.
    let start = members.iter().copied().find(|m| cyclic.contains(m))?;
    let mut visited_at: HashMap<usize, usize> = HashMap::new();
    let mut walk: Vec<LocalEdge> = Vec::new();
    let mut current = start;
    loop {
        if let Some(&position) = visited_at.get(&current) {
            return Some(walk.split_off(position));
        }
        visited_at.insert(current, walk.len());
        let next = *adjacency.get(&current)?.first()?;
        walk.push(next);
        current = next.target;
    }
}

/// Longest-path-from-sink levels over the acyclic local graph: members with
/// no outgoing local edge sit at level 0, every other member one above its
/// highest dependency.
fn assign_levels(arena: &mut GraphArena, members: &[usize], local: &[LocalEdge]) {
    let mut adjacency: HashMap<usize, Vec<usize>> = HashMap::new();
    for edge in local {
        adjacency.entry(edge.source).or_default().push(edge.target);
    }
    let mut levels: HashMap<usize, u32> = HashMap::new();
    for member in members {
        compute_level(*member, &adjacency, &mut levels);
    }
    for member in members {
        arena.set_level(*member, levels[member]);
    }
}

fn compute_level(
    member: usize,
    adjacency: &HashMap<usize, Vec<usize>>,
    levels: &mut HashMap<usize, u32>,
) -> u32 {
    if let Some(&level) = levels.get(&member) {
        return level;
    }
    let level = match adjacency.get(&member) {
        Some(targets) if !targets.is_empty() => {
            1 + targets
                .iter()
                .map(|target| compute_level(*target, adjacency, levels))
                .max()
                .unwrap_or(0)
        }
        _ => 0,
    };
    levels.insert(member, level);
    level
}

/// Whether a leaf-to-leaf edge points upwards or sideways in the levelized
/// hierarchy. The comparison happens at the children of the two leaves'
/// lowest common ancestor; asking about leaves in disjoint trees is a caller
/// error.
pub fn points_upwards(arena: &GraphArena, source: usize, target: usize) -> Result<bool> {
    let source_chain = arena.ancestors(source);
    let target_chain = arena.ancestors(target);
    let target_positions: HashMap<usize, usize> = target_chain
        .iter()
        .enumerate()
        .map(|(position, idx)| (*idx, position))
        .collect();

    let mut lca = None;
    for (position, idx) in source_chain.iter().enumerate() {
        if let Some(&target_position) = target_positions.get(idx) {
            lca = Some((position, target_position));
            break;
        }
    }
    let Some((source_position, target_position)) = lca else {
        bail!(
            "no common ancestor between `{}` and `{}`",
            arena.node(source).id,
            arena.node(target).id
        );
    };
    if source_position == 0 || target_position == 0 {
        // One endpoint is an ancestor of the other; containment edges do not
        // cross levels.
        return Ok(false);
    }

    let source_side = source_chain[source_position - 1];
    let target_side = target_chain[target_position - 1];
    let source_level = arena.node(source_side).level.unwrap_or(0);
    let target_level = arena.node(target_side).level.unwrap_or(0);
    Ok(source_level <= target_level)
}

/// Classify every aggregated leaf edge after levelization. Edges between
/// disjoint roots carry no level relation and are skipped.
pub fn collect_violations(arena: &GraphArena) -> Result<Vec<LayeringViolation>> {
    let mut violations = Vec::new();
    for edge in arena.edges() {
        if arena.root_of(edge.source) != arena.root_of(edge.target) {
            continue;
        }
        if points_upwards(arena, edge.source, edge.target)? {
            violations.push(LayeringViolation {
                source: arena.node(edge.source).id.clone(),
                target: arena.node(edge.target).id.clone(),
                weight: edge.weight,
            });
        }
    }
    Ok(violations)
}
