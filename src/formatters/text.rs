use anyhow::Result;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::core::AnalysisResult;
use crate::graph::GraphArena;

/// Human-readable report: the levelized containment tree followed by the
/// feedback edges and layering violations.
pub struct TextFormatter;

impl TextFormatter {
    pub fn new() -> Self {
        Self
    }

    pub fn format_to_file(&self, result: &AnalysisResult, output_path: &Path) -> Result<()> {
        fs::write(output_path, self.format(result))?;
        Ok(())
    }

    pub fn format(&self, result: &AnalysisResult) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Levelized dependency graph: {} entities from {} files, {} graph nodes",
            result.nodes.len(),
            result.file_count,
            result.arena.len()
        );
        let _ = writeln!(out);

        let mut roots = result.arena.roots().to_vec();
        roots.sort_by(|a, b| result.arena.node(*a).id.cmp(&result.arena.node(*b).id));
        for root in roots {
            self.write_subtree(&result.arena, root, 0, &mut out);
        }

        let _ = writeln!(out);
        if result.feedback.is_empty() {
            let _ = writeln!(out, "Feedback edges: none");
        } else {
            let _ = writeln!(out, "Feedback edges ({}):", result.feedback.len());
            for edge in &result.feedback {
                let _ = writeln!(out, "  {} -> {} (weight {})", edge.source, edge.target, edge.weight);
            }
        }

        if result.violations.is_empty() {
            let _ = writeln!(out, "Layering violations: none");
        } else {
            let _ = writeln!(out, "Layering violations ({}):", result.violations.len());
            for violation in &result.violations {
                let _ = writeln!(
                    out,
                    "  {} -> {} (weight {})",
                    violation.source, violation.target, violation.weight
                );
            }
        }
        out
    }

    fn write_subtree(&self, arena: &GraphArena, idx: usize, depth: usize, out: &mut String) {
        let node = arena.node(idx);
        let level = node
            .level
            .map(|level| format!("L{level}"))
            .unwrap_or_else(|| "L?".to_string());
        let marker = if node.is_leaf { "" } else { "/" };
        let _ = writeln!(
            out,
            "{:indent$}[{}] {}{}",
            "",
            level,
            node.path.name(),
            marker,
            indent = depth * 2
        );

        let mut children = node.children.clone();
        children.sort_by(|a, b| {
            let left = arena.node(*a);
            let right = arena.node(*b);
            (left.level, &left.id).cmp(&(right.level, &right.id))
        });
        for child in children {
            self.write_subtree(arena, child, depth + 1, out);
        }
    }
}

impl Default for TextFormatter {
    fn default() -> Self {
        Self::new()
    }
}
