use anyhow::Result;
use serde_json::json;
use std::fs;
use std::path::Path;

use crate::core::AnalysisResult;

/// Machine-readable report. Graph nodes are emitted in arena order and edges
/// reference them by index, so the output stays compact and stable across
/// runs.
pub struct JsonFormatter;

impl JsonFormatter {
    pub fn new() -> Self {
        Self
    }

    pub fn format_to_file(&self, result: &AnalysisResult, output_path: &Path) -> Result<()> {
        fs::write(output_path, self.format(result)?)?;
        Ok(())
    }

    pub fn format(&self, result: &AnalysisResult) -> Result<String> {
        let nodes: Vec<_> = result
            .arena
            .nodes()
            .iter()
            .map(|node| {
                json!({
                    "id": node.id,
                    "parent": node.parent,
                    "level": node.level,
                    "leaf": node.is_leaf,
                })
            })
            .collect();

        let edges: Vec<_> = result
            .arena
            .edges()
            .iter()
            .map(|edge| json!([edge.source, edge.target, edge.weight]))
            .collect();

        let feedback: Vec<_> = result
            .feedback
            .iter()
            .map(|edge| {
                json!({
                    "source": edge.source,
                    "target": edge.target,
                    "weight": edge.weight,
                    "among_leaves": edge.among_leaves,
                })
            })
            .collect();

        let violations: Vec<_> = result
            .violations
            .iter()
            .map(|violation| {
                json!({
                    "source": violation.source,
                    "target": violation.target,
                    "weight": violation.weight,
                })
            })
            .collect();

        let output = json!({
            "meta": {
                "files": result.file_count,
                "entities": result.nodes.len(),
                "graph_nodes": result.arena.len(),
            },
            "nodes": nodes,
            "edges": edges,
            "feedback": feedback,
            "violations": violations,
        });
        Ok(serde_json::to_string_pretty(&output)?)
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}
