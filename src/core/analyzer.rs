use anyhow::Result;
use rayon::prelude::*;
use std::path::Path;

use super::{FileScanner, Language, Node, TypeResolver};
use crate::graph::levelizer::{self, FeedbackEdge, LayeringViolation};
use crate::graph::GraphArena;
use crate::parsers::{consolidate, ExtractorFactory, SourceFile};

/// Everything one run produces: the resolved node list, the levelized
/// containment forest, and the two diagnostic edge sets.
pub struct AnalysisResult {
    pub nodes: Vec<Node>,
    pub arena: GraphArena,
    pub feedback: Vec<FeedbackEdge>,
    pub violations: Vec<LayeringViolation>,
    pub file_count: usize,
}

pub struct ProjectAnalyzer {
    file_scanner: FileScanner,
}

impl ProjectAnalyzer {
    pub fn new() -> Self {
        Self {
            file_scanner: FileScanner::new(),
        }
    }

    pub fn analyze(&self, root_path: &Path, languages: &[Language]) -> Result<AnalysisResult> {
        println!("Scanning files...");
        let files = self.file_scanner.scan_directory(root_path, languages)?;
        println!("Found {} files to analyze", files.len());

        let mut sources = Vec::with_capacity(files.len());
        for file_info in &files {
            match std::fs::read_to_string(&file_info.path) {
                Ok(text) => sources.push(SourceFile {
                    path: file_info.path.clone(),
                    language: file_info.language,
                    text,
                }),
                Err(err) => {
                    eprintln!(
                        "Warning: Failed to read {}: {}",
                        file_info.path.display(),
                        err
                    );
                }
            }
        }
        let file_count = sources.len();

        println!("Extracting entities...");
        // Grammar-shape failures abort the run; a partial model would feed
        // wrong answers into resolution.
        let extracted: Result<Vec<Vec<Node>>> = sources
            .par_iter()
            .map(|file| {
                let extractor = ExtractorFactory::new().get_extractor(file.language)?;
                extractor.extract(file)
            })
            .collect();
        let mut nodes: Vec<Node> = extracted?.into_iter().flatten().collect();
        nodes.sort_by(|a, b| {
            (&a.physical_path, &a.path).cmp(&(&b.physical_path, &b.path))
        });

        let nodes = consolidate(nodes);
        println!("Extracted {} entities", nodes.len());

        println!("Resolving type references...");
        let resolver = TypeResolver::new(&nodes);
        let mut nodes = resolver.resolve_all(nodes);
        nodes.sort_by(|a, b| a.path.cmp(&b.path));

        println!("Levelizing dependency graph...");
        let mut arena = GraphArena::from_nodes(&nodes);
        let feedback = levelizer::levelize(&mut arena);
        let violations = levelizer::collect_violations(&arena)?;
        println!(
            "Levelized {} graph nodes ({} feedback edges, {} violations)",
            arena.len(),
            feedback.len(),
            violations.len()
        );

        Ok(AnalysisResult {
            nodes,
            arena,
            feedback,
            violations,
            file_count,
        })
    }
}

impl Default for ProjectAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
