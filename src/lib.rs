//! # stratum
//!
//! Multi-language dependency levelization for architecture analysis.
//!
//! stratum parses C++, C#, Java, and Go sources into a uniform entity model,
//! resolves type references project-wide, and levelizes the resulting
//! dependency graph: every namespace and entity gets a level number within
//! its sibling group, cyclic dependencies are cut and reported, and edges
//! that point against the layering are listed as violations.
//!
//! ## Pipeline
//!
//! 1. **Extraction**: per-file tree-sitter parsing into [`core::Node`]s
//! 2. **Resolution**: project-wide symbol table, total name resolution
//! 3. **Levelization**: containment forest, cycle breaking, level assignment

pub mod core;
pub mod formatters;
pub mod graph;
pub mod parsers;
