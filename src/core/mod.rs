pub mod analyzer;
pub mod model;
pub mod path;
pub mod resolver;
pub mod scanner;

pub use analyzer::{AnalysisResult, ProjectAnalyzer};
pub use model::{Dependency, Language, Node, NodeKind, TypeRef, TypeRefKind, UsageKind};
pub use path::{NodePath, UNKNOWN_SEGMENT};
pub use resolver::{LanguageDictionary, ProjectDictionary, TypeResolver};
pub use scanner::{FileInfo, FileScanner};
