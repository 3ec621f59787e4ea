use anyhow::Result;
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::core::Language;

#[derive(Debug, Clone)]
pub struct FileInfo {
    pub path: PathBuf,
    pub language: Language,
}

pub struct FileScanner;

impl FileScanner {
    pub fn new() -> Self {
        Self
    }

    /// Walk `root_path` and keep every file whose extension belongs to one of
    /// the requested languages. Symlinks are not followed.
    pub fn scan_directory(&self, root_path: &Path, languages: &[Language]) -> Result<Vec<FileInfo>> {
        let supported_extensions = self.extensions_for(languages);

        let entries: Vec<_> = WalkDir::new(root_path)
            .follow_links(false)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|entry| entry.path().is_file())
            .collect();

        let mut files: Vec<FileInfo> = entries
            .par_iter()
            .filter_map(|entry| {
                let path = entry.path();
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .and_then(|extension| {
                        supported_extensions.get(extension).map(|&language| FileInfo {
                            path: path.to_path_buf(),
                            language,
                        })
                    })
            })
            .collect();

        // Deterministic intake order regardless of walk order.
        files.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(files)
    }

    fn extensions_for(&self, languages: &[Language]) -> HashMap<&'static str, Language> {
        let mut extensions = HashMap::with_capacity(languages.len() * 3);

        for &language in languages {
            match language {
                Language::Cpp => {
                    extensions.insert("cpp", Language::Cpp);
                    extensions.insert("cxx", Language::Cpp);
                    extensions.insert("cc", Language::Cpp);
                    extensions.insert("hpp", Language::Cpp);
                    extensions.insert("h", Language::Cpp);
                }
                Language::CSharp => {
                    extensions.insert("cs", Language::CSharp);
                }
                Language::Java => {
                    extensions.insert("java", Language::Java);
                }
                Language::Go => {
                    extensions.insert("go", Language::Go);
                }
            }
        }

        extensions
    }
}

impl Default for FileScanner {
    fn default() -> Self {
        Self::new()
    }
}
