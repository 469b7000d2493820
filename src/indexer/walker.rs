use std::path::PathBuf;
use walkdir::{DirEntry, WalkDir};

use super::Eligibility;
use crate::config::IndexerConfig;

/// Walks the watched root and yields files eligible for the initial build
pub struct Walker {
    root: PathBuf,
    rules: Eligibility,
    ignore_patterns: Vec<String>,
}

impl Walker {
    /// Create a new Walker with the given root directory and configuration
    pub fn new(root: PathBuf, config: &IndexerConfig) -> Self {
        Self {
            root,
            rules: Eligibility::new(config),
            ignore_patterns: config.ignore_patterns.clone(),
        }
    }

    /// Walk the directory tree.
    ///
    /// Unreadable entries are yielded as errors so the caller can log and
    /// count them; the walk carries on with sibling entries. Ignored
    /// directories are not descended into.
    pub fn walk(&self) -> impl Iterator<Item = Result<PathBuf, walkdir::Error>> + '_ {
        WalkDir::new(&self.root)
            .follow_links(false)
            .into_iter()
            .filter_entry(move |entry| !self.is_ignored(entry))
            .filter_map(move |entry| match entry {
                Ok(entry) => {
                    if entry.file_type().is_file() && self.rules.is_enumerated(entry.path()) {
                        Some(Ok(entry.into_path()))
                    } else {
                        None
                    }
                }
                Err(e) => Some(Err(e)),
            })
    }

    /// Collect all eligible files, dropping unreadable entries
    pub fn collect_files(&self) -> Vec<PathBuf> {
        self.walk().filter_map(Result::ok).collect()
    }

    fn is_ignored(&self, entry: &DirEntry) -> bool {
        // Never filter the root itself
        if entry.depth() == 0 {
            return false;
        }
        let name = entry.file_name().to_string_lossy();
        self.ignore_patterns
            .iter()
            .any(|pattern| name.eq_ignore_ascii_case(pattern))
    }
}
