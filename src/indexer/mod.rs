//! Filesystem-facing side of indexing: which files qualify, how to find them,
//! and how to read them.

pub mod text;
pub mod walker;

use std::collections::HashSet;
use std::path::Path;

use crate::config::IndexerConfig;

pub use text::{decode, read_text, split_lines, TextEncoding};
pub use walker::Walker;

/// How much of a file gets indexed, decided by extension alone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileClass {
    /// Contents and name
    Content,
    /// Name only
    NameOnly,
}

/// Extension-based eligibility rules
#[derive(Debug, Clone)]
pub struct Eligibility {
    content: HashSet<String>,
    name_only: HashSet<String>,
}

impl Eligibility {
    pub fn new(config: &IndexerConfig) -> Self {
        Self {
            content: normalize(&config.content_extensions),
            name_only: normalize(&config.name_only_extensions),
        }
    }

    /// Class used by `index`: anything that is not content-indexable is name-only
    pub fn class_of(&self, path: &Path) -> FileClass {
        match extension_of(path) {
            Some(ext) if self.content.contains(&ext) => FileClass::Content,
            _ => FileClass::NameOnly,
        }
    }

    /// Whether the initial build should pick up `path`
    pub fn is_enumerated(&self, path: &Path) -> bool {
        extension_of(path)
            .map(|ext| self.content.contains(&ext) || self.name_only.contains(&ext))
            .unwrap_or(false)
    }
}

impl Default for Eligibility {
    fn default() -> Self {
        Self::new(&IndexerConfig::default())
    }
}

fn normalize(extensions: &[String]) -> HashSet<String> {
    extensions
        .iter()
        .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
        .collect()
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}
