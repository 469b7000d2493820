//! Per-file content postings

use dashmap::DashMap;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use super::path_key::PathKey;

/// Token postings for a single file: token -> line numbers (1-based, ascending)
#[derive(Debug, Default)]
pub struct ContentEntry {
    postings: HashMap<String, Vec<u32>>,
}

impl ContentEntry {
    /// Build an entry from `(line_number, tokens)` pairs in file order
    pub fn from_lines<I, T>(line_tokens: I) -> Self
    where
        I: IntoIterator<Item = (u32, T)>,
        T: IntoIterator<Item = String>,
    {
        let mut postings: HashMap<String, Vec<u32>> = HashMap::new();
        for (line_number, tokens) in line_tokens {
            for token in tokens {
                let lines = postings.entry(token).or_default();
                if lines.last() != Some(&line_number) {
                    lines.push(line_number);
                }
            }
        }
        Self { postings }
    }

    pub fn contains(&self, token: &str) -> bool {
        self.postings.contains_key(token)
    }

    pub fn lines(&self, token: &str) -> Option<&[u32]> {
        self.postings.get(token).map(Vec::as_slice)
    }

    /// Number of distinct tokens in the file
    pub fn token_count(&self) -> usize {
        self.postings.len()
    }
}

/// Content postings keyed by path.
///
/// Each entry is built off to the side and published with a single insert,
/// so readers never see a partially built entry.
#[derive(Debug, Default)]
pub struct ContentIndex {
    entries: DashMap<PathKey, Arc<ContentEntry>>,
}

impl ContentIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the entry for `path` with one built from `line_tokens`.
    ///
    /// Returns the number of distinct tokens stored.
    pub fn put<I, T>(&self, path: PathKey, line_tokens: I) -> usize
    where
        I: IntoIterator<Item = (u32, T)>,
        T: IntoIterator<Item = String>,
    {
        let entry = Arc::new(ContentEntry::from_lines(line_tokens));
        let token_count = entry.token_count();
        // Re-inserting an existing key keeps the stored key, so refresh it to
        // pick up a changed path spelling.
        self.entries.remove(&path);
        self.entries.insert(path, entry);
        token_count
    }

    pub fn remove(&self, path: &PathKey) -> bool {
        self.entries.remove(path).is_some()
    }

    /// Every path whose current entry has a posting for `token`
    pub fn contains_token(&self, token: &str) -> HashSet<PathKey> {
        self.entries
            .iter()
            .filter(|entry| entry.value().contains(token))
            .map(|entry| entry.key().clone())
            .collect()
    }

    /// Line numbers where `token` occurs in `path`
    pub fn lines_for(&self, path: &PathKey, token: &str) -> Option<Vec<u32>> {
        let entry = self.entries.get(path)?.value().clone();
        entry.lines(token).map(<[u32]>::to_vec)
    }

    /// Number of files with content postings
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of distinct tokens over all files
    pub fn token_count(&self) -> usize {
        self.entries
            .iter()
            .map(|entry| entry.value().token_count())
            .sum()
    }
}
