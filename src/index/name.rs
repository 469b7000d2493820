//! File-name postings shared by all files

use dashmap::DashMap;
use std::collections::HashSet;

use super::path_key::PathKey;

/// token -> set of paths whose base name contains the token
#[derive(Debug, Default)]
pub struct NameIndex {
    buckets: DashMap<String, HashSet<PathKey>>,
}

impl NameIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `path` to the bucket of every token. Adding twice has no extra effect.
    pub fn add<I>(&self, path: &PathKey, tokens: I)
    where
        I: IntoIterator<Item = String>,
    {
        for token in tokens {
            let mut bucket = self.buckets.entry(token).or_default();
            // Replace rather than insert so the latest path spelling wins
            bucket.replace(path.clone());
        }
    }

    /// Remove `path` from every bucket, dropping buckets that become empty.
    ///
    /// Returns the number of buckets the path was removed from.
    pub fn remove(&self, path: &PathKey) -> usize {
        let mut removed = 0;
        self.buckets.retain(|_, paths| {
            if paths.remove(path) {
                removed += 1;
            }
            !paths.is_empty()
        });
        removed
    }

    pub fn contains_token(&self, token: &str) -> HashSet<PathKey> {
        self.buckets
            .get(token)
            .map(|bucket| bucket.value().clone())
            .unwrap_or_default()
    }

    /// Number of distinct name tokens
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}
