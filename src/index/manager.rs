//! The index manager: sole owner of the content and name indices
//!
//! All mutation goes through `index` and `remove`. Both take a striped lock
//! on the path so that two writers touching the same file (the initial build
//! and the change feed, say) cannot interleave their remove and insert steps.
//! Different paths never contend on that lock, and `query` never takes it.

use rayon::prelude::*;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::fs;
use std::hash::{Hash, Hasher};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::content::ContentIndex;
use super::name::NameIndex;
use super::outcome::{BuildReport, FailureStage, IndexOutcome};
use super::path_key::PathKey;
use crate::config::IndexerConfig;
use crate::error::{IndexError, Result};
use crate::indexer::{read_text, split_lines, Eligibility, FileClass, Walker};
use crate::metrics::{
    BUILD_DURATION, INDEXED_FILES, INDEX_FAILURES, QUERY_LATENCY, QUERY_REQUESTS, QUERY_RESULTS,
};
use crate::tokenizer::{tokenize, tokenize_distinct};

const PATH_LOCK_STRIPES: usize = 64;

/// Sizes of the in-memory indices
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexStats {
    /// Files with a content entry
    pub files_with_content: usize,
    /// Distinct tokens summed over content entries
    pub content_tokens: usize,
    /// Distinct name tokens
    pub name_tokens: usize,
}

/// Owns both indices and exposes build, index, remove and query
pub struct IndexManager {
    content: ContentIndex,
    names: NameIndex,
    rules: Eligibility,
    config: IndexerConfig,
    path_locks: Vec<Mutex<()>>,
}

impl IndexManager {
    pub fn new(config: IndexerConfig) -> Self {
        Self {
            content: ContentIndex::new(),
            names: NameIndex::new(),
            rules: Eligibility::new(&config),
            config,
            path_locks: (0..PATH_LOCK_STRIPES).map(|_| Mutex::new(())).collect(),
        }
    }

    /// Populate the indices from every eligible file under `root`.
    ///
    /// Fails only when `root` itself cannot be read. Unreadable entries below
    /// it are logged and skipped. When `cancel` fires the scan stops between
    /// files and the report comes back with `cancelled` set; whatever was
    /// indexed so far stays.
    pub async fn build(
        self: &Arc<Self>,
        root: impl AsRef<Path>,
        cancel: CancellationToken,
    ) -> Result<BuildReport> {
        let root = root.as_ref().to_path_buf();

        fs::read_dir(&root).map_err(|source| IndexError::RootUnreadable {
            path: root.clone(),
            source,
        })?;

        let manager = Arc::clone(self);
        let report =
            tokio::task::spawn_blocking(move || manager.build_blocking(&root, &cancel)).await?;

        Ok(report)
    }

    /// Blocking body of [`IndexManager::build`], for callers already off the async runtime
    pub fn build_blocking(&self, root: &Path, cancel: &CancellationToken) -> BuildReport {
        let start = Instant::now();
        let mut report = BuildReport::default();

        info!("Building index for {:?}", root);

        let threads = self.config.parallel_threads.unwrap_or_else(num_cpus::get);
        let pool = match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
            Ok(pool) => Some(pool),
            Err(e) => {
                warn!("Falling back to the global thread pool: {}", e);
                None
            }
        };

        let batch_size = self.config.batch_size.max(1);
        let mut batch = Vec::with_capacity(batch_size);
        let walker = Walker::new(root.to_path_buf(), &self.config);

        for item in walker.walk() {
            if cancel.is_cancelled() {
                break;
            }

            match item {
                Ok(path) => {
                    batch.push(path);
                    if batch.len() >= batch_size {
                        self.index_batch(&mut batch, pool.as_ref(), cancel, &mut report);
                    }
                }
                Err(e) => {
                    let path = e.path().map(Path::to_path_buf).unwrap_or_default();
                    warn!("Skipping unreadable entry {:?}: {}", path, e);
                    report.skipped_entries += 1;
                }
            }
        }

        if !batch.is_empty() {
            self.index_batch(&mut batch, pool.as_ref(), cancel, &mut report);
        }

        report.cancelled = cancel.is_cancelled();
        report.duration = start.elapsed();
        BUILD_DURATION.observe(report.duration.as_secs_f64());
        INDEXED_FILES.set(self.content.len() as f64);

        info!(
            "Build of {:?} {} in {:.2}s: {} indexed, {} name-only, {} failed, {} skipped",
            root,
            if report.cancelled { "cancelled" } else { "finished" },
            report.duration.as_secs_f64(),
            report.indexed,
            report.name_only,
            report.failed,
            report.skipped_entries
        );

        report
    }

    fn index_batch(
        &self,
        batch: &mut Vec<PathBuf>,
        pool: Option<&rayon::ThreadPool>,
        cancel: &CancellationToken,
        report: &mut BuildReport,
    ) {
        let run = || -> Vec<IndexOutcome> {
            batch
                .par_iter()
                .filter_map(|path| {
                    if cancel.is_cancelled() {
                        None
                    } else {
                        Some(self.index(path))
                    }
                })
                .collect()
        };

        let outcomes = match pool {
            Some(pool) => pool.install(run),
            None => run(),
        };

        for outcome in &outcomes {
            report.record(outcome);
        }
        batch.clear();
    }

    /// Re-index one file.
    ///
    /// Always removes the path first, so a failed read leaves no stale
    /// postings. Contents are read only for content-indexable extensions; the
    /// base name is indexed for every file that still exists. Never fails:
    /// problems are logged and reported through the outcome.
    pub fn index(&self, path: &Path) -> IndexOutcome {
        let key = PathKey::new(path);
        let _guard = self.lock_path(&key);
        self.remove_unlocked(&key);

        let outcome = self.index_unlocked(path, &key);
        match &outcome {
            IndexOutcome::Failed(failure) => {
                INDEX_FAILURES.inc();
                warn!(
                    "Index error for {:?} ({} stage): {}",
                    path, failure.stage, failure.reason
                );
            }
            IndexOutcome::Indexed { lines, tokens } => {
                debug!("Indexed {:?}: {} lines, {} tokens", path, lines, tokens);
            }
            IndexOutcome::NameOnly => {
                debug!("Name-indexed {:?}", path);
            }
        }
        outcome
    }

    fn index_unlocked(&self, path: &Path, key: &PathKey) -> IndexOutcome {
        let class = self.rules.class_of(path);

        // A vanished path ends up absent rather than name-only
        match fs::metadata(path) {
            Ok(meta) if meta.is_dir() => {
                return IndexOutcome::failed(FailureStage::Name, "path is a directory");
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                let stage = match class {
                    FileClass::Content => FailureStage::Content,
                    FileClass::NameOnly => FailureStage::Name,
                };
                return IndexOutcome::failed(stage, e.to_string());
            }
            _ => {}
        }

        let mut outcome = match class {
            FileClass::Content => self.index_content(path, key),
            FileClass::NameOnly => IndexOutcome::NameOnly,
        };

        match path.file_stem() {
            Some(stem) => {
                let stem = stem.to_string_lossy();
                self.names.add(key, tokenize(&stem));
            }
            None => {
                if !outcome.is_failed() {
                    outcome = IndexOutcome::failed(FailureStage::Name, "path has no file name");
                }
            }
        }

        outcome
    }

    fn index_content(&self, path: &Path, key: &PathKey) -> IndexOutcome {
        let text = match read_text(path) {
            Ok(text) => text,
            Err(e) => return IndexOutcome::failed(FailureStage::Content, e.to_string()),
        };

        let lines = split_lines(&text);
        let line_count = lines.len();
        let tokens = self.content.put(
            key.clone(),
            lines
                .iter()
                .copied()
                .enumerate()
                .map(|(i, line)| (i as u32 + 1, tokenize(line))),
        );

        IndexOutcome::Indexed {
            lines: line_count,
            tokens,
        }
    }

    /// Drop `path` from both indices. Returns whether anything was removed.
    pub fn remove(&self, path: &Path) -> bool {
        let key = PathKey::new(path);
        let _guard = self.lock_path(&key);
        let removed = self.remove_unlocked(&key);
        if removed {
            debug!("Removed {:?} from index", path);
        }
        removed
    }

    fn remove_unlocked(&self, key: &PathKey) -> bool {
        let had_content = self.content.remove(key);
        let name_buckets = self.names.remove(key);
        had_content || name_buckets > 0
    }

    /// Paths matching every term of `text`.
    ///
    /// A term matches a file when it occurs in the contents or in the base
    /// name. Queries without any token match nothing. Results are distinct
    /// and sorted by case-folded path.
    pub fn query(&self, text: &str) -> Vec<PathBuf> {
        let _timer = QUERY_LATENCY.start_timer();
        QUERY_REQUESTS.inc();

        let terms = tokenize_distinct(text);
        if terms.is_empty() {
            QUERY_RESULTS.observe(0.0);
            return Vec::new();
        }

        let mut candidates: Vec<HashSet<PathKey>> =
            terms.iter().map(|term| self.candidates(term)).collect();
        candidates.sort_by_key(HashSet::len);

        let mut sets = candidates.into_iter();
        let mut matched = sets.next().unwrap_or_default();
        for set in sets {
            if matched.is_empty() {
                break;
            }
            matched.retain(|key| set.contains(key));
        }

        let mut keys: Vec<PathKey> = matched.into_iter().collect();
        keys.sort_by(|a, b| a.folded().cmp(b.folded()));

        QUERY_RESULTS.observe(keys.len() as f64);
        keys.into_iter().map(PathKey::into_path).collect()
    }

    fn candidates(&self, token: &str) -> HashSet<PathKey> {
        let mut hits = self.content.contains_token(token);
        for key in self.names.contains_token(token) {
            // Keep the content-side spelling when both sides know the path
            hits.insert(key);
        }
        hits
    }

    /// Line numbers where `token` occurs in `path`, if the file has content postings
    pub fn lines_for(&self, path: &Path, token: &str) -> Option<Vec<u32>> {
        let token = token.to_ascii_lowercase();
        self.content.lines_for(&PathKey::new(path), &token)
    }

    pub fn stats(&self) -> IndexStats {
        let stats = IndexStats {
            files_with_content: self.content.len(),
            content_tokens: self.content.token_count(),
            name_tokens: self.names.len(),
        };
        INDEXED_FILES.set(stats.files_with_content as f64);
        stats
    }

    fn lock_path(&self, key: &PathKey) -> MutexGuard<'_, ()> {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        let stripe = (hasher.finish() as usize) % self.path_locks.len();
        self.path_locks[stripe]
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for IndexManager {
    fn default() -> Self {
        Self::new(IndexerConfig::default())
    }
}
