//! Per-file results of an `index` call

use std::fmt;
use std::time::Duration;

/// Stage where indexing a single file failed
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub enum FailureStage {
    /// Opening, decoding or reading the file contents
    Content,
    /// Deriving tokens from the file name
    Name,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureStage::Content => write!(f, "content"),
            FailureStage::Name => write!(f, "name"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexFailure {
    pub stage: FailureStage,
    pub reason: String,
}

/// What `IndexManager::index` did with a path.
///
/// A `Failed` content stage still leaves the path name-indexed when the name
/// stage succeeded; a failure never leaves a partial content entry behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexOutcome {
    /// Contents and name indexed
    Indexed { lines: usize, tokens: usize },
    /// Not content-indexable; name indexed only
    NameOnly,
    Failed(IndexFailure),
}

impl IndexOutcome {
    pub fn failed(stage: FailureStage, reason: impl Into<String>) -> Self {
        IndexOutcome::Failed(IndexFailure {
            stage,
            reason: reason.into(),
        })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, IndexOutcome::Failed(_))
    }
}

/// Summary of a bulk build
#[derive(Debug, Default, Clone)]
pub struct BuildReport {
    /// Files handed to `index`
    pub files_seen: usize,
    pub indexed: usize,
    pub name_only: usize,
    pub failed: usize,
    /// Directory entries that could not be read and were skipped
    pub skipped_entries: usize,
    /// The build stopped early because cancellation was requested
    pub cancelled: bool,
    pub duration: Duration,
}

impl BuildReport {
    pub fn record(&mut self, outcome: &IndexOutcome) {
        self.files_seen += 1;
        match outcome {
            IndexOutcome::Indexed { .. } => self.indexed += 1,
            IndexOutcome::NameOnly => self.name_only += 1,
            IndexOutcome::Failed(_) => self.failed += 1,
        }
    }
}
