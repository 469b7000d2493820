//! Change feed: applies change notifications to the index
//!
//! Notifications arrive on a bounded queue and are applied one at a time, so
//! the per-path order the watch layer delivers is the order the index sees.

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use super::notification::ChangeNotification;
use crate::index::{IndexManager, IndexOutcome};
use crate::metrics::{CHANGE_NOTIFICATIONS, WATCH_ERRORS};

/// Counters for notifications applied by a [`ChangeFeed`]
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FeedStats {
    /// Files indexed with contents
    pub indexed: usize,
    /// Files indexed by name only
    pub name_only: usize,
    /// Paths removed (including removals of never-indexed paths)
    pub removed: usize,
    /// `index` calls that reported a failure
    pub failed: usize,
    /// Error notifications from the watch layer
    pub watch_errors: usize,
}

impl FeedStats {
    /// Merge another stats instance into this one
    pub fn merge(&mut self, other: &FeedStats) {
        self.indexed += other.indexed;
        self.name_only += other.name_only;
        self.removed += other.removed;
        self.failed += other.failed;
        self.watch_errors += other.watch_errors;
    }

    pub fn has_changes(&self) -> bool {
        self.indexed > 0 || self.name_only > 0 || self.removed > 0
    }

    fn record(&mut self, outcome: &IndexOutcome) {
        match outcome {
            IndexOutcome::Indexed { .. } => self.indexed += 1,
            IndexOutcome::NameOnly => self.name_only += 1,
            IndexOutcome::Failed(_) => self.failed += 1,
        }
    }
}

/// Translates change notifications into index and remove calls
#[derive(Clone)]
pub struct ChangeFeed {
    manager: Arc<IndexManager>,
}

impl ChangeFeed {
    pub fn new(manager: Arc<IndexManager>) -> Self {
        Self { manager }
    }

    /// Apply a single notification. Blocks on file I/O for create/change/rename.
    pub fn apply(&self, notification: &ChangeNotification) -> FeedStats {
        let mut stats = FeedStats::default();
        CHANGE_NOTIFICATIONS.inc();

        debug!("Applying {} notification", notification.kind());

        match notification {
            ChangeNotification::Created(path) | ChangeNotification::Changed(path) => {
                let outcome = self.manager.index(path);
                stats.record(&outcome);
            }
            ChangeNotification::Deleted(path) => {
                self.manager.remove(path);
                stats.removed += 1;
            }
            ChangeNotification::Renamed { from, to } => {
                self.manager.remove(from);
                stats.removed += 1;
                let outcome = self.manager.index(to);
                stats.record(&outcome);
                debug!("Re-indexed renamed file: {:?} -> {:?}", from, to);
            }
            ChangeNotification::Error(message) => {
                WATCH_ERRORS.inc();
                error!("Watch error: {}", message);
                stats.watch_errors += 1;
            }
        }

        stats
    }

    /// Consume notifications until `shutdown` fires or every sender is dropped.
    ///
    /// Each notification is applied on the blocking pool before the next one
    /// is taken off the queue.
    pub async fn run(
        self,
        mut rx: mpsc::Receiver<ChangeNotification>,
        shutdown: CancellationToken,
    ) -> FeedStats {
        let mut total_stats = FeedStats::default();

        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    info!("Shutdown signal received, stopping change feed");
                    break;
                }

                next = rx.recv() => {
                    let Some(notification) = next else {
                        info!("Change notification queue closed");
                        break;
                    };

                    let feed = self.clone();
                    match tokio::task::spawn_blocking(move || feed.apply(&notification)).await {
                        Ok(stats) => total_stats.merge(&stats),
                        Err(e) => {
                            error!("Failed to apply change notification: {}", e);
                            total_stats.failed += 1;
                        }
                    }
                }
            }
        }

        total_stats
    }
}
