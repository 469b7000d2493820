//! Filesystem watching and the change feed
//!
//! [`FileWatcher`] turns debounced `notify` events into
//! [`ChangeNotification`]s on a bounded queue; [`ChangeFeed`] drains that
//! queue into the index. The index itself never depends on the watcher, so
//! any other producer can feed the same queue.

pub mod feed;
pub mod notification;

use notify::event::{ModifyKind, RenameMode};
use notify::{EventKind, RecommendedWatcher, RecursiveMode};
use notify_debouncer_full::{new_debouncer, DebouncedEvent, Debouncer, RecommendedCache};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::config::{Config, WatcherConfig};
use crate::error::{IndexError, Result};

pub use feed::{ChangeFeed, FeedStats};
pub use notification::{ChangeKind, ChangeNotification};

/// Keeps the underlying watch alive; dropping it stops event delivery
pub struct WatchGuard {
    _debouncer: Debouncer<RecommendedWatcher, RecommendedCache>,
}

/// Recursive watch over a root directory
pub struct FileWatcher {
    root: PathBuf,
    config: WatcherConfig,
    extensions: Vec<String>,
}

impl FileWatcher {
    pub fn new(root: PathBuf, config: WatcherConfig, extensions: Vec<String>) -> Self {
        Self {
            root,
            config,
            extensions,
        }
    }

    /// Watcher using the debounce window and watched extensions from `config`
    pub fn from_config(root: PathBuf, config: &Config) -> Self {
        Self::new(
            root,
            config.watcher.clone(),
            config.indexer.watched_extensions(),
        )
    }

    /// Start watching and forward notifications into `tx`.
    ///
    /// The notify callback runs on its own thread and blocks on a full queue,
    /// which pushes back on the debouncer instead of dropping events.
    pub fn start(self, tx: mpsc::Sender<ChangeNotification>) -> Result<WatchGuard> {
        let debounce = Duration::from_millis(self.config.debounce_ms);
        let filter = EventFilter {
            extensions: self.extensions.clone(),
        };

        let mut debouncer = new_debouncer(
            debounce,
            None,
            move |result: std::result::Result<Vec<DebouncedEvent>, Vec<notify::Error>>| {
                let notifications = match result {
                    Ok(events) => filter.convert(&events),
                    Err(errors) => errors
                        .into_iter()
                        .map(|e| ChangeNotification::Error(e.to_string()))
                        .collect(),
                };

                for notification in notifications {
                    if let Err(e) = tx.blocking_send(notification) {
                        error!("Failed to queue change notification: {}", e);
                        return;
                    }
                }
            },
        )
        .map_err(|e| IndexError::Watch(format!("failed to create debouncer: {}", e)))?;

        debouncer
            .watch(&self.root, RecursiveMode::Recursive)
            .map_err(|e| IndexError::Watch(format!("failed to watch {:?}: {}", self.root, e)))?;

        info!("Watching directory: {:?}", self.root);
        info!("Debounce delay: {}ms", self.config.debounce_ms);

        Ok(WatchGuard {
            _debouncer: debouncer,
        })
    }
}

/// Maps raw events to notifications, dropping directories and unwatched extensions
#[derive(Debug, Clone)]
struct EventFilter {
    extensions: Vec<String>,
}

impl EventFilter {
    fn convert(&self, events: &[DebouncedEvent]) -> Vec<ChangeNotification> {
        let mut notifications = Vec::new();

        for event in events {
            match event.kind {
                EventKind::Modify(ModifyKind::Name(RenameMode::Both)) if event.paths.len() == 2 => {
                    let from = &event.paths[0];
                    let to = &event.paths[1];
                    match (self.accepts(from), self.accepts(to)) {
                        (true, true) => {
                            notifications.push(ChangeNotification::renamed(from, to))
                        }
                        (true, false) => notifications.push(ChangeNotification::deleted(from)),
                        (false, true) => notifications.push(ChangeNotification::created(to)),
                        (false, false) => {}
                    }
                }
                _ => {
                    for path in &event.paths {
                        if !self.accepts(path) {
                            debug!("Skipping path outside watched extensions: {:?}", path);
                            continue;
                        }
                        if let Some(notification) = Self::map_kind(&event.kind, path) {
                            notifications.push(notification);
                        }
                    }
                }
            }
        }

        notifications
    }

    fn map_kind(kind: &EventKind, path: &Path) -> Option<ChangeNotification> {
        match kind {
            EventKind::Create(_) => Some(ChangeNotification::created(path)),
            EventKind::Modify(ModifyKind::Name(RenameMode::From)) => {
                Some(ChangeNotification::deleted(path))
            }
            EventKind::Modify(ModifyKind::Name(RenameMode::To)) => {
                Some(ChangeNotification::created(path))
            }
            EventKind::Modify(ModifyKind::Metadata(_)) => None,
            EventKind::Modify(_) => Some(ChangeNotification::changed(path)),
            EventKind::Remove(_) => Some(ChangeNotification::deleted(path)),
            _ => None,
        }
    }

    fn accepts(&self, path: &Path) -> bool {
        if path.is_dir() {
            return false;
        }

        if self.extensions.is_empty() {
            return true;
        }

        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                self.extensions
                    .iter()
                    .any(|watched| watched.eq_ignore_ascii_case(ext))
            })
            .unwrap_or(false)
    }
}
