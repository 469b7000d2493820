//! Watch command implementation
//!
//! Starts watching before the initial build so changes made while the build
//! runs are not lost, then answers queries typed on stdin until Ctrl+C.

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::watcher::{ChangeFeed, FileWatcher};
use crate::{Config, IndexManager};

/// Run the watch command
///
/// # Arguments
/// * `debounce_ms` - Overrides the configured debounce delay
pub async fn run(root: &Path, config: &Config, debounce_ms: Option<u64>) -> Result<()> {
    let mut config = config.clone();
    if let Some(debounce_ms) = debounce_ms {
        config.watcher.debounce_ms = debounce_ms;
    }

    let manager = Arc::new(IndexManager::new(config.indexer.clone()));

    let (tx, rx) = mpsc::channel(config.watcher.queue_capacity.max(1));
    let _watch_guard = FileWatcher::from_config(root.to_path_buf(), &config)
        .start(tx)
        .context("Failed to start file watcher")?;

    let shutdown = CancellationToken::new();
    let feed = ChangeFeed::new(manager.clone());
    let feed_handle = tokio::spawn(feed.run(rx, shutdown.clone()));

    // The feed and the build may touch the same file; per-path locking in
    // the manager keeps the last write whole.
    if let Err(e) = super::build_index(&manager, root).await {
        shutdown.cancel();
        let _ = feed_handle.await;
        return Err(e);
    }

    println!("Watching directory: {}", root.display());
    println!("Debounce delay: {}ms", config.watcher.debounce_ms);
    println!("Type a query and press Enter. Press Ctrl+C to stop.");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = signal::ctrl_c() => break,
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let results = manager.query(&line);
                if results.is_empty() {
                    println!("(no matches)");
                }
                for path in results {
                    println!("{}", path.display());
                }
                println!();
            }
        }
    }

    println!();
    println!("Shutting down...");

    shutdown.cancel();
    let stats = feed_handle.await.context("Change feed task panicked")?;

    println!();
    println!("Watch session complete!");
    println!("----------------------------------------");
    println!("  Files indexed:   {}", stats.indexed);
    println!("  Name-only:       {}", stats.name_only);
    println!("  Paths removed:   {}", stats.removed);
    if stats.failed > 0 {
        println!("  Failed:          {}", stats.failed);
    }
    if stats.watch_errors > 0 {
        println!("  Watch errors:    {}", stats.watch_errors);
    }
    println!("----------------------------------------");

    info!("Watch session ended");

    Ok(())
}
