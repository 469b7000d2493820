//! CLI command implementations

pub mod search;
pub mod stats;
pub mod watch;

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::index::{BuildReport, IndexManager};

/// Populate `manager` from `root`, cancelling the scan on Ctrl+C.
pub(crate) async fn build_index(manager: &Arc<IndexManager>, root: &Path) -> Result<BuildReport> {
    let cancel = CancellationToken::new();

    let ctrl_c_cancel = cancel.clone();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c_cancel.cancel();
        }
    });

    let result = manager
        .build(root, cancel)
        .await
        .with_context(|| format!("Failed to build index for {}", root.display()));
    ctrl_c.abort();
    let report = result?;

    eprintln!(
        "Indexed {} files ({} name-only, {} failed, {} skipped) in {:.2}s{}",
        report.indexed,
        report.name_only,
        report.failed,
        report.skipped_entries,
        report.duration.as_secs_f64(),
        if report.cancelled { " (cancelled)" } else { "" }
    );

    Ok(report)
}
