//! Stats command for displaying index statistics and metrics

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

use crate::metrics::{gather_metrics, MetricSnapshot};
use crate::{Config, IndexManager};

/// Run the stats command
///
/// Builds an index over `root` and reports its size.
///
/// # Arguments
/// * `prometheus` - If true, output in Prometheus text format
pub async fn run(root: &Path, config: &Config, prometheus: bool) -> Result<()> {
    let manager = Arc::new(IndexManager::new(config.indexer.clone()));
    let report = super::build_index(&manager, root).await?;
    let stats = manager.stats();

    if prometheus {
        print!("{}", gather_metrics());
        return Ok(());
    }

    let snapshot = MetricSnapshot::capture();

    println!("Index Statistics");
    println!("================\n");

    println!("Index Contents:");
    println!("  Files with content: {}", stats.files_with_content);
    println!("  Content tokens:     {}", stats.content_tokens);
    println!("  Name tokens:        {}", stats.name_tokens);
    println!();

    println!("Build:");
    println!("  Files seen:    {}", report.files_seen);
    println!("  Name-only:     {}", report.name_only);
    println!("  Failed:        {}", report.failed);
    println!("  Skipped:       {}", report.skipped_entries);
    println!("  Duration:      {:.3}s", report.duration.as_secs_f64());
    println!();

    println!("Query Metrics:");
    println!("  Total queries:   {:.0}", snapshot.query_requests_total);
    println!("  Index failures:  {:.0}", snapshot.index_failures_total);
    println!();

    println!("Root:");
    println!("  {}", root.display());

    Ok(())
}
