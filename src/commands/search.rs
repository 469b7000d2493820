use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

use crate::{Config, IndexManager};

/// Run the search command
///
/// Builds an index over `root` and prints every path matching all terms of `query`.
pub async fn run(root: &Path, query: &str, config: &Config) -> Result<()> {
    let manager = Arc::new(IndexManager::new(config.indexer.clone()));
    super::build_index(&manager, root).await?;

    let results = manager.query(query);

    if results.is_empty() {
        println!("No results found for: {}", query);
        return Ok(());
    }

    println!("Found {} results for: \"{}\"\n", results.len(), query);
    for path in &results {
        println!("{}", path.display());
    }

    Ok(())
}
