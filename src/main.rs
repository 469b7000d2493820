use anyhow::Result;
use clap::Parser;

use aim_index::cli::{Cli, Commands};
use aim_index::config::Config;
use aim_index::logging::{init_early_logging, init_logging};
use aim_index::metrics;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            init_early_logging();
            tracing::error!("{:#}", e);
            return Err(e);
        }
    };

    // The guard MUST be held until program exit to ensure logs are flushed
    let _logging_guard = init_logging(&config.logging, &Config::data_dir())?;

    tracing::info!("aim-index starting up");

    metrics::register_metrics();

    match cli.command {
        Commands::Search { root, query } => {
            aim_index::commands::search::run(&root, &query.join(" "), &config).await?;
        }
        Commands::Watch { root, debounce_ms } => {
            aim_index::commands::watch::run(&root, &config, debounce_ms).await?;
        }
        Commands::Stats { root, prometheus } => {
            aim_index::commands::stats::run(&root, &config, prometheus).await?;
        }
    }

    Ok(())
}
