use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "aim-index")]
#[command(author, version, about = "Live name and content search over a watched folder")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to config.toml (defaults to the per-user config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Index a folder and print files matching every query term
    Search {
        /// Folder to index
        root: PathBuf,

        /// Query terms
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },

    /// Index a folder, keep it in sync, and answer queries read from stdin
    Watch {
        /// Folder to watch
        root: PathBuf,

        /// Debounce delay in milliseconds
        #[arg(short, long)]
        debounce_ms: Option<u64>,
    },

    /// Index a folder and show index statistics
    Stats {
        /// Folder to index
        root: PathBuf,

        /// Output in Prometheus format
        #[arg(long)]
        prometheus: bool,
    },
}
