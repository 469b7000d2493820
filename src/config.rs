use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub indexer: IndexerConfig,

    #[serde(default)]
    pub watcher: WatcherConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexerConfig {
    /// Extensions whose contents are tokenized (without the leading dot)
    #[serde(default = "default_content_extensions")]
    pub content_extensions: Vec<String>,

    /// Extensions that the initial build name-indexes without reading contents
    #[serde(default = "default_name_only_extensions")]
    pub name_only_extensions: Vec<String>,

    /// Directory or file names skipped during the initial build
    #[serde(default = "default_ignore_patterns")]
    pub ignore_patterns: Vec<String>,

    /// Number of parallel threads for the initial build (None = auto-detect)
    #[serde(default)]
    pub parallel_threads: Option<usize>,

    /// Number of files handed to the thread pool between cancellation checks
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            content_extensions: default_content_extensions(),
            name_only_extensions: default_name_only_extensions(),
            ignore_patterns: default_ignore_patterns(),
            parallel_threads: None,
            batch_size: default_batch_size(),
        }
    }
}

impl IndexerConfig {
    /// Every extension the watcher and the initial build care about
    pub fn watched_extensions(&self) -> Vec<String> {
        self.content_extensions
            .iter()
            .chain(self.name_only_extensions.iter())
            .map(|ext| ext.to_ascii_lowercase())
            .collect()
    }
}

fn default_content_extensions() -> Vec<String> {
    vec!["csv".to_string(), "log".to_string()]
}

fn default_name_only_extensions() -> Vec<String> {
    vec!["txt".to_string()]
}

fn default_ignore_patterns() -> Vec<String> {
    vec![".git".to_string(), "$RECYCLE.BIN".to_string()]
}

fn default_batch_size() -> usize {
    64
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatcherConfig {
    /// Debounce window for filesystem events
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Capacity of the notification queue between the watcher and the index
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

fn default_debounce_ms() -> u64 {
    500
}

fn default_queue_capacity() -> usize {
    1024
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Write logs to rotating files
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Also log to stderr
    #[serde(default)]
    pub stderr: bool,

    /// Level for the file layer: trace, debug, info, warn, error
    #[serde(default = "default_level")]
    pub level: String,

    /// Log directory; relative paths resolve against the data directory
    #[serde(default = "default_log_directory")]
    pub directory: PathBuf,

    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,

    /// hourly, daily, minutely or never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            stderr: false,
            level: default_level(),
            directory: default_log_directory(),
            file_prefix: default_file_prefix(),
            rotation: default_rotation(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_level() -> String {
    "info".to_string()
}

fn default_log_directory() -> PathBuf {
    PathBuf::from("logs")
}

fn default_file_prefix() -> String {
    "aim-index.log".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Config {
    /// Load configuration from `path`, or from the per-user config directory
    /// when `path` is `None`. A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) => path,
                None => return Ok(Config::default()),
            },
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config from {:?}", config_path))?;

            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config from {:?}", config_path))
        } else {
            Ok(Config::default())
        }
    }

    /// Save configuration as pretty TOML
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }

        let content =
            toml::to_string_pretty(self).with_context(|| "Failed to serialize config")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config to {:?}", path))?;

        Ok(())
    }

    /// `config.toml` inside the per-user config directory
    pub fn default_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    /// Per-user local data directory, used as the base for relative log paths
    pub fn data_dir() -> PathBuf {
        project_dirs()
            .map(|dirs| dirs.data_local_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from(".aim"))
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "AIM")
}
