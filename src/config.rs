//! Runtime configuration for pagecache.
//!
//! Configuration can be loaded from a JSON file or constructed programmatically.
//! Cache geometry (page size, table capacity) and source robustness knobs live here.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::cache::error::CacheError;
use crate::cache::table::MIN_CAPACITY;
use crate::source::range::DEFAULT_MAX_ZERO_READS;

/// Command-line arguments.
#[derive(Parser, Debug, Clone)]
#[command(name = "pagecache", about = "Random reads over slow sources through a page cache")]
pub struct Cli {
    /// Path to configuration file (JSON).
    #[arg(short, long, default_value = "pagecache.json")]
    pub config: PathBuf,

    /// Override the configured page size in bytes.
    #[arg(long)]
    pub page_size: Option<u64>,

    /// Override the configured page table capacity.
    #[arg(long)]
    pub capacity: Option<usize>,

    /// Enable verbose logging.
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON.
    #[arg(long)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Read a byte range through the cache and write it to stdout.
    Read {
        /// File to read from.
        path: PathBuf,

        /// Starting byte offset.
        #[arg(long, default_value_t = 0)]
        offset: u64,

        /// Number of bytes to read.
        #[arg(long)]
        length: usize,
    },

    /// Scan a file through the cache and directly, and compare the results.
    Verify {
        path: PathBuf,

        /// Size of each read in bytes.
        #[arg(long, default_value_t = 256)]
        read_size: usize,
    },

    /// Scan a file through the cache and print cache statistics as JSON.
    Stats {
        path: PathBuf,

        /// Size of each read in bytes.
        #[arg(long, default_value_t = 256)]
        read_size: usize,
    },
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Page cache geometry.
    pub cache: CacheConfig,

    /// Source settings.
    pub source: SourceConfig,
}

/// Page cache geometry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Bytes per page. Larger pages mean fewer source requests but more
    /// over-fetch for small random reads.
    pub page_size: u64,

    /// Pages kept resident. Peak memory is `capacity * page_size`.
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            page_size: 1024 * 1024, // 1 MiB
            capacity: 10,
        }
    }
}

impl CacheConfig {
    pub fn validate(&self) -> Result<(), CacheError> {
        if self.page_size < 1 {
            return Err(CacheError::InvalidArgument(format!(
                "page_size must be at least 1, got {}",
                self.page_size
            )));
        }
        if self.capacity < MIN_CAPACITY {
            return Err(CacheError::InvalidArgument(format!(
                "capacity must be at least {MIN_CAPACITY}, got {}",
                self.capacity
            )));
        }
        Ok(())
    }

    /// Upper bound on resident page bytes.
    pub fn max_resident_bytes(&self) -> u64 {
        self.page_size.saturating_mul(self.capacity as u64)
    }
}

/// Source robustness settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Consecutive zero-byte reads tolerated before a range read fails.
    pub max_zero_reads: u32,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            max_zero_reads: DEFAULT_MAX_ZERO_READS,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file, falling back to defaults for missing fields.
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        let config = if path.exists() {
            let data = std::fs::read_to_string(path)?;
            serde_json::from_str::<Config>(&data)?
        } else {
            tracing::warn!("Config file not found at {:?}, using defaults", path);
            Config::default()
        };
        config.cache.validate()?;
        Ok(config)
    }

    /// Apply command-line overrides on top of the loaded values.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(page_size) = cli.page_size {
            self.cache.page_size = page_size;
        }
        if let Some(capacity) = cli.capacity {
            self.cache.capacity = capacity;
        }
    }
}
