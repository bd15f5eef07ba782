//! pagecache: random reads over slow sources through a read-through page cache.
//!
//! The binary exercises the cache against local files:
//!   read   → pull one byte range through the cache to stdout
//!   verify → compare cached reads with direct source reads across a whole file
//!   stats  → scan a file through the cache and report hit/miss counters

use std::io::Write;
use std::path::Path;

use anyhow::{bail, Context};
use clap::Parser;
use tracing::{info, warn};

use pagecache::config::{CacheConfig, Cli, Command, Config};
use pagecache::source::{open_file, FileSource};
use pagecache::{PageCache, RandomAccessSource, ReadStatus};

fn main() -> anyhow::Result<()> {
    // Parse CLI arguments.
    let cli = Cli::parse();

    // Initialize tracing/logging. Logs go to stderr; stdout carries data.
    let filter = if cli.verbose {
        "pagecache=debug"
    } else {
        "pagecache=info"
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| filter.into());
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(true);
    if cli.log_json {
        builder.json().init();
    } else {
        builder.init();
    }

    info!("pagecache v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration.
    let mut config = Config::load(&cli.config)?;
    config.apply_cli(&cli);
    config.cache.validate()?;

    info!(
        page_size = config.cache.page_size,
        capacity = config.cache.capacity,
        max_resident_bytes = config.cache.max_resident_bytes(),
        max_zero_reads = config.source.max_zero_reads,
        "Configuration loaded"
    );

    match &cli.command {
        Command::Read {
            path,
            offset,
            length,
        } => read(&config, path, *offset, *length),
        Command::Verify { path, read_size } => verify(&config, path, *read_size),
        Command::Stats { path, read_size } => stats(&config, path, *read_size),
    }
}

fn open_cache(config: &Config, path: &Path) -> anyhow::Result<PageCache<FileSource>> {
    let source = open_file(path, config.source.max_zero_reads)
        .with_context(|| format!("opening {}", path.display()))?;
    info!(path = %path.display(), size = source.size(), "Opened source");
    Ok(PageCache::from_config(source, &config.cache)?)
}

fn read(config: &Config, path: &Path, offset: u64, length: usize) -> anyhow::Result<()> {
    let mut cache = open_cache(config, path)?;
    let mut buf = vec![0u8; length];
    let mut stdout = std::io::stdout().lock();

    match cache.read_at(&mut buf, offset) {
        Ok(outcome) => {
            stdout.write_all(&buf[..outcome.bytes])?;
            if outcome.is_end_of_data() {
                warn!(offset, requested = length, read = outcome.bytes, "Source ended before the requested range");
            }
        }
        Err(e) => {
            // Keep whatever arrived before the failure.
            stdout.write_all(&buf[..e.copied])?;
            return Err(e.into());
        }
    }
    stdout.flush()?;

    info!(stats = ?cache.stats(), "Read complete");
    Ok(())
}

fn verify(config: &Config, path: &Path, read_size: usize) -> anyhow::Result<()> {
    if read_size == 0 {
        bail!("read size must be at least 1");
    }
    let mut direct = open_file(path, config.source.max_zero_reads)?;
    let mut cache = open_cache(config, path)?;

    let mut expected = vec![0u8; read_size];
    let mut actual = vec![0u8; read_size];
    let mut mismatches = 0u64;
    let mut offset = 0u64;

    // One read past the end, to check end-of-data handling too.
    while offset <= direct.size() {
        let want = direct.read_at(&mut expected, offset)?;
        let got = cache.read_at(&mut actual, offset)?;

        if want != got || expected[..want.bytes] != actual[..got.bytes] {
            if mismatches == 0 {
                warn!(offset, ?want, ?got, "First mismatch between cached and direct reads");
            }
            mismatches += 1;
        }
        offset += read_size as u64;
    }

    info!(mismatches, stats = ?cache.stats(), "Verification finished");
    if mismatches > 0 {
        bail!("{mismatches} reads differed between the cache and the source");
    }
    println!("ok");
    Ok(())
}

fn stats(config: &Config, path: &Path, read_size: usize) -> anyhow::Result<()> {
    if read_size == 0 {
        bail!("read size must be at least 1");
    }
    let mut cache = open_cache(config, path)?;
    let mut buf = vec![0u8; read_size];
    let mut offset = 0u64;

    loop {
        let outcome = cache.read_at(&mut buf, offset)?;
        if outcome.status == ReadStatus::EndOfData {
            break;
        }
        offset += outcome.bytes as u64;
    }

    let report = serde_json::json!({
        "source_size": cache.size(),
        "cache": CacheConfig {
            page_size: cache.page_size(),
            capacity: cache.capacity(),
        },
        "resident_pages": cache.table().len(),
        "resident_bytes": cache.table().resident_bytes(),
        "hit_ratio": cache.stats().hit_ratio(),
        "stats": cache.stats(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
