//! pagecache: read-through page cache for high-latency random-access sources.
//!
//! Turns a byte source whose individual reads are expensive (a remote object,
//! a slow disk) into one that answers arbitrary positional reads from a small,
//! fixed set of cached pages:
//!   caller → PageCache (PageTable, recency-ordered) → RandomAccessSource
//!
//! The cache speaks the same positional-read contract as its source, so it can
//! be stacked, shared behind a lock, or wrapped as `Read + Seek`.

pub mod cache;
pub mod config;
pub mod source;

pub use cache::{CacheError, CacheStats, PageCache, PageCursor, ReadError, SharedPageCache};
pub use source::{RandomAccessSource, ReadOutcome, ReadStatus, SourceError};
