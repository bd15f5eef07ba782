//! Read-through page cache over a [`RandomAccessSource`].
//!
//! `read_at` answers arbitrary `(offset, len)` reads by stitching together the
//! pages that cover the range, fetching missing pages from the source one page
//! per read. The cache follows the same short-read contract as the source it
//! wraps, so it can be dropped in wherever a random-access source is expected.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::cache::error::{CacheError, ReadError};
use crate::cache::fill::fill_page;
use crate::cache::page::{Page, PageIndex};
use crate::cache::table::PageTable;
use crate::config::CacheConfig;
use crate::source::{RandomAccessSource, ReadOutcome, SourceError};

/// Counters describing how the cache has been used.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// `read_at` calls with a non-empty destination.
    pub reads: u64,
    /// Page lookups served from the table.
    pub hits: u64,
    /// Page lookups that went to the source.
    pub misses: u64,
    /// Pages pushed out of the table.
    pub evictions: u64,
    /// Page fills that failed.
    pub fill_failures: u64,
    /// Bytes delivered by successful fills.
    pub bytes_fetched: u64,
}

impl CacheStats {
    /// Fraction of page lookups served without touching the source.
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            return 0.0;
        }
        self.hits as f64 / total as f64
    }
}

/// A fixed-capacity page cache in front of a source.
///
/// Holds the source for its whole lifetime and never closes or writes to it.
/// Pass `&mut source` to keep ownership with the caller.
#[derive(Debug)]
pub struct PageCache<S> {
    source: S,
    table: PageTable,
    size: u64,
    stats: CacheStats,
}

impl<S: RandomAccessSource> PageCache<S> {
    /// Wrap `source` with a table of `capacity` pages of `page_size` bytes.
    ///
    /// Peak memory is bounded by `capacity * page_size`.
    pub fn new(source: S, page_size: u64, capacity: usize) -> Result<Self, CacheError> {
        let table = PageTable::new(page_size, capacity)?;
        let size = source.size();
        Ok(Self {
            source,
            table,
            size,
            stats: CacheStats::default(),
        })
    }

    pub fn from_config(source: S, config: &CacheConfig) -> Result<Self, CacheError> {
        Self::new(source, config.page_size, config.capacity)
    }

    /// Read `buf.len()` bytes starting at `offset`.
    ///
    /// Returns [`ReadStatus::EndOfData`](crate::source::ReadStatus::EndOfData)
    /// with a short count when the source ends inside the range. On a source
    /// failure, bytes copied from earlier pages stay in `buf` and their count is
    /// carried in the error.
    pub fn read_at(&mut self, buf: &mut [u8], offset: u64) -> Result<ReadOutcome, ReadError> {
        if buf.is_empty() {
            return Ok(ReadOutcome::complete(0));
        }
        let end = offset.checked_add(buf.len() as u64).ok_or_else(|| {
            ReadError::new(
                0,
                CacheError::invalid(format!(
                    "read of {} bytes at offset {offset} overflows the address space",
                    buf.len()
                )),
            )
        })?;
        self.stats.reads += 1;

        let page_size = self.table.page_size();
        let first = offset / page_size;
        let last = (end - 1) / page_size;
        let start = (offset % page_size) as usize;

        let page = self.page(first).map_err(|e| ReadError::new(0, e))?;
        if page.len() < start {
            // Offset lies past the end of the source.
            return Ok(ReadOutcome::end_of_data(0));
        }

        let mut copied = copy_into(&page.data()[start..], buf);
        if page.is_short(page_size) && copied < buf.len() {
            return Ok(ReadOutcome::end_of_data(copied));
        }

        for index in first + 1..=last {
            let page = self.page(index).map_err(|e| ReadError::new(copied, e))?;
            copied += copy_into(page.data(), &mut buf[copied..]);

            if page.is_short(page_size) && copied < buf.len() {
                return Ok(ReadOutcome::end_of_data(copied));
            }
        }

        debug_assert_eq!(copied, buf.len());
        Ok(ReadOutcome::complete(copied))
    }

    /// Lookup-or-fill. Fills that fail are never inserted.
    fn page(&mut self, index: PageIndex) -> Result<Page, CacheError> {
        if let Some(page) = self.table.lookup(index) {
            self.stats.hits += 1;
            return Ok(page);
        }
        self.stats.misses += 1;

        let page = match fill_page(&mut self.source, self.table.page_size(), index) {
            Ok(page) => page,
            Err(e) => {
                self.stats.fill_failures += 1;
                return Err(e);
            }
        };
        self.stats.bytes_fetched += page.len() as u64;

        if self.table.insert(page.clone()).is_some() {
            self.stats.evictions += 1;
        }
        trace!(index, resident = self.table.len(), "Inserted page");
        Ok(page)
    }

    /// Total size of the underlying source, as reported at construction.
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn page_size(&self) -> u64 {
        self.table.page_size()
    }

    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    pub fn table(&self) -> &PageTable {
        &self.table
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Drop the cached pages and hand the source back.
    pub fn into_inner(self) -> S {
        self.source
    }
}

/// Lets a cache stand in for its source, e.g. to stack caches or hand it to
/// code written against [`RandomAccessSource`]. A failure loses the partial
/// byte count; use [`PageCache::read_at`] directly when it matters.
impl<S: RandomAccessSource> RandomAccessSource for PageCache<S> {
    fn size(&self) -> u64 {
        self.size
    }

    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> Result<ReadOutcome, SourceError> {
        PageCache::read_at(self, buf, offset).map_err(|e| SourceError::Upstream(Box::new(e)))
    }
}

fn copy_into(src: &[u8], dst: &mut [u8]) -> usize {
    let n = src.len().min(dst.len());
    dst[..n].copy_from_slice(&src[..n]);
    n
}
