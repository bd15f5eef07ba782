//! Thread-safe page cache.
//!
//! [`PageCache`] mutates its table on every lookup, so concurrent callers must
//! serialize the whole lookup-fill-insert sequence. Holding one lock per read
//! keeps two callers from filling the same page twice and keeps evict-on-insert
//! atomic with the insert.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bytes::Bytes;

use crate::cache::error::{CacheError, ReadError};
use crate::cache::page::PageIndex;
use crate::cache::reader::{CacheStats, PageCache};
use crate::source::{RandomAccessSource, ReadOutcome, ReadStatus, SourceError};

/// A cloneable handle to one page cache shared between threads or tasks.
#[derive(Debug)]
pub struct SharedPageCache<S> {
    inner: Arc<Mutex<PageCache<S>>>,
    size: u64,
}

impl<S> Clone for SharedPageCache<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            size: self.size,
        }
    }
}

fn lock<S>(inner: &Mutex<PageCache<S>>) -> MutexGuard<'_, PageCache<S>> {
    // A poisoned table is still consistent: every mutation is one push or pop.
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<S: RandomAccessSource> SharedPageCache<S> {
    pub fn new(cache: PageCache<S>) -> Self {
        let size = cache.size();
        Self {
            inner: Arc::new(Mutex::new(cache)),
            size,
        }
    }

    /// Blocking positional read; see [`PageCache::read_at`].
    pub fn read_at(&self, buf: &mut [u8], offset: u64) -> Result<ReadOutcome, ReadError> {
        lock(&self.inner).read_at(buf, offset)
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Snapshot of the usage counters.
    pub fn stats(&self) -> CacheStats {
        lock(&self.inner).stats().clone()
    }

    /// Resident page indices, oldest first.
    pub fn resident_pages(&self) -> Vec<PageIndex> {
        lock(&self.inner).table().indices().collect()
    }
}

impl<S: RandomAccessSource + Send + 'static> SharedPageCache<S> {
    /// Read `len` bytes at `offset` on tokio's blocking pool.
    ///
    /// Source reads block, so they are kept off the async worker threads. The
    /// returned buffer is truncated to the bytes actually read. On failure the
    /// partially filled buffer is dropped; only its length survives in the error.
    pub async fn read_range(&self, offset: u64, len: usize) -> Result<(Bytes, ReadStatus), ReadError> {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || {
            let mut buf = vec![0u8; len];
            let outcome = lock(&inner).read_at(&mut buf, offset)?;
            buf.truncate(outcome.bytes);
            Ok::<_, ReadError>((Bytes::from(buf), outcome.status))
        })
        .await
        .map_err(|e| ReadError::new(0, CacheError::TaskFailed(e)))?
    }
}

impl<S: RandomAccessSource> RandomAccessSource for SharedPageCache<S> {
    fn size(&self) -> u64 {
        self.size
    }

    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> Result<ReadOutcome, SourceError> {
        SharedPageCache::read_at(self, buf, offset).map_err(|e| SourceError::Upstream(Box::new(e)))
    }
}
