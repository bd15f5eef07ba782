//! Page table: the bounded, recency-ordered working set.
//!
//! Entries are kept oldest-first in a `VecDeque`. A hit moves the entry to the
//! back, an insert appends to the back and evicts the front once the table is
//! over capacity, so the most recently looked-up or inserted page is always the
//! last to go. Lookups are a linear scan over at most `capacity` entries.

use std::collections::VecDeque;

use tracing::{debug, trace};

use crate::cache::error::CacheError;
use crate::cache::page::{Page, PageIndex};

/// Smallest usable capacity. With one slot, any read straddling a page
/// boundary would evict the page it just fetched.
pub const MIN_CAPACITY: usize = 2;

#[derive(Debug)]
pub struct PageTable {
    /// Oldest at the front, most recently touched at the back.
    entries: VecDeque<Page>,
    page_size: u64,
    capacity: usize,
}

impl PageTable {
    pub fn new(page_size: u64, capacity: usize) -> Result<Self, CacheError> {
        if page_size < 1 {
            return Err(CacheError::invalid(format!(
                "page size must be at least 1, got {page_size}"
            )));
        }
        if capacity < MIN_CAPACITY {
            return Err(CacheError::invalid(format!(
                "page table capacity must be at least {MIN_CAPACITY}, got {capacity}"
            )));
        }

        Ok(Self {
            entries: VecDeque::new(),
            page_size,
            capacity,
        })
    }

    /// Find the page with `index` and mark it most recently used.
    ///
    /// `None` is the ordinary miss path, not an error.
    pub fn lookup(&mut self, index: PageIndex) -> Option<Page> {
        let pos = self.entries.iter().rposition(|p| p.index() == index)?;

        if pos + 1 != self.entries.len() {
            let page = self.entries.remove(pos)?;
            self.entries.push_back(page);
        }
        trace!(index, "Page table hit");
        self.entries.back().cloned()
    }

    /// Append `page` as most recently used, evicting the oldest entry if the
    /// table is now over capacity. Returns the evicted page.
    ///
    /// Callers insert only after a confirmed miss; no duplicate check is done.
    pub fn insert(&mut self, page: Page) -> Option<Page> {
        self.entries.push_back(page);
        if self.entries.len() > self.capacity {
            let evicted = self.entries.pop_front();
            if let Some(ref p) = evicted {
                debug!(index = p.index(), "Evicted page");
            }
            return evicted;
        }
        None
    }

    /// Whether `index` is resident. Does not affect recency.
    pub fn contains(&self, index: PageIndex) -> bool {
        self.entries.iter().any(|p| p.index() == index)
    }

    /// Resident page indices, oldest first.
    pub fn indices(&self) -> impl Iterator<Item = PageIndex> + '_ {
        self.entries.iter().map(Page::index)
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bytes currently held by resident pages.
    pub fn resident_bytes(&self) -> usize {
        self.entries.iter().map(Page::len).sum()
    }
}
