//! Page type.
//!
//! A page is an immutable snapshot of one `page_size` window of the source.
//! Refilling a page produces a new `Page`; existing ones are never mutated.

use bytes::Bytes;

/// Page number: `byte_offset / page_size`.
pub type PageIndex = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    index: PageIndex,
    data: Bytes,
}

impl Page {
    pub fn new(index: PageIndex, data: impl Into<Bytes>) -> Self {
        Self {
            index,
            data: data.into(),
        }
    }

    pub fn index(&self) -> PageIndex {
        self.index
    }

    /// Page contents. Shorter than the page size only for the page that covers
    /// the end of the source (or lies entirely past it).
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Whether this page holds fewer than `page_size` bytes.
    pub fn is_short(&self, page_size: u64) -> bool {
        (self.data.len() as u64) < page_size
    }
}
