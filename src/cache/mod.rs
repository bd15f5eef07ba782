//! Read-through page cache.
//!
//! - [`page`]: Page and page index
//! - [`table`]: PageTable, the bounded recency-ordered working set
//! - [`fill`]: Miss handler that reads one page from the source
//! - [`reader`]: PageCache, multi-page read composition and statistics
//! - [`cursor`]: `Read + Seek` adapter for stream consumers
//! - [`shared`]: Mutex-guarded variant for concurrent callers
//! - [`error`]: Cache error types

pub mod cursor;
pub mod error;
pub mod fill;
pub mod page;
pub mod reader;
pub mod shared;
pub mod table;

pub use cursor::PageCursor;
pub use error::{CacheError, ReadError};
pub use page::{Page, PageIndex};
pub use reader::{CacheStats, PageCache};
pub use shared::SharedPageCache;
pub use table::PageTable;
