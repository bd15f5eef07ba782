//! Random-access byte sources.
//!
//! A source is anything that can answer "give me `buf.len()` bytes starting at
//! `offset`" over an object of known, stable size. The page cache sits on top of
//! one of these and never cares whether it is backed by memory, a local file or a
//! remote object store.
//!
//! - [`memory`]: in-memory source over [`bytes::Bytes`]
//! - [`range`]: adapter from a "open a reader for this byte range" primitive,
//!   with bounded tolerance for transient empty reads
//! - [`file`]: local files through the range adapter

pub mod file;
pub mod memory;
pub mod range;

use std::io;

use thiserror::Error;

pub use file::{open_file, FileRanges, FileSource};
pub use memory::MemorySource;
pub use range::{RangeOpener, RangeSource};

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("short read at offset {offset}: got {got} of {want} bytes without end of data")]
    ShortRead { offset: u64, want: usize, got: usize },

    #[error("read at offset {offset} stalled after {attempts} consecutive empty reads ({got} of {want} bytes)")]
    Stalled {
        offset: u64,
        want: usize,
        got: usize,
        attempts: u32,
    },

    #[error("upstream source failed: {0}")]
    Upstream(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// How a read ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadStatus {
    /// The destination was filled completely.
    Complete,
    /// The source ended before the destination was filled.
    EndOfData,
}

/// Result of a successful (possibly short) read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadOutcome {
    /// Bytes written to the front of the destination buffer.
    pub bytes: usize,
    pub status: ReadStatus,
}

impl ReadOutcome {
    pub fn complete(bytes: usize) -> Self {
        Self {
            bytes,
            status: ReadStatus::Complete,
        }
    }

    pub fn end_of_data(bytes: usize) -> Self {
        Self {
            bytes,
            status: ReadStatus::EndOfData,
        }
    }

    pub fn is_end_of_data(&self) -> bool {
        self.status == ReadStatus::EndOfData
    }
}

/// A byte provider supporting reads at arbitrary offsets.
///
/// Contract for `read_at`:
/// - `Ok` with [`ReadStatus::Complete`] means `bytes == buf.len()`.
/// - `Ok` with [`ReadStatus::EndOfData`] means the source ended; `bytes` may be
///   anything from `0` to `buf.len()`. `offset + buf.len()` past the end is legal.
/// - `Err` is a real failure (transport, access). Implementations that want to
///   retry do so internally; callers never retry.
///
/// `size` is queried once by consumers and must not change while they hold the
/// source.
pub trait RandomAccessSource {
    /// Total length of the object in bytes.
    fn size(&self) -> u64;

    /// Read up to `buf.len()` bytes starting at absolute byte `offset`.
    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> Result<ReadOutcome, SourceError>;
}

impl<S: RandomAccessSource + ?Sized> RandomAccessSource for &mut S {
    fn size(&self) -> u64 {
        (**self).size()
    }

    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> Result<ReadOutcome, SourceError> {
        (**self).read_at(buf, offset)
    }
}

impl<S: RandomAccessSource + ?Sized> RandomAccessSource for Box<S> {
    fn size(&self) -> u64 {
        (**self).size()
    }

    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> Result<ReadOutcome, SourceError> {
        (**self).read_at(buf, offset)
    }
}
