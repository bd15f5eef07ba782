//! In-memory source.

use bytes::Bytes;

use crate::source::{RandomAccessSource, ReadOutcome, SourceError};

/// A source over a byte buffer held in memory.
///
/// Follows the conventional short-read contract exactly, which makes it the
/// reference the cache is checked against.
#[derive(Debug, Clone)]
pub struct MemorySource {
    data: Bytes,
}

impl MemorySource {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self { data: data.into() }
    }

    /// The backing bytes.
    pub fn bytes(&self) -> &Bytes {
        &self.data
    }
}

impl RandomAccessSource for MemorySource {
    fn size(&self) -> u64 {
        self.data.len() as u64
    }

    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> Result<ReadOutcome, SourceError> {
        let len = self.data.len() as u64;
        if offset >= len {
            if buf.is_empty() {
                return Ok(ReadOutcome::complete(0));
            }
            return Ok(ReadOutcome::end_of_data(0));
        }

        let start = offset as usize;
        let available = &self.data[start..];
        let n = buf.len().min(available.len());
        buf[..n].copy_from_slice(&available[..n]);

        if n < buf.len() {
            Ok(ReadOutcome::end_of_data(n))
        } else {
            Ok(ReadOutcome::complete(n))
        }
    }
}
