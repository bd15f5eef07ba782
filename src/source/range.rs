//! Range-reader adapter.
//!
//! Object stores expose reads as "open a stream for bytes `[offset, offset+len)`
//! and drain it". Those streams can hand back empty reads while the transport
//! catches up, so draining tolerates a bounded run of zero-byte reads before the
//! read is declared stalled.

use std::io::{self, Read};

use tracing::{debug, warn};

use crate::source::{RandomAccessSource, ReadOutcome, SourceError};

/// Default number of consecutive zero-byte reads tolerated per range.
pub const DEFAULT_MAX_ZERO_READS: u32 = 10;

/// Opens byte-range readers over an object of known size.
///
/// Only one range is outstanding at a time: the reader returned by
/// `open_range` is drained and dropped before the next one is opened.
pub trait RangeOpener {
    type Reader<'a>: Read
    where
        Self: 'a;

    /// Total object size in bytes.
    fn size(&self) -> u64;

    /// Open a reader over `len` bytes starting at `offset`. The range is
    /// always within `0..size()`.
    fn open_range(&mut self, offset: u64, len: u64) -> io::Result<Self::Reader<'_>>;
}

/// A [`RandomAccessSource`] built from a [`RangeOpener`].
#[derive(Debug)]
pub struct RangeSource<O> {
    opener: O,
    size: u64,
    max_zero_reads: u32,
}

impl<O: RangeOpener> RangeSource<O> {
    pub fn new(opener: O) -> Self {
        Self::with_max_zero_reads(opener, DEFAULT_MAX_ZERO_READS)
    }

    pub fn with_max_zero_reads(opener: O, max_zero_reads: u32) -> Self {
        let size = opener.size();
        Self {
            opener,
            size,
            max_zero_reads: max_zero_reads.max(1),
        }
    }

    pub fn max_zero_reads(&self) -> u32 {
        self.max_zero_reads
    }

    pub fn get_ref(&self) -> &O {
        &self.opener
    }

    pub fn into_inner(self) -> O {
        self.opener
    }
}

impl<O: RangeOpener> RandomAccessSource for RangeSource<O> {
    fn size(&self) -> u64 {
        self.size
    }

    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> Result<ReadOutcome, SourceError> {
        if buf.is_empty() {
            return Ok(ReadOutcome::complete(0));
        }
        if offset >= self.size {
            return Ok(ReadOutcome::end_of_data(0));
        }

        // Clamp to the object end; anything cut off is reported as end of data.
        let remaining = self.size - offset;
        let want = usize::try_from(remaining).map_or(buf.len(), |r| r.min(buf.len()));
        let clamped = want < buf.len();

        let mut reader = self.opener.open_range(offset, want as u64)?;
        let dst = &mut buf[..want];
        let mut got = 0usize;
        let mut zero_reads = 0u32;

        while got < want {
            match reader.read(&mut dst[got..]) {
                Ok(0) => {
                    zero_reads += 1;
                    if zero_reads >= self.max_zero_reads {
                        warn!(offset, want, got, attempts = zero_reads, "Range read stalled");
                        return Err(SourceError::Stalled {
                            offset,
                            want,
                            got,
                            attempts: zero_reads,
                        });
                    }
                    debug!(offset, got, attempts = zero_reads, "Empty read from range, retrying");
                }
                Ok(m) => {
                    zero_reads = 0;
                    got += m;
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        if clamped {
            Ok(ReadOutcome::end_of_data(got))
        } else {
            Ok(ReadOutcome::complete(got))
        }
    }
}
