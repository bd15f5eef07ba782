//! Miss handler: materialize one page with a single bounded source read.

use tracing::{debug, warn};

use crate::cache::error::CacheError;
use crate::cache::page::{Page, PageIndex};
use crate::source::{RandomAccessSource, ReadStatus, SourceError};

/// Read page `index` from `source`.
///
/// Issues exactly one read of `page_size` bytes at `index * page_size`. End of
/// data is not an error here: the page is truncated to what the source delivered,
/// which is how the last (short) page of a source comes to exist. Only the byte
/// count is trusted, so an end-of-data read that still filled the page yields a
/// normal full page.
pub fn fill_page<S>(source: &mut S, page_size: u64, index: PageIndex) -> Result<Page, CacheError>
where
    S: RandomAccessSource + ?Sized,
{
    if page_size < 1 {
        return Err(CacheError::invalid(format!(
            "page size must be at least 1, got {page_size}"
        )));
    }
    let offset = index.checked_mul(page_size).ok_or_else(|| {
        CacheError::invalid(format!(
            "page {index} with page size {page_size} is beyond the addressable range"
        ))
    })?;
    let len = usize::try_from(page_size)
        .map_err(|_| CacheError::invalid(format!("page size {page_size} does not fit in memory")))?;

    let mut buf = vec![0u8; len];
    let wrap = |err: SourceError| CacheError::Fill {
        index,
        offset,
        size: page_size,
        source: err,
    };

    let outcome = match source.read_at(&mut buf, offset) {
        Ok(outcome) => outcome,
        Err(e) => {
            warn!(index, offset, size = page_size, error = %e, "Page fill failed");
            return Err(wrap(e));
        }
    };

    match outcome.status {
        ReadStatus::EndOfData => buf.truncate(outcome.bytes.min(len)),
        ReadStatus::Complete if outcome.bytes != len => {
            warn!(index, offset, got = outcome.bytes, "Source reported a complete read that came up short");
            return Err(wrap(SourceError::ShortRead {
                offset,
                want: len,
                got: outcome.bytes,
            }));
        }
        ReadStatus::Complete => {}
    }

    debug!(index, offset, bytes = buf.len(), "Filled page");
    Ok(Page::new(index, buf))
}
