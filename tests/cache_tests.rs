//! Integration tests for page cache reads against a reference source.

use std::io::{self, Seek, SeekFrom};

use pagecache::cache::table::PageTable;
use pagecache::source::MemorySource;
use pagecache::{
    CacheError, PageCache, PageCursor, RandomAccessSource, ReadOutcome, ReadStatus, SourceError,
};

fn content(len: usize) -> Vec<u8> {
    // Cheap deterministic noise so misplaced pages show up as mismatches.
    let mut x = 0x2545_f491u32;
    (0..len)
        .map(|_| {
            x ^= x << 13;
            x ^= x >> 17;
            x ^= x << 5;
            x as u8
        })
        .collect()
}

/// Counts reads that reach the wrapped source.
struct Counting<S> {
    inner: S,
    reads: u64,
}

impl<S: RandomAccessSource> RandomAccessSource for Counting<S> {
    fn size(&self) -> u64 {
        self.inner.size()
    }

    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> Result<ReadOutcome, SourceError> {
        self.reads += 1;
        self.inner.read_at(buf, offset)
    }
}

/// Fails every read at or after `fail_from`.
struct FailAfter {
    inner: MemorySource,
    fail_from: u64,
}

impl RandomAccessSource for FailAfter {
    fn size(&self) -> u64 {
        self.inner.size()
    }

    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> Result<ReadOutcome, SourceError> {
        if offset >= self.fail_from {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "access denied").into());
        }
        self.inner.read_at(buf, offset)
    }
}

#[test]
fn test_scenario_read_across_page_boundary() {
    let data = content(2500);
    let mut cache = PageCache::new(MemorySource::new(data.clone()), 1024, 2).unwrap();

    let mut buf = [0u8; 256];
    let outcome = cache.read_at(&mut buf, 1000).unwrap();
    assert_eq!(outcome, ReadOutcome::complete(256));
    assert_eq!(&buf[..], &data[1000..1256]);
}

#[test]
fn test_scenario_short_read_at_end() {
    let data = content(2500);
    let mut cache = PageCache::new(MemorySource::new(data.clone()), 1024, 2).unwrap();

    let mut buf = [0u8; 100];
    let outcome = cache.read_at(&mut buf, 2450).unwrap();
    assert_eq!(outcome.bytes, 50);
    assert_eq!(outcome.status, ReadStatus::EndOfData);
    assert_eq!(&buf[..50], &data[2450..]);
}

#[test]
fn test_scenario_negative_offset_rejected() {
    let cache = PageCache::new(MemorySource::new(content(2500)), 1024, 2).unwrap();
    let mut cursor = PageCursor::new(cache);

    let err = cursor.seek(SeekFrom::End(-2501)).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    assert_eq!(cursor.get_ref().stats().misses, 0);
}

#[test]
fn test_scenario_capacity_one_rejected() {
    let err = PageTable::new(1024, 1).unwrap_err();
    assert!(matches!(err, CacheError::InvalidArgument(_)));

    let err = PageCache::new(MemorySource::new(content(10)), 1024, 1).unwrap_err();
    assert!(matches!(err, CacheError::InvalidArgument(_)));
}

#[test]
fn test_equivalence_with_source() {
    let data = content(20_000);
    let mut reference = MemorySource::new(data.clone());

    for (page_size, capacity) in [(1u64, 2usize), (7, 3), (256, 2), (1024, 4), (4096, 8), (32_768, 2)] {
        let mut cache = PageCache::new(MemorySource::new(data.clone()), page_size, capacity).unwrap();

        for len in [1usize, 100, 255, 256, 1024, 3000] {
            let mut expected = vec![0u8; len];
            let mut actual = vec![0u8; len];
            let mut offset = 0u64;
            while offset < 20_000 + 2 * len as u64 {
                let want = reference.read_at(&mut expected, offset).unwrap();
                let got = cache.read_at(&mut actual, offset).unwrap();
                assert_eq!(want, got, "page_size={page_size} len={len} offset={offset}");
                assert_eq!(expected[..want.bytes], actual[..got.bytes]);
                offset += (len as u64 * 3) / 2 + 1;
            }
            assert!(cache.table().len() <= capacity);
        }
    }
}

#[test]
fn test_final_page_length() {
    let data = content(2500);
    let mut cache = PageCache::new(MemorySource::new(data.clone()), 1024, 2).unwrap();

    let mut buf = [0u8; 1024];
    let outcome = cache.read_at(&mut buf, 2048).unwrap();
    assert_eq!(outcome, ReadOutcome::end_of_data(2500 % 1024));
    assert_eq!(&buf[..outcome.bytes], &data[2048..]);
}

#[test]
fn test_repeat_read_issues_no_source_reads() {
    let data = content(10_000);
    let source = Counting {
        inner: MemorySource::new(data.clone()),
        reads: 0,
    };
    let mut cache = PageCache::new(source, 1024, 4).unwrap();

    let mut first = vec![0u8; 2500];
    let mut second = vec![0u8; 2500];
    cache.read_at(&mut first, 3000).unwrap();
    let reads = cache.source().reads;
    assert_eq!(reads, 4);

    cache.read_at(&mut second, 3000).unwrap();
    assert_eq!(first, second);
    assert_eq!(&first[..], &data[3000..5500]);
    assert_eq!(cache.source().reads, reads);
}

#[test]
fn test_one_source_read_per_page() {
    let source = Counting {
        inner: MemorySource::new(content(8192)),
        reads: 0,
    };
    let mut cache = PageCache::new(source, 1024, 8).unwrap();

    // Pages 1..=4, read from the middle of page 1 to the middle of page 4.
    let mut buf = vec![0u8; 3500];
    cache.read_at(&mut buf, 1100).unwrap();
    assert_eq!(cache.source().reads, 4);
}

#[test]
fn test_failure_keeps_partial_bytes() {
    let data = content(4096);
    let source = FailAfter {
        inner: MemorySource::new(data.clone()),
        fail_from: 2048,
    };
    let mut cache = PageCache::new(source, 1024, 4).unwrap();

    let mut buf = vec![0u8; 2000];
    let err = cache.read_at(&mut buf, 1000).unwrap_err();
    assert_eq!(err.copied, 1048);
    assert_eq!(&buf[..1048], &data[1000..2048]);

    match &err.source {
        CacheError::Fill { index, size, .. } => {
            assert_eq!(*index, 2);
            assert_eq!(*size, 1024);
        }
        other => panic!("unexpected error: {other:?}"),
    }

    // The failed page was never inserted.
    assert!(!cache.table().contains(2));
    assert_eq!(cache.stats().fill_failures, 1);
}

#[test]
fn test_failure_on_first_page_copies_nothing() {
    let source = FailAfter {
        inner: MemorySource::new(content(4096)),
        fail_from: 0,
    };
    let mut cache = PageCache::new(source, 1024, 2).unwrap();

    let mut buf = vec![0u8; 10];
    let err = cache.read_at(&mut buf, 5).unwrap_err();
    assert_eq!(err.copied, 0);
    assert!(cache.table().is_empty());

    let io_err: io::Error = err.into();
    assert_eq!(io_err.kind(), io::ErrorKind::Other);
}
