//! Integration tests for the page table's recency-ordered eviction.

use pagecache::cache::page::{Page, PageIndex};
use pagecache::cache::table::PageTable;
use pagecache::source::MemorySource;
use pagecache::PageCache;

fn page(index: PageIndex) -> Page {
    Page::new(index, vec![0u8; 16])
}

fn assert_unique(table: &PageTable) {
    let mut seen: Vec<PageIndex> = table.indices().collect();
    let len = seen.len();
    seen.sort_unstable();
    seen.dedup();
    assert_eq!(seen.len(), len, "duplicate page indices in table");
}

#[test]
fn test_promoted_page_survives_capacity_inserts() {
    let capacity = 4;
    let mut table = PageTable::new(16, capacity).unwrap();

    table.insert(page(100));
    for i in 0..(capacity as u64 - 1) {
        table.insert(page(i));
    }

    // Touch page 100 before every insert so it never drifts to the front.
    for i in 10..(10 + capacity as u64) {
        assert!(table.lookup(100).is_some());
        table.insert(page(i));
    }
    assert!(table.contains(100));
}

#[test]
fn test_untouched_page_is_evicted() {
    let capacity = 4;
    let mut table = PageTable::new(16, capacity).unwrap();

    table.insert(page(100));
    for i in 0..capacity as u64 {
        table.insert(page(i));
    }
    assert!(!table.contains(100));
    assert_eq!(table.len(), capacity);
}

#[test]
fn test_single_lookup_buys_one_full_turn() {
    let capacity = 3;
    let mut table = PageTable::new(16, capacity).unwrap();
    for i in 0..capacity as u64 {
        table.insert(page(i));
    }

    // Page 0 goes to the back: it outlives capacity - 1 new inserts.
    table.lookup(0).unwrap();
    table.insert(page(10));
    table.insert(page(11));
    assert!(table.contains(0));

    table.insert(page(12));
    assert!(!table.contains(0));
}

#[test]
fn test_capacity_and_uniqueness_under_random_reads() {
    let data: Vec<u8> = (0..50_000u32).map(|i| (i % 253) as u8).collect();
    let mut cache = PageCache::new(MemorySource::new(data), 1000, 5).unwrap();

    let mut buf = vec![0u8; 1500];
    let mut x = 12_345u64;
    for _ in 0..500 {
        x = x.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
        let offset = (x >> 33) % 52_000;
        cache.read_at(&mut buf, offset).unwrap();

        assert!(cache.table().len() <= cache.capacity());
        assert_unique(cache.table());
    }
    assert!(cache.stats().evictions > 0);
    assert_eq!(
        cache.stats().misses - cache.stats().evictions,
        cache.table().len() as u64
    );
}
