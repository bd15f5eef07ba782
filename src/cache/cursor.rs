//! `Read + Seek` view of a page cache.
//!
//! Archive readers and other stream consumers usually want a seekable reader
//! rather than positional reads; this keeps a cursor position and turns each
//! `read` into a `read_at` at that position.

use std::io::{self, Read, Seek, SeekFrom};

use crate::cache::reader::PageCache;
use crate::source::RandomAccessSource;

#[derive(Debug)]
pub struct PageCursor<S> {
    cache: PageCache<S>,
    pos: u64,
}

impl<S: RandomAccessSource> PageCursor<S> {
    pub fn new(cache: PageCache<S>) -> Self {
        Self { cache, pos: 0 }
    }

    pub fn position(&self) -> u64 {
        self.pos
    }

    pub fn get_ref(&self) -> &PageCache<S> {
        &self.cache
    }

    pub fn get_mut(&mut self) -> &mut PageCache<S> {
        &mut self.cache
    }

    pub fn into_inner(self) -> PageCache<S> {
        self.cache
    }
}

impl<S: RandomAccessSource> Read for PageCursor<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let outcome = self.cache.read_at(buf, self.pos)?;
        self.pos += outcome.bytes as u64;
        Ok(outcome.bytes)
    }
}

impl<S: RandomAccessSource> Seek for PageCursor<S> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let (base, delta) = match pos {
            SeekFrom::Start(n) => {
                self.pos = n;
                return Ok(n);
            }
            SeekFrom::End(d) => (self.cache.size(), d),
            SeekFrom::Current(d) => (self.pos, d),
        };

        match base.checked_add_signed(delta) {
            Some(n) => {
                self.pos = n;
                Ok(n)
            }
            None => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "invalid seek to a negative or overflowing position",
            )),
        }
    }
}
