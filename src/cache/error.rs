//! Cache error types.

use std::io;

use thiserror::Error;

use crate::cache::page::PageIndex;
use crate::source::SourceError;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("fill of page {index} failed: read of {size} bytes at offset {offset}: {source}")]
    Fill {
        index: PageIndex,
        offset: u64,
        size: u64,
        #[source]
        source: SourceError,
    },

    #[error("blocking read task failed: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),
}

impl CacheError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        CacheError::InvalidArgument(msg.into())
    }
}

/// A failed `read_at`, together with the bytes that had already been copied
/// into the destination before the failure.
#[derive(Error, Debug)]
#[error("read failed after {copied} bytes: {source}")]
pub struct ReadError {
    pub copied: usize,
    #[source]
    pub source: CacheError,
}

impl ReadError {
    pub(crate) fn new(copied: usize, source: CacheError) -> Self {
        Self { copied, source }
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self.source, CacheError::InvalidArgument(_))
    }
}

impl From<ReadError> for io::Error {
    fn from(err: ReadError) -> Self {
        let kind = match &err.source {
            CacheError::InvalidArgument(_) => io::ErrorKind::InvalidInput,
            _ => io::ErrorKind::Other,
        };
        io::Error::new(kind, err)
    }
}
