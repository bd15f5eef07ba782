//! Local files as range-readable objects.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom, Take};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::source::range::{RangeOpener, RangeSource};
use crate::source::SourceError;

/// A local file opened for range reads.
#[derive(Debug)]
pub struct FileRanges {
    file: File,
    path: PathBuf,
    size: u64,
}

impl FileRanges {
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        let size = file.metadata()?.len();
        debug!(path = %path.display(), size, "Opened file source");
        Ok(Self { file, path, size })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RangeOpener for FileRanges {
    type Reader<'a> = Take<&'a mut File>;

    fn size(&self) -> u64 {
        self.size
    }

    fn open_range(&mut self, offset: u64, len: u64) -> io::Result<Take<&mut File>> {
        self.file.seek(SeekFrom::Start(offset))?;
        Ok((&mut self.file).take(len))
    }
}

/// A file-backed [`RandomAccessSource`](crate::source::RandomAccessSource).
pub type FileSource = RangeSource<FileRanges>;

/// Open `path` as a random-access source.
///
/// `max_zero_reads` bounds how many consecutive empty reads are tolerated before
/// a range read fails; for a regular file an empty read inside the known size
/// means the file shrank underneath us.
pub fn open_file(path: impl AsRef<Path>, max_zero_reads: u32) -> Result<FileSource, SourceError> {
    let ranges = FileRanges::open(path)?;
    Ok(RangeSource::with_max_zero_reads(ranges, max_zero_reads))
}
