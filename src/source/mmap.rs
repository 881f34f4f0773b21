// src/source/mmap.rs
use crate::error::Result;
use crate::source::{DataSource, StreamSource};
use memmap2::Mmap;
use std::fs::File;
use std::io::Cursor;
use std::path::Path;

/// Bounded source over a memory-mapped file
pub struct MmapSource {
    inner: StreamSource<Cursor<Mmap>>,
}

impl MmapSource {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        // The mapping is read-only and dropped together with the source
        let mmap = unsafe { Mmap::map(&file)? };
        Ok(MmapSource {
            inner: StreamSource::from_reader(Cursor::new(mmap)),
        })
    }

    pub fn bytes_read(&self) -> u64 {
        self.inner.bytes_read()
    }
}

impl DataSource for MmapSource {
    fn is_prepared(&mut self) -> bool {
        true
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<bool> {
        self.inner.read(buf)
    }
}
