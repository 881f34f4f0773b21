// src/source/stream.rs
use crate::error::Result;
use crate::source::DataSource;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// Bounded source over any [`Read`] implementation
pub struct StreamSource<R: Read> {
    reader: R,
    bytes_read: u64,
}

/// Constructor for standard file I/O
impl StreamSource<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::from_reader(BufReader::with_capacity(65536, file)))
    }
}

impl<R: Read> StreamSource<R> {
    pub fn from_reader(reader: R) -> Self {
        StreamSource { reader, bytes_read: 0 }
    }

    /// Total bytes handed out by successful reads
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: Read> DataSource for StreamSource<R> {
    fn is_prepared(&mut self) -> bool {
        true
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<bool> {
        match self.reader.read_exact(buf) {
            Ok(()) => {
                self.bytes_read += buf.len() as u64;
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
