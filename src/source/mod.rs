// src/source/mod.rs
//! Byte sources an [`EventStore`](crate::store::EventStore) reads blocks from.
//!
//! Bounded sources (files, in-memory streams) are always prepared and report
//! their end through a failed read. Live sources may not be prepared yet;
//! the store then returns without touching its framing state.

mod stream;
mod live;
#[cfg(feature = "mmap")]
mod mmap;

pub use stream::StreamSource;
pub use live::{LiveFeed, LiveSource};
#[cfg(feature = "mmap")]
pub use mmap::MmapSource;

use crate::error::Result;
use std::fmt;
use std::path::PathBuf;

/// A source of RIDF bytes
pub trait DataSource {
    /// Whether a read may be attempted now
    fn is_prepared(&mut self) -> bool;

    /// Fill `buf` completely.
    ///
    /// Returns `Ok(true)` if exactly `buf.len()` bytes were obtained and
    /// `Ok(false)` if the source ended first.
    fn read(&mut self, buf: &mut [u8]) -> Result<bool>;
}

impl<S: DataSource + ?Sized> DataSource for Box<S> {
    fn is_prepared(&mut self) -> bool {
        (**self).is_prepared()
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<bool> {
        (**self).read(buf)
    }
}

/// A source waiting in the input queue, opened when its turn comes
pub enum SourceDescriptor {
    File(PathBuf),
    #[cfg(feature = "mmap")]
    Mapped(PathBuf),
    Stream(Box<dyn DataSource + Send>),
}

impl SourceDescriptor {
    pub fn open(self) -> Result<Box<dyn DataSource + Send>> {
        match self {
            SourceDescriptor::File(path) => Ok(Box::new(StreamSource::open(path)?)),
            #[cfg(feature = "mmap")]
            SourceDescriptor::Mapped(path) => Ok(Box::new(MmapSource::open(path)?)),
            SourceDescriptor::Stream(source) => Ok(source),
        }
    }
}

impl fmt::Debug for SourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceDescriptor::File(path) => f.debug_tuple("File").field(path).finish(),
            #[cfg(feature = "mmap")]
            SourceDescriptor::Mapped(path) => f.debug_tuple("Mapped").field(path).finish(),
            SourceDescriptor::Stream(_) => f.write_str("Stream"),
        }
    }
}

impl fmt::Display for SourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceDescriptor::File(path) => write!(f, "{}", path.display()),
            #[cfg(feature = "mmap")]
            SourceDescriptor::Mapped(path) => write!(f, "{} (mmap)", path.display()),
            SourceDescriptor::Stream(_) => f.write_str("<stream>"),
        }
    }
}

impl From<PathBuf> for SourceDescriptor {
    fn from(path: PathBuf) -> Self {
        SourceDescriptor::File(path)
    }
}
