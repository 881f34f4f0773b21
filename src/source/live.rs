// src/source/live.rs
use crate::block::RecordHeader;
use crate::error::Result;
use crate::source::DataSource;
use bytes::{Buf, Bytes, BytesMut};
use crossbeam_channel::{Receiver, Sender, TryRecvError};

/// Producer half of a live source.
///
/// Messages may split blocks at any byte; the source holds a block back
/// until all of it has arrived.
#[derive(Clone)]
pub struct LiveFeed {
    tx: Sender<Bytes>,
}

impl LiveFeed {
    /// Publish the next bytes of the stream. Returns `false` once the
    /// consuming source has been dropped.
    pub fn publish(&self, blocks: Bytes) -> bool {
        self.tx.send(blocks).is_ok()
    }
}

/// Unbounded source fed by a [`LiveFeed`], standing in for an online
/// shared-memory buffer.
///
/// Not prepared until the next block has been buffered in full. A header
/// that cannot open a block is handed out on its own so the reader can
/// reject it. Once every feed has been dropped the source reports itself
/// prepared so the next read can report its end.
pub struct LiveSource {
    rx: Receiver<Bytes>,
    buffer: BytesMut,
    disconnected: bool,
}

impl LiveSource {
    /// Create a connected feed/source pair with an unbounded queue
    pub fn channel() -> (LiveFeed, LiveSource) {
        Self::from_channel(crossbeam_channel::unbounded())
    }

    /// Create a pair whose queue holds at most `capacity` messages
    pub fn bounded(capacity: usize) -> (LiveFeed, LiveSource) {
        Self::from_channel(crossbeam_channel::bounded(capacity))
    }

    fn from_channel((tx, rx): (Sender<Bytes>, Receiver<Bytes>)) -> (LiveFeed, LiveSource) {
        let source = LiveSource {
            rx,
            buffer: BytesMut::with_capacity(65536),
            disconnected: false,
        };
        (LiveFeed { tx }, source)
    }

    /// Bytes received but not yet read
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Length of the leading block if it is buffered in full
    fn buffered_block_len(&self) -> Option<usize> {
        let header = RecordHeader::parse(&self.buffer)?;
        let len = if header.is_valid_block_header() {
            (header.size as usize).max(RecordHeader::SIZE)
        } else {
            RecordHeader::SIZE
        };
        (self.buffer.len() >= len).then_some(len)
    }

    fn pull(&mut self) {
        loop {
            match self.rx.try_recv() {
                Ok(bytes) => self.buffer.extend_from_slice(&bytes),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.disconnected = true;
                    break;
                }
            }
        }
    }
}

impl DataSource for LiveSource {
    fn is_prepared(&mut self) -> bool {
        self.pull();
        self.disconnected || self.buffered_block_len().is_some()
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<bool> {
        if self.buffer.len() < buf.len() {
            self.pull();
        }
        if self.buffer.len() < buf.len() {
            if !self.disconnected {
                tracing::debug!(wanted = buf.len(), buffered = self.buffer.len(), "live source short of data");
            }
            return Ok(false);
        }
        self.buffer.copy_to_slice(buf);
        Ok(true)
    }
}
