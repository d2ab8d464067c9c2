use std::io::{ErrorKind, Read};

use tracing::debug;

use crate::codec::{Frame, FrameConfig, OwnedFrame};
use crate::deframer::{Deframer, DeframerConfig, DeframerStats, Outcome};
use crate::error::{FrameError, Result};
use crate::ring::RingBuffer;

const READ_CHUNK_SIZE: usize = 4 * 1024;

/// Reads validated frames from any `Read` stream.
///
/// Partial reads, line noise and corrupted frames are handled internally;
/// callers only ever see frames whose CRC checked out.
pub struct FrameReader<T> {
    inner: T,
    ring: RingBuffer,
    deframer: Deframer,
    config: FrameConfig,
}

impl<T: Read> FrameReader<T> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: T) -> Result<Self> {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Result<Self> {
        config.validate()?;
        let ring = RingBuffer::new(config.buffer_capacity)?;
        let deframer = Deframer::new(DeframerConfig {
            max_frame_len: config.max_frame_len,
        })?;
        Ok(Self {
            inner,
            ring,
            deframer,
            config,
        })
    }

    /// Read the next frame (blocking) and copy it out of the buffer.
    ///
    /// Returns `Err(FrameError::ConnectionClosed)` when EOF is reached.
    pub fn read_frame(&mut self) -> Result<OwnedFrame> {
        self.read_with(|frame| frame.into_owned())
    }

    /// Read the next frame (blocking) and hand it to `f` without copying.
    ///
    /// At EOF, undecided candidates are abandoned one byte at a time so
    /// frames buffered behind a bogus header are still delivered.
    pub fn read_with<R>(&mut self, f: impl FnOnce(Frame<'_>) -> R) -> Result<R> {
        let mut eof = false;
        loop {
            match self.deframer.try_parse_next(&mut self.ring) {
                Outcome::Frame(frame) => return Ok(f(frame)),
                Outcome::Resynced(_) => continue,
                Outcome::NeedMoreData if eof => {
                    self.deframer.abandon_candidate(&mut self.ring);
                    continue;
                }
                Outcome::Empty if eof => return Err(FrameError::ConnectionClosed),
                Outcome::NeedMoreData | Outcome::Empty => {}
            }

            let free = self.ring.free_space();
            if free == 0 {
                return Err(FrameError::BufferFull {
                    requested: 1,
                    free: 0,
                });
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let limit = free.min(READ_CHUNK_SIZE);
            let read = match self.inner.read(&mut chunk[..limit]) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            };

            if read == 0 {
                if self.ring.available() > 1 {
                    debug!(
                        buffered = self.ring.available(),
                        "stream ended with undecided bytes"
                    );
                }
                eof = true;
                continue;
            }

            self.ring.write(&chunk[..read])?;
        }
    }

    /// Decoding statistics since creation or the last reset.
    pub fn stats(&self) -> DeframerStats {
        self.deframer.stats()
    }

    pub fn reset_stats(&mut self) {
        self.deframer.reset_stats();
    }

    /// Bytes read from the stream but not yet decided on.
    pub fn buffered(&self) -> usize {
        self.ring.available()
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream. Buffered bytes are lost.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current frame reader configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}
