use std::io::{ErrorKind, Write};

use bytes::BytesMut;

use crate::codec::{encode_frame, OwnedFrame, DEFAULT_MAX_FRAME_LEN};
use crate::error::{FrameError, Result};

/// Writes complete frames to any `Write` stream.
///
/// Keeps the sender's sequence counter, which wraps modulo 256.
pub struct FrameWriter<T> {
    inner: T,
    buf: BytesMut,
    next_sequence: u8,
}

impl<T: Write> FrameWriter<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(DEFAULT_MAX_FRAME_LEN),
            next_sequence: 0,
        }
    }

    /// Encode `payload`, stamp it with the next sequence number and send it.
    ///
    /// Returns the sequence number used.
    pub fn send(&mut self, flags: u8, msg_type: u8, payload: &[u8]) -> Result<u8> {
        let sequence = self.next_sequence;
        self.buf.clear();
        encode_frame(flags, sequence, msg_type, payload, &mut self.buf)?;
        self.write_buffered()?;
        self.next_sequence = sequence.wrapping_add(1);
        Ok(sequence)
    }

    /// Write a frame as-is, keeping its own sequence number.
    pub fn write_frame(&mut self, frame: &OwnedFrame) -> Result<()> {
        self.buf.clear();
        frame.encode(&mut self.buf)?;
        self.write_buffered()
    }

    /// The sequence number the next [`send`](Self::send) will use.
    pub fn next_sequence(&self) -> u8 {
        self.next_sequence
    }

    pub fn set_next_sequence(&mut self, sequence: u8) {
        self.next_sequence = sequence;
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    fn write_buffered(&mut self) -> Result<()> {
        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => return Err(FrameError::ConnectionClosed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }

        self.flush()
    }
}
