//! Fixed-capacity circular byte queue.
//!
//! ```text
//!            tail                       head
//!             ▼                          ▼
//! ┌──────────┬──────────────────────────┬───────────┐
//! │  free    │   unread (count bytes)   │   free    │
//! └──────────┴──────────────────────────┴───────────┘
//! ```
//!
//! Unread data may wrap past the end of storage; [`Span`] presents it as two
//! slices so callers never need to copy to inspect it.

use std::fmt;
use std::ops::Range;

use crate::error::{FrameError, Result};

/// A non-owning view of bytes that may wrap around the end of the buffer.
#[derive(Debug, Clone, Copy, Default)]
pub struct Span<'a> {
    first: &'a [u8],
    second: &'a [u8],
}

impl<'a> Span<'a> {
    pub fn new(first: &'a [u8], second: &'a [u8]) -> Self {
        Self { first, second }
    }

    /// Leading contiguous part.
    pub fn first(&self) -> &'a [u8] {
        self.first
    }

    /// Wrapped part, empty when the view is contiguous.
    pub fn second(&self) -> &'a [u8] {
        self.second
    }

    pub fn len(&self) -> usize {
        self.first.len() + self.second.len()
    }

    pub fn is_empty(&self) -> bool {
        self.first.is_empty() && self.second.is_empty()
    }

    /// Byte at logical index `index`.
    pub fn get(&self, index: usize) -> Option<u8> {
        match self.first.get(index) {
            Some(byte) => Some(*byte),
            None => self.second.get(index - self.first.len()).copied(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = u8> + 'a {
        self.first.iter().chain(self.second.iter()).copied()
    }

    /// Sub-view over the logical `range`.
    ///
    /// # Panics
    /// Panics if the range is out of bounds, like slice indexing.
    pub fn slice(&self, range: Range<usize>) -> Span<'a> {
        assert!(
            range.start <= range.end && range.end <= self.len(),
            "span range {range:?} out of bounds for length {}",
            self.len()
        );
        let split = self.first.len();
        if range.end <= split {
            Span::new(&self.first[range], &[])
        } else if range.start >= split {
            Span::new(&self.second[range.start - split..range.end - split], &[])
        } else {
            Span::new(&self.first[range.start..], &self.second[..range.end - split])
        }
    }

    /// Logical offset of the first occurrence of `pattern`, including
    /// occurrences that straddle the wrap point.
    pub fn find(&self, pattern: &[u8]) -> Option<usize> {
        if pattern.is_empty() {
            return Some(0);
        }
        let len = self.len();
        if pattern.len() > len {
            return None;
        }
        (0..=len - pattern.len()).find(|&start| {
            pattern
                .iter()
                .enumerate()
                .all(|(i, expected)| self.get(start + i) == Some(*expected))
        })
    }

    /// Little-endian u16 at logical offset `at`.
    pub fn read_u16_le(&self, at: usize) -> Option<u16> {
        Some(u16::from_le_bytes([self.get(at)?, self.get(at + 1)?]))
    }

    /// Copy the whole view into `dst`.
    ///
    /// # Panics
    /// Panics if `dst.len() != self.len()`.
    pub fn copy_to_slice(&self, dst: &mut [u8]) {
        assert_eq!(dst.len(), self.len(), "destination length mismatch");
        let (head, tail) = dst.split_at_mut(self.first.len());
        head.copy_from_slice(self.first);
        tail.copy_from_slice(self.second);
    }

    pub fn to_vec(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len());
        out.extend_from_slice(self.first);
        out.extend_from_slice(self.second);
        out
    }
}

impl<'a> From<&'a [u8]> for Span<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Span::new(bytes, &[])
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for Span<'a> {
    fn from(bytes: &'a [u8; N]) -> Self {
        Span::new(bytes, &[])
    }
}

impl<'a> From<&'a Vec<u8>> for Span<'a> {
    fn from(bytes: &'a Vec<u8>) -> Self {
        Span::new(bytes, &[])
    }
}

/// Fixed-capacity byte queue fed by the transport and drained by the de-framer.
///
/// Storage is allocated once in [`RingBuffer::new`]; no later operation
/// allocates. Writes are all-or-nothing.
pub struct RingBuffer {
    storage: Box<[u8]>,
    head: usize,
    tail: usize,
    count: usize,
}

impl RingBuffer {
    /// Allocate a buffer holding at most `capacity` bytes.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(FrameError::invalid("ring buffer capacity must be non-zero"));
        }

        let mut storage = Vec::new();
        storage
            .try_reserve_exact(capacity)
            .map_err(|_| FrameError::NoMemory { capacity })?;
        storage.resize(capacity, 0);

        Ok(Self {
            storage: storage.into_boxed_slice(),
            head: 0,
            tail: 0,
            count: 0,
        })
    }

    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Unread bytes currently held.
    pub fn available(&self) -> usize {
        self.count
    }

    pub fn free_space(&self) -> usize {
        self.capacity() - self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn is_full(&self) -> bool {
        self.count == self.capacity()
    }

    /// Append all of `data`, or nothing if it does not fit.
    pub fn write(&mut self, data: &[u8]) -> Result<()> {
        if data.len() > self.free_space() {
            return Err(FrameError::BufferFull {
                requested: data.len(),
                free: self.free_space(),
            });
        }
        if data.is_empty() {
            return Ok(());
        }

        let capacity = self.capacity();
        let first_len = data.len().min(capacity - self.head);
        let (first, second) = data.split_at(first_len);
        self.storage[self.head..self.head + first_len].copy_from_slice(first);
        self.storage[..second.len()].copy_from_slice(second);

        self.head = (self.head + data.len()) % capacity;
        self.count += data.len();
        Ok(())
    }

    /// View the next `n` unread bytes without consuming them.
    ///
    /// Returns `None` if fewer than `n` bytes are buffered.
    pub fn peek(&self, n: usize) -> Option<Span<'_>> {
        if n > self.count {
            return None;
        }
        Some(self.span(n))
    }

    /// View every unread byte.
    pub fn contents(&self) -> Span<'_> {
        self.span(self.count)
    }

    /// Discard the next `n` unread bytes.
    pub fn consume(&mut self, n: usize) -> Result<()> {
        if n > self.count {
            return Err(FrameError::invalid(format!(
                "cannot consume {n} bytes, only {} buffered",
                self.count
            )));
        }
        self.advance(n);
        Ok(())
    }

    /// Discard exactly one byte.
    pub fn skip(&mut self) -> Result<()> {
        self.consume(1)
    }

    /// Consume the next `n` bytes and return them as one contiguous slice.
    ///
    /// Wrapped data is rotated into place first. The slice borrows the
    /// buffer, so it cannot outlive the next write.
    pub fn take(&mut self, n: usize) -> Result<&[u8]> {
        if n > self.count {
            return Err(FrameError::invalid(format!(
                "cannot take {n} bytes, only {} buffered",
                self.count
            )));
        }
        Ok(self.take_front(n))
    }

    /// Consume at most `n` bytes as one contiguous slice.
    pub(crate) fn take_front(&mut self, n: usize) -> &[u8] {
        let n = n.min(self.count);
        if self.tail + n > self.capacity() {
            self.make_contiguous();
        }
        let start = self.tail;
        self.advance(n);
        &self.storage[start..start + n]
    }

    /// Drop every unread byte.
    pub fn clear(&mut self) {
        self.head = 0;
        self.tail = 0;
        self.count = 0;
    }

    fn advance(&mut self, n: usize) {
        self.tail = (self.tail + n) % self.capacity();
        self.count -= n;
        if self.count == 0 {
            self.head = 0;
            self.tail = 0;
        }
    }

    fn make_contiguous(&mut self) {
        self.storage.rotate_left(self.tail);
        self.tail = 0;
        self.head = self.count % self.capacity();
    }

    fn span(&self, n: usize) -> Span<'_> {
        let first_len = n.min(self.capacity() - self.tail);
        Span::new(
            &self.storage[self.tail..self.tail + first_len],
            &self.storage[..n - first_len],
        )
    }
}

impl fmt::Debug for RingBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RingBuffer")
            .field("capacity", &self.capacity())
            .field("count", &self.count)
            .field("head", &self.head)
            .field("tail", &self.tail)
            .finish()
    }
}
