//! Incremental, resynchronizing frame scanner over a [`RingBuffer`].
//!
//! ```text
//!            ┌──────────────────── resync (drop 1 byte) ─────────────────┐
//!            ▼                                                           │
//!  SearchingSync ──sync──► AwaitHeader ──len ok──► AwaitFullFrame ──crc──┤
//!                                                                  ok    │
//!                                                                  ▼     │
//!                                                               Deliver ─┘
//! ```
//!
//! Nothing is consumed until a decision is made, so a frame split across
//! any number of writes decodes the same as one written whole. A bad
//! candidate costs exactly one byte, so a genuine frame overlapping a
//! corrupted one is never skipped.

use tracing::{debug, trace};

use crate::codec::{Frame, DEFAULT_MAX_FRAME_LEN, HEADER_SIZE, MAX_FRAME_LEN, MIN_FRAME_LEN, SYNC};
use crate::error::{FrameError, Result};
use crate::ring::RingBuffer;
use crate::validate::{validate, Validation};

/// Where the scanner stopped on its last call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    /// No sync candidate at the read position.
    SearchingSync,
    /// Sync found; the fixed header is not fully buffered.
    AwaitHeader,
    /// Header accepted; waiting for the rest of the frame.
    AwaitFullFrame,
}

/// Result of one [`Deframer::try_parse_next`] call.
#[derive(Debug, PartialEq, Eq)]
#[must_use]
pub enum Outcome<'a> {
    /// A validated frame. Its bytes have been consumed from the buffer.
    Frame(Frame<'a>),
    /// A sync candidate is buffered but undecided. Nothing was consumed.
    NeedMoreData,
    /// Corruption or leading noise: this many bytes were dropped. Call again.
    Resynced(usize),
    /// No sync candidate in the buffered bytes.
    Empty,
}

impl<'a> Outcome<'a> {
    pub fn is_frame(&self) -> bool {
        matches!(self, Outcome::Frame(_))
    }

    pub fn into_frame(self) -> Option<Frame<'a>> {
        match self {
            Outcome::Frame(frame) => Some(frame),
            _ => None,
        }
    }
}

/// Running counters for observability.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeframerStats {
    /// Frames delivered.
    pub frames: u64,
    /// `Resynced` outcomes returned.
    pub resyncs: u64,
    /// Bytes dropped by resyncs and noise discards.
    pub bytes_discarded: u64,
    /// Candidates rejected for an out-of-range length.
    pub bad_length: u64,
    /// Candidates rejected for a CRC mismatch.
    pub bad_crc: u64,
}

#[derive(Debug, Clone)]
pub struct DeframerConfig {
    /// Largest accepted frame, sync through CRC. Default: 1 KiB.
    pub max_frame_len: usize,
}

impl DeframerConfig {
    pub fn validate(&self) -> Result<()> {
        if !(MIN_FRAME_LEN..=MAX_FRAME_LEN).contains(&self.max_frame_len) {
            return Err(FrameError::invalid(format!(
                "max frame length {} outside {MIN_FRAME_LEN}..={MAX_FRAME_LEN}",
                self.max_frame_len
            )));
        }
        Ok(())
    }
}

impl Default for DeframerConfig {
    fn default() -> Self {
        Self {
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
        }
    }
}

/// Scans a [`RingBuffer`] for frames, one decision per call.
#[derive(Debug, Clone)]
pub struct Deframer {
    config: DeframerConfig,
    state: ParseState,
    stats: DeframerStats,
}

impl Deframer {
    pub fn new(config: DeframerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            state: ParseState::SearchingSync,
            stats: DeframerStats::default(),
        })
    }

    pub fn with_max_frame_len(max_frame_len: usize) -> Result<Self> {
        Self::new(DeframerConfig { max_frame_len })
    }

    pub fn config(&self) -> &DeframerConfig {
        &self.config
    }

    pub fn state(&self) -> ParseState {
        self.state
    }

    pub fn stats(&self) -> DeframerStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = DeframerStats::default();
    }

    /// Make one parsing decision over the buffered bytes.
    ///
    /// Call repeatedly until it returns [`Outcome::NeedMoreData`] or
    /// [`Outcome::Empty`], then write more bytes. A returned frame borrows
    /// the buffer, so it must be handled (or copied) before the next write.
    pub fn try_parse_next<'a>(&mut self, ring: &'a mut RingBuffer) -> Outcome<'a> {
        match ring.contents().find(&SYNC) {
            None => {
                // Keep the last byte: it may be the first half of a split sync.
                let noise = ring.available().saturating_sub(1);
                if noise > 0 {
                    self.discard(ring, noise);
                    trace!(discarded = noise, "no sync in buffered bytes");
                }
                self.state = ParseState::SearchingSync;
                return Outcome::Empty;
            }
            Some(0) => {}
            Some(offset) => {
                self.discard(ring, offset);
                self.stats.resyncs += 1;
                self.state = ParseState::SearchingSync;
                debug!(skipped = offset, "resynced past leading noise");
                return Outcome::Resynced(offset);
            }
        }

        if ring.available() < HEADER_SIZE {
            self.state = ParseState::AwaitHeader;
            return Outcome::NeedMoreData;
        }

        // A candidate longer than the ring can never complete.
        let max_frame_len = self.config.max_frame_len.min(ring.capacity());
        match validate(ring.contents(), max_frame_len) {
            Ok(Validation::Incomplete { .. }) => {
                self.state = ParseState::AwaitFullFrame;
                Outcome::NeedMoreData
            }
            Ok(Validation::Complete { length }) => {
                debug_assert!(length <= ring.available());
                let frame = Frame::from_validated(ring.take_front(length));
                self.stats.frames += 1;
                self.state = ParseState::SearchingSync;
                trace!(
                    length,
                    sequence = frame.sequence,
                    msg_type = frame.msg_type,
                    "frame delivered"
                );
                Outcome::Frame(frame)
            }
            Err(err) => {
                match err {
                    FrameError::BadLength { .. } => self.stats.bad_length += 1,
                    FrameError::BadCrc { .. } => self.stats.bad_crc += 1,
                    _ => {}
                }
                debug!(error = %err, "rejected frame candidate, resyncing");
                self.discard(ring, 1);
                self.stats.resyncs += 1;
                self.state = ParseState::SearchingSync;
                Outcome::Resynced(1)
            }
        }
    }

    /// Give up on the candidate at the read position by dropping its first
    /// byte, as if it had been rejected.
    ///
    /// Used once the stream has ended: an undecided candidate can no longer
    /// complete, and a real frame may be buffered behind a bogus header.
    /// Returns the number of bytes dropped (0 or 1).
    pub fn abandon_candidate(&mut self, ring: &mut RingBuffer) -> usize {
        if ring.is_empty() {
            return 0;
        }
        self.discard(ring, 1);
        self.stats.resyncs += 1;
        self.state = ParseState::SearchingSync;
        debug!(buffered = ring.available(), "abandoned undecided candidate");
        1
    }

    fn discard(&mut self, ring: &mut RingBuffer, n: usize) {
        if ring.consume(n).is_ok() {
            self.stats.bytes_discarded += n as u64;
        }
    }
}
