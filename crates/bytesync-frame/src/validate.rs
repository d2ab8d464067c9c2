//! Frame integrity checks shared by the streaming de-framer and one-shot
//! callers.

use crate::codec::{Frame, CRC_SIZE, LENGTH_OFFSET, MIN_FRAME_LEN, SYNC, SYNC_SIZE};
use crate::crc::Crc16;
use crate::error::{FrameError, Result};
use crate::ring::Span;

/// Result of checking a span that starts at a sync candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validation {
    /// The first `length` bytes form a well-formed frame.
    Complete { length: usize },
    /// Nothing is wrong yet, but at least `needed` bytes are required to decide.
    Incomplete { needed: usize },
}

/// Check whether `raw` begins with a well-formed frame.
///
/// `raw` may be a contiguous slice or a wrapped ring buffer [`Span`]. Bytes
/// past the declared length are ignored. A partially buffered frame is
/// reported as [`Validation::Incomplete`], never as an error, so streaming
/// callers can wait for more data without discarding it.
pub fn validate<'a>(raw: impl Into<Span<'a>>, max_frame_len: usize) -> Result<Validation> {
    let raw = raw.into();

    if raw.len() < SYNC_SIZE || raw.get(0) != Some(SYNC[0]) || raw.get(1) != Some(SYNC[1]) {
        return Err(FrameError::NoSync);
    }

    let Some(length) = raw.read_u16_le(LENGTH_OFFSET) else {
        return Ok(Validation::Incomplete {
            needed: LENGTH_OFFSET + 2,
        });
    };
    let length = usize::from(length);

    if length < MIN_FRAME_LEN || length > max_frame_len {
        return Err(FrameError::BadLength {
            length,
            max: max_frame_len,
        });
    }

    if raw.len() < length {
        return Ok(Validation::Incomplete { needed: length });
    }

    let crc_at = length - CRC_SIZE;
    let covered = raw.slice(SYNC_SIZE..crc_at);
    let computed = Crc16::new()
        .update(covered.first())
        .update(covered.second())
        .finish();
    let stored = raw.read_u16_le(crc_at).unwrap_or_default();

    if computed != stored {
        return Err(FrameError::BadCrc { stored, computed });
    }

    Ok(Validation::Complete { length })
}

/// Validate a complete, standalone frame.
///
/// Unlike [`validate`], a buffer shorter than the declared length is an
/// error ([`FrameError::BadLength`]). Returns the frame length.
pub fn validate_frame(raw: &[u8], max_frame_len: usize) -> Result<usize> {
    match validate(raw, max_frame_len)? {
        Validation::Complete { length } => Ok(length),
        Validation::Incomplete { needed } => Err(FrameError::BadLength {
            length: needed,
            max: raw.len().min(max_frame_len),
        }),
    }
}

/// Validate `raw` and return the frame at its start.
pub fn parse_frame(raw: &[u8], max_frame_len: usize) -> Result<Frame<'_>> {
    let length = validate_frame(raw, max_frame_len)?;
    Ok(Frame::from_validated(&raw[..length]))
}
