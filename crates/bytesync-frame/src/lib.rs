//! Framed message decoding for unreliable byte streams.
//!
//! Bytes arrive in arbitrary chunks from a serial line, socket or pipe and
//! may contain line noise, truncations and bit flips. Every frame is:
//! - A 2-byte sync pattern (`0xAA 0x55`) for stream resynchronization
//! - A 5-byte header: flags, 2-byte little-endian total length, sequence, type
//! - A payload of `length - 9` bytes
//! - A 2-byte little-endian CRC-16/CCITT-FALSE over everything after the sync
//!
//! Bytes are staged in a fixed-capacity [`RingBuffer`] and scanned by a
//! [`Deframer`], which delivers only frames whose CRC checks out and drops a
//! single byte at a time past anything that does not.

pub mod codec;
pub mod crc;
pub mod deframer;
pub mod error;
pub mod reader;
pub mod ring;
pub mod validate;
pub mod writer;

#[cfg(feature = "async")]
pub mod async_codec;

#[cfg(feature = "async")]
pub use async_codec::BsCodec;
pub use codec::{
    encode_frame, extract_payload, Frame, FrameConfig, OwnedFrame, DEFAULT_BUFFER_CAPACITY,
    DEFAULT_MAX_FRAME_LEN, HEADER_SIZE, MAX_FRAME_LEN, MAX_PAYLOAD, MIN_FRAME_LEN, SYNC,
};
pub use crc::{crc16_ccitt, verify, verify_frame_crc, Crc16};
pub use deframer::{Deframer, DeframerConfig, DeframerStats, Outcome, ParseState};
pub use error::{FrameError, Result};
pub use reader::FrameReader;
pub use ring::{RingBuffer, Span};
pub use validate::{parse_frame, validate, validate_frame, Validation};
pub use writer::FrameWriter;
