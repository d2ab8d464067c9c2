use bytes::{BufMut, Bytes, BytesMut};

use crate::crc::Crc16;
use crate::error::{FrameError, Result};

/// Sync pattern that opens every frame.
pub const SYNC: [u8; 2] = [0xAA, 0x55];

pub const SYNC_SIZE: usize = 2;

/// Fixed header: sync (2) + flags (1) + length (2) + sequence (1) + type (1) = 7 bytes.
pub const HEADER_SIZE: usize = 7;

/// Trailing CRC-16.
pub const CRC_SIZE: usize = 2;

/// Offset of the little-endian total-length field.
pub const LENGTH_OFFSET: usize = 3;

/// Smallest well-formed frame: header plus CRC, empty payload.
pub const MIN_FRAME_LEN: usize = HEADER_SIZE + CRC_SIZE;

/// Largest length the 16-bit length field can express.
pub const MAX_FRAME_LEN: usize = u16::MAX as usize;

/// Largest payload a single frame can carry.
pub const MAX_PAYLOAD: usize = MAX_FRAME_LEN - MIN_FRAME_LEN;

/// Default configured maximum frame length: 1 KiB.
pub const DEFAULT_MAX_FRAME_LEN: usize = 1024;

/// Default ring buffer capacity: 8 KiB.
pub const DEFAULT_BUFFER_CAPACITY: usize = 8 * 1024;

/// A decoded frame borrowing its payload.
///
/// The payload points into the ring buffer (or the caller's slice for
/// [`parse_frame`](crate::validate::parse_frame)); copy it out with
/// [`Frame::extract_payload`] or [`Frame::into_owned`] to keep it past the
/// next buffer write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame<'a> {
    /// Opaque, caller-defined bits.
    pub flags: u8,
    /// Total frame length on the wire, sync through CRC.
    pub length: u16,
    /// Sender-assigned counter, wraps at 256.
    pub sequence: u8,
    /// Message discriminator for dispatch.
    pub msg_type: u8,
    pub payload: &'a [u8],
    pub crc: u16,
}

impl<'a> Frame<'a> {
    /// Build a frame model over bytes already accepted by the validator.
    pub(crate) fn from_validated(raw: &'a [u8]) -> Self {
        let length = raw.len();
        Self {
            flags: raw[2],
            length: u16::from_le_bytes([raw[LENGTH_OFFSET], raw[LENGTH_OFFSET + 1]]),
            sequence: raw[5],
            msg_type: raw[6],
            payload: &raw[HEADER_SIZE..length - CRC_SIZE],
            crc: u16::from_le_bytes([raw[length - 2], raw[length - 1]]),
        }
    }

    /// Copy the payload into caller-owned storage.
    pub fn extract_payload(&self, out: &mut [u8]) -> Result<usize> {
        extract_payload(self, out)
    }

    /// Detach the frame from the buffer it was parsed from.
    pub fn into_owned(self) -> OwnedFrame {
        OwnedFrame {
            flags: self.flags,
            length: self.length,
            sequence: self.sequence,
            msg_type: self.msg_type,
            payload: Bytes::copy_from_slice(self.payload),
            crc: self.crc,
        }
    }
}

/// A frame that owns its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedFrame {
    pub flags: u8,
    pub length: u16,
    pub sequence: u8,
    pub msg_type: u8,
    pub payload: Bytes,
    pub crc: u16,
}

impl OwnedFrame {
    /// Create a frame, computing its length and CRC.
    pub fn new(flags: u8, sequence: u8, msg_type: u8, payload: impl Into<Bytes>) -> Result<Self> {
        let payload = payload.into();
        let length = frame_length(payload.len())?;
        let crc = covered_crc(flags, length, sequence, msg_type, &payload);
        Ok(Self {
            flags,
            length,
            sequence,
            msg_type,
            payload,
            crc,
        })
    }

    /// Borrow as a [`Frame`].
    pub fn as_frame(&self) -> Frame<'_> {
        Frame {
            flags: self.flags,
            length: self.length,
            sequence: self.sequence,
            msg_type: self.msg_type,
            payload: self.payload.as_ref(),
            crc: self.crc,
        }
    }

    /// The total wire size of this frame.
    pub fn wire_size(&self) -> usize {
        MIN_FRAME_LEN + self.payload.len()
    }

    /// Append this frame's wire encoding to `dst`.
    pub fn encode(&self, dst: &mut BytesMut) -> Result<()> {
        encode_frame(self.flags, self.sequence, self.msg_type, &self.payload, dst)
    }

    /// Encode into a fresh buffer.
    pub fn to_bytes(&self) -> Result<Bytes> {
        let mut buf = BytesMut::with_capacity(self.wire_size());
        self.encode(&mut buf)?;
        Ok(buf.freeze())
    }
}

/// Encode a frame into the wire format.
///
/// Wire format:
/// ```text
/// ┌──────────┬───────┬─────────┬─────┬──────┬─────────────┬──────────┐
/// │ Sync (2) │ Flags │ Length  │ Seq │ Type │ Payload     │ CRC (2)  │
/// │ AA 55    │ (1)   │ (2B LE) │ (1) │ (1)  │ Length - 9  │ LE       │
/// └──────────┴───────┴─────────┴─────┴──────┴─────────────┴──────────┘
///              └────────────── CRC-16/CCITT-FALSE ───────┘
/// ```
pub fn encode_frame(
    flags: u8,
    sequence: u8,
    msg_type: u8,
    payload: &[u8],
    dst: &mut BytesMut,
) -> Result<()> {
    let length = frame_length(payload.len())?;
    dst.reserve(usize::from(length));
    dst.put_slice(&SYNC);
    dst.put_u8(flags);
    dst.put_u16_le(length);
    dst.put_u8(sequence);
    dst.put_u8(msg_type);
    dst.put_slice(payload);
    dst.put_u16_le(covered_crc(flags, length, sequence, msg_type, payload));
    Ok(())
}

/// Copy a frame's payload into `out`, returning the number of bytes copied.
///
/// Fails with [`FrameError::InvalidArgument`] if `out` is too small.
pub fn extract_payload(frame: &Frame<'_>, out: &mut [u8]) -> Result<usize> {
    let len = frame.payload.len();
    if out.len() < len {
        return Err(FrameError::invalid(format!(
            "output buffer holds {} bytes, payload is {len}",
            out.len()
        )));
    }
    out[..len].copy_from_slice(frame.payload);
    Ok(len)
}

fn frame_length(payload_len: usize) -> Result<u16> {
    if payload_len > MAX_PAYLOAD {
        return Err(FrameError::PayloadTooLarge {
            size: payload_len,
            max: MAX_PAYLOAD,
        });
    }
    Ok((payload_len + MIN_FRAME_LEN) as u16)
}

fn covered_crc(flags: u8, length: u16, sequence: u8, msg_type: u8, payload: &[u8]) -> u16 {
    Crc16::new()
        .update(&[flags])
        .update(&length.to_le_bytes())
        .update(&[sequence, msg_type])
        .update(payload)
        .finish()
}

/// Configuration for a frame stream.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Largest accepted frame, sync through CRC. Default: 1 KiB.
    pub max_frame_len: usize,
    /// Ring buffer capacity. Must hold at least one maximal frame. Default: 8 KiB.
    pub buffer_capacity: usize,
}

impl FrameConfig {
    /// Check the configuration is usable.
    pub fn validate(&self) -> Result<()> {
        if !(MIN_FRAME_LEN..=MAX_FRAME_LEN).contains(&self.max_frame_len) {
            return Err(FrameError::invalid(format!(
                "max frame length {} outside {MIN_FRAME_LEN}..={MAX_FRAME_LEN}",
                self.max_frame_len
            )));
        }
        if self.buffer_capacity < self.max_frame_len {
            return Err(FrameError::invalid(format!(
                "buffer capacity {} cannot hold a {} byte frame",
                self.buffer_capacity, self.max_frame_len
            )));
        }
        Ok(())
    }
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
        }
    }
}
