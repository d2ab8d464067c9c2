//! Framed message decoding for unreliable byte streams.
//!
//! bytesync turns a raw byte stream (serial line, socket, pipe) into
//! validated frames. It tolerates arbitrary chunking and line noise and
//! recovers from corrupted frames by resynchronizing on the next sync
//! pattern.
//!
//! # Crate Structure
//!
//! - [`frame`]: ring buffer, CRC engine, validator, streaming de-framer and
//!   blocking/async stream adapters
//!
//! The C ABI lives in the separate `bytesync-ffi` crate.

/// Re-export frame types.
pub mod frame {
    pub use bytesync_frame::*;
}

pub use bytesync_frame::{
    Deframer, Frame, FrameConfig, FrameError, FrameReader, FrameWriter, OwnedFrame, Outcome,
    RingBuffer,
};
