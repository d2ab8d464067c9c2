use std::ffi::c_void;
use std::os::raw::c_int;

use bytesync_frame::{Frame, SYNC};

pub use bytesync_frame::error::{
    BS_ERR_BAD_CRC, BS_ERR_BAD_LENGTH, BS_ERR_BUFFER_FULL, BS_ERR_INVALID_ARG, BS_ERR_NO_MEMORY,
    BS_ERR_NO_SYNC, BS_SUCCESS,
};

/// A panic was caught at the boundary.
pub const BS_ERR_INTERNAL: c_int = -99;

/// `bs_deframer_next` delivered a frame.
pub const BS_OUTCOME_FRAME: c_int = 1;
/// `bs_deframer_next` needs more bytes before it can decide.
pub const BS_OUTCOME_NEED_MORE: c_int = 2;
/// `bs_deframer_next` dropped bytes; call again.
pub const BS_OUTCOME_RESYNCED: c_int = 3;
/// `bs_deframer_next` found no sync candidate.
pub const BS_OUTCOME_EMPTY: c_int = 4;

/// C view of a decoded frame. `payload` borrows the buffer it was parsed from.
#[repr(C)]
#[derive(Debug)]
pub struct BsFrame {
    pub sync: [u8; 2],
    pub flags: u8,
    pub length: u16,
    pub sequence: u8,
    pub msg_type: u8,
    pub payload: *const u8,
    pub payload_len: usize,
    pub crc: u16,
}

impl Default for BsFrame {
    fn default() -> Self {
        Self {
            sync: [0; 2],
            flags: 0,
            length: 0,
            sequence: 0,
            msg_type: 0,
            payload: std::ptr::null(),
            payload_len: 0,
            crc: 0,
        }
    }
}

impl From<&Frame<'_>> for BsFrame {
    fn from(frame: &Frame<'_>) -> Self {
        Self {
            sync: SYNC,
            flags: frame.flags,
            length: frame.length,
            sequence: frame.sequence,
            msg_type: frame.msg_type,
            payload: frame.payload.as_ptr(),
            payload_len: frame.payload.len(),
            crc: frame.crc,
        }
    }
}

pub type BsRingBufHandle = *mut c_void;
pub type BsDeframerHandle = *mut c_void;
