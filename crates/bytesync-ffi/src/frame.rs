use std::os::raw::c_int;

use bytesync_frame::{
    crc16_ccitt, extract_payload, parse_frame, validate_frame, verify_frame_crc, MAX_FRAME_LEN,
};

use crate::error;
use crate::types::{BsFrame, BS_ERR_INTERNAL, BS_ERR_INVALID_ARG, BS_SUCCESS};

/// CRC-16/CCITT-FALSE of `length` bytes at `data`.
///
/// # Safety
/// `data` must be valid for reads of `length` bytes, or null when `length` is 0.
#[no_mangle]
pub unsafe extern "C" fn bs_crc16_ccitt(data: *const u8, length: usize) -> u16 {
    crate::ffi_boundary(0, || {
        error::clear_error_state();
        // SAFETY: Pointer validity is guaranteed by the caller.
        match unsafe { error::bytes_arg(data, length, "data") } {
            Some(bytes) => crc16_ccitt(bytes),
            None => 0,
        }
    })
}

/// Check the trailing CRC of a complete frame. Returns 0 if valid, -1 otherwise.
///
/// # Safety
/// `frame_buffer` must be valid for reads of `frame_len` bytes.
#[no_mangle]
pub unsafe extern "C" fn bs_verify_crc(frame_buffer: *const u8, frame_len: usize) -> c_int {
    crate::ffi_boundary(-1, || {
        error::clear_error_state();
        // SAFETY: Pointer validity is guaranteed by the caller.
        match unsafe { error::bytes_arg(frame_buffer, frame_len, "frame_buffer") } {
            Some(bytes) if verify_frame_crc(bytes) => 0,
            _ => -1,
        }
    })
}

/// Validate sync, length and CRC of the frame at the start of `buffer`.
///
/// # Safety
/// `buffer` must be valid for reads of `buffer_len` bytes.
#[no_mangle]
pub unsafe extern "C" fn bs_validate_frame(buffer: *const u8, buffer_len: usize) -> c_int {
    crate::ffi_boundary(BS_ERR_INTERNAL, || {
        error::clear_error_state();
        // SAFETY: Pointer validity is guaranteed by the caller.
        let Some(bytes) = (unsafe { error::bytes_arg(buffer, buffer_len, "buffer") }) else {
            return BS_ERR_INVALID_ARG;
        };
        match validate_frame(bytes, MAX_FRAME_LEN) {
            Ok(_) => BS_SUCCESS,
            Err(err) => error::map_frame_error(&err),
        }
    })
}

/// Parse the frame at the start of `buffer` into `frame`.
///
/// On success `frame->payload` points into `buffer`.
///
/// # Safety
/// `buffer` must be valid for reads of `buffer_len` bytes and `frame` must be
/// a valid, writable `BsFrame` pointer.
#[no_mangle]
pub unsafe extern "C" fn bs_parse_frame(
    buffer: *const u8,
    buffer_len: usize,
    frame: *mut BsFrame,
) -> c_int {
    crate::ffi_boundary(BS_ERR_INTERNAL, || {
        error::clear_error_state();
        if frame.is_null() {
            return error::set_invalid_argument("frame cannot be null");
        }
        // SAFETY: Pointer validity is guaranteed by the caller.
        let Some(bytes) = (unsafe { error::bytes_arg(buffer, buffer_len, "buffer") }) else {
            return BS_ERR_INVALID_ARG;
        };

        match parse_frame(bytes, MAX_FRAME_LEN) {
            Ok(parsed) => {
                // SAFETY: Non-null and writable per the caller contract.
                unsafe { *frame = BsFrame::from(&parsed) };
                BS_SUCCESS
            }
            Err(err) => error::map_frame_error(&err),
        }
    })
}

/// Copy the payload of the frame at the start of `buffer` into `payload`.
///
/// Returns the number of bytes copied, or a negative error code.
///
/// # Safety
/// `buffer` must be valid for reads of `buffer_len` bytes and `payload` must
/// be valid for writes of `payload_max` bytes (or null when `payload_max` is 0).
#[no_mangle]
pub unsafe extern "C" fn bs_extract_payload(
    buffer: *const u8,
    buffer_len: usize,
    payload: *mut u8,
    payload_max: usize,
) -> isize {
    crate::ffi_boundary(BS_ERR_INTERNAL as isize, || {
        error::clear_error_state();
        // SAFETY: Pointer validity is guaranteed by the caller.
        let Some(bytes) = (unsafe { error::bytes_arg(buffer, buffer_len, "buffer") }) else {
            return BS_ERR_INVALID_ARG as isize;
        };
        if payload.is_null() && payload_max > 0 {
            return error::set_invalid_argument("payload cannot be null") as isize;
        }

        let parsed = match parse_frame(bytes, MAX_FRAME_LEN) {
            Ok(parsed) => parsed,
            Err(err) => return error::map_frame_error(&err) as isize,
        };

        let out: &mut [u8] = if payload_max == 0 {
            &mut []
        } else {
            // SAFETY: Non-null and valid for `payload_max` bytes per the caller contract.
            unsafe { std::slice::from_raw_parts_mut(payload, payload_max) }
        };
        match extract_payload(&parsed, out) {
            Ok(n) => n as isize,
            Err(err) => error::map_frame_error(&err) as isize,
        }
    })
}
