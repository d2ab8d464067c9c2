use std::os::raw::c_int;

use bytesync_frame::{Deframer, DeframerConfig, Outcome, RingBuffer};

use crate::error;
use crate::types::{
    BsDeframerHandle, BsFrame, BsRingBufHandle, BS_ERR_INTERNAL, BS_ERR_INVALID_ARG,
    BS_OUTCOME_EMPTY, BS_OUTCOME_FRAME, BS_OUTCOME_NEED_MORE, BS_OUTCOME_RESYNCED, BS_SUCCESS,
};

fn with_ring<T>(handle: BsRingBufHandle, on_error: T, f: impl FnOnce(&mut RingBuffer) -> T) -> T {
    if handle.is_null() {
        let _ = error::set_invalid_argument("ring buffer handle cannot be null");
        return on_error;
    }

    let ring = {
        // SAFETY: Pointer validity is guaranteed by the caller.
        unsafe { &mut *(handle as *mut RingBuffer) }
    };

    f(ring)
}

/// Allocate a ring buffer holding at most `capacity` bytes.
///
/// Returns null on failure; see `bs_last_error`.
#[no_mangle]
pub extern "C" fn bs_ringbuf_new(capacity: usize) -> BsRingBufHandle {
    crate::ffi_boundary(std::ptr::null_mut(), || {
        error::clear_error_state();
        match RingBuffer::new(capacity) {
            Ok(ring) => Box::into_raw(Box::new(ring)) as BsRingBufHandle,
            Err(err) => {
                let _ = error::map_frame_error(&err);
                std::ptr::null_mut()
            }
        }
    })
}

/// Free a ring buffer handle.
///
/// # Safety
/// `ring` must be null or a handle previously returned by `bs_ringbuf_new`.
#[no_mangle]
pub unsafe extern "C" fn bs_ringbuf_free(ring: BsRingBufHandle) {
    crate::ffi_boundary((), || {
        if ring.is_null() {
            return;
        }
        // SAFETY: Handle was created by `Box::into_raw` in `bs_ringbuf_new`.
        unsafe {
            drop(Box::from_raw(ring as *mut RingBuffer));
        }
    });
}

/// Append `length` bytes, all or nothing.
///
/// # Safety
/// `ring` must be a valid handle and `data` valid for reads of `length` bytes.
#[no_mangle]
pub unsafe extern "C" fn bs_ringbuf_write(
    ring: BsRingBufHandle,
    data: *const u8,
    length: usize,
) -> c_int {
    crate::ffi_boundary(BS_ERR_INTERNAL, || {
        error::clear_error_state();
        // SAFETY: Pointer validity is guaranteed by the caller.
        let Some(bytes) = (unsafe { error::bytes_arg(data, length, "data") }) else {
            return BS_ERR_INVALID_ARG;
        };
        with_ring(ring, BS_ERR_INVALID_ARG, |ring| match ring.write(bytes) {
            Ok(()) => BS_SUCCESS,
            Err(err) => error::map_frame_error(&err),
        })
    })
}

/// Unread bytes held. Returns 0 for a null handle.
///
/// # Safety
/// `ring` must be null or a valid handle.
#[no_mangle]
pub unsafe extern "C" fn bs_ringbuf_available(ring: BsRingBufHandle) -> usize {
    crate::ffi_boundary(0, || with_ring(ring, 0, |ring| ring.available()))
}

/// Free bytes remaining. Returns 0 for a null handle.
///
/// # Safety
/// `ring` must be null or a valid handle.
#[no_mangle]
pub unsafe extern "C" fn bs_ringbuf_free_space(ring: BsRingBufHandle) -> usize {
    crate::ffi_boundary(0, || with_ring(ring, 0, |ring| ring.free_space()))
}

/// Create a de-framer. A `max_frame_len` of 0 selects the default (1024).
///
/// Returns null on failure; see `bs_last_error`.
#[no_mangle]
pub extern "C" fn bs_deframer_new(max_frame_len: usize) -> BsDeframerHandle {
    crate::ffi_boundary(std::ptr::null_mut(), || {
        error::clear_error_state();
        let config = if max_frame_len == 0 {
            DeframerConfig::default()
        } else {
            DeframerConfig { max_frame_len }
        };
        match Deframer::new(config) {
            Ok(deframer) => Box::into_raw(Box::new(deframer)) as BsDeframerHandle,
            Err(err) => {
                let _ = error::map_frame_error(&err);
                std::ptr::null_mut()
            }
        }
    })
}

/// Free a de-framer handle.
///
/// # Safety
/// `deframer` must be null or a handle previously returned by `bs_deframer_new`.
#[no_mangle]
pub unsafe extern "C" fn bs_deframer_free(deframer: BsDeframerHandle) {
    crate::ffi_boundary((), || {
        if deframer.is_null() {
            return;
        }
        // SAFETY: Handle was created by `Box::into_raw` in `bs_deframer_new`.
        unsafe {
            drop(Box::from_raw(deframer as *mut Deframer));
        }
    });
}

/// Make one parsing decision over the bytes buffered in `ring`.
///
/// On `BS_OUTCOME_FRAME`, `frame` is filled and its payload points into the
/// ring's storage: it stays valid until the next `bs_ringbuf_write` or
/// `bs_ringbuf_free` on that ring. On `BS_OUTCOME_RESYNCED` the number of
/// dropped bytes is written to `skipped` when it is non-null.
///
/// # Safety
/// `deframer` and `ring` must be valid handles, `frame` a writable `BsFrame`
/// pointer and `skipped` null or a writable `size_t` pointer.
#[no_mangle]
pub unsafe extern "C" fn bs_deframer_next(
    deframer: BsDeframerHandle,
    ring: BsRingBufHandle,
    frame: *mut BsFrame,
    skipped: *mut usize,
) -> c_int {
    crate::ffi_boundary(BS_ERR_INTERNAL, || {
        error::clear_error_state();
        if deframer.is_null() {
            return error::set_invalid_argument("deframer handle cannot be null");
        }
        if frame.is_null() {
            return error::set_invalid_argument("frame cannot be null");
        }

        let deframer = {
            // SAFETY: Pointer validity is guaranteed by the caller.
            unsafe { &mut *(deframer as *mut Deframer) }
        };

        with_ring(ring, BS_ERR_INVALID_ARG, |ring| {
            match deframer.try_parse_next(ring) {
                Outcome::Frame(parsed) => {
                    // SAFETY: Non-null and writable per the caller contract.
                    unsafe { *frame = BsFrame::from(&parsed) };
                    BS_OUTCOME_FRAME
                }
                Outcome::NeedMoreData => BS_OUTCOME_NEED_MORE,
                Outcome::Resynced(n) => {
                    if !skipped.is_null() {
                        // SAFETY: Non-null and writable per the caller contract.
                        unsafe { *skipped = n };
                    }
                    BS_OUTCOME_RESYNCED
                }
                Outcome::Empty => BS_OUTCOME_EMPTY,
            }
        })
    })
}
