//! bytesync-ffi: C-ABI exports for CRC, validation and streaming de-framing.

mod error;
mod frame;
mod stream;
mod types;

use std::panic::AssertUnwindSafe;

pub use frame::{bs_crc16_ccitt, bs_extract_payload, bs_parse_frame, bs_validate_frame, bs_verify_crc};
pub use stream::{
    bs_deframer_free, bs_deframer_new, bs_deframer_next, bs_ringbuf_available, bs_ringbuf_free,
    bs_ringbuf_free_space, bs_ringbuf_new, bs_ringbuf_write,
};
pub use types::{
    BsDeframerHandle, BsFrame, BsRingBufHandle, BS_ERR_BAD_CRC, BS_ERR_BAD_LENGTH,
    BS_ERR_BUFFER_FULL, BS_ERR_INTERNAL, BS_ERR_INVALID_ARG, BS_ERR_NO_MEMORY, BS_ERR_NO_SYNC,
    BS_OUTCOME_EMPTY, BS_OUTCOME_FRAME, BS_OUTCOME_NEED_MORE, BS_OUTCOME_RESYNCED, BS_SUCCESS,
};

fn ffi_boundary<T>(on_panic: T, f: impl FnOnce() -> T) -> T {
    match std::panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => value,
        Err(_) => {
            error::set_panic_error();
            on_panic
        }
    }
}

/// Text of the last error on this thread, or an empty string.
///
/// The pointer stays valid until the next bytesync call on the same thread.
#[no_mangle]
pub extern "C" fn bs_last_error() -> *const std::os::raw::c_char {
    ffi_boundary(std::ptr::null(), error::last_error_ptr)
}

#[cfg(test)]
mod tests {
    use std::ffi::CStr;

    use super::*;

    fn last_error() -> String {
        let ptr = bs_last_error();
        assert!(!ptr.is_null());
        // SAFETY: bs_last_error returns a pointer to a thread-local CString.
        unsafe { CStr::from_ptr(ptr).to_str().unwrap().to_owned() }
    }

    #[test]
    fn last_error_is_empty_after_success() {
        let data = b"123456789";
        // SAFETY: Valid slice pointer and length.
        unsafe { bs_crc16_ccitt(data.as_ptr(), data.len()) };
        assert!(last_error().is_empty());
    }

    #[test]
    fn last_error_describes_failure() {
        let raw = [0x00u8, 0x01, 0x02];
        // SAFETY: Valid slice pointer and length.
        let rc = unsafe { bs_validate_frame(raw.as_ptr(), raw.len()) };
        assert_eq!(rc, BS_ERR_NO_SYNC);
        assert!(last_error().contains("sync"));
    }

    #[test]
    fn panics_are_contained() {
        let value = ffi_boundary(-7, || -> i32 { panic!("boom") });
        assert_eq!(value, -7);
        assert_eq!(last_error(), "panic across FFI boundary");
    }
}
