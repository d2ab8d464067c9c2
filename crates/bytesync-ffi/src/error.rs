use std::cell::RefCell;
use std::ffi::CString;
use std::os::raw::{c_char, c_int};

use bytesync_frame::error::BS_ERR_INVALID_ARG;
use bytesync_frame::FrameError;

thread_local! {
    static LAST_ERROR: RefCell<CString> = RefCell::new(CString::default());
}

pub(crate) fn clear_error_state() {
    LAST_ERROR.with(|state| {
        *state.borrow_mut() = CString::default();
    });
}

pub(crate) fn set_error_message(message: impl Into<String>) {
    let sanitized = message.into().replace('\0', "?");
    LAST_ERROR.with(|state| {
        *state.borrow_mut() = CString::new(sanitized).unwrap_or_default();
    });
}

pub(crate) fn set_invalid_argument(message: impl Into<String>) -> c_int {
    set_error_message(message);
    BS_ERR_INVALID_ARG
}

pub(crate) fn set_panic_error() {
    set_error_message("panic across FFI boundary");
}

pub(crate) fn map_frame_error(err: &FrameError) -> c_int {
    set_error_message(err.to_string());
    err.code()
}

pub(crate) fn last_error_ptr() -> *const c_char {
    LAST_ERROR.with(|state| state.borrow().as_ptr())
}

/// Borrow `len` bytes at `ptr`. A null pointer is accepted only when `len` is 0.
///
/// # Safety
/// A non-null `ptr` must be valid for reads of `len` bytes for `'a`.
pub(crate) unsafe fn bytes_arg<'a>(ptr: *const u8, len: usize, name: &str) -> Option<&'a [u8]> {
    if len == 0 {
        return Some(&[]);
    }
    if ptr.is_null() {
        set_invalid_argument(format!("{name} cannot be null"));
        return None;
    }
    // SAFETY: Non-null and valid for `len` bytes per the caller contract.
    Some(unsafe { std::slice::from_raw_parts(ptr, len) })
}
