//! Bounded raw memory copies.

use crate::error::{log, null_argument, record, SafeOpsError};
use safeops_core::SafeError;
use std::ffi::c_void;

/// Returns true if either region starts inside the other's span.
///
/// The destination span is its full capacity, not just the bytes written.
fn regions_overlap(dest: usize, dest_size: usize, src: usize, src_size: usize) -> bool {
    (src < dest && src.saturating_add(src_size) > dest)
        || (dest < src && dest.saturating_add(dest_size) > src)
}

#[track_caller]
unsafe fn bounded_move(
    operation: &'static str,
    dest: *mut c_void,
    dest_size: usize,
    src: *const c_void,
    src_size: usize,
) -> bool {
    if dest.is_null() || src.is_null() {
        null_argument(operation);
        return false;
    }
    if src_size > dest_size {
        record(&SafeError::OutOfBounds {
            operation,
            required: src_size,
            capacity: dest_size,
        });
        return false;
    }

    if regions_overlap(dest as usize, dest_size, src as usize, src_size) {
        tracing::debug!(operation, "memory regions overlap");
        log(SafeOpsError::Overlap, "memory regions overlap, copying with move semantics");
    }

    std::ptr::copy(src.cast::<u8>(), dest.cast::<u8>(), src_size);
    true
}

/// Copies `src_size` bytes from `src` into `dest`, which holds `dest_size`.
///
/// Fails with `NullPointer` or `OutOfBounds` (`src_size > dest_size`). An
/// overlap is reported to the logger as an `Overlap` notice, does not change
/// the last error, and the copy still behaves like `memmove`.
///
/// # Safety
///
/// `dest` must be valid for `dest_size` bytes of writes and `src` for
/// `src_size` bytes of reads.
#[no_mangle]
pub unsafe extern "C" fn safe_mem_copy(
    dest: *mut c_void,
    dest_size: usize,
    src: *const c_void,
    src_size: usize,
) -> bool {
    bounded_move("safe_mem_copy", dest, dest_size, src, src_size)
}

/// Same contract as [`safe_mem_copy`].
///
/// # Safety
///
/// Same as [`safe_mem_copy`].
#[no_mangle]
pub unsafe extern "C" fn safe_mem_move(
    dest: *mut c_void,
    dest_size: usize,
    src: *const c_void,
    src_size: usize,
) -> bool {
    bounded_move("safe_mem_move", dest, dest_size, src, src_size)
}
