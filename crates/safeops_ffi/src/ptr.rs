//! Pointer offset and inspection.

use crate::error::{record, RecordExt};
use safeops_core::{ptr, SafeError};
use std::ffi::c_void;

/// Returns `base + offset` if `offset <= base_size`, otherwise null.
///
/// Fails with `NullPointer`, `OutOfBounds` or `Overflow` (the address would
/// wrap). Nothing is dereferenced.
#[no_mangle]
pub extern "C" fn safe_pointer_offset(base: *mut c_void, base_size: usize, offset: usize) -> *mut c_void {
    ptr::offset_within(base.cast_const(), base_size, offset)
        .recorded()
        .map_or(std::ptr::null_mut(), |p| p.as_ptr().cast())
}

/// Returns true if `ptr` is non-null.
#[no_mangle]
pub extern "C" fn is_valid_pointer(ptr: *const c_void) -> bool {
    ptr::is_valid_pointer(ptr)
}

/// Returns true if `ptr` is a multiple of `alignment`.
///
/// A null pointer, or an alignment that is not a power of two, records an
/// error and returns false.
#[no_mangle]
pub extern "C" fn is_aligned(ptr: *const c_void, alignment: usize) -> bool {
    if ptr.is_null() {
        record(&SafeError::null("is_aligned"));
        return false;
    }
    ptr::is_aligned(ptr, alignment).recorded().unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{safeops_clear_last_error, safeops_get_last_error, SafeOpsError};

    #[test]
    fn offsets() {
        let mut buf = [0u8; 10];
        let base = buf.as_mut_ptr().cast::<c_void>();
        assert_eq!(safe_pointer_offset(base, 10, 3) as usize, base as usize + 3);
        assert_eq!(safe_pointer_offset(base, 10, 10) as usize, base as usize + 10);

        safeops_clear_last_error();
        assert!(safe_pointer_offset(base, 10, 11).is_null());
        assert_eq!(safeops_get_last_error(), SafeOpsError::OutOfBounds);
        assert!(safe_pointer_offset(std::ptr::null_mut(), 10, 0).is_null());
        assert_eq!(safeops_get_last_error(), SafeOpsError::NullPointer);
    }

    #[test]
    fn alignment() {
        let value = 0u64;
        let p = (&value as *const u64).cast::<c_void>();
        assert!(is_valid_pointer(p));
        assert!(!is_valid_pointer(std::ptr::null()));
        assert!(is_aligned(p, 8));
        assert!(!is_aligned(p.cast::<u8>().wrapping_add(1).cast(), 2));

        safeops_clear_last_error();
        assert!(!is_aligned(p, 6));
        assert_eq!(safeops_get_last_error(), SafeOpsError::InvalidParam);
    }
}
