//! Checked pointer arithmetic.
//!
//! These helpers compute and inspect addresses. They never dereference
//! anything; whether an access at the resulting address is in bounds for the
//! size later read or written is up to the caller.

use crate::error::{SafeError, SafeResult};
use std::ptr::NonNull;

/// Returns `base + offset` (in bytes) if the offset stays within a region of
/// `capacity` bytes starting at `base`.
///
/// `offset == capacity` is allowed and yields the one-past-the-end address.
///
/// # Errors
///
/// - `NullPointer` if `base` is null
/// - `OutOfBounds` if `offset > capacity`
/// - `Overflow` if the address computation would wrap
pub fn offset_within<T>(base: *const T, capacity: usize, offset: usize) -> SafeResult<NonNull<u8>> {
    if base.is_null() {
        return Err(SafeError::null("offset_within"));
    }
    if offset > capacity {
        tracing::debug!(offset, capacity, "pointer offset out of bounds");
        return Err(SafeError::out_of_bounds("offset_within", offset, capacity));
    }

    let addr = base as usize;
    if addr.checked_add(offset).is_none() {
        tracing::debug!(addr, offset, "pointer offset wraps address space");
        return Err(SafeError::Overflow {
            operation: "offset_within",
            detail: format!("{addr:#x} + {offset}"),
        });
    }

    NonNull::new(base.cast::<u8>().wrapping_add(offset).cast_mut())
        .ok_or(SafeError::null("offset_within"))
}

/// Returns true if `ptr` is non-null.
#[must_use]
pub fn is_valid_pointer<T: ?Sized>(ptr: *const T) -> bool {
    !ptr.is_null()
}

/// Returns true if `ptr` is a multiple of `alignment`.
///
/// # Errors
///
/// Returns `InvalidParam` if `alignment` is not a non-zero power of two.
pub fn is_aligned<T>(ptr: *const T, alignment: usize) -> SafeResult<bool> {
    if !alignment.is_power_of_two() {
        return Err(SafeError::invalid("is_aligned", "alignment must be a power of two"));
    }
    Ok((ptr as usize) & (alignment - 1) == 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn offset_inside_region() {
        let buf = [0u8; 16];
        let p = offset_within(buf.as_ptr(), buf.len(), 4).unwrap();
        assert_eq!(p.as_ptr() as usize, buf.as_ptr() as usize + 4);
    }

    #[test]
    fn one_past_the_end_allowed() {
        let buf = [0u32; 4];
        let p = offset_within(buf.as_ptr(), 16, 16).unwrap();
        assert_eq!(p.as_ptr() as usize, buf.as_ptr() as usize + 16);
    }

    #[test]
    fn beyond_capacity_fails() {
        let buf = [0u8; 8];
        let err = offset_within(buf.as_ptr(), buf.len(), 9).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutOfBounds);
    }

    #[test]
    fn null_base_fails() {
        let err = offset_within(std::ptr::null::<u8>(), 8, 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NullPointer);
    }

    #[test]
    fn wrapping_address_fails() {
        let base = usize::MAX as *const u8;
        let err = offset_within(base, usize::MAX, 2).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Overflow);
    }

    #[test]
    fn validity_and_alignment() {
        let value = 0u64;
        let p: *const u64 = &value;
        assert!(is_valid_pointer(p));
        assert!(!is_valid_pointer(std::ptr::null::<u8>()));
        assert!(is_aligned(p, std::mem::align_of::<u64>()).unwrap());
        assert!(!is_aligned(0x1001 as *const u8, 2).unwrap());
        assert_eq!(is_aligned(p, 3).unwrap_err().kind(), ErrorKind::InvalidParam);
        assert!(is_aligned(p, 0).is_err());
    }
}
