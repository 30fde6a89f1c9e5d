//! Overflow-checked `int` arithmetic.

use crate::error::{null_argument, RecordExt};
use safeops_core::{arith, SafeResult};
use std::ffi::{c_int, c_longlong};

#[track_caller]
unsafe fn store(operation: &'static str, result: SafeResult<c_int>, out: *mut c_int) -> bool {
    if out.is_null() {
        null_argument(operation);
        return false;
    }
    match result.recorded() {
        Some(value) => {
            *out = value;
            true
        }
        None => false,
    }
}

/// Stores `a + b` in `*result`, failing with `Overflow` if it does not fit.
///
/// # Safety
///
/// `result` must be null or writable.
#[no_mangle]
pub unsafe extern "C" fn safe_add_int(a: c_int, b: c_int, result: *mut c_int) -> bool {
    store("safe_add_int", arith::add(a, b), result)
}

/// Stores `a - b` in `*result`, failing with `Overflow` if it does not fit.
///
/// # Safety
///
/// `result` must be null or writable.
#[no_mangle]
pub unsafe extern "C" fn safe_sub_int(a: c_int, b: c_int, result: *mut c_int) -> bool {
    store("safe_sub_int", arith::sub(a, b), result)
}

/// Stores `a * b` in `*result`, failing with `Overflow` if it does not fit.
///
/// # Safety
///
/// `result` must be null or writable.
#[no_mangle]
pub unsafe extern "C" fn safe_mul_int(a: c_int, b: c_int, result: *mut c_int) -> bool {
    store("safe_mul_int", arith::mul(a, b), result)
}

/// Stores `a / b` in `*result`.
///
/// Fails with `InvalidParam` for a zero divisor and `Overflow` for
/// `INT_MIN / -1`.
///
/// # Safety
///
/// `result` must be null or writable.
#[no_mangle]
pub unsafe extern "C" fn safe_div_int(a: c_int, b: c_int, result: *mut c_int) -> bool {
    store("safe_div_int", arith::div(a, b), result)
}

/// Narrows `value` to `int`, failing with `Overflow` outside its range.
///
/// # Safety
///
/// `out` must be null or writable.
#[no_mangle]
pub unsafe extern "C" fn safe_cast_long_long_to_int(value: c_longlong, out: *mut c_int) -> bool {
    store("safe_cast_long_long_to_int", arith::narrow(value), out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{safeops_clear_last_error, safeops_get_last_error, SafeOpsError};

    #[test]
    fn in_range_results() {
        let mut out = 0;
        assert!(unsafe { safe_add_int(2, 3, &mut out) });
        assert_eq!(out, 5);
        assert!(unsafe { safe_sub_int(2, 3, &mut out) });
        assert_eq!(out, -1);
        assert!(unsafe { safe_mul_int(-4, 5, &mut out) });
        assert_eq!(out, -20);
        assert!(unsafe { safe_div_int(9, 2, &mut out) });
        assert_eq!(out, 4);
        assert!(unsafe { safe_cast_long_long_to_int(-7, &mut out) });
        assert_eq!(out, -7);
    }

    #[test]
    fn overflow_leaves_result() {
        let mut out = 123;
        safeops_clear_last_error();
        assert!(!unsafe { safe_add_int(c_int::MAX, 1, &mut out) });
        assert_eq!(safeops_get_last_error(), SafeOpsError::Overflow);
        assert!(!unsafe { safe_mul_int(c_int::MAX, 2, &mut out) });
        assert!(!unsafe { safe_div_int(c_int::MIN, -1, &mut out) });
        assert!(!unsafe {
            safe_cast_long_long_to_int(c_longlong::from(c_int::MAX) + 1, &mut out)
        });
        assert_eq!(out, 123);
    }

    #[test]
    fn divide_by_zero() {
        let mut out = 0;
        safeops_clear_last_error();
        assert!(!unsafe { safe_div_int(1, 0, &mut out) });
        assert_eq!(safeops_get_last_error(), SafeOpsError::InvalidParam);
    }

    #[test]
    fn null_result() {
        safeops_clear_last_error();
        assert!(!unsafe { safe_add_int(1, 1, std::ptr::null_mut()) });
        assert_eq!(safeops_get_last_error(), SafeOpsError::NullPointer);
    }
}
