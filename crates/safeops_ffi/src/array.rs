//! Bounds-checked `int` array access.

use crate::error::{fits_slice, null_argument, RecordExt};
use safeops_core::array;
use std::ffi::c_int;

/// Stores `value` at `array[index]`.
///
/// Fails with `OutOfBounds` unless `index < array_size`, or when
/// `array_size` is too large to describe an array.
///
/// # Safety
///
/// `array` must be null or writable for `array_size` elements.
#[no_mangle]
pub unsafe extern "C" fn safe_write_int(
    array: *mut c_int,
    array_size: usize,
    index: usize,
    value: c_int,
) -> bool {
    if array.is_null() {
        null_argument("safe_write_int");
        return false;
    }
    if !fits_slice::<c_int>("safe_write_int", array_size) {
        return false;
    }
    let array = std::slice::from_raw_parts_mut(array, array_size);
    array::write(array, index, value).recorded().is_some()
}

/// Stores `array[index]` in `*out_value`.
///
/// Fails with `OutOfBounds` unless `index < array_size`; `*out_value` is then
/// left alone.
///
/// # Safety
///
/// `array` must be null or readable for `array_size` elements and
/// `out_value` null or writable.
#[no_mangle]
pub unsafe extern "C" fn safe_read_int(
    array: *const c_int,
    array_size: usize,
    index: usize,
    out_value: *mut c_int,
) -> bool {
    if array.is_null() || out_value.is_null() {
        null_argument("safe_read_int");
        return false;
    }
    if !fits_slice::<c_int>("safe_read_int", array_size) {
        return false;
    }
    let array = std::slice::from_raw_parts(array, array_size);
    match array::read(array, index).recorded() {
        Some(value) => {
            *out_value = value;
            true
        }
        None => false,
    }
}
