//! Bounds-checked element access.

use crate::error::{SafeError, SafeResult};

/// Stores `value` at `array[index]`.
///
/// # Errors
///
/// Returns `OutOfBounds` if `index >= array.len()`; nothing is written.
pub fn write<T>(array: &mut [T], index: usize, value: T) -> SafeResult<()> {
    let len = array.len();
    let slot = array.get_mut(index).ok_or_else(|| {
        tracing::debug!(index, len, "array write out of bounds");
        SafeError::out_of_bounds("write", index, len)
    })?;
    *slot = value;
    Ok(())
}

/// Returns a copy of `array[index]`.
///
/// # Errors
///
/// Returns `OutOfBounds` if `index >= array.len()`.
pub fn read<T: Copy>(array: &[T], index: usize) -> SafeResult<T> {
    array.get(index).copied().ok_or_else(|| {
        tracing::debug!(index, len = array.len(), "array read out of bounds");
        SafeError::out_of_bounds("read", index, array.len())
    })
}
