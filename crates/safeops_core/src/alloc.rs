//! Checked allocation and secure release.
//!
//! Allocations report failure instead of aborting the process. Released slots
//! are always left `None`, so a stale handle can never be freed twice or read
//! after release.

use crate::error::{SafeError, SafeResult};
use std::mem::MaybeUninit;
use zeroize::Zeroize;

/// Bytes reserved for size accounting in front of a tracked allocation.
///
/// Requests larger than `isize::MAX - HEADER_SIZE` are rejected as overflow.
pub const HEADER_SIZE: usize = 16;

/// Largest request accepted by the allocation functions.
pub const MAX_ALLOCATION: usize = isize::MAX as usize - HEADER_SIZE;

/// Checks an allocation request size without allocating.
///
/// # Errors
///
/// - `InvalidParam` if `size` is zero
/// - `Overflow` if `size` exceeds [`MAX_ALLOCATION`]
pub fn validate_size(size: usize) -> SafeResult<()> {
    if size == 0 {
        tracing::debug!("zero-size allocation requested");
        return Err(SafeError::invalid("allocate", "zero size allocation requested"));
    }
    if size > MAX_ALLOCATION {
        tracing::debug!(size, "allocation size would overflow");
        return Err(SafeError::Overflow {
            operation: "allocate",
            detail: format!("{size} bytes plus {HEADER_SIZE} header bytes"),
        });
    }
    Ok(())
}

fn reserve<T>(size: usize) -> SafeResult<Vec<T>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(size).map_err(|_| {
        tracing::debug!(size, "allocator refused request");
        SafeError::AllocationFailed { size }
    })?;
    Ok(buf)
}

/// Allocates `size` zero-initialized bytes.
///
/// # Errors
///
/// - `InvalidParam` if `size` is zero
/// - `Overflow` if `size` exceeds [`MAX_ALLOCATION`]
/// - `AllocationFailed` if the allocator cannot satisfy the request
pub fn allocate_zeroed(size: usize) -> SafeResult<Box<[u8]>> {
    validate_size(size)?;
    let mut buf = reserve(size)?;
    buf.resize(size, 0u8);
    Ok(buf.into_boxed_slice())
}

/// Allocates `size` bytes without initializing them.
///
/// Same contract as [`allocate_zeroed`]; the contents are indeterminate until
/// written.
///
/// # Errors
///
/// See [`allocate_zeroed`].
pub fn allocate_uninit(size: usize) -> SafeResult<Box<[MaybeUninit<u8>]>> {
    validate_size(size)?;
    let mut buf = reserve(size)?;
    buf.resize(size, MaybeUninit::uninit());
    Ok(buf.into_boxed_slice())
}

/// Releases the allocation in `slot` and leaves it `None`.
///
/// An empty slot is a no-op.
pub fn release<T: ?Sized>(slot: &mut Option<Box<T>>) {
    drop(slot.take());
}

/// Wipes the allocation in `slot`, releases it and leaves it `None`.
///
/// `size` is the element count the caller believes it allocated. The length
/// tracked by the box is authoritative: the whole allocation is wiped, and a
/// `size` larger than it is rejected without releasing anything.
///
/// # Errors
///
/// - `NullPointer` if `slot` is empty
/// - `OutOfBounds` if `size` exceeds the tracked length
pub fn release_secure<T>(slot: &mut Option<Box<[T]>>, size: usize) -> SafeResult<()>
where
    [T]: Zeroize,
{
    let Some(region) = slot.as_mut() else {
        tracing::debug!("secure release of empty slot");
        return Err(SafeError::null("release_secure"));
    };

    if size > region.len() {
        tracing::debug!(size, tracked = region.len(), "secure release size mismatch");
        return Err(SafeError::out_of_bounds("release_secure", size, region.len()));
    }

    secure_zero(region);
    *slot = None;
    Ok(())
}

/// Overwrites `buf` with zeros in a way the optimizer cannot remove.
pub fn secure_zero<T>(buf: &mut [T])
where
    [T]: Zeroize,
{
    buf.zeroize();
}
