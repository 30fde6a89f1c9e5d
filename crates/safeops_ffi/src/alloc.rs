//! Tracked allocation.
//!
//! Every block is preceded by a [`HEADER_SIZE`]-byte header holding the
//! requested size, so `safe_free_typed` can check the size its caller claims
//! and wipe the whole block.

use crate::error::{null_argument, record, RecordExt};
use safeops_core::alloc::{validate_size, HEADER_SIZE};
use safeops_core::SafeError;
use std::alloc::Layout;
use std::ffi::c_void;
use std::ptr;
use zeroize::Zeroize;

const ALIGN: usize = HEADER_SIZE;

fn layout_for(size: usize) -> Option<Layout> {
    Layout::from_size_align(HEADER_SIZE + size, ALIGN).ok()
}

/// Allocates a tracked block and returns the user pointer, or null.
#[track_caller]
fn allocate(size: usize, zeroed: bool) -> *mut c_void {
    if validate_size(size).recorded().is_none() {
        return ptr::null_mut();
    }
    let Some(layout) = layout_for(size) else {
        record(&SafeError::Overflow {
            operation: "allocate",
            detail: format!("{size} bytes plus {HEADER_SIZE} header bytes"),
        });
        return ptr::null_mut();
    };

    // Safety: the layout has a non-zero size.
    let block = unsafe {
        if zeroed {
            std::alloc::alloc_zeroed(layout)
        } else {
            std::alloc::alloc(layout)
        }
    };
    if block.is_null() {
        tracing::debug!(size, "allocator refused request");
        record(&SafeError::AllocationFailed { size });
        return ptr::null_mut();
    }

    // Safety: the block is at least HEADER_SIZE bytes and 16-aligned.
    unsafe {
        block.cast::<usize>().write(size);
        block.add(HEADER_SIZE).cast()
    }
}

/// Reads the tracked size of a block returned by [`allocate`].
///
/// # Safety
///
/// `user` must come from `safe_malloc` or `safe_malloc_uninitialized` and not
/// have been freed.
unsafe fn tracked_size(user: *mut c_void) -> (*mut u8, usize) {
    let block = user.cast::<u8>().sub(HEADER_SIZE);
    (block, block.cast::<usize>().read())
}

/// Releases a tracked block.
///
/// # Safety
///
/// Same as [`tracked_size`].
unsafe fn deallocate(block: *mut u8, size: usize) {
    if let Some(layout) = layout_for(size) {
        std::alloc::dealloc(block, layout);
    }
}

/// Allocates `size` zero-initialized bytes.
///
/// Returns null on failure: `InvalidParam` for a zero size, `Overflow` if the
/// size plus header is not representable, `AllocationFailed` if the allocator
/// refuses. Release with `safe_free` or `safe_free_typed`.
#[no_mangle]
pub extern "C" fn safe_malloc(size: usize) -> *mut c_void {
    allocate(size, true)
}

/// Allocates `size` bytes without initializing them.
///
/// Fails the same way as [`safe_malloc`].
#[no_mangle]
pub extern "C" fn safe_malloc_uninitialized(size: usize) -> *mut c_void {
    allocate(size, false)
}

/// Frees the block `*ptr_ref` points to and sets `*ptr_ref` to null.
///
/// Null `ptr_ref` or null `*ptr_ref` is a no-op, so freeing twice is harmless.
///
/// # Safety
///
/// `ptr_ref` must be null or valid for reads and writes, and `*ptr_ref` must
/// be null or a live block from this library's allocation functions.
#[no_mangle]
pub unsafe extern "C" fn safe_free(ptr_ref: *mut *mut c_void) {
    if ptr_ref.is_null() || (*ptr_ref).is_null() {
        return;
    }
    let (block, size) = tracked_size(*ptr_ref);
    deallocate(block, size);
    *ptr_ref = ptr::null_mut();
}

/// Wipes and frees the block `*ptr_ref` points to, then sets `*ptr_ref` to
/// null.
///
/// `size` is what the caller believes the block holds. A size larger than
/// the tracked allocation fails with `OutOfBounds` and frees nothing. The
/// wipe always covers the full tracked size and cannot be elided.
///
/// # Safety
///
/// Same as [`safe_free`].
#[no_mangle]
pub unsafe extern "C" fn safe_free_typed(ptr_ref: *mut *mut c_void, size: usize) -> bool {
    if ptr_ref.is_null() || (*ptr_ref).is_null() {
        null_argument("safe_free_typed");
        return false;
    }

    let (block, tracked) = tracked_size(*ptr_ref);
    if size > tracked {
        tracing::warn!(size, tracked, "free size exceeds tracked allocation");
        record(&SafeError::OutOfBounds {
            operation: "safe_free_typed",
            required: size,
            capacity: tracked,
        });
        return false;
    }

    std::slice::from_raw_parts_mut((*ptr_ref).cast::<u8>(), tracked).zeroize();
    deallocate(block, tracked);
    *ptr_ref = ptr::null_mut();
    true
}
