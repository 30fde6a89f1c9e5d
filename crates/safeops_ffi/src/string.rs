//! Bounded narrow and wide string functions.
//!
//! Each export checks its pointers, turns them into slices and calls the
//! matching `safeops_core::string` function. Source and destination may not
//! share memory; overlapping arguments fail with `InvalidParam` before
//! anything is read into a slice.

use crate::error::{fits_slice, null_argument, record, RecordExt};
use safeops_core::string::{self, CharUnit};
use safeops_core::{SafeError, SafeResult};
use std::ffi::c_char;
use std::mem::size_of;
use std::slice;

/// Wide character type of the host C library.
pub type WChar = libc::wchar_t;

/// Counts elements before the first NUL, looking at no more than `limit`.
///
/// # Safety
///
/// `p` must be readable up to its terminator or `limit` elements, whichever
/// comes first.
unsafe fn scan<C: CharUnit>(p: *const C, limit: usize) -> usize {
    let mut n = 0;
    while n < limit && *p.add(n) != C::NUL {
        n += 1;
    }
    n
}

/// Number of elements occupied by a terminated string, terminator included.
unsafe fn terminated_span<C: CharUnit>(p: *const C) -> usize {
    scan(p, usize::MAX) + 1
}

fn spans_overlap<C>(a: *const C, a_len: usize, b: *const C, b_len: usize) -> bool {
    let (a, b) = (a as usize, b as usize);
    let a_end = a.saturating_add(a_len.saturating_mul(size_of::<C>()));
    let b_end = b.saturating_add(b_len.saturating_mul(size_of::<C>()));
    a < b_end && b < a_end
}

#[track_caller]
fn overlapping(operation: &'static str) -> bool {
    tracing::debug!(operation, "string arguments overlap");
    record(&SafeError::InvalidParam {
        operation,
        reason: "source and destination overlap",
    });
    false
}

/// Runs `op` over a destination buffer and a source of `src_len` elements.
#[track_caller]
unsafe fn with_dest_src<C: CharUnit>(
    operation: &'static str,
    dest: *mut C,
    dest_size: usize,
    src: *const C,
    src_len: usize,
    op: impl FnOnce(&mut [C], &[C]) -> SafeResult<usize>,
) -> bool {
    if !fits_slice::<C>(operation, dest_size) {
        return false;
    }
    if spans_overlap(dest.cast_const(), dest_size, src, src_len) {
        return overlapping(operation);
    }
    let dest = slice::from_raw_parts_mut(dest, dest_size);
    let src = slice::from_raw_parts(src, src_len);
    op(dest, src).recorded().is_some()
}

#[track_caller]
unsafe fn str_len<C: CharUnit>(
    operation: &'static str,
    s: *const C,
    max_len: usize,
    out_len: *mut usize,
) -> bool {
    if s.is_null() || out_len.is_null() {
        null_argument(operation);
        return false;
    }
    let limit = max_len.saturating_add(1);
    let seen = scan(s, limit);
    // Include the terminator when there is one inside the window.
    let visible = if seen < limit { seen + 1 } else { seen };
    match string::length(slice::from_raw_parts(s, visible), max_len).recorded() {
        Some(len) => {
            *out_len = len;
            true
        }
        None => false,
    }
}

#[track_caller]
unsafe fn str_copy<C: CharUnit>(
    operation: &'static str,
    dest: *mut C,
    dest_size: usize,
    src: *const C,
) -> bool {
    if dest.is_null() || src.is_null() {
        null_argument(operation);
        return false;
    }
    let src_len = terminated_span(src);
    with_dest_src(operation, dest, dest_size, src, src_len, string::copy)
}

#[track_caller]
unsafe fn str_ncopy<C: CharUnit>(
    operation: &'static str,
    dest: *mut C,
    dest_size: usize,
    src: *const C,
    count: usize,
) -> bool {
    if dest.is_null() || src.is_null() {
        null_argument(operation);
        return false;
    }
    let src_len = scan(src, count);
    with_dest_src(operation, dest, dest_size, src, src_len, |d, s| {
        string::copy_n(d, s, count)
    })
}

#[track_caller]
unsafe fn str_cat<C: CharUnit>(
    operation: &'static str,
    dest: *mut C,
    dest_size: usize,
    src: *const C,
) -> bool {
    if dest.is_null() || src.is_null() {
        null_argument(operation);
        return false;
    }
    let src_len = terminated_span(src);
    with_dest_src(operation, dest, dest_size, src, src_len, string::concat)
}

#[track_caller]
unsafe fn str_ncat<C: CharUnit>(
    operation: &'static str,
    dest: *mut C,
    dest_size: usize,
    src: *const C,
    count: usize,
) -> bool {
    if dest.is_null() || src.is_null() {
        null_argument(operation);
        return false;
    }
    let src_len = scan(src, count);
    with_dest_src(operation, dest, dest_size, src, src_len, |d, s| {
        string::concat_n(d, s, count)
    })
}

#[track_caller]
unsafe fn str_find<C: CharUnit>(
    operation: &'static str,
    haystack: *const C,
    haystack_len: usize,
    needle: *const C,
    out_pos: *mut usize,
) -> bool {
    if haystack.is_null() || needle.is_null() || out_pos.is_null() {
        null_argument(operation);
        return false;
    }

    let needle = slice::from_raw_parts(needle, scan(needle, usize::MAX));
    if needle.is_empty() || needle.len() > haystack_len {
        record(&SafeError::InvalidParam {
            operation,
            reason: "invalid needle length",
        });
        return false;
    }

    // The haystack may end before `haystack_len`; not found still reports
    // `haystack_len`.
    let text_len = scan(haystack, haystack_len);
    let text = slice::from_raw_parts(haystack, text_len);
    let pos = if needle.len() > text_len {
        haystack_len
    } else {
        match string::find(text, text_len, needle).recorded() {
            Some(pos) if pos == text_len => haystack_len,
            Some(pos) => pos,
            None => return false,
        }
    };
    *out_pos = pos;
    true
}

#[track_caller]
unsafe fn str_replace<C: CharUnit>(
    operation: &'static str,
    s: *mut C,
    size: usize,
    old: *const C,
    new: *const C,
    out_len: *mut usize,
) -> bool {
    if s.is_null() || old.is_null() || new.is_null() || out_len.is_null() {
        null_argument(operation);
        return false;
    }
    if !fits_slice::<C>(operation, size) {
        return false;
    }
    let old_len = terminated_span(old);
    let new_len = terminated_span(new);
    let buf = s.cast_const();
    if spans_overlap(buf, size, old, old_len) || spans_overlap(buf, size, new, new_len) {
        return overlapping(operation);
    }

    let buf = slice::from_raw_parts_mut(s, size);
    let old = slice::from_raw_parts(old, old_len);
    let new = slice::from_raw_parts(new, new_len);
    match string::replace(buf, old, new).recorded() {
        Some(len) => {
            *out_len = len;
            true
        }
        None => false,
    }
}

/// Stores the length of `s` in `*out_len`.
///
/// The terminator may sit at index `max_len` at the latest; otherwise the
/// call fails with `OutOfBounds`. No more than `max_len + 1` characters are
/// read.
///
/// # Safety
///
/// `s` must be readable up to its terminator or `max_len + 1` characters.
/// `out_len` must be writable.
#[no_mangle]
pub unsafe extern "C" fn safe_str_len(s: *const c_char, max_len: usize, out_len: *mut usize) -> bool {
    str_len("safe_str_len", s.cast::<u8>(), max_len, out_len)
}

/// Copies `src` into `dest` (capacity `dest_size`, terminator included) and
/// zero-fills the rest of `dest`.
///
/// Fails with `Overflow` if `src` does not fit, leaving `dest` unchanged.
///
/// # Safety
///
/// `dest` must be writable for `dest_size` bytes and `src` terminated.
#[no_mangle]
pub unsafe extern "C" fn safe_str_copy(dest: *mut c_char, dest_size: usize, src: *const c_char) -> bool {
    str_copy("safe_str_copy", dest.cast::<u8>(), dest_size, src.cast::<u8>())
}

/// Copies at most `count` characters of `src` into `dest` and terminates it.
///
/// Fails with `OutOfBounds` if the copied text plus terminator exceeds
/// `dest_size`.
///
/// # Safety
///
/// `dest` must be writable for `dest_size` bytes and `src` readable up to its
/// terminator or `count` bytes.
#[no_mangle]
pub unsafe extern "C" fn safe_str_ncopy(
    dest: *mut c_char,
    dest_size: usize,
    src: *const c_char,
    count: usize,
) -> bool {
    str_ncopy("safe_str_ncopy", dest.cast::<u8>(), dest_size, src.cast::<u8>(), count)
}

/// Appends `src` to the string in `dest`.
///
/// Fails with `OutOfBounds` if the result does not fit; `dest` is unchanged.
///
/// # Safety
///
/// `dest` must be writable for `dest_size` bytes and `src` terminated.
#[no_mangle]
pub unsafe extern "C" fn safe_str_cat(dest: *mut c_char, dest_size: usize, src: *const c_char) -> bool {
    str_cat("safe_str_cat", dest.cast::<u8>(), dest_size, src.cast::<u8>())
}

/// Appends at most `count` characters of `src` to the string in `dest`.
///
/// # Safety
///
/// As for [`safe_str_ncopy`].
#[no_mangle]
pub unsafe extern "C" fn safe_str_ncat(
    dest: *mut c_char,
    dest_size: usize,
    src: *const c_char,
    count: usize,
) -> bool {
    str_ncat("safe_str_ncat", dest.cast::<u8>(), dest_size, src.cast::<u8>(), count)
}

/// Stores the index of the first occurrence of `needle` in the first
/// `haystack_len` characters of `haystack`, or `haystack_len` if there is
/// none.
///
/// Fails with `InvalidParam` if the needle is empty or longer than
/// `haystack_len`.
///
/// # Safety
///
/// `haystack` must be readable up to its terminator or `haystack_len` bytes,
/// `needle` terminated and `out_pos` writable.
#[no_mangle]
pub unsafe extern "C" fn safe_str_find(
    haystack: *const c_char,
    haystack_len: usize,
    needle: *const c_char,
    out_pos: *mut usize,
) -> bool {
    str_find(
        "safe_str_find",
        haystack.cast::<u8>(),
        haystack_len,
        needle.cast::<u8>(),
        out_pos,
    )
}

/// Replaces every non-overlapping `old_str` in `s` with `new_str` and stores
/// the new length.
///
/// If the result would not fit in `size` bytes the call fails with
/// `OutOfBounds` and `s` is unchanged.
///
/// # Safety
///
/// `s` must be writable for `size` bytes, `old_str` and `new_str` terminated
/// and `out_len` writable.
#[no_mangle]
pub unsafe extern "C" fn safe_str_replace(
    s: *mut c_char,
    size: usize,
    old_str: *const c_char,
    new_str: *const c_char,
    out_len: *mut usize,
) -> bool {
    str_replace(
        "safe_str_replace",
        s.cast::<u8>(),
        size,
        old_str.cast::<u8>(),
        new_str.cast::<u8>(),
        out_len,
    )
}

/// Wide version of [`safe_str_len`]; `max_len` counts characters.
///
/// # Safety
///
/// As for [`safe_str_len`], in `wchar_t` units.
#[no_mangle]
pub unsafe extern "C" fn safe_wstr_len(s: *const WChar, max_len: usize, out_len: *mut usize) -> bool {
    str_len("safe_wstr_len", s, max_len, out_len)
}

/// Wide version of [`safe_str_copy`]; `dest_size` counts characters.
///
/// # Safety
///
/// As for [`safe_str_copy`], in `wchar_t` units.
#[no_mangle]
pub unsafe extern "C" fn safe_wstr_copy(dest: *mut WChar, dest_size: usize, src: *const WChar) -> bool {
    str_copy("safe_wstr_copy", dest, dest_size, src)
}

/// Wide version of [`safe_str_ncopy`].
///
/// # Safety
///
/// As for [`safe_str_ncopy`], in `wchar_t` units.
#[no_mangle]
pub unsafe extern "C" fn safe_wstr_ncopy(
    dest: *mut WChar,
    dest_size: usize,
    src: *const WChar,
    count: usize,
) -> bool {
    str_ncopy("safe_wstr_ncopy", dest, dest_size, src, count)
}

/// Wide version of [`safe_str_cat`].
///
/// # Safety
///
/// As for [`safe_str_cat`], in `wchar_t` units.
#[no_mangle]
pub unsafe extern "C" fn safe_wstr_cat(dest: *mut WChar, dest_size: usize, src: *const WChar) -> bool {
    str_cat("safe_wstr_cat", dest, dest_size, src)
}

/// Wide version of [`safe_str_ncat`].
///
/// # Safety
///
/// As for [`safe_str_ncat`], in `wchar_t` units.
#[no_mangle]
pub unsafe extern "C" fn safe_wstr_ncat(
    dest: *mut WChar,
    dest_size: usize,
    src: *const WChar,
    count: usize,
) -> bool {
    str_ncat("safe_wstr_ncat", dest, dest_size, src, count)
}

/// Wide version of [`safe_str_find`].
///
/// # Safety
///
/// As for [`safe_str_find`], in `wchar_t` units.
#[no_mangle]
pub unsafe extern "C" fn safe_wstr_find(
    haystack: *const WChar,
    haystack_len: usize,
    needle: *const WChar,
    out_pos: *mut usize,
) -> bool {
    str_find("safe_wstr_find", haystack, haystack_len, needle, out_pos)
}

/// Wide version of [`safe_str_replace`].
///
/// # Safety
///
/// As for [`safe_str_replace`], in `wchar_t` units.
#[no_mangle]
pub unsafe extern "C" fn safe_wstr_replace(
    s: *mut WChar,
    size: usize,
    old_str: *const WChar,
    new_str: *const WChar,
    out_len: *mut usize,
) -> bool {
    str_replace("safe_wstr_replace", s, size, old_str, new_str, out_len)
}
