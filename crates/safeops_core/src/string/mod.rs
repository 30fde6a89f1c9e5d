//! Bounded operations on NUL-terminated strings.
//!
//! Every function is generic over [`CharUnit`], so narrow (`u8`) and wide
//! (`u16`/`u32`/`i32`) strings share one contract. A destination's capacity
//! is its slice length and always includes room for the terminator.
//! Truncation is never silent: an operation that would not fit fails and
//! leaves the destination unchanged.
//!
//! Source strings end at their first NUL, or at the end of the slice if they
//! have none, so both `b"text\0"` and `b"text"` are accepted.
//!
//! ```rust
//! use safeops_core::string;
//!
//! let mut buf = [0u8; 50];
//! string::copy(&mut buf, b"Hello, World!").unwrap();
//! string::concat(&mut buf, b" How are you?").unwrap();
//! let len = string::length(&buf, buf.len()).unwrap();
//! assert_eq!(string::find(&buf, len, b"World").unwrap(), 7);
//!
//! let len = string::replace(&mut buf, b"World", b"Everyone").unwrap();
//! assert_eq!(&buf[..len], b"Hello, Everyone! How are you?");
//! ```

mod unit;

pub use unit::{as_terminated, bounded_len, terminated_len, CharUnit};

use crate::error::{SafeError, SafeResult};
use unit::Matches;
use zeroize::Zeroizing;

fn unterminated(operation: &'static str, max_len: usize) -> SafeError {
    tracing::debug!(operation, max_len, "string not terminated");
    SafeError::Unterminated { operation, max_len }
}

/// Length of the terminated string already stored in a destination buffer.
fn existing_len<C: CharUnit>(operation: &'static str, dest: &[C]) -> SafeResult<usize> {
    dest.iter()
        .position(|&c| c == C::NUL)
        .ok_or_else(|| unterminated(operation, dest.len()))
}

/// Returns the length of `s`, which must be terminated within `max_len`.
///
/// A terminator at index `max_len` is accepted, so a string of exactly
/// `max_len` elements passes. The scan never leaves the slice.
///
/// # Errors
///
/// Returns `OutOfBounds` if no terminator appears at or before `max_len`.
pub fn length<C: CharUnit>(s: &[C], max_len: usize) -> SafeResult<usize> {
    let limit = max_len.saturating_add(1).min(s.len());
    s[..limit]
        .iter()
        .position(|&c| c == C::NUL)
        .ok_or_else(|| unterminated("length", max_len))
}

/// Copies `src` into `dest` and terminates it.
///
/// The rest of `dest` after the terminator is cleared. Returns the length of
/// the copied string.
///
/// # Errors
///
/// - `InvalidParam` if `dest` is empty
/// - `Overflow` if `src` plus its terminator does not fit
pub fn copy<C: CharUnit>(dest: &mut [C], src: &[C]) -> SafeResult<usize> {
    if dest.is_empty() {
        return Err(SafeError::invalid("copy", "destination capacity is 0"));
    }

    let src_len = terminated_len(src);
    if src_len >= dest.len() {
        tracing::debug!(src_len, capacity = dest.len(), "string copy would truncate");
        return Err(SafeError::Overflow {
            operation: "copy",
            detail: format!(
                "source length {src_len} does not fit capacity {}",
                dest.len()
            ),
        });
    }

    dest[..src_len].copy_from_slice(&src[..src_len]);
    dest[src_len..].fill(C::NUL);
    Ok(src_len)
}

/// Copies at most `count` elements of `src` into `dest` and terminates it.
///
/// Returns the number of elements copied, `min(count, len(src))`.
///
/// # Errors
///
/// - `InvalidParam` if `dest` is empty
/// - `OutOfBounds` if the copied elements plus terminator do not fit
pub fn copy_n<C: CharUnit>(dest: &mut [C], src: &[C], count: usize) -> SafeResult<usize> {
    if dest.is_empty() {
        return Err(SafeError::invalid("copy_n", "destination capacity is 0"));
    }

    let copy_len = bounded_len(src, count);
    if copy_len >= dest.len() {
        tracing::debug!(copy_len, capacity = dest.len(), "bounded copy exceeds destination");
        return Err(SafeError::out_of_bounds("copy_n", copy_len + 1, dest.len()));
    }

    dest[..copy_len].copy_from_slice(&src[..copy_len]);
    dest[copy_len] = C::NUL;
    Ok(copy_len)
}

fn append<C: CharUnit>(
    operation: &'static str,
    dest: &mut [C],
    src: &[C],
    append_len: usize,
) -> SafeResult<usize> {
    let dest_len = existing_len(operation, dest)?;
    let total = dest_len + append_len;
    if total >= dest.len() {
        tracing::debug!(dest_len, append_len, capacity = dest.len(), "concatenation would overflow");
        return Err(SafeError::out_of_bounds(operation, total + 1, dest.len()));
    }

    dest[dest_len..total].copy_from_slice(&src[..append_len]);
    dest[total] = C::NUL;
    Ok(total)
}

/// Appends `src` to the string in `dest`.
///
/// Returns the new length. On failure `dest` is unchanged.
///
/// # Errors
///
/// - `OutOfBounds` if `dest` holds no terminator
/// - `OutOfBounds` if the combined string plus terminator does not fit
pub fn concat<C: CharUnit>(dest: &mut [C], src: &[C]) -> SafeResult<usize> {
    append("concat", dest, src, terminated_len(src))
}

/// Appends at most `count` elements of `src` to the string in `dest`.
///
/// # Errors
///
/// See [`concat`].
pub fn concat_n<C: CharUnit>(dest: &mut [C], src: &[C], count: usize) -> SafeResult<usize> {
    append("concat_n", dest, src, bounded_len(src, count))
}

/// Finds the first occurrence of `needle` in the first `haystack_len`
/// elements of `haystack`.
///
/// The search also stops at a terminator inside that range. When the needle
/// is absent the result is `Ok(haystack_len)`; not finding it is not an
/// error.
///
/// # Errors
///
/// - `OutOfBounds` if `haystack_len` exceeds the slice
/// - `InvalidParam` if the needle is empty or longer than `haystack_len`
pub fn find<C: CharUnit>(haystack: &[C], haystack_len: usize, needle: &[C]) -> SafeResult<usize> {
    if haystack_len > haystack.len() {
        return Err(SafeError::out_of_bounds("find", haystack_len, haystack.len()));
    }

    let needle = as_terminated(needle);
    if needle.is_empty() || needle.len() > haystack_len {
        tracing::debug!(needle_len = needle.len(), haystack_len, "invalid needle length");
        return Err(SafeError::invalid("find", "invalid needle length"));
    }

    let text = as_terminated(&haystack[..haystack_len]);
    Ok(Matches::new(text, needle).next().unwrap_or(haystack_len))
}

/// Replaces every non-overlapping occurrence of `old` in the string stored
/// in `buf` with `new`.
///
/// The final length is computed before anything is written; if it does not
/// fit, `buf` is untouched. The result is assembled in a scratch buffer of
/// the same capacity, which is wiped afterwards, and copied back in one
/// step. Returns the new length (the old length when nothing matched).
///
/// # Errors
///
/// - `InvalidParam` if `old` is empty
/// - `OutOfBounds` if `buf` holds no terminator, or the result does not fit
/// - `Overflow` if the final length is not representable
/// - `AllocationFailed` if the scratch buffer cannot be allocated
pub fn replace<C: CharUnit>(buf: &mut [C], old: &[C], new: &[C]) -> SafeResult<usize> {
    let old = as_terminated(old);
    let new = as_terminated(new);
    if old.is_empty() {
        return Err(SafeError::invalid("replace", "empty string to replace"));
    }

    let len = existing_len("replace", buf)?;
    let count = Matches::new(&buf[..len], old).count();

    let overflow = || SafeError::Overflow {
        operation: "replace",
        detail: format!("{count} replacements of length {} in string of {len}", new.len()),
    };
    let final_len = (len - count * old.len())
        .checked_add(count.checked_mul(new.len()).ok_or_else(overflow)?)
        .ok_or_else(overflow)?;

    if final_len >= buf.len() {
        tracing::debug!(final_len, capacity = buf.len(), "replacement would overflow buffer");
        return Err(SafeError::out_of_bounds("replace", final_len + 1, buf.len()));
    }
    if count == 0 {
        return Ok(len);
    }

    let mut scratch: Zeroizing<Vec<C>> = Zeroizing::new(Vec::new());
    scratch
        .try_reserve_exact(buf.len())
        .map_err(|_| SafeError::AllocationFailed {
            size: buf.len() * std::mem::size_of::<C>(),
        })?;

    let mut read = 0;
    for start in Matches::new(&buf[..len], old) {
        scratch.extend_from_slice(&buf[read..start]);
        scratch.extend_from_slice(new);
        read = start + old.len();
    }
    scratch.extend_from_slice(&buf[read..len]);
    scratch.push(C::NUL);
    debug_assert_eq!(scratch.len(), final_len + 1);

    buf[..=final_len].copy_from_slice(&scratch);
    Ok(final_len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn wide(s: &str) -> Vec<u32> {
        s.chars().map(|c| c as u32).chain(std::iter::once(0)).collect()
    }

    #[test]
    fn length_within_limit() {
        assert_eq!(length(b"hello\0", 10).unwrap(), 5);
        assert_eq!(length(b"\0", 0).unwrap(), 0);
    }

    #[test]
    fn length_exactly_max() {
        assert_eq!(length(b"abc\0", 3).unwrap(), 3);
    }

    #[test]
    fn length_too_long() {
        let err = length(b"abcdef\0", 3).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutOfBounds);
    }

    #[test]
    fn length_unterminated_slice() {
        assert!(length(b"abc", 10).is_err());
    }

    #[test]
    fn copy_succeeds_below_capacity() {
        let mut dest = [0xffu8; 6];
        assert_eq!(copy(&mut dest, b"hello").unwrap(), 5);
        assert_eq!(&dest, b"hello\0");
    }

    #[test]
    fn copy_clears_tail() {
        let mut dest = *b"xxxxxxxx";
        copy(&mut dest, b"ab\0").unwrap();
        assert_eq!(&dest, b"ab\0\0\0\0\0\0");
    }

    #[test]
    fn copy_rejects_truncation() {
        let mut dest = [b'z'; 5];
        let err = copy(&mut dest, b"hello").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Overflow);
        assert_eq!(&dest, b"zzzzz");
    }

    #[test]
    fn copy_zero_capacity() {
        let mut dest: [u8; 0] = [];
        let err = copy(&mut dest, b"").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParam);
    }

    #[test]
    fn copy_n_takes_prefix() {
        let mut dest = [0xffu8; 4];
        assert_eq!(copy_n(&mut dest, b"hello", 3).unwrap(), 3);
        assert_eq!(&dest, b"hel\0");
    }

    #[test]
    fn copy_n_short_source() {
        let mut dest = [0xffu8; 8];
        assert_eq!(copy_n(&mut dest, b"hi\0", 6).unwrap(), 2);
        assert_eq!(&dest[..3], b"hi\0");
    }

    #[test]
    fn copy_n_no_room_for_terminator() {
        let mut dest = [0u8; 3];
        let err = copy_n(&mut dest, b"hello", 3).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutOfBounds);
    }

    #[test]
    fn concat_appends() {
        let mut dest = [0u8; 12];
        copy(&mut dest, b"foo").unwrap();
        assert_eq!(concat(&mut dest, b"bar").unwrap(), 6);
        assert_eq!(&dest[..7], b"foobar\0");
    }

    #[test]
    fn concat_boundary() {
        let mut dest = [0u8; 7];
        copy(&mut dest, b"foo").unwrap();
        assert!(concat(&mut dest, b"bar").is_ok());

        let mut dest = [0u8; 6];
        copy(&mut dest, b"foo").unwrap();
        let before = dest;
        let err = concat(&mut dest, b"bar").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutOfBounds);
        assert_eq!(dest, before);
    }

    #[test]
    fn concat_unterminated_destination() {
        let mut dest = *b"full";
        assert!(concat(&mut dest, b"x").is_err());
        assert_eq!(&dest, b"full");
    }

    #[test]
    fn concat_n_limits_append() {
        let mut dest = [0u8; 8];
        copy(&mut dest, b"ab").unwrap();
        assert_eq!(concat_n(&mut dest, b"cdefgh", 2).unwrap(), 4);
        assert_eq!(&dest[..5], b"abcd\0");
    }

    #[test]
    fn find_present_and_absent() {
        let hay = b"Hello, World!";
        assert_eq!(find(hay, hay.len(), b"World").unwrap(), 7);
        assert_eq!(find(hay, hay.len(), b"Hello").unwrap(), 0);
        assert_eq!(find(hay, hay.len(), b"xyz").unwrap(), hay.len());
    }

    #[test]
    fn find_stops_at_haystack_len() {
        let hay = b"abcdef";
        assert_eq!(find(hay, 4, b"ef").unwrap(), 4);
    }

    #[test]
    fn find_rejects_bad_needles() {
        let hay = b"abc";
        assert_eq!(find(hay, 3, b"").unwrap_err().kind(), ErrorKind::InvalidParam);
        assert_eq!(find(hay, 3, b"abcd").unwrap_err().kind(), ErrorKind::InvalidParam);
        assert_eq!(find(hay, 4, b"a").unwrap_err().kind(), ErrorKind::OutOfBounds);
    }

    #[test]
    fn replace_grows_string() {
        let mut buf = [0u8; 50];
        copy(&mut buf, b"Hello, World! How are you?").unwrap();
        let len = replace(&mut buf, b"World", b"Everyone").unwrap();
        assert_eq!(len, 29);
        assert_eq!(&buf[..=len], b"Hello, Everyone! How are you?\0");
    }

    #[test]
    fn replace_shrinks_string() {
        let mut buf = [0u8; 16];
        copy(&mut buf, b"a--b--c").unwrap();
        let len = replace(&mut buf, b"--", b"-").unwrap();
        assert_eq!(&buf[..=len], b"a-b-c\0");
    }

    #[test]
    fn replace_without_match_is_noop() {
        let mut buf = [0u8; 8];
        copy(&mut buf, b"abc").unwrap();
        let before = buf;
        assert_eq!(replace(&mut buf, b"zz", b"y").unwrap(), 3);
        assert_eq!(buf, before);
    }

    #[test]
    fn replace_that_does_not_fit_leaves_buffer() {
        let mut buf = [0u8; 8];
        copy(&mut buf, b"aaaa").unwrap();
        let before = buf;
        let err = replace(&mut buf, b"a", b"bb").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutOfBounds);
        assert_eq!(buf, before);
    }

    #[test]
    fn replace_empty_pattern() {
        let mut buf = [0u8; 8];
        copy(&mut buf, b"abc").unwrap();
        assert_eq!(
            replace(&mut buf, b"", b"x").unwrap_err().kind(),
            ErrorKind::InvalidParam
        );
    }

    #[test]
    fn replace_with_empty_deletes() {
        let mut buf = [0u8; 8];
        copy(&mut buf, b"a.b.c").unwrap();
        let len = replace(&mut buf, b".", b"").unwrap();
        assert_eq!(&buf[..=len], b"abc\0");
    }

    #[test]
    fn wide_strings_share_contract() {
        let mut dest = vec![0u32; 8];
        assert_eq!(copy(&mut dest, &wide("héllo")).unwrap(), 5);
        assert_eq!(length(&dest, dest.len()).unwrap(), 5);
        assert!(concat(&mut dest, &wide("!!")).is_ok());
        assert!(concat(&mut dest, &wide("?")).is_err());
        assert_eq!(&dest[..8], wide("héllo!!").as_slice());

        let mut small = vec![0u32; 3];
        assert_eq!(copy_n(&mut small, &wide("wide"), 2).unwrap(), 2);
        assert_eq!(concat_n(&mut small, &wide("x"), 1).unwrap_err().kind(), ErrorKind::OutOfBounds);
    }

    #[test]
    fn utf16_units() {
        let src: Vec<u16> = "ok".encode_utf16().chain(std::iter::once(0)).collect();
        let mut dest = [0u16; 4];
        assert_eq!(copy(&mut dest, &src).unwrap(), 2);
        assert_eq!(find(&dest, 2, &src[1..]).unwrap(), 1);
    }
}
