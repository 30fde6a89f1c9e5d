//! Bounded memory copy and move.

use crate::error::{SafeError, SafeResult};
use std::ops::Range;

/// Whether a copy touched overlapping regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlap {
    /// Source and destination were disjoint.
    Disjoint,
    /// Source and destination overlapped; the copy used move semantics.
    Detected,
}

impl Overlap {
    /// Returns true if the regions overlapped.
    #[must_use]
    pub const fn is_detected(self) -> bool {
        matches!(self, Self::Detected)
    }
}

/// Copies all of `src` into the front of `dest`.
///
/// Capacity is `dest.len()`. Elements of `dest` past `src.len()` are left
/// untouched.
///
/// # Errors
///
/// Returns `OutOfBounds` if `src` is longer than `dest`.
pub fn copy<T: Copy>(dest: &mut [T], src: &[T]) -> SafeResult<()> {
    if src.len() > dest.len() {
        tracing::debug!(src = src.len(), capacity = dest.len(), "copy exceeds destination");
        return Err(SafeError::out_of_bounds("copy", src.len(), dest.len()));
    }
    dest[..src.len()].copy_from_slice(src);
    Ok(())
}

/// Copies `buf[src]` to the window `buf[dest..dest + dest_capacity]`.
///
/// The regions may overlap; the result is always what a copy through an
/// intermediate buffer would produce. Overlap is reported in the return value,
/// not as an error.
///
/// The overlap test compares the source range with the whole destination
/// window, not only the bytes written.
///
/// # Errors
///
/// - `OutOfBounds` if `src` or the destination window falls outside `buf`
/// - `OutOfBounds` if the source is longer than `dest_capacity`
pub fn copy_within<T: Copy>(
    buf: &mut [T],
    src: Range<usize>,
    dest: usize,
    dest_capacity: usize,
) -> SafeResult<Overlap> {
    if src.start > src.end || src.end > buf.len() {
        return Err(SafeError::out_of_bounds("copy_within", src.end, buf.len()));
    }
    let window_end = dest
        .checked_add(dest_capacity)
        .filter(|&end| end <= buf.len())
        .ok_or_else(|| {
            SafeError::out_of_bounds("copy_within", dest.saturating_add(dest_capacity), buf.len())
        })?;

    let len = src.end - src.start;
    if len > dest_capacity {
        tracing::debug!(len, dest_capacity, "copy_within exceeds destination");
        return Err(SafeError::out_of_bounds("copy_within", len, dest_capacity));
    }

    let overlap = if src.start < window_end && dest < src.end {
        tracing::debug!(?src, dest, "memory regions overlap, using move semantics");
        Overlap::Detected
    } else {
        Overlap::Disjoint
    };

    buf.copy_within(src, dest);
    Ok(overlap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use proptest::prelude::*;

    #[test]
    fn copy_fits() {
        let mut dest = [0u8; 8];
        copy(&mut dest, b"abc").unwrap();
        assert_eq!(&dest[..4], b"abc\0");
    }

    #[test]
    fn copy_exact_capacity() {
        let mut dest = [0u8; 3];
        copy(&mut dest, b"xyz").unwrap();
        assert_eq!(&dest, b"xyz");
    }

    #[test]
    fn copy_too_large() {
        let mut dest = [9u8; 2];
        let err = copy(&mut dest, b"xyz").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutOfBounds);
        assert_eq!(dest, [9, 9]);
    }

    #[test]
    fn copy_within_forward_overlap() {
        let mut buf = *b"abcdefgh";
        let overlap = copy_within(&mut buf, 0..4, 2, 6).unwrap();
        assert!(overlap.is_detected());
        assert_eq!(&buf, b"ababcdgh");
    }

    #[test]
    fn copy_within_backward_overlap() {
        let mut buf = *b"abcdefgh";
        let overlap = copy_within(&mut buf, 2..6, 0, 4).unwrap();
        assert_eq!(overlap, Overlap::Detected);
        assert_eq!(&buf, b"cdefefgh");
    }

    #[test]
    fn copy_within_disjoint() {
        let mut buf = *b"abcdefgh";
        let overlap = copy_within(&mut buf, 0..2, 6, 2).unwrap();
        assert_eq!(overlap, Overlap::Disjoint);
        assert_eq!(&buf, b"abcdefab");
    }

    #[test]
    fn copy_within_source_exceeds_window() {
        let mut buf = *b"abcdefgh";
        let err = copy_within(&mut buf, 0..4, 5, 3).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutOfBounds);
        assert_eq!(&buf, b"abcdefgh");
    }

    #[test]
    fn copy_within_window_outside_buffer() {
        let mut buf = *b"abcd";
        assert!(copy_within(&mut buf, 0..1, 3, 2).is_err());
        assert!(copy_within(&mut buf, 0..1, usize::MAX, 2).is_err());
        assert!(copy_within(&mut buf, 2..9, 0, 4).is_err());
    }

    proptest! {
        #[test]
        fn copy_within_matches_buffered_copy(
            data in prop::collection::vec(any::<u8>(), 1..64),
            a in any::<prop::sample::Index>(),
            b in any::<prop::sample::Index>(),
            d in any::<prop::sample::Index>(),
        ) {
            let (x, y) = (a.index(data.len() + 1), b.index(data.len() + 1));
            let src = x.min(y)..x.max(y);
            let dest = d.index(data.len() - src.len() + 1);
            let capacity = data.len() - dest;

            let mut expected = data.clone();
            let staged = data[src.clone()].to_vec();
            expected[dest..dest + staged.len()].copy_from_slice(&staged);

            let mut buf = data;
            let overlap = copy_within(&mut buf, src.clone(), dest, capacity).unwrap();
            prop_assert_eq!(buf, expected);
            let window = dest..dest + capacity;
            prop_assert_eq!(
                overlap.is_detected(),
                src.start < window.end && window.start < src.end
            );
        }
    }
}
