//! Character units for terminated strings.

use std::fmt;
use zeroize::DefaultIsZeroes;

/// An element of a NUL-terminated string.
///
/// Implemented for `u8` (narrow strings) and for `u16`, `u32` and `i32`, which
/// cover every platform's `wchar_t`.
pub trait CharUnit: DefaultIsZeroes + Eq + fmt::Debug {
    /// The terminator value.
    const NUL: Self;
}

impl CharUnit for u8 {
    const NUL: Self = 0;
}

impl CharUnit for u16 {
    const NUL: Self = 0;
}

impl CharUnit for u32 {
    const NUL: Self = 0;
}

impl CharUnit for i32 {
    const NUL: Self = 0;
}

/// Length of the logical string in `s`: the index of the first NUL, or the
/// slice length when there is none.
pub fn terminated_len<C: CharUnit>(s: &[C]) -> usize {
    s.iter().position(|&c| c == C::NUL).unwrap_or(s.len())
}

/// Like [`terminated_len`] but never looks past `limit` elements.
pub fn bounded_len<C: CharUnit>(s: &[C], limit: usize) -> usize {
    let limit = limit.min(s.len());
    s[..limit]
        .iter()
        .position(|&c| c == C::NUL)
        .unwrap_or(limit)
}

/// Returns the logical string in `s`, without its terminator.
pub fn as_terminated<C: CharUnit>(s: &[C]) -> &[C] {
    &s[..terminated_len(s)]
}

/// Iterator over the start offsets of non-overlapping matches of a pattern.
pub(crate) struct Matches<'a, C> {
    text: &'a [C],
    pattern: &'a [C],
    pos: usize,
}

impl<'a, C: CharUnit> Matches<'a, C> {
    /// `pattern` must not be empty.
    pub(crate) fn new(text: &'a [C], pattern: &'a [C]) -> Self {
        debug_assert!(!pattern.is_empty());
        Self {
            text,
            pattern,
            pos: 0,
        }
    }
}

impl<C: CharUnit> Iterator for Matches<'_, C> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let rest = self.text.get(self.pos..)?;
        let offset = rest
            .windows(self.pattern.len())
            .position(|w| w == self.pattern)?;
        let start = self.pos + offset;
        self.pos = start + self.pattern.len();
        Some(start)
    }
}
