//! Property-based test generators using proptest.
//!
//! Strings are generated without interior NULs so their logical length is
//! their `Vec` length; helpers turn them into terminated buffers.

use proptest::prelude::*;

/// Strategy for narrow string contents (no NUL) of up to `max_len` bytes.
pub fn text_strategy(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(1u8..=255, 0..=max_len)
}

/// Strategy for non-empty narrow strings drawn from a small alphabet, so
/// searches and replacements actually hit.
pub fn pattern_strategy(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(prop::sample::select(b"abc".to_vec()), 1..=max_len.max(1))
}

/// Strategy for wide string contents (no NUL, valid scalar values).
pub fn wide_text_strategy(max_len: usize) -> impl Strategy<Value = Vec<u32>> {
    prop::collection::vec(any::<char>(), 0..=max_len)
        .prop_map(|chars| chars.into_iter().filter(|&c| c != '\0').map(u32::from).collect())
}

/// Strategy for buffer capacities in `1..=max`.
pub fn capacity_strategy(max: usize) -> impl Strategy<Value = usize> {
    1..=max.max(1)
}

/// Strategy for valid `fopen`-style mode strings.
pub fn mode_strategy() -> impl Strategy<Value = String> {
    (
        prop::sample::select(vec!["r", "w", "a", "wx"]),
        any::<bool>(),
        prop::sample::select(vec!["", "b", "t"]),
    )
        .prop_map(|(base, plus, suffix)| {
            format!("{base}{}{suffix}", if plus { "+" } else { "" })
        })
}

/// Strategy for `i32` values biased toward the edges of the range.
pub fn i32_strategy() -> impl Strategy<Value = i32> {
    let edge = prop_oneof![
        Just(i32::MIN),
        Just(i32::MIN + 1),
        Just(-1),
        Just(0),
        Just(1),
        Just(i32::MAX - 1),
        Just(i32::MAX),
    ];
    prop_oneof![2 => any::<i32>(), 1 => edge]
}

/// Strategy for operand pairs for binary arithmetic.
pub fn i32_operands() -> impl Strategy<Value = (i32, i32)> {
    (i32_strategy(), i32_strategy())
}

/// Returns `text` followed by a terminator.
#[must_use]
pub fn terminated(text: &[u8]) -> Vec<u8> {
    let mut s = text.to_vec();
    s.push(0);
    s
}

/// Returns a zeroed buffer of `capacity` holding `text` and its terminator.
///
/// # Panics
///
/// If `text` plus terminator does not fit.
#[must_use]
pub fn filled_buffer(text: &[u8], capacity: usize) -> Vec<u8> {
    assert!(text.len() < capacity, "text does not fit capacity");
    let mut buf = vec![0u8; capacity];
    buf[..text.len()].copy_from_slice(text);
    buf
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Creates a configuration for thorough tests.
    #[must_use]
    pub fn thorough() -> Self {
        Self {
            cases: 1024,
            max_shrink_iters: 10000,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}
