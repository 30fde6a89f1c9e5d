//! Overflow-checked integer arithmetic and narrowing casts.
//!
//! Each function returns the mathematically exact result or an error; nothing
//! wraps or saturates.

use crate::error::{SafeError, SafeResult};
use std::fmt::Display;

/// Primitive integers with checked operations.
pub trait CheckedInt: Copy + Display + PartialEq {
    /// The additive identity.
    const ZERO: Self;

    /// Checked addition.
    fn checked_add(self, rhs: Self) -> Option<Self>;
    /// Checked subtraction.
    fn checked_sub(self, rhs: Self) -> Option<Self>;
    /// Checked multiplication.
    fn checked_mul(self, rhs: Self) -> Option<Self>;
    /// Checked division; `None` for a zero divisor or `MIN / -1`.
    fn checked_div(self, rhs: Self) -> Option<Self>;
    /// Checked remainder; `None` for a zero divisor or `MIN % -1`.
    fn checked_rem(self, rhs: Self) -> Option<Self>;
}

macro_rules! impl_checked_int {
    ($($t:ty),* $(,)?) => {$(
        impl CheckedInt for $t {
            const ZERO: Self = 0;

            fn checked_add(self, rhs: Self) -> Option<Self> {
                <$t>::checked_add(self, rhs)
            }

            fn checked_sub(self, rhs: Self) -> Option<Self> {
                <$t>::checked_sub(self, rhs)
            }

            fn checked_mul(self, rhs: Self) -> Option<Self> {
                <$t>::checked_mul(self, rhs)
            }

            fn checked_div(self, rhs: Self) -> Option<Self> {
                <$t>::checked_div(self, rhs)
            }

            fn checked_rem(self, rhs: Self) -> Option<Self> {
                <$t>::checked_rem(self, rhs)
            }
        }
    )*};
}

impl_checked_int!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

fn overflow<T: Display>(operation: &'static str, symbol: &str, a: T, b: T) -> SafeError {
    tracing::debug!(operation, "{a} {symbol} {b} overflows");
    SafeError::Overflow {
        operation,
        detail: format!("{a} {symbol} {b}"),
    }
}

/// Returns `a + b`.
///
/// # Errors
///
/// Returns `Overflow` if the sum is not representable.
pub fn add<T: CheckedInt>(a: T, b: T) -> SafeResult<T> {
    a.checked_add(b).ok_or_else(|| overflow("add", "+", a, b))
}

/// Returns `a - b`.
///
/// # Errors
///
/// Returns `Overflow` if the difference is not representable.
pub fn sub<T: CheckedInt>(a: T, b: T) -> SafeResult<T> {
    a.checked_sub(b).ok_or_else(|| overflow("sub", "-", a, b))
}

/// Returns `a * b`.
///
/// # Errors
///
/// Returns `Overflow` if the product is not representable.
pub fn mul<T: CheckedInt>(a: T, b: T) -> SafeResult<T> {
    a.checked_mul(b).ok_or_else(|| overflow("mul", "*", a, b))
}

/// Returns `a / b`, truncated toward zero.
///
/// # Errors
///
/// - `InvalidParam` if `b` is zero
/// - `Overflow` for `MIN / -1`
pub fn div<T: CheckedInt>(a: T, b: T) -> SafeResult<T> {
    if b == T::ZERO {
        return Err(SafeError::invalid("div", "division by zero"));
    }
    a.checked_div(b).ok_or_else(|| overflow("div", "/", a, b))
}

/// Returns `a % b`.
///
/// # Errors
///
/// - `InvalidParam` if `b` is zero
/// - `Overflow` for `MIN % -1`
pub fn rem<T: CheckedInt>(a: T, b: T) -> SafeResult<T> {
    if b == T::ZERO {
        return Err(SafeError::invalid("rem", "division by zero"));
    }
    a.checked_rem(b).ok_or_else(|| overflow("rem", "%", a, b))
}

/// Converts `value` to a narrower integer type without losing information.
///
/// ```rust
/// use safeops_core::arith::narrow;
///
/// let small: i32 = narrow(1234_i64).unwrap();
/// assert_eq!(small, 1234);
/// assert!(narrow::<i64, i32>(i64::MAX).is_err());
/// ```
///
/// # Errors
///
/// Returns `Overflow` if `value` is outside the target's range.
pub fn narrow<W, N>(value: W) -> SafeResult<N>
where
    W: Copy + Display,
    N: TryFrom<W>,
{
    N::try_from(value).map_err(|_| {
        tracing::debug!("{value} does not fit {}", std::any::type_name::<N>());
        SafeError::Overflow {
            operation: "narrow",
            detail: format!("{value} out of range for {}", std::any::type_name::<N>()),
        }
    })
}
