//! Error types for bounded operations.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for bounded operations.
pub type SafeResult<T> = Result<T, SafeError>;

/// Flat classification of a failure.
///
/// Every [`SafeError`] maps to exactly one kind. The numeric order matches the
/// C ABI codes, with [`ErrorKind::None`] reserved for "nothing recorded".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// No error recorded.
    None,
    /// A required pointer or handle was absent.
    NullPointer,
    /// An index, length or offset exceeded its capacity.
    OutOfBounds,
    /// An arithmetic result or size could not be represented.
    Overflow,
    /// An argument was rejected before any work was done.
    InvalidParam,
    /// The allocator refused the request.
    AllocationFailed,
    /// A file could not be opened, validated or closed.
    FileAccess,
    /// Source and destination regions overlap (informational).
    Overlap,
    /// Anything else.
    Unknown,
}

impl ErrorKind {
    /// Returns a short, stable name for the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::NullPointer => "null-pointer",
            Self::OutOfBounds => "out-of-bounds",
            Self::Overflow => "overflow",
            Self::InvalidParam => "invalid-parameter",
            Self::AllocationFailed => "allocation-failed",
            Self::FileAccess => "file-access",
            Self::Overlap => "overlap",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned by bounded operations.
#[derive(Debug, Error)]
pub enum SafeError {
    /// A required pointer or handle was absent.
    #[error("null pointer in {operation}")]
    NullPointer {
        /// The operation that received the null argument.
        operation: &'static str,
    },

    /// A write or read would exceed the available capacity.
    #[error("{operation}: {required} exceeds capacity {capacity}")]
    OutOfBounds {
        /// The operation that was rejected.
        operation: &'static str,
        /// Elements (or bytes) the operation needed.
        required: usize,
        /// Elements (or bytes) available.
        capacity: usize,
    },

    /// A string had no terminator within the permitted length.
    #[error("{operation}: string is not terminated within {max_len} elements")]
    Unterminated {
        /// The operation that scanned the string.
        operation: &'static str,
        /// The scan limit.
        max_len: usize,
    },

    /// An arithmetic result could not be represented in the target type.
    #[error("{operation} overflow: {detail}")]
    Overflow {
        /// The arithmetic operation.
        operation: &'static str,
        /// The operands that overflowed.
        detail: String,
    },

    /// An argument was rejected.
    #[error("invalid parameter in {operation}: {reason}")]
    InvalidParam {
        /// The operation that rejected the argument.
        operation: &'static str,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// The allocator could not satisfy the request.
    #[error("allocation of {size} bytes failed")]
    AllocationFailed {
        /// The requested size.
        size: usize,
    },

    /// A file could not be opened, validated or closed.
    #[error("file access failed for {}: {reason}", path.display())]
    FileAccess {
        /// The path that was being accessed.
        path: PathBuf,
        /// What went wrong.
        reason: &'static str,
        /// The underlying OS error, when there is one.
        #[source]
        source: Option<io::Error>,
    },
}

impl SafeError {
    /// Returns the taxonomy kind for this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NullPointer { .. } => ErrorKind::NullPointer,
            Self::OutOfBounds { .. } | Self::Unterminated { .. } => ErrorKind::OutOfBounds,
            Self::Overflow { .. } => ErrorKind::Overflow,
            Self::InvalidParam { .. } => ErrorKind::InvalidParam,
            Self::AllocationFailed { .. } => ErrorKind::AllocationFailed,
            Self::FileAccess { .. } => ErrorKind::FileAccess,
        }
    }

    pub(crate) const fn out_of_bounds(
        operation: &'static str,
        required: usize,
        capacity: usize,
    ) -> Self {
        Self::OutOfBounds {
            operation,
            required,
            capacity,
        }
    }

    pub(crate) const fn invalid(operation: &'static str, reason: &'static str) -> Self {
        Self::InvalidParam { operation, reason }
    }

    /// Creates a null-pointer error for `operation`.
    #[must_use]
    pub const fn null(operation: &'static str) -> Self {
        Self::NullPointer { operation }
    }

    /// Creates a file-access error with an OS error source.
    #[must_use]
    pub fn file_io(path: impl Into<PathBuf>, reason: &'static str, source: io::Error) -> Self {
        Self::FileAccess {
            path: path.into(),
            reason,
            source: Some(source),
        }
    }

    /// Creates a file-access error with no OS error behind it.
    #[must_use]
    pub fn file_rejected(path: impl Into<PathBuf>, reason: &'static str) -> Self {
        Self::FileAccess {
            path: path.into(),
            reason,
            source: None,
        }
    }
}
