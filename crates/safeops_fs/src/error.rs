//! Error types for file operations.
//!
//! File failures share the [`SafeError`] taxonomy with the rest of the
//! library: OS and validation failures are `FileAccess`, malformed arguments
//! are `InvalidParam`, and a missing handle is `NullPointer`.

pub use safeops_core::{ErrorKind, SafeError};

/// Result type for file operations.
pub type FsResult<T> = Result<T, SafeError>;
