//! Error codes, thread-local last error and the logger callback.

use parking_lot::RwLock;
use safeops_core::{ErrorKind, SafeError, SafeResult};
use std::cell::Cell;
use std::ffi::{c_char, c_int, CString};
use std::panic::Location;

/// Result code reported by the C ABI.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SafeOpsError {
    /// No error.
    Ok = 0,
    /// Null pointer argument.
    NullPointer = 1,
    /// Index, length or offset out of bounds.
    OutOfBounds = 2,
    /// Arithmetic or size overflow.
    Overflow = 3,
    /// Invalid argument.
    InvalidParam = 4,
    /// Allocation failed.
    AllocationFailed = 5,
    /// File could not be opened, validated or closed.
    FileAccess = 6,
    /// Regions overlap (informational).
    Overlap = 7,
    /// Anything else.
    Unknown = 8,
}

impl From<ErrorKind> for SafeOpsError {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::None => SafeOpsError::Ok,
            ErrorKind::NullPointer => SafeOpsError::NullPointer,
            ErrorKind::OutOfBounds => SafeOpsError::OutOfBounds,
            ErrorKind::Overflow => SafeOpsError::Overflow,
            ErrorKind::InvalidParam => SafeOpsError::InvalidParam,
            ErrorKind::AllocationFailed => SafeOpsError::AllocationFailed,
            ErrorKind::FileAccess => SafeOpsError::FileAccess,
            ErrorKind::Overlap => SafeOpsError::Overlap,
            ErrorKind::Unknown => SafeOpsError::Unknown,
        }
    }
}

/// Logger callback: `(error, message, source file, source line)`.
///
/// Strings are only valid for the duration of the call.
pub type SafeOpsLogFunc =
    extern "C" fn(error: SafeOpsError, message: *const c_char, file: *const c_char, line: c_int);

static LOGGER: RwLock<Option<SafeOpsLogFunc>> = parking_lot::const_rwlock(None);

// Thread-local storage for the last error kind
thread_local! {
    static LAST_ERROR: Cell<SafeOpsError> = const { Cell::new(SafeOpsError::Ok) };
}

fn to_cstring(s: &str) -> CString {
    CString::new(s.replace('\0', "\u{FFFD}")).unwrap_or_default()
}

/// Invokes the registered logger, if any.
#[track_caller]
pub(crate) fn log(error: SafeOpsError, message: &str) {
    let Some(logger) = *LOGGER.read() else {
        return;
    };
    let location = Location::caller();
    let message = to_cstring(message);
    let file = to_cstring(location.file());
    let line = c_int::try_from(location.line()).unwrap_or(c_int::MAX);
    logger(error, message.as_ptr(), file.as_ptr(), line);
}

/// Records `error` as this thread's last error and forwards it to the logger.
#[track_caller]
pub(crate) fn set_last_error(error: SafeOpsError, message: &str) {
    LAST_ERROR.with(|e| e.set(error));
    tracing::debug!(?error, "{message}");
    log(error, message);
}

/// Records a [`SafeError`].
#[track_caller]
pub(crate) fn record(err: &SafeError) {
    set_last_error(err.kind().into(), &err.to_string());
}

/// Converts results into the C convention: `Some` on success, `None` after
/// recording the error.
pub(crate) trait RecordExt<T> {
    fn recorded(self) -> Option<T>;
}

impl<T> RecordExt<T> for SafeResult<T> {
    #[track_caller]
    fn recorded(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(err) => {
                record(&err);
                None
            }
        }
    }
}

/// Records a null-pointer failure for `operation`.
#[track_caller]
pub(crate) fn null_argument(operation: &'static str) {
    record(&SafeError::null(operation));
}

/// Checks that `len` elements of `T` can form a slice, recording
/// `OutOfBounds` when the extent exceeds `isize::MAX` bytes.
#[track_caller]
pub(crate) fn fits_slice<T>(operation: &'static str, len: usize) -> bool {
    let limit = isize::MAX.unsigned_abs() / std::mem::size_of::<T>().max(1);
    if len > limit {
        record(&SafeError::OutOfBounds {
            operation,
            required: len,
            capacity: limit,
        });
        return false;
    }
    true
}

/// Replaces the process-wide logger. Pass null to remove it.
///
/// The logger is shared by all threads; register it before other threads
/// start calling into the library.
#[no_mangle]
pub extern "C" fn safeops_set_logger(logger: Option<SafeOpsLogFunc>) {
    *LOGGER.write() = logger;
}

/// Returns the last error recorded on the calling thread.
///
/// Successful calls do not reset it.
#[no_mangle]
pub extern "C" fn safeops_get_last_error() -> SafeOpsError {
    LAST_ERROR.with(Cell::get)
}

/// Resets the calling thread's last error to `Ok`.
#[no_mangle]
pub extern "C" fn safeops_clear_last_error() {
    LAST_ERROR.with(|e| e.set(SafeOpsError::Ok));
}
