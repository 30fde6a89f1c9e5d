//! Platform descriptor acquisition.

use crate::error::FsResult;
use crate::options::{FileOptions, OpenMode};
use safeops_core::SafeError;
use std::fs::File;
use std::io;
use std::path::Path;

/// Acquires an OS handle for a path in one step.
///
/// Implementations must honor `options.follow_symlinks` as part of the open
/// call itself: when links are not followed, a symbolic link at the final
/// path component must make the open fail (or be detectable on the returned
/// handle), never be resolved. No existence or type check may be made on the
/// path beforehand.
///
/// # Implementors
///
/// - [`UnixBackend`] - `open(2)` with `O_NOFOLLOW`
/// - [`WindowsBackend`] - `CreateFileW` with `FILE_FLAG_OPEN_REPARSE_POINT`
pub trait OpenBackend {
    /// Opens `path` with `mode`, applying `options`.
    ///
    /// # Errors
    ///
    /// Returns `FileAccess` if the OS refuses the open.
    fn acquire(&self, path: &Path, mode: &OpenMode, options: &FileOptions) -> FsResult<File>;
}

impl<B: OpenBackend + ?Sized> OpenBackend for &B {
    fn acquire(&self, path: &Path, mode: &OpenMode, options: &FileOptions) -> FsResult<File> {
        (**self).acquire(path, mode, options)
    }
}

/// The backend for the current platform.
#[cfg(unix)]
pub type PlatformBackend = UnixBackend;

/// The backend for the current platform.
#[cfg(windows)]
pub type PlatformBackend = WindowsBackend;

fn open_failed(path: &Path, reason: &'static str, err: io::Error) -> SafeError {
    tracing::debug!(path = %path.display(), error = %err, "{reason}");
    SafeError::file_io(path, reason, err)
}

/// POSIX backend.
#[cfg(unix)]
#[derive(Debug, Default, Clone, Copy)]
pub struct UnixBackend;

#[cfg(unix)]
impl UnixBackend {
    fn is_symlink_refusal(err: &io::Error) -> bool {
        // Linux and macOS report ELOOP, FreeBSD and NetBSD report EMLINK.
        matches!(err.raw_os_error(), Some(code) if code == libc::ELOOP || code == libc::EMLINK)
    }
}

#[cfg(unix)]
impl OpenBackend for UnixBackend {
    fn acquire(&self, path: &Path, mode: &OpenMode, options: &FileOptions) -> FsResult<File> {
        use std::os::unix::fs::OpenOptionsExt;

        let mut open = mode.open_options();
        open.mode(options.create_mode);
        let mut flags = 0;
        if !options.follow_symlinks {
            flags |= libc::O_NOFOLLOW;
        }
        if options.require_regular_file {
            // A FIFO would otherwise block in open(2) before it can be
            // rejected. Regular files ignore the flag.
            flags |= libc::O_NONBLOCK;
        }
        open.custom_flags(flags);

        open.open(path).map_err(|err| {
            if !options.follow_symlinks && Self::is_symlink_refusal(&err) {
                open_failed(path, "refusing to follow symbolic link", err)
            } else {
                open_failed(path, "failed to open file", err)
            }
        })
    }
}

/// Windows backend.
#[cfg(windows)]
#[derive(Debug, Default, Clone, Copy)]
pub struct WindowsBackend;

#[cfg(windows)]
const FILE_FLAG_OPEN_REPARSE_POINT: u32 = 0x0020_0000;

#[cfg(windows)]
impl OpenBackend for WindowsBackend {
    fn acquire(&self, path: &Path, mode: &OpenMode, options: &FileOptions) -> FsResult<File> {
        use std::os::windows::fs::OpenOptionsExt;

        let mut open = mode.open_options();
        if !options.follow_symlinks {
            // The link itself is opened; validation rejects it by handle.
            open.custom_flags(FILE_FLAG_OPEN_REPARSE_POINT);
        }
        open.open(path)
            .map_err(|err| open_failed(path, "failed to open file", err))
    }
}
