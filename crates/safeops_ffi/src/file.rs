//! Validated `FILE*` streams.
//!
//! `safe_fopen` opens and validates through `safeops_fs`, then hands the
//! descriptor to the C library with `fdopen`. Streams are remembered until
//! `safe_fclose` so the close knows the path and whether to wipe.

use crate::error::{null_argument, record, RecordExt};
use parking_lot::Mutex;
use safeops_core::SafeError;
use safeops_fs::{FileOptions, OpenMode, DEFAULT_CREATE_MODE};
use std::ffi::{c_char, c_uint, CStr};
use std::fs::File;
use std::io;
use std::mem::ManuallyDrop;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::io::{FromRawFd, IntoRawFd};
use std::path::{Path, PathBuf};

/// Options for [`safe_fopen`].
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct SafeFileOpts {
    /// Follow a symbolic link in the final path component.
    pub follow_symlinks: bool,
    /// Reject anything that is not a regular file.
    pub require_regular_file: bool,
    /// Permission bits for a newly created file.
    pub create_mode: c_uint,
    /// Overwrite the contents with zeros when the stream is closed.
    pub secure_delete: bool,
}

impl Default for SafeFileOpts {
    fn default() -> Self {
        Self {
            follow_symlinks: false,
            require_regular_file: true,
            create_mode: DEFAULT_CREATE_MODE,
            secure_delete: false,
        }
    }
}

impl From<SafeFileOpts> for FileOptions {
    fn from(opts: SafeFileOpts) -> Self {
        FileOptions::new()
            .follow_symlinks(opts.follow_symlinks)
            .require_regular_file(opts.require_regular_file)
            .create_mode(opts.create_mode)
            .secure_delete(opts.secure_delete)
    }
}

struct OpenStream {
    stream: usize,
    path: PathBuf,
    wipe_on_close: bool,
}

static STREAMS: Mutex<Vec<OpenStream>> = parking_lot::const_mutex(Vec::new());

/// Mode string for `fdopen` matching the access the descriptor already has.
fn stream_mode(mode: &OpenMode) -> &'static CStr {
    match (mode.read, mode.write, mode.append) {
        (true, true, true) => c"a+",
        (true, true, false) => c"r+",
        (_, true, true) => c"a",
        (_, true, false) => c"w",
        _ => c"r",
    }
}

fn take_stream(stream: *mut libc::FILE) -> Option<OpenStream> {
    let mut streams = STREAMS.lock();
    let index = streams.iter().position(|s| s.stream == stream as usize)?;
    Some(streams.swap_remove(index))
}

/// Opens `path` with an `fopen`-style `mode` and validates the handle.
///
/// `opts` may be null for the defaults: links are not followed, only regular
/// files are accepted and new files get mode `0644`. Returns null on failure
/// with `NullPointer`, `InvalidParam` (bad mode or a non-UTF-8 mode string)
/// or `FileAccess` recorded. A rejected handle is closed before returning.
///
/// # Safety
///
/// `path` and `mode` must be null or terminated strings, and `opts` null or
/// valid for reads.
#[no_mangle]
pub unsafe extern "C" fn safe_fopen(
    path: *const c_char,
    mode: *const c_char,
    opts: *const SafeFileOpts,
) -> *mut libc::FILE {
    if path.is_null() || mode.is_null() {
        null_argument("safe_fopen");
        return std::ptr::null_mut();
    }
    let path = Path::new(std::ffi::OsStr::from_bytes(CStr::from_ptr(path).to_bytes()));
    let Ok(mode) = CStr::from_ptr(mode).to_str() else {
        record(&SafeError::InvalidParam {
            operation: "safe_fopen",
            reason: "mode is not valid UTF-8",
        });
        return std::ptr::null_mut();
    };
    let options = FileOptions::from(opts.as_ref().copied().unwrap_or_default());

    let Some(file) = safeops_fs::open(path, mode, Some(&options)).recorded() else {
        return std::ptr::null_mut();
    };
    let wipe_on_close = options.secure_delete && file.mode().can_overwrite();
    let fd_mode = stream_mode(file.mode());

    let fd = file.into_file().into_raw_fd();
    let stream = libc::fdopen(fd, fd_mode.as_ptr());
    if stream.is_null() {
        let err = io::Error::last_os_error();
        libc::close(fd);
        record(&SafeError::file_io(path, "failed to create stream", err));
        return std::ptr::null_mut();
    }

    let mut streams = STREAMS.lock();
    // A stream closed behind our back leaves its entry; the C library may
    // hand the same address out again.
    streams.retain(|s| s.stream != stream as usize);
    streams.push(OpenStream {
        stream: stream as usize,
        path: path.to_path_buf(),
        wipe_on_close,
    });
    stream
}

/// Closes `*fp` and sets it to null.
///
/// Buffered output is flushed first. A stream opened with `secure_delete`
/// and a mode that writes in place is overwritten with zeros and synced
/// before closing. `*fp` is cleared even when flushing, wiping or closing
/// fails; the call then returns false with `FileAccess` recorded.
///
/// # Safety
///
/// `fp` must be null or valid for reads and writes, and `*fp` null or a
/// stream returned by [`safe_fopen`] that has not been closed.
#[no_mangle]
pub unsafe extern "C" fn safe_fclose(fp: *mut *mut libc::FILE) -> bool {
    if fp.is_null() || (*fp).is_null() {
        null_argument("safe_fclose");
        return false;
    }
    let stream = *fp;
    *fp = std::ptr::null_mut();

    let tracked = take_stream(stream);
    let path = tracked
        .as_ref()
        .map_or_else(|| PathBuf::from("<stream>"), |s| s.path.clone());
    let mut failure: Option<SafeError> = None;

    if libc::fflush(stream) != 0 {
        failure = Some(SafeError::file_io(&path, "failed to flush stream", io::Error::last_os_error()));
    }

    if tracked.as_ref().is_some_and(|s| s.wipe_on_close) {
        let fd = libc::fileno(stream);
        if fd < 0 {
            failure.get_or_insert_with(|| {
                SafeError::file_io(&path, "stream has no descriptor", io::Error::last_os_error())
            });
        } else {
            // The stream still owns the descriptor.
            let mut file = ManuallyDrop::new(File::from_raw_fd(fd));
            if let Err(err) = safeops_fs::wipe_contents(&mut file) {
                failure.get_or_insert_with(|| SafeError::file_io(&path, "failed to wipe contents", err));
            }
        }
    } else if tracked.is_none() {
        tracing::warn!("closing a stream that was not opened by safe_fopen");
    }

    if libc::fclose(stream) != 0 {
        failure.get_or_insert_with(|| {
            SafeError::file_io(&path, "failed to close stream", io::Error::last_os_error())
        });
    }

    match failure {
        Some(err) => {
            record(&err);
            false
        }
        None => true,
    }
}
