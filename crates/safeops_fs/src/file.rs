//! Validated file handles.

use crate::backend::{OpenBackend, PlatformBackend};
use crate::error::FsResult;
use crate::options::{FileOptions, OpenMode};
use safeops_core::SafeError;
use std::fs::{File, Metadata};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

const WIPE_CHUNK: usize = 8 * 1024;

/// Overwrites the whole current length of `file` with zeros and syncs it.
///
/// Writes start at offset 0 through the file's own position, so the handle
/// must not be in append mode.
///
/// # Errors
///
/// Returns any I/O error from the query, the writes or the sync.
pub fn wipe_contents(file: &mut File) -> io::Result<()> {
    let len = file.metadata()?.len();
    let zeros = [0u8; WIPE_CHUNK];

    file.seek(SeekFrom::Start(0))?;
    let mut remaining = len;
    while remaining > 0 {
        let chunk = remaining.min(WIPE_CHUNK as u64) as usize;
        file.write_all(&zeros[..chunk])?;
        remaining -= chunk as u64;
    }
    file.sync_all()
}

/// Lifecycle of a file acquisition.
///
/// `Closed -> Opening -> Validated | Rejected`, then `Validated -> Open ->
/// Closed`. A rejected handle is released before the error is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileState {
    /// No handle is held.
    Closed,
    /// The OS handle is being acquired.
    Opening,
    /// The open handle passed type and link checks.
    Validated,
    /// The open handle failed validation and was released.
    Rejected,
    /// A usable stream is available.
    Open,
}

fn enter(path: &Path, state: FileState) {
    tracing::trace!(path = %path.display(), ?state, "file state");
}

/// Checks the metadata of an already-open handle against `options`.
fn validate(metadata: &Metadata, options: &FileOptions) -> Result<(), &'static str> {
    let file_type = metadata.file_type();
    if !options.follow_symlinks && file_type.is_symlink() {
        return Err("target is a symbolic link");
    }
    if options.require_regular_file && !file_type.is_file() {
        return Err("not a regular file");
    }
    Ok(())
}

/// An open file whose type and link policy were verified on the handle.
///
/// Read, write and seek go straight to the validated descriptor. Close it
/// with [`secure_close`] to apply the secure-delete policy; dropping it closes
/// the descriptor without wiping.
#[derive(Debug)]
pub struct SecureFile {
    file: File,
    path: PathBuf,
    mode: OpenMode,
    options: FileOptions,
}

impl SecureFile {
    /// Returns the path the handle was opened from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the parsed access mode.
    #[must_use]
    pub fn mode(&self) -> &OpenMode {
        &self.mode
    }

    /// Returns the options the handle was opened with.
    #[must_use]
    pub fn options(&self) -> &FileOptions {
        &self.options
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub fn state(&self) -> FileState {
        FileState::Open
    }

    /// Queries metadata through the handle, never through the path.
    ///
    /// # Errors
    ///
    /// Returns `FileAccess` if the query fails.
    pub fn metadata(&self) -> FsResult<Metadata> {
        self.file
            .metadata()
            .map_err(|err| SafeError::file_io(&self.path, "failed to stat open file", err))
    }

    /// Returns the underlying file.
    #[must_use]
    pub fn as_file(&self) -> &File {
        &self.file
    }

    /// Gives up the validated handle without applying the secure-delete
    /// policy.
    #[must_use]
    pub fn into_file(self) -> File {
        self.file
    }

    fn finish(&mut self) -> FsResult<()> {
        self.file
            .flush()
            .map_err(|err| SafeError::file_io(&self.path, "failed to flush", err))?;

        if !self.options.secure_delete {
            return Ok(());
        }

        if self.mode.can_overwrite() {
            wipe_contents(&mut self.file)
                .map_err(|err| SafeError::file_io(&self.path, "failed to wipe contents", err))?;
            tracing::debug!(path = %self.path.display(), "contents wiped before close");
        } else {
            tracing::warn!(
                path = %self.path.display(),
                "secure delete requested but handle cannot overwrite in place; skipped"
            );
        }
        Ok(())
    }
}

impl Read for SecureFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}

impl Write for SecureFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

impl Seek for SecureFile {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.file.seek(pos)
    }
}

/// Opens `path` on the current platform's backend.
///
/// `mode` is a C-style mode string (see [`OpenMode::parse`]). When `options`
/// is `None`, [`FileOptions::DEFAULT`] applies: symlinks are not followed and
/// the target must be a regular file.
///
/// # Example
///
/// ```no_run
/// use safeops_fs::{open, secure_close, FileOptions};
/// use std::io::Write;
///
/// let options = FileOptions::new().secure_delete(true);
/// let mut slot = Some(open("scratch.bin", "w+", Some(&options))?);
/// if let Some(file) = slot.as_mut() {
///     file.write_all(b"temporary secret")?;
/// }
/// secure_close(&mut slot)?;
/// assert!(slot.is_none());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
///
/// # Errors
///
/// - `InvalidParam` for an empty path or unrecognized mode
/// - `FileAccess` if the open fails, a link is refused, or the handle fails
///   validation
pub fn open(
    path: impl AsRef<Path>,
    mode: &str,
    options: Option<&FileOptions>,
) -> FsResult<SecureFile> {
    open_with(&PlatformBackend::default(), path, mode, options)
}

/// Opens `path` using `backend` to acquire the handle.
///
/// # Errors
///
/// See [`open`].
pub fn open_with<B: OpenBackend + ?Sized>(
    backend: &B,
    path: impl AsRef<Path>,
    mode: &str,
    options: Option<&FileOptions>,
) -> FsResult<SecureFile> {
    let path = path.as_ref();
    if path.as_os_str().is_empty() {
        return Err(SafeError::InvalidParam {
            operation: "open",
            reason: "empty path",
        });
    }
    let mode = OpenMode::parse(mode)?;
    let options = options.unwrap_or(&FileOptions::DEFAULT);

    enter(path, FileState::Opening);
    let file = backend.acquire(path, &mode, options)?;

    let metadata = file
        .metadata()
        .map_err(|err| SafeError::file_io(path, "failed to stat open file", err))?;

    if let Err(reason) = validate(&metadata, options) {
        enter(path, FileState::Rejected);
        drop(file);
        tracing::debug!(path = %path.display(), "{reason}");
        return Err(SafeError::file_rejected(path, reason));
    }
    enter(path, FileState::Validated);

    enter(path, FileState::Open);
    Ok(SecureFile {
        file,
        path: path.to_path_buf(),
        mode,
        options: options.clone(),
    })
}

/// Closes the handle in `slot` and leaves it `None`.
///
/// Pending writes are flushed. With `secure_delete`, a handle that can write
/// in place has its contents overwritten with zeros and synced before the
/// close; other handles skip the wipe with a warning. The slot is emptied
/// even when flushing or wiping fails.
///
/// # Errors
///
/// - `NullPointer` if `slot` is empty
/// - `FileAccess` if flushing or wiping fails
pub fn secure_close(slot: &mut Option<SecureFile>) -> FsResult<()> {
    let Some(mut file) = slot.take() else {
        return Err(SafeError::null("secure_close"));
    };

    let result = file.finish();
    enter(&file.path, FileState::Closed);
    drop(file);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use safeops_core::ErrorKind;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn open_regular_file_with_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.txt");
        fs::write(&path, b"hello world").unwrap();

        let mut file = open(&path, "r", None).unwrap();
        assert_eq!(file.state(), FileState::Open);
        assert_eq!(file.path(), path);

        let mut contents = String::new();
        file.read_to_string(&mut contents).unwrap();
        assert_eq!(contents, "hello world");
    }

    #[test]
    fn write_mode_creates_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("new.bin");

        let mut slot = Some(open(&path, "w", None).unwrap());
        slot.as_mut().unwrap().write_all(b"abc").unwrap();
        secure_close(&mut slot).unwrap();
        assert!(slot.is_none());
        assert_eq!(fs::read(&path).unwrap(), b"abc");
    }

    #[test]
    fn missing_file_is_file_access() {
        let dir = tempdir().unwrap();
        let err = open(dir.path().join("absent"), "r", None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FileAccess);
    }

    #[test]
    fn directory_rejected_when_regular_required() {
        let dir = tempdir().unwrap();
        let err = open(dir.path(), "r", None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FileAccess);
    }

    #[test]
    fn empty_path_and_bad_mode() {
        assert_eq!(open("", "r", None).unwrap_err().kind(), ErrorKind::InvalidParam);

        let dir = tempdir().unwrap();
        let path = dir.path().join("f");
        fs::write(&path, b"x").unwrap();
        assert_eq!(
            open(&path, "rw", None).unwrap_err().kind(),
            ErrorKind::InvalidParam
        );
    }

    #[test]
    fn append_mode_appends() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("log.txt");
        fs::write(&path, b"one\n").unwrap();

        let mut slot = Some(open(&path, "a", None).unwrap());
        slot.as_mut().unwrap().write_all(b"two\n").unwrap();
        secure_close(&mut slot).unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"one\ntwo\n");
    }

    #[test]
    fn secure_delete_wipes_contents() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("secret.bin");
        fs::write(&path, vec![0xAAu8; WIPE_CHUNK + 100]).unwrap();

        let options = FileOptions::new().secure_delete(true);
        let mut slot = Some(open(&path, "r+", Some(&options)).unwrap());
        secure_close(&mut slot).unwrap();

        let contents = fs::read(&path).unwrap();
        assert_eq!(contents.len(), WIPE_CHUNK + 100);
        assert!(contents.iter().all(|&b| b == 0));
    }

    #[test]
    fn secure_delete_skipped_for_read_only() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ro.bin");
        fs::write(&path, b"keep").unwrap();

        let options = FileOptions::new().secure_delete(true);
        let mut slot = Some(open(&path, "r", Some(&options)).unwrap());
        secure_close(&mut slot).unwrap();
        assert!(slot.is_none());
        assert_eq!(fs::read(&path).unwrap(), b"keep");
    }

    #[test]
    fn closing_empty_slot_fails() {
        let mut slot: Option<SecureFile> = None;
        let err = secure_close(&mut slot).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NullPointer);
    }

    #[test]
    fn metadata_comes_from_handle() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("m.bin");
        fs::write(&path, b"12345").unwrap();

        let file = open(&path, "r", None).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(file.metadata().unwrap().len(), 5);
    }

    #[cfg(unix)]
    #[test]
    fn symlink_refused_by_default() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("target.txt");
        let link = dir.path().join("link.txt");
        fs::write(&target, b"data").unwrap();
        std::os::unix::fs::symlink(&target, &link).unwrap();

        let err = open(&link, "r", None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FileAccess);

        // A write-mode open through the link must not truncate the target.
        assert!(open(&link, "w", None).is_err());
        assert_eq!(fs::read(&target).unwrap(), b"data");
    }

    #[cfg(unix)]
    #[test]
    fn symlink_followed_when_allowed() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("target.txt");
        let link = dir.path().join("link.txt");
        fs::write(&target, b"data").unwrap();
        std::os::unix::fs::symlink(&target, &link).unwrap();

        let options = FileOptions::new().follow_symlinks(true);
        let mut file = open(&link, "r", Some(&options)).unwrap();
        let mut contents = Vec::new();
        file.read_to_end(&mut contents).unwrap();
        assert_eq!(contents, b"data");
    }

    #[cfg(unix)]
    #[test]
    fn device_allowed_only_without_regular_requirement() {
        let path = Path::new("/dev/null");
        assert!(open(path, "r", None).is_err());

        let options = FileOptions::new().require_regular_file(false);
        assert!(open(path, "r", Some(&options)).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn fifo_rejected_without_blocking() {
        use std::process::Command;
        use std::sync::mpsc;
        use std::time::Duration;

        let dir = tempdir().unwrap();
        let fifo = dir.path().join("pipe");
        let status = Command::new("mkfifo").arg(&fifo).status().unwrap();
        assert!(status.success());

        let (tx, rx) = mpsc::channel();
        let path = fifo.clone();
        std::thread::spawn(move || {
            let _ = tx.send(open(&path, "r", None).map(|_| ()).map_err(|e| e.kind()));
        });
        let result = rx.recv_timeout(Duration::from_secs(5)).expect("open blocked on fifo");
        assert_eq!(result, Err(ErrorKind::FileAccess));

        // Nobody reads the pipe, so a nonblocking write open fails outright.
        let err = open(&fifo, "w", None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FileAccess);
    }

    #[cfg(unix)]
    #[test]
    fn create_mode_applied() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("private.bin");
        let options = FileOptions::new().create_mode(0o600);
        let file = open(&path, "w", Some(&options)).unwrap();

        let mode = file.metadata().unwrap().permissions().mode() & 0o777;
        assert_eq!(mode & !0o600, 0);
    }

    struct RefusingBackend;

    impl OpenBackend for RefusingBackend {
        fn acquire(&self, path: &Path, _: &OpenMode, _: &FileOptions) -> FsResult<File> {
            Err(SafeError::file_rejected(path, "backend refused"))
        }
    }

    #[test]
    fn custom_backend_is_used() {
        let err = open_with(&RefusingBackend, "anything", "r", None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FileAccess);
        assert!(err.to_string().contains("backend refused"));
    }
}
