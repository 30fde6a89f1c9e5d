//! Test fixtures for the file component.
//!
//! Provides a temporary directory pre-populated with the kinds of paths the
//! file checks care about, and one-time tracing setup for tests.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Once;
use tempfile::TempDir;
use tracing_subscriber::EnvFilter;

/// Contents written to [`FsFixture::regular`].
pub const REGULAR_CONTENTS: &[u8] = b"fixture contents\n";

/// A temporary directory with a regular file, a subdirectory and (on unix)
/// symbolic links to both. Removed on drop.
pub struct FsFixture {
    temp_dir: TempDir,
}

impl FsFixture {
    /// Creates the fixture.
    ///
    /// # Panics
    ///
    /// If the temporary directory or its entries cannot be created.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();

        fs::write(root.join("regular.txt"), REGULAR_CONTENTS).expect("Failed to write regular file");
        fs::create_dir(root.join("subdir")).expect("Failed to create subdirectory");
        fs::write(root.join("subdir").join("nested.txt"), b"nested\n")
            .expect("Failed to write nested file");

        #[cfg(unix)]
        {
            use std::os::unix::fs::symlink;
            symlink(root.join("regular.txt"), root.join("link.txt")).expect("Failed to create symlink");
            symlink(root.join("subdir"), root.join("dirlink")).expect("Failed to create dir symlink");
            symlink(root.join("missing.txt"), root.join("dangling")).expect("Failed to create dangling symlink");
        }

        Self { temp_dir }
    }

    /// The fixture root.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// A regular file holding [`REGULAR_CONTENTS`].
    pub fn regular(&self) -> PathBuf {
        self.root().join("regular.txt")
    }

    /// A directory.
    pub fn directory(&self) -> PathBuf {
        self.root().join("subdir")
    }

    /// A regular file inside [`FsFixture::directory`].
    pub fn nested(&self) -> PathBuf {
        self.directory().join("nested.txt")
    }

    /// A path that does not exist.
    pub fn missing(&self) -> PathBuf {
        self.root().join("missing.txt")
    }

    /// A symbolic link to [`FsFixture::regular`].
    #[cfg(unix)]
    pub fn symlink(&self) -> PathBuf {
        self.root().join("link.txt")
    }

    /// A symbolic link to [`FsFixture::directory`].
    #[cfg(unix)]
    pub fn dir_symlink(&self) -> PathBuf {
        self.root().join("dirlink")
    }

    /// A symbolic link whose target does not exist.
    #[cfg(unix)]
    pub fn dangling_symlink(&self) -> PathBuf {
        self.root().join("dangling")
    }

    /// Returns a fresh path under the root that does not exist yet.
    pub fn fresh(&self, name: &str) -> PathBuf {
        self.root().join(name)
    }
}

impl Default for FsFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs `f` with a fresh [`FsFixture`].
pub fn with_fs_fixture<F, R>(f: F) -> R
where
    F: FnOnce(&FsFixture) -> R,
{
    let fixture = FsFixture::new();
    f(&fixture)
}

static TRACING: Once = Once::new();

/// Installs a test tracing subscriber once per process.
///
/// The filter comes from `RUST_LOG`, defaulting to debug output for the
/// core crate and trace output for the file crate. Output
/// goes through the test writer so it is captured per test.
pub fn init_test_tracing() {
    TRACING.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("safeops_core=debug,safeops_fs=trace"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use safeops_core::ErrorKind;
    use safeops_fs::{open, secure_close, FileOptions};
    use std::io::Read;

    #[test]
    fn fixture_layout() {
        with_fs_fixture(|fx| {
            assert_eq!(fs::read(fx.regular()).unwrap(), REGULAR_CONTENTS);
            assert!(fx.directory().is_dir());
            assert!(fx.nested().is_file());
            assert!(!fx.missing().exists());
            assert!(!fx.fresh("new.txt").exists());
        });
    }

    #[test]
    fn tracing_init_is_idempotent() {
        init_test_tracing();
        init_test_tracing();
        tracing::debug!("tracing ready");
    }

    #[test]
    fn open_and_close_fixture_file() {
        init_test_tracing();
        let fx = FsFixture::new();
        let mut slot = Some(open(fx.regular(), "r", None).unwrap());
        let mut contents = Vec::new();
        slot.as_mut().unwrap().read_to_end(&mut contents).unwrap();
        assert_eq!(contents, REGULAR_CONTENTS);

        secure_close(&mut slot).unwrap();
        assert!(slot.is_none());
        assert_eq!(secure_close(&mut slot).unwrap_err().kind(), ErrorKind::NullPointer);
    }

    #[test]
    fn directories_rejected_unless_allowed() {
        let fx = FsFixture::new();
        let err = open(fx.directory(), "r", None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FileAccess);

        let permissive = FileOptions::new().require_regular_file(false);
        assert!(open(fx.directory(), "r", Some(&permissive)).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn every_symlink_refused_by_default() {
        let fx = FsFixture::new();
        for link in [fx.symlink(), fx.dir_symlink(), fx.dangling_symlink()] {
            let err = open(&link, "r", None).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::FileAccess, "{}", link.display());
        }

        let follow = FileOptions::new().follow_symlinks(true);
        assert!(open(fx.symlink(), "r", Some(&follow)).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn refused_symlink_leaves_target_intact() {
        let fx = FsFixture::new();
        assert!(open(fx.symlink(), "w", None).is_err());
        assert_eq!(fs::read(fx.regular()).unwrap(), REGULAR_CONTENTS);
    }
}
