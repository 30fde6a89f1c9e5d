//! File open configuration.

use crate::error::FsResult;
use safeops_core::SafeError;
use std::fs::OpenOptions;

/// Default permission bits for newly created files (`rw-r--r--`).
pub const DEFAULT_CREATE_MODE: u32 = 0o644;

/// Policy applied when opening a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOptions {
    /// Whether a symbolic link at the final path component may be followed.
    pub follow_symlinks: bool,

    /// Whether the opened object must be a regular file.
    pub require_regular_file: bool,

    /// Permission bits for files created by the open. Ignored on Windows.
    pub create_mode: u32,

    /// Whether contents are overwritten with zeros before the handle closes.
    pub secure_delete: bool,
}

impl FileOptions {
    /// The options used when none are supplied.
    pub const DEFAULT: Self = Self {
        follow_symlinks: false,
        require_regular_file: true,
        create_mode: DEFAULT_CREATE_MODE,
        secure_delete: false,
    };

    /// Creates options with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self::DEFAULT
    }

    /// Sets whether symbolic links may be followed.
    #[must_use]
    pub const fn follow_symlinks(mut self, value: bool) -> Self {
        self.follow_symlinks = value;
        self
    }

    /// Sets whether the target must be a regular file.
    #[must_use]
    pub const fn require_regular_file(mut self, value: bool) -> Self {
        self.require_regular_file = value;
        self
    }

    /// Sets permission bits for created files.
    #[must_use]
    pub const fn create_mode(mut self, mode: u32) -> Self {
        self.create_mode = mode;
        self
    }

    /// Sets whether contents are wiped on close.
    #[must_use]
    pub const fn secure_delete(mut self, value: bool) -> Self {
        self.secure_delete = value;
        self
    }
}

impl Default for FileOptions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Access mode parsed from a C-style mode string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenMode {
    /// Open for reading.
    pub read: bool,
    /// Open for writing.
    pub write: bool,
    /// Writes always go to the end of the file.
    pub append: bool,
    /// Create the file if missing.
    pub create: bool,
    /// Truncate an existing file.
    pub truncate: bool,
    /// Fail if the file already exists.
    pub create_new: bool,
}

impl OpenMode {
    /// Parses `r`, `w` or `a`, optionally followed by `+`, and by `b`/`t`
    /// (ignored). `x` may follow `w` to require that the file is new.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParam` for any other string.
    pub fn parse(mode: &str) -> FsResult<Self> {
        let invalid = || SafeError::InvalidParam {
            operation: "open",
            reason: "unrecognized mode string",
        };

        let mut chars = mode.chars();
        let mut parsed = match chars.next() {
            Some('r') => Self::base(true, false, false),
            Some('w') => Self {
                create: true,
                truncate: true,
                ..Self::base(false, true, false)
            },
            Some('a') => Self {
                create: true,
                ..Self::base(false, true, true)
            },
            _ => return Err(invalid()),
        };

        for c in chars {
            match c {
                '+' if !(parsed.read && parsed.write) => {
                    parsed.read = true;
                    parsed.write = true;
                }
                'x' if parsed.truncate && !parsed.create_new => parsed.create_new = true,
                'b' | 't' => {}
                _ => return Err(invalid()),
            }
        }
        Ok(parsed)
    }

    const fn base(read: bool, write: bool, append: bool) -> Self {
        Self {
            read,
            write,
            append,
            create: false,
            truncate: false,
            create_new: false,
        }
    }

    /// Returns true if writes land at the current position.
    #[must_use]
    pub const fn can_overwrite(&self) -> bool {
        self.write && !self.append
    }

    /// Builds the matching [`OpenOptions`].
    #[must_use]
    pub fn open_options(&self) -> OpenOptions {
        let mut options = OpenOptions::new();
        options
            .read(self.read)
            .write(self.write && !self.append)
            .append(self.append)
            .truncate(self.truncate && !self.create_new)
            .create(self.create && !self.create_new)
            .create_new(self.create_new);
        options
    }
}
