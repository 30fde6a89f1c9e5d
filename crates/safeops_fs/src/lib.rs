//! # SafeOps FS
//!
//! TOCTOU-resistant file acquisition.
//!
//! A path is resolved exactly once, by the open call. Type and link checks
//! run against the descriptor that call returned, so the object that was
//! validated is always the object that is read or written.
//!
//! ## Design Principles
//!
//! - No existence or type check on the path before opening
//! - Symbolic links at the final component are refused by the open itself
//! - Validation queries the open handle (`fstat`), never the path
//! - Platform differences live behind the [`OpenBackend`] trait
//!
//! ## Example
//!
//! ```no_run
//! use safeops_fs::{open, secure_close};
//! use std::io::Read;
//!
//! let mut slot = Some(open("config.toml", "r", None)?);
//! let mut contents = String::new();
//! if let Some(file) = slot.as_mut() {
//!     file.read_to_string(&mut contents)?;
//! }
//! secure_close(&mut slot)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod options;

#[cfg(unix)]
pub use backend::UnixBackend;
#[cfg(windows)]
pub use backend::WindowsBackend;
pub use backend::{OpenBackend, PlatformBackend};
pub use error::{ErrorKind, FsResult, SafeError};
pub use file::{open, open_with, secure_close, wipe_contents, FileState, SecureFile};
pub use options::{FileOptions, OpenMode, DEFAULT_CREATE_MODE};
