//! # SafeOps Testkit
//!
//! Test utilities for SafeOps.
//!
//! This crate provides:
//! - File fixtures (regular files, directories, symlinks) in temp dirs
//! - Property-based test generators using proptest
//! - Shared arithmetic and string test vectors
//! - Multi-threaded stress runs with a shared error sink
//! - One-time tracing setup for tests
//!
//! ## Usage
//!
//! ```rust
//! use safeops_testkit::prelude::*;
//!
//! with_fs_fixture(|fx| {
//!     let file = safeops_fs::open(fx.regular(), "r", None).unwrap();
//!     assert_eq!(file.path(), fx.regular());
//! });
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod stress;
pub mod vectors;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::stress::*;
    pub use crate::vectors::*;
}

pub use fixtures::*;
pub use generators::*;
pub use stress::*;
pub use vectors::*;
