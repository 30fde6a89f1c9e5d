//! # SafeOps Core
//!
//! Bounds-validated, overflow-checked replacements for unchecked memory,
//! string, array and arithmetic primitives.
//!
//! This crate provides:
//! - Checked allocation with secure, non-elidable wiping on release
//! - Bounded memory copy that stays correct under overlap
//! - Bounded string length/copy/concatenate/find/replace for narrow and wide
//!   strings
//! - Bounds-checked array access
//! - Overflow-checked arithmetic and narrowing casts
//! - Checked pointer offsets
//!
//! ## Design Principles
//!
//! - Callers supply fixed-capacity buffers; capacity is never exceeded
//! - Truncation and overflow are failures, never silent behavior
//! - Every failure is a [`SafeError`] value; there is no hidden global state
//! - Reports are routed to an explicit [`ErrorSink`] when the caller wants one
//!
//! ## Example
//!
//! ```rust
//! use safeops_core::{arith, string, ErrorKind};
//!
//! let mut buf = [0u8; 8];
//! assert!(string::copy(&mut buf, b"tiny").is_ok());
//! assert_eq!(
//!     string::copy(&mut buf, b"too long").unwrap_err().kind(),
//!     ErrorKind::Overflow
//! );
//! assert_eq!(arith::add(i32::MAX, 1).unwrap_err().kind(), ErrorKind::Overflow);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod alloc;
pub mod arith;
pub mod array;
mod error;
pub mod mem;
pub mod ptr;
mod report;
pub mod string;

pub use error::{ErrorKind, SafeError, SafeResult};
pub use mem::Overlap;
pub use report::{
    notice, ErrorSink, MemorySink, RecordedReport, Report, ReportExt, Severity, TracingSink,
};
