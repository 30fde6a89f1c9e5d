//! # SafeOps FFI
//!
//! C ABI over the SafeOps bounded operations.
//!
//! Conventions:
//! - Functions return `bool` (or a pointer, null on failure)
//! - A failure records a [`SafeOpsError`] in thread-local storage, readable
//!   with `safeops_get_last_error`, and calls the registered logger
//! - Output parameters are only written on success
//! - Memory from `safe_malloc` must be released with `safe_free` or
//!   `safe_free_typed`

#![warn(missing_docs)]

mod alloc;
mod arith;
mod array;
mod error;
#[cfg(unix)]
mod file;
mod mem;
mod ptr;
mod string;

pub use alloc::{safe_free, safe_free_typed, safe_malloc, safe_malloc_uninitialized};
pub use arith::{
    safe_add_int, safe_cast_long_long_to_int, safe_div_int, safe_mul_int, safe_sub_int,
};
pub use array::{safe_read_int, safe_write_int};
pub use error::{
    safeops_clear_last_error, safeops_get_last_error, safeops_set_logger, SafeOpsError,
    SafeOpsLogFunc,
};
#[cfg(unix)]
pub use file::{safe_fclose, safe_fopen, SafeFileOpts};
pub use mem::{safe_mem_copy, safe_mem_move};
pub use ptr::{is_aligned, is_valid_pointer, safe_pointer_offset};
pub use string::{
    safe_str_cat, safe_str_copy, safe_str_find, safe_str_len, safe_str_ncat, safe_str_ncopy,
    safe_str_replace, safe_wstr_cat, safe_wstr_copy, safe_wstr_find, safe_wstr_len,
    safe_wstr_ncat, safe_wstr_ncopy, safe_wstr_replace, WChar,
};
