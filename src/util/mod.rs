//! Utility functions.

pub mod build;
mod path_ext;

use std::io;

use anyhow::Error;

pub use crate::util::path_ext::PathExt;

/// Returns the underlying I/O error kind for the given error.
pub fn underlying_io_error_kind(error: &Error) -> Option<io::ErrorKind> {
    for cause in error.chain() {
        if let Some(io_error) = cause.downcast_ref::<io::Error>() {
            return Some(io_error.kind());
        }
    }
    None
}
