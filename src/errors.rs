// tracebuf
// Copyright (c) 2019-2024 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `errors` module defines the common error type shared by every operation in this crate.

use core::fmt;
use core::result;

/// `TracebufError` enumerates every way an operation in this crate can fail.
///
/// No operation in this crate aborts the process; all failures are reported through this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TracebufError {
    /// Aligned storage could not be sized or acquired for the requested buffer.
    AllocFailed(&'static str),
    /// A typed accessor was invoked with a bit width that does not match the buffer's layout.
    TypeMismatch(&'static str),
    /// A sample or channel index was out of the buffer's declared bounds.
    OutOfBounds(&'static str),
    /// A backend kernel was invoked on a layout or channel count it does not support.
    BadShape(&'static str),
    /// `set_backend` was called with an index that does not name a registered backend.
    InvalidBackend(&'static str),
    /// The source buffer has fewer samples than an operation requires for interpolation.
    EmptyInput(&'static str),
}

impl fmt::Display for TracebufError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            TracebufError::AllocFailed(msg) => write!(f, "allocation failed: {msg}"),
            TracebufError::TypeMismatch(msg) => write!(f, "type mismatch: {msg}"),
            TracebufError::OutOfBounds(msg) => write!(f, "out of bounds: {msg}"),
            TracebufError::BadShape(msg) => write!(f, "bad shape: {msg}"),
            TracebufError::InvalidBackend(msg) => write!(f, "invalid backend: {msg}"),
            TracebufError::EmptyInput(msg) => write!(f, "empty input: {msg}"),
        }
    }
}

impl std::error::Error for TracebufError {}

/// A specialized `Result` type for fallible operations in this crate.
pub type Result<T> = result::Result<T, TracebufError>;

/// Convenience function to create an allocation-failed error.
pub fn alloc_failed_error<T>(msg: &'static str) -> Result<T> {
    log::warn!("tracebuf (alloc): {msg}");
    Err(TracebufError::AllocFailed(msg))
}

/// Convenience function to create a type-mismatch error.
pub fn type_mismatch_error<T>(msg: &'static str) -> Result<T> {
    log::debug!("tracebuf (access): {msg}");
    Err(TracebufError::TypeMismatch(msg))
}

/// Convenience function to create an out-of-bounds error.
pub fn out_of_bounds_error<T>(msg: &'static str) -> Result<T> {
    log::debug!("tracebuf (access): {msg}");
    Err(TracebufError::OutOfBounds(msg))
}

/// Convenience function to create a bad-shape error.
pub fn bad_shape_error<T>(msg: &'static str) -> Result<T> {
    log::debug!("tracebuf (backend): {msg}");
    Err(TracebufError::BadShape(msg))
}

/// Convenience function to create an invalid-backend error.
pub fn invalid_backend_error<T>(msg: &'static str) -> Result<T> {
    log::debug!("tracebuf (backend): {msg}");
    Err(TracebufError::InvalidBackend(msg))
}

/// Convenience function to create an empty-input error.
pub fn empty_input_error<T>(msg: &'static str) -> Result<T> {
    log::debug!("tracebuf (src): {msg}");
    Err(TracebufError::EmptyInput(msg))
}
