// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 memlay contributors

//! Crate-wide error type.
//!
//! Schema-time errors ([`Error::InvalidSchema`], [`Error::InvalidType`]) are
//! unrecoverable at definition time: the composite descriptor is not
//! produced. Access-time errors are per-call and never corrupt descriptor or
//! allocator state; a failed allocator operation leaves the section map
//! untouched.

use thiserror::Error;

/// Errors produced by schema definition, field access, and the allocator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Malformed field or struct declaration.
    #[error("invalid schema: {0}")]
    InvalidSchema(String),

    /// Unregistered type name or a descriptor used where another kind was
    /// expected.
    #[error("invalid type: {0}")]
    InvalidType(String),

    /// Array or element index beyond the resolved length.
    #[error("index {index} out of bounds for length {length}")]
    IndexOutOfBounds { index: usize, length: usize },

    /// A counter value or a computed size exceeds the supported range.
    #[error("value {0} exceeds the safe range")]
    Overflow(u64),

    /// A value could not be coerced to the required primitive.
    #[error("invalid value: {0}")]
    InvalidValue(String),

    /// Buffer access beyond its bounds.
    #[error("fault: offset {offset:#x} beyond buffer of {len} bytes")]
    Fault { offset: usize, len: usize },

    /// The allocator cannot satisfy the request.
    #[error("out of memory: requested {requested} bytes, {available} free")]
    OutOfMemory { requested: usize, available: usize },

    /// `free` or `realloc` on an offset that is not a section start.
    #[error("invalid address {0:#x}")]
    InvalidAddress(u32),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn fault(offset: usize, len: usize) -> Self {
        Error::Fault { offset, len }
    }

    pub(crate) fn schema(msg: impl Into<String>) -> Self {
        Error::InvalidSchema(msg.into())
    }
}
