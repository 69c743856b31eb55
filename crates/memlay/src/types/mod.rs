// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 memlay contributors

//! Runtime type information.
//!
//! Every type - primitive, array, or composite - satisfies the same codec
//! contract: a name, a static size, and `read`/`write` over an absolute
//! byte offset in a buffer. Composites are built by the
//! [`crate::schema::StructBuilder`] and nest arbitrarily.

mod descriptor;
mod primitive;
mod registry;
mod value;

pub use descriptor::{ArrayDescriptor, TypeDescriptor, TypeKind};
pub use primitive::{PrimitiveKind, ALL_PRIMITIVES};
pub use registry::TypeRegistry;
pub use value::Value;
