// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 memlay contributors

//! Struct and union definition: builders, field model, and the C-rules
//! layout engine.

mod builder;
mod field;
mod layout;

pub use builder::{StructBuilder, UnionBuilder};
pub use field::{CountedBy, Field, FieldDef};
pub use layout::{offset_of, size_of, StructDescriptor};
