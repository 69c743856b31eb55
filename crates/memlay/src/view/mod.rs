// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 memlay contributors

//! Buffer views over laid-out instances.
//!
//! Views borrow a byte buffer and interpret a composite instance in place.
//! All counter resolution happens at access time; no sizes or offsets
//! survive past a single view's lifetime.

mod array_view;
mod size;
mod struct_view;

pub use array_view::{ArrayMut, ArrayRef};
pub use size::dynamic_size;
pub use struct_view::{StructMut, StructRef};
