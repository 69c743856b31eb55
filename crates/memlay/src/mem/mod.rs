// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 memlay contributors

//! Arena allocation and typed pointers.

mod memory;
mod pointer;
mod shared;

pub use memory::{Memory, MemoryUsage};
pub use pointer::Pointer;
pub use shared::SharedMemory;
