// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 memlay contributors

//! Crate-wide tunables - single source of truth.
//!
//! Every limit the layout engine or the allocator enforces is defined here;
//! nothing is hardcoded elsewhere.

/// Default arena size used by [`crate::mem::Memory::default`].
pub const DEFAULT_ARENA_SIZE: usize = 64 * 1024;

/// Largest per-field alignment the layout engine accepts.
///
/// Matches the strictest alignment any supported primitive can require
/// (16 covers long double on common LP64 targets, should it ever be added).
pub const MAX_ALIGNMENT: u32 = 16;

/// Upper bound for counted-by values and computed dynamic extents.
///
/// Offsets and sizes in the data model are 32-bit; any counter or extent
/// above this reports [`crate::Error::Overflow`].
pub const SAFE_COUNTER_MAX: u64 = u32::MAX as u64;

/// Per-arena construction options.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArenaOptions {
    /// Zero a section's bytes when it is freed.
    pub zero_on_free: bool,
}

impl ArenaOptions {
    pub fn zero_on_free(mut self) -> Self {
        self.zero_on_free = true;
        self
    }
}
