// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 memlay contributors

//! Thread-shared arena handle.

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use crate::config::ArenaOptions;
use crate::mem::Memory;

/// Clonable handle to an arena behind a mutex.
///
/// Views borrow the guard, so the lock is held for exactly as long as a
/// caller keeps the guard alive.
#[derive(Debug, Clone, Default)]
pub struct SharedMemory {
    inner: Arc<Mutex<Memory>>,
}

impl SharedMemory {
    pub fn new(size: u32) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Memory::new(size))),
        }
    }

    pub fn with_options(size: u32, options: ArenaOptions) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Memory::with_options(size, options))),
        }
    }

    pub fn from_memory(mem: Memory) -> Self {
        Self {
            inner: Arc::new(Mutex::new(mem)),
        }
    }

    /// Lock the arena for exclusive access.
    pub fn lock(&self) -> MutexGuard<'_, Memory> {
        self.inner.lock()
    }
}
