// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 memlay contributors

//! Arena allocator over a flat byte buffer.
//!
//! The arena tracks sections in an address-ordered map. Allocation is
//! first-fit with splitting; freeing coalesces with both neighbors before
//! the call returns, so the map never holds two adjacent free sections.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::{ArenaOptions, DEFAULT_ARENA_SIZE};
use crate::error::{Error, Result};
use crate::mem::Pointer;
use crate::types::{PrimitiveKind, TypeDescriptor};

/// A contiguous run of bytes in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Section {
    size: u32,
    is_free: bool,
}

/// Byte accounting snapshot of an arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryUsage {
    pub total: u32,
    pub used: u32,
    pub free: u32,
}

/// A flat byte arena with first-fit allocation.
#[derive(Debug)]
pub struct Memory {
    buf: Box<[u8]>,
    map: BTreeMap<u32, Section>,
    zero_on_free: bool,
}

impl Memory {
    /// Arena of `size` zeroed bytes.
    pub fn new(size: u32) -> Self {
        Self::with_options(size, ArenaOptions::default())
    }

    /// Arena of the default size (64 KiB).
    pub fn with_default_size() -> Self {
        Self::new(DEFAULT_ARENA_SIZE as u32)
    }

    pub fn with_options(size: u32, options: ArenaOptions) -> Self {
        Self::from_parts(vec![0u8; size as usize].into_boxed_slice(), options)
    }

    /// Arena over an existing buffer, preserving its contents.
    ///
    /// The whole buffer starts as one free section; previously written
    /// bytes stay readable through [`Memory::at`] until something
    /// allocates over them.
    pub fn from_buffer(buf: impl Into<Box<[u8]>>) -> Self {
        Self::from_parts(buf.into(), ArenaOptions::default())
    }

    fn from_parts(buf: Box<[u8]>, options: ArenaOptions) -> Self {
        let size = buf.len() as u32;
        let mut map = BTreeMap::new();
        if size > 0 {
            map.insert(
                0,
                Section {
                    size,
                    is_free: true,
                },
            );
        }
        Self {
            buf,
            map,
            zero_on_free: options.zero_on_free,
        }
    }

    /// Total arena size in bytes.
    pub fn len(&self) -> u32 {
        self.buf.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The whole backing buffer.
    pub fn bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.buf
    }

    /// Bytes from `addr` to the end of the arena.
    ///
    /// `addr == len` yields an empty slice; anything past that is a fault.
    pub fn at(&self, addr: u32) -> Result<&[u8]> {
        self.buf
            .get(addr as usize..)
            .ok_or_else(|| Error::fault(addr as usize, self.buf.len()))
    }

    pub fn at_mut(&mut self, addr: u32) -> Result<&mut [u8]> {
        let len = self.buf.len();
        self.buf
            .get_mut(addr as usize..)
            .ok_or_else(|| Error::fault(addr as usize, len))
    }

    /// Allocate `size` bytes, first fit.
    ///
    /// Returns a byte-typed pointer (`uint8`, stride 1); [`Pointer::cast`]
    /// reinterprets it.
    pub fn alloc(&mut self, size: u32) -> Result<Pointer> {
        self.alloc_raw(size).map(byte_pointer)
    }

    fn alloc_raw(&mut self, size: u32) -> Result<u32> {
        let size = size.max(1);
        let found = self
            .map
            .iter()
            .find(|(_, sec)| sec.is_free && sec.size >= size)
            .map(|(addr, sec)| (*addr, *sec));
        let Some((addr, section)) = found else {
            // Total free bytes; under fragmentation every run may still be
            // too small for the request.
            let available: u32 = self
                .map
                .values()
                .filter(|s| s.is_free)
                .map(|s| s.size)
                .sum();
            log::debug!("allocation of {size} bytes failed, {available} bytes free");
            return Err(Error::OutOfMemory {
                requested: size as usize,
                available: available as usize,
            });
        };
        self.map.insert(
            addr,
            Section {
                size,
                is_free: false,
            },
        );
        if section.size > size {
            self.map.insert(
                addr + size,
                Section {
                    size: section.size - size,
                    is_free: true,
                },
            );
        }
        log::trace!("alloc {size} bytes at {addr:#x}");
        Ok(addr)
    }

    /// Free the allocation at `addr`.
    ///
    /// `addr` must be the exact address returned by [`Memory::alloc`] or
    /// [`Memory::realloc`]; anything else is [`Error::InvalidAddress`].
    pub fn free(&mut self, addr: u32) -> Result<()> {
        let section = self
            .allocated(addr)
            .ok_or(Error::InvalidAddress(addr))?;
        if self.zero_on_free {
            let range = addr as usize..(addr + section.size) as usize;
            self.buf[range].fill(0);
        }
        self.map.insert(
            addr,
            Section {
                size: section.size,
                is_free: true,
            },
        );
        self.coalesce(addr);
        log::trace!("free {} bytes at {addr:#x}", section.size);
        Ok(())
    }

    /// Resize the allocation at `addr`, returning a byte-typed pointer to
    /// its (possibly moved) address. Grows in place when the next section
    /// is free and large enough; otherwise allocates fresh, copies
    /// `min(old, new)` bytes, and frees the old section.
    pub fn realloc(&mut self, addr: u32, new_size: u32) -> Result<Pointer> {
        self.realloc_raw(addr, new_size).map(byte_pointer)
    }

    fn realloc_raw(&mut self, addr: u32, new_size: u32) -> Result<u32> {
        if addr as usize > self.buf.len() {
            return Err(Error::fault(addr as usize, self.buf.len()));
        }
        let section = self
            .allocated(addr)
            .ok_or(Error::InvalidAddress(addr))?;
        let new_size = new_size.max(1);
        let old_size = section.size;

        if new_size == old_size {
            return Ok(addr);
        }
        if new_size < old_size {
            self.map.insert(
                addr,
                Section {
                    size: new_size,
                    is_free: false,
                },
            );
            self.map.insert(
                addr + new_size,
                Section {
                    size: old_size - new_size,
                    is_free: true,
                },
            );
            self.coalesce(addr + new_size);
            return Ok(addr);
        }

        // Grow in place when the neighbor has room.
        let next_addr = addr + old_size;
        if let Some(next) = self.map.get(&next_addr).copied() {
            if next.is_free && old_size + next.size >= new_size {
                self.map.remove(&next_addr);
                self.map.insert(
                    addr,
                    Section {
                        size: new_size,
                        is_free: false,
                    },
                );
                let leftover = old_size + next.size - new_size;
                if leftover > 0 {
                    self.map.insert(
                        addr + new_size,
                        Section {
                            size: leftover,
                            is_free: true,
                        },
                    );
                }
                log::trace!("realloc {addr:#x}: {old_size} -> {new_size} in place");
                return Ok(addr);
            }
        }

        let new_addr = self.alloc_raw(new_size)?;
        let copy = old_size.min(new_size) as usize;
        self.buf
            .copy_within(addr as usize..addr as usize + copy, new_addr as usize);
        self.free(addr)?;
        log::trace!("realloc {addr:#x}: {old_size} -> {new_size} moved to {new_addr:#x}");
        Ok(new_addr)
    }

    /// Byte accounting across all sections.
    pub fn usage(&self) -> MemoryUsage {
        let used = self
            .map
            .values()
            .filter(|s| !s.is_free)
            .map(|s| s.size)
            .sum();
        MemoryUsage {
            total: self.len(),
            used,
            free: self.len() - used,
        }
    }

    fn allocated(&self, addr: u32) -> Option<Section> {
        self.map
            .get(&addr)
            .copied()
            .filter(|s| !s.is_free)
    }

    /// Merge the free section at `addr` with free neighbors on both sides.
    fn coalesce(&mut self, addr: u32) {
        let mut addr = addr;
        let mut section = match self.map.get(&addr) {
            Some(s) if s.is_free => *s,
            _ => return,
        };

        if let Some((&prev_addr, &prev)) = self.map.range(..addr).next_back() {
            if prev.is_free && prev_addr + prev.size == addr {
                self.map.remove(&addr);
                section = Section {
                    size: prev.size + section.size,
                    is_free: true,
                };
                addr = prev_addr;
                self.map.insert(addr, section);
            }
        }
        let next_addr = addr + section.size;
        if let Some(&next) = self.map.get(&next_addr) {
            if next.is_free {
                self.map.remove(&next_addr);
                self.map.insert(
                    addr,
                    Section {
                        size: section.size + next.size,
                        is_free: true,
                    },
                );
            }
        }
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::with_default_size()
    }
}

fn byte_pointer(addr: u32) -> Pointer {
    Pointer::new(
        Arc::new(TypeDescriptor::primitive(PrimitiveKind::U8)),
        addr,
    )
}
