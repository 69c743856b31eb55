// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 memlay contributors

//! Typed pointers into an arena.
//!
//! A pointer is a plain `(type, address)` value. It borrows nothing: the
//! arena is passed in at dereference time, so pointers can be stored,
//! copied, and persisted freely. Address arithmetic wraps, like the
//! hardware it models.

use std::sync::Arc;

use crate::error::Result;
use crate::mem::Memory;
use crate::types::{TypeDescriptor, Value};
use crate::view::{StructMut, StructRef};

/// A typed address into an arena.
#[derive(Debug, Clone)]
pub struct Pointer {
    pub ty: Arc<TypeDescriptor>,
    pub addr: u32,
}

impl Pointer {
    pub fn new(ty: Arc<TypeDescriptor>, addr: u32) -> Self {
        Self { ty, addr }
    }

    /// Decode the pointee (static interpretation).
    pub fn deref(&self, mem: &Memory) -> Result<Value> {
        self.ty.read(mem.bytes(), self.addr as usize)
    }

    /// Counter-aware view of a struct pointee.
    pub fn deref_struct<'m>(&self, mem: &'m Memory) -> Result<StructRef<'m>> {
        StructRef::new(mem.bytes(), self.addr as usize, self.ty.clone())
    }

    /// Counter-aware mutable view of a struct pointee.
    pub fn deref_struct_mut<'m>(&self, mem: &'m mut Memory) -> Result<StructMut<'m>> {
        StructMut::new(mem.bytes_mut(), self.addr as usize, self.ty.clone())
    }

    /// Encode a value into the pointee.
    pub fn write(&self, mem: &mut Memory, value: &Value) -> Result<()> {
        self.ty.write(mem.bytes_mut(), self.addr as usize, value)
    }

    /// Same address, different type.
    pub fn cast(&self, ty: Arc<TypeDescriptor>) -> Self {
        Self {
            ty,
            addr: self.addr,
        }
    }

    /// Pointer arithmetic: move by `n` elements of the pointee type.
    pub fn add(&self, n: i32) -> Self {
        let step = (self.ty.size() as i32).wrapping_mul(n);
        Self {
            ty: self.ty.clone(),
            addr: self.addr.wrapping_add(step as u32),
        }
    }

    pub fn inc(&self) -> Self {
        self.add(1)
    }

    pub fn dec(&self) -> Self {
        self.add(-1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PrimitiveKind;

    fn prim(kind: PrimitiveKind) -> Arc<TypeDescriptor> {
        Arc::new(TypeDescriptor::primitive(kind))
    }

    #[test]
    fn deref_and_write() {
        let mut mem = Memory::new(64);
        let p = mem.alloc(4).unwrap().cast(prim(PrimitiveKind::U32));
        p.write(&mut mem, &Value::U32(0xBEEF)).unwrap();
        assert_eq!(p.deref(&mem).unwrap(), Value::U32(0xBEEF));
    }

    #[test]
    fn arithmetic_steps_by_element_size() {
        let p = Pointer::new(prim(PrimitiveKind::U32), 100);
        assert_eq!(p.inc().addr, 104);
        assert_eq!(p.dec().addr, 96);
        assert_eq!(p.add(-3).addr, 88);
    }

    #[test]
    fn arithmetic_wraps() {
        let p = Pointer::new(prim(PrimitiveKind::U32), 0);
        assert_eq!(p.dec().addr, u32::MAX - 3);
    }

    #[test]
    fn cast_preserves_address() {
        let p = Pointer::new(prim(PrimitiveKind::U32), 40);
        let q = p.cast(prim(PrimitiveKind::U8));
        assert_eq!(q.addr, 40);
        assert_eq!(q.inc().addr, 41);
    }
}
