// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 memlay contributors

//! Counter-aware struct views.
//!
//! A view borrows a buffer and interprets a composite instance at a base
//! offset. Field offsets after a dynamic field are recomputed from the
//! live counters on every access, never cached in the view.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::schema::StructDescriptor;
use crate::types::{TypeDescriptor, TypeKind, Value};
use crate::view::size::{dynamic_size, field_offset, read_counter};
use crate::view::{ArrayMut, ArrayRef};

/// Read-only view of a composite instance.
#[derive(Debug, Clone)]
pub struct StructRef<'b> {
    buf: &'b [u8],
    base: usize,
    desc: Arc<TypeDescriptor>,
}

impl<'b> StructRef<'b> {
    /// View the instance of `desc` starting at `base`.
    pub fn new(buf: &'b [u8], base: usize, desc: Arc<TypeDescriptor>) -> Result<Self> {
        if desc.as_struct().is_none() {
            return Err(Error::InvalidType(desc.name.clone()));
        }
        if base > buf.len() {
            return Err(Error::fault(base, buf.len()));
        }
        Ok(Self { buf, base, desc })
    }

    pub fn descriptor(&self) -> &Arc<TypeDescriptor> {
        &self.desc
    }

    fn inner(&self) -> &StructDescriptor {
        // Checked in new.
        match &self.desc.kind {
            TypeKind::Struct(s) => s,
            _ => unreachable!("StructRef over non-struct"),
        }
    }

    fn lookup(&self, name: &str) -> Result<usize> {
        self.inner()
            .field_index(name)
            .ok_or_else(|| Error::InvalidValue(format!("{} has no field {name}", self.desc.name)))
    }

    /// Decode a field, honoring counters for counted and bounded arrays.
    pub fn get(&self, name: &str) -> Result<Value> {
        let index = self.lookup(name)?;
        read_field(self.buf, self.base, self.inner(), index)
    }

    /// Element view over an array field, with its runtime length resolved.
    pub fn array(&self, name: &str) -> Result<ArrayRef<'b>> {
        let index = self.lookup(name)?;
        let s = self.inner();
        let field = &s.fields[index];
        let array = field
            .ty
            .as_array()
            .ok_or_else(|| Error::InvalidType(field.ty.name.clone()))?;
        let len = resolve_len(self.buf, self.base, s, index)?;
        let offset = field_offset(self.buf, self.base, s, index)?;
        Ok(ArrayRef::new(self.buf, offset, array.element.clone(), len))
    }

    /// View of a nested composite field.
    pub fn nested(&self, name: &str) -> Result<StructRef<'b>> {
        let index = self.lookup(name)?;
        let s = self.inner();
        let field = &s.fields[index];
        let offset = field_offset(self.buf, self.base, s, index)?;
        StructRef::new(self.buf, offset, field.ty.clone())
    }

    /// Runtime size of this instance, counters included.
    pub fn dynamic_size(&self) -> Result<usize> {
        dynamic_size(self.buf, self.base, &self.desc)
    }

    /// Effective offset of a field relative to the instance start,
    /// shifted by the extras of dynamic predecessors.
    pub fn offset_of(&self, name: &str) -> Result<usize> {
        let index = self.lookup(name)?;
        let abs = field_offset(self.buf, self.base, self.inner(), index)?;
        Ok(abs - self.base)
    }
}

/// Mutable view of a composite instance.
#[derive(Debug)]
pub struct StructMut<'b> {
    buf: &'b mut [u8],
    base: usize,
    desc: Arc<TypeDescriptor>,
}

impl<'b> StructMut<'b> {
    pub fn new(buf: &'b mut [u8], base: usize, desc: Arc<TypeDescriptor>) -> Result<Self> {
        if desc.as_struct().is_none() {
            return Err(Error::InvalidType(desc.name.clone()));
        }
        if base > buf.len() {
            return Err(Error::fault(base, buf.len()));
        }
        Ok(Self { buf, base, desc })
    }

    /// Read-only reborrow of this view.
    pub fn as_ref(&self) -> StructRef<'_> {
        StructRef {
            buf: self.buf,
            base: self.base,
            desc: self.desc.clone(),
        }
    }

    fn inner(&self) -> &StructDescriptor {
        match &self.desc.kind {
            TypeKind::Struct(s) => s,
            _ => unreachable!("StructMut over non-struct"),
        }
    }

    fn lookup(&self, name: &str) -> Result<usize> {
        self.inner()
            .field_index(name)
            .ok_or_else(|| Error::InvalidValue(format!("{} has no field {name}", self.desc.name)))
    }

    pub fn get(&self, name: &str) -> Result<Value> {
        self.as_ref().get(name)
    }

    pub fn dynamic_size(&self) -> Result<usize> {
        self.as_ref().dynamic_size()
    }

    /// Encode a field, honoring counters for counted and bounded arrays.
    ///
    /// Array values longer than the available room are truncated. For a
    /// counted array the room is the current counter value, so the counter
    /// must be written before the elements.
    pub fn set(&mut self, name: &str, value: &Value) -> Result<()> {
        let index = self.lookup(name)?;
        let desc = self.desc.clone();
        let s = match &desc.kind {
            TypeKind::Struct(s) => s,
            _ => unreachable!(),
        };
        write_field(self.buf, self.base, s, index, value)
    }

    /// [`StructMut::set`] restricted to array fields.
    pub fn set_array(&mut self, name: &str, value: &Value) -> Result<()> {
        let index = self.lookup(name)?;
        let field = &self.inner().fields[index];
        if field.ty.as_array().is_none() {
            return Err(Error::InvalidType(field.ty.name.clone()));
        }
        self.set(name, value)
    }

    /// [`StructMut::set`] restricted to nested composite fields.
    pub fn set_nested(&mut self, name: &str, value: &Value) -> Result<()> {
        let index = self.lookup(name)?;
        let field = &self.inner().fields[index];
        if !field.ty.is_struct() {
            return Err(Error::InvalidType(field.ty.name.clone()));
        }
        self.set(name, value)
    }

    /// Mutable element view over an array field.
    pub fn array_mut(&mut self, name: &str) -> Result<ArrayMut<'_>> {
        let index = self.lookup(name)?;
        let desc = self.desc.clone();
        let s = match &desc.kind {
            TypeKind::Struct(s) => s,
            _ => unreachable!(),
        };
        let field = &s.fields[index];
        let array = field
            .ty
            .as_array()
            .ok_or_else(|| Error::InvalidType(field.ty.name.clone()))?;
        let len = resolve_len(self.buf, self.base, s, index)?;
        let offset = field_offset(self.buf, self.base, s, index)?;
        Ok(ArrayMut::new(self.buf, offset, array.element.clone(), len))
    }

    /// Mutable view of a nested composite field.
    pub fn nested_mut(&mut self, name: &str) -> Result<StructMut<'_>> {
        let index = self.lookup(name)?;
        let desc = self.desc.clone();
        let s = match &desc.kind {
            TypeKind::Struct(s) => s,
            _ => unreachable!(),
        };
        let field = &s.fields[index];
        let offset = field_offset(self.buf, self.base, s, index)?;
        StructMut::new(self.buf, offset, field.ty.clone())
    }

    /// Write every entry of a struct value, in entry order.
    ///
    /// Entries may be a subset of the declared fields. Counters are written
    /// in the order given, so list a counter before the array it counts.
    pub fn copy_from(&mut self, value: &Value) -> Result<()> {
        let entries = match value {
            Value::Struct(entries) => entries,
            other => {
                return Err(Error::InvalidValue(format!(
                    "cannot store {} value into struct {}",
                    other.kind_name(),
                    self.desc.name
                )))
            }
        };
        for (name, item) in entries {
            self.set(name, item)?;
        }
        Ok(())
    }
}

/// Resolved element count of the array field at `index`.
///
/// Counted arrays read their counter; bounded arrays clamp the counter to
/// the capacity; plain arrays use their fixed length.
pub(crate) fn resolve_len(
    buf: &[u8],
    base: usize,
    s: &StructDescriptor,
    index: usize,
) -> Result<usize> {
    let field = &s.fields[index];
    let array = field
        .ty
        .as_array()
        .ok_or_else(|| Error::InvalidType(field.ty.name.clone()))?;
    match &field.counted_by {
        None => Ok(array.length as usize),
        Some(counted) => {
            let count = read_counter(buf, base, s, counted.index)?;
            if array.length == 0 {
                Ok(count)
            } else {
                Ok(count.min(array.length as usize))
            }
        }
    }
}

/// Decode a value of `ty` at absolute `offset`, honoring nested counters.
pub(crate) fn read_value(buf: &[u8], offset: usize, ty: &TypeDescriptor) -> Result<Value> {
    match &ty.kind {
        TypeKind::Primitive(p) => p.read_at(buf, offset, true),
        TypeKind::Array(a) => read_elements(buf, offset, &a.element, a.length as usize),
        TypeKind::Struct(s) => {
            let mut fields = Vec::with_capacity(s.fields.len());
            for index in 0..s.fields.len() {
                fields.push((
                    s.fields[index].name.clone(),
                    read_field(buf, offset, s, index)?,
                ));
            }
            Ok(Value::Struct(fields))
        }
    }
}

fn read_field(buf: &[u8], base: usize, s: &StructDescriptor, index: usize) -> Result<Value> {
    let field = &s.fields[index];
    let offset = field_offset(buf, base, s, index)?;
    match &field.ty.kind {
        TypeKind::Primitive(p) => p.read_at(buf, offset, field.little_endian),
        TypeKind::Array(a) => {
            let len = resolve_len(buf, base, s, index)?;
            read_elements(buf, offset, &a.element, len)
        }
        TypeKind::Struct(_) => read_value(buf, offset, &field.ty),
    }
}

fn read_elements(
    buf: &[u8],
    offset: usize,
    element: &Arc<TypeDescriptor>,
    len: usize,
) -> Result<Value> {
    let mut items = Vec::with_capacity(len);
    let mut cursor = offset;
    for _ in 0..len {
        items.push(read_value(buf, cursor, element)?);
        cursor += if element.is_dynamic() {
            dynamic_size(buf, cursor, element)?
        } else {
            element.size() as usize
        };
    }
    Ok(Value::Array(items))
}

/// Encode a value of `ty` at absolute `offset`, honoring nested counters.
pub(crate) fn write_value(
    buf: &mut [u8],
    offset: usize,
    ty: &TypeDescriptor,
    value: &Value,
) -> Result<()> {
    match &ty.kind {
        TypeKind::Primitive(p) => p.write_at(buf, offset, true, value),
        TypeKind::Array(a) => {
            write_elements(buf, offset, &a.element, a.length as usize, &ty.name, value)
        }
        TypeKind::Struct(s) => {
            let entries = match value {
                Value::Struct(entries) => entries,
                other => {
                    return Err(Error::InvalidValue(format!(
                        "cannot store {} value into struct {}",
                        other.kind_name(),
                        ty.name
                    )))
                }
            };
            for (name, item) in entries {
                let index = s.field_index(name).ok_or_else(|| {
                    Error::InvalidValue(format!("{} has no field {name}", ty.name))
                })?;
                write_field(buf, offset, s, index, item)?;
            }
            Ok(())
        }
    }
}

fn write_field(
    buf: &mut [u8],
    base: usize,
    s: &StructDescriptor,
    index: usize,
    value: &Value,
) -> Result<()> {
    let field = &s.fields[index];
    let offset = field_offset(buf, base, s, index)?;
    match &field.ty.kind {
        TypeKind::Primitive(p) => p.write_at(buf, offset, field.little_endian, value),
        TypeKind::Array(a) => {
            // Write room: the capacity for bounded arrays, the counter for
            // fully counted ones.
            let room = if a.length > 0 {
                a.length as usize
            } else {
                resolve_len(buf, base, s, index)?
            };
            write_elements(buf, offset, &a.element, room, &field.decl, value)
        }
        TypeKind::Struct(_) => write_value(buf, offset, &field.ty, value),
    }
}

fn write_elements(
    buf: &mut [u8],
    offset: usize,
    element: &Arc<TypeDescriptor>,
    room: usize,
    target: &str,
    value: &Value,
) -> Result<()> {
    let items = value.as_array().ok_or_else(|| {
        Error::InvalidValue(format!(
            "cannot store {} value into {target}",
            value.kind_name()
        ))
    })?;
    if items.len() > room {
        log::warn!("truncating write of {} elements into {target}", items.len());
    }
    let mut cursor = offset;
    for item in items.iter().take(room) {
        write_value(buf, cursor, element, item)?;
        cursor += if element.is_dynamic() {
            dynamic_size(buf, cursor, element)?
        } else {
            element.size() as usize
        };
    }
    Ok(())
}
