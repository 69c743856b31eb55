// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 memlay contributors

//! Type descriptors - the codec contract shared by primitives and composites.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::schema::StructDescriptor;
use crate::types::{PrimitiveKind, Value};

/// Kind of a described type.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    /// Fixed-size numeric codec.
    Primitive(PrimitiveKind),
    /// Repetition of an element type.
    Array(ArrayDescriptor),
    /// Struct or union with laid-out fields.
    Struct(StructDescriptor),
}

/// A complete type descriptor.
///
/// Descriptors are immutable once built and own no data: they are pure
/// codecs over `(buffer, offset)` pairs. Composites are themselves valid
/// descriptors, so arbitrary nesting works through [`Arc`] references.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDescriptor {
    /// Type name (canonical primitive name, `elem[len]`, or struct name).
    pub name: String,
    /// Type kind.
    pub kind: TypeKind,
}

/// Array type descriptor.
///
/// `length == 0` marks a counted array: its static size is zero and its
/// real length is read from the sibling counter field at access time.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayDescriptor {
    /// Element type.
    pub element: Arc<TypeDescriptor>,
    /// Fixed element count (0 for counted arrays).
    pub length: u32,
}

impl TypeDescriptor {
    /// Descriptor for a primitive kind.
    pub fn primitive(kind: PrimitiveKind) -> Self {
        Self {
            name: kind.name().to_string(),
            kind: TypeKind::Primitive(kind),
        }
    }

    /// Descriptor for an array of `length` elements.
    pub fn array(element: Arc<TypeDescriptor>, length: u32) -> Self {
        Self {
            name: format!("{}[{}]", element.name, length),
            kind: TypeKind::Array(ArrayDescriptor { element, length }),
        }
    }

    pub(crate) fn composite(name: impl Into<String>, desc: StructDescriptor) -> Self {
        Self {
            name: name.into(),
            kind: TypeKind::Struct(desc),
        }
    }

    /// Static size in bytes. Counted arrays contribute zero; for dynamic
    /// composites this is the size assuming every counter reads zero.
    ///
    /// Saturates at `u32::MAX` for fixed arrays whose extent leaves `u32`;
    /// such arrays never survive layout (see [`TypeDescriptor::try_size`]).
    pub fn size(&self) -> u32 {
        match &self.kind {
            TypeKind::Primitive(p) => p.size(),
            TypeKind::Array(a) => a.element.size().saturating_mul(a.length),
            TypeKind::Struct(s) => s.static_size,
        }
    }

    /// Checked static size: [`Error::Overflow`] when a fixed array's
    /// extent exceeds `u32`.
    pub fn try_size(&self) -> Result<u32> {
        match &self.kind {
            TypeKind::Primitive(p) => Ok(p.size()),
            TypeKind::Array(a) => {
                let elem = a.element.try_size()?;
                elem.checked_mul(a.length)
                    .ok_or(Error::Overflow(elem as u64 * a.length as u64))
            }
            TypeKind::Struct(s) => Ok(s.static_size),
        }
    }

    /// Alignment requirement (C rules: arrays align like their element).
    pub fn alignment(&self) -> u32 {
        match &self.kind {
            TypeKind::Primitive(p) => p.alignment(),
            TypeKind::Array(a) => a.element.alignment(),
            TypeKind::Struct(s) => s.alignment,
        }
    }

    /// True when the runtime size of an instance can differ from
    /// [`TypeDescriptor::size`].
    pub fn is_dynamic(&self) -> bool {
        match &self.kind {
            TypeKind::Primitive(_) => false,
            TypeKind::Array(a) => a.length == 0 || a.element.is_dynamic(),
            TypeKind::Struct(s) => s.is_dynamic,
        }
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self.kind, TypeKind::Primitive(_))
    }

    pub fn is_struct(&self) -> bool {
        matches!(self.kind, TypeKind::Struct(_))
    }

    pub fn as_primitive(&self) -> Option<PrimitiveKind> {
        match self.kind {
            TypeKind::Primitive(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayDescriptor> {
        match &self.kind {
            TypeKind::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&StructDescriptor> {
        match &self.kind {
            TypeKind::Struct(s) => Some(s),
            _ => None,
        }
    }

    /// Decode a value at `offset`, interpreting the static layout.
    ///
    /// Counters are not consulted: counted arrays decode as empty and
    /// capacity-bounded arrays decode at full capacity. The counter-aware
    /// path is [`crate::view::StructRef`].
    pub fn read(&self, buf: &[u8], offset: usize) -> Result<Value> {
        match &self.kind {
            TypeKind::Primitive(p) => p.read_at(buf, offset, true),
            TypeKind::Array(a) => {
                let stride = a.element.size() as usize;
                let mut items = Vec::with_capacity(a.length as usize);
                for i in 0..a.length as usize {
                    items.push(a.element.read(buf, offset + i * stride)?);
                }
                Ok(Value::Array(items))
            }
            TypeKind::Struct(s) => {
                let mut fields = Vec::with_capacity(s.fields.len());
                for field in &s.fields {
                    let at = offset + field.offset as usize;
                    let value = match field.ty.as_primitive() {
                        Some(p) => p.read_at(buf, at, field.little_endian)?,
                        None => field.ty.read(buf, at)?,
                    };
                    fields.push((field.name.clone(), value));
                }
                Ok(Value::Struct(fields))
            }
        }
    }

    /// Encode a value at `offset`, interpreting the static layout.
    ///
    /// Array writes stop at the shorter of the value and the capacity
    /// (deliberate truncation - the array occupies fixed, pre-allocated
    /// room). Struct writes accept any subset of the declared fields.
    pub fn write(&self, buf: &mut [u8], offset: usize, value: &Value) -> Result<()> {
        match &self.kind {
            TypeKind::Primitive(p) => p.write_at(buf, offset, true, value),
            TypeKind::Array(a) => {
                let items = value.as_array().ok_or_else(|| {
                    Error::InvalidValue(format!(
                        "cannot store {} value into {}",
                        value.kind_name(),
                        self.name
                    ))
                })?;
                let stride = a.element.size() as usize;
                let n = items.len().min(a.length as usize);
                if items.len() > a.length as usize {
                    log::warn!(
                        "truncating write of {} elements into {}",
                        items.len(),
                        self.name
                    );
                }
                for (i, item) in items.iter().take(n).enumerate() {
                    a.element.write(buf, offset + i * stride, item)?;
                }
                Ok(())
            }
            TypeKind::Struct(s) => {
                let entries = match value {
                    Value::Struct(entries) => entries,
                    other => {
                        return Err(Error::InvalidValue(format!(
                            "cannot store {} value into struct {}",
                            other.kind_name(),
                            self.name
                        )))
                    }
                };
                for (name, item) in entries {
                    let field = s.field(name).ok_or_else(|| {
                        Error::InvalidValue(format!("{} has no field {name}", self.name))
                    })?;
                    let at = offset + field.offset as usize;
                    match field.ty.as_primitive() {
                        Some(p) => p.write_at(buf, at, field.little_endian, item)?,
                        None => field.ty.write(buf, at, item)?,
                    }
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_descriptor() {
        let d = TypeDescriptor::primitive(PrimitiveKind::U32);
        assert_eq!(d.name, "uint32");
        assert_eq!(d.size(), 4);
        assert_eq!(d.alignment(), 4);
        assert!(!d.is_dynamic());
    }

    #[test]
    fn array_descriptor_naming_and_size() {
        let elem = Arc::new(TypeDescriptor::primitive(PrimitiveKind::U16));
        let d = TypeDescriptor::array(elem, 8);
        assert_eq!(d.name, "uint16[8]");
        assert_eq!(d.size(), 16);
        assert_eq!(d.alignment(), 2);
    }

    #[test]
    fn counted_array_is_dynamic() {
        let elem = Arc::new(TypeDescriptor::primitive(PrimitiveKind::U8));
        let d = TypeDescriptor::array(elem, 0);
        assert_eq!(d.size(), 0);
        assert!(d.is_dynamic());
    }

    #[test]
    fn oversized_array_extent_is_overflow() {
        let elem = Arc::new(TypeDescriptor::primitive(PrimitiveKind::U64));
        let d = TypeDescriptor::array(elem, 0x2000_0000);
        assert!(matches!(d.try_size().unwrap_err(), Error::Overflow(_)));
        // The unchecked accessor saturates instead of wrapping.
        assert_eq!(d.size(), u32::MAX);
    }

    #[test]
    fn array_roundtrip_with_truncation() {
        let elem = Arc::new(TypeDescriptor::primitive(PrimitiveKind::U8));
        let d = TypeDescriptor::array(elem, 3);
        let mut buf = [0u8; 3];
        d.write(&mut buf, 0, &vec![9u8, 8, 7, 6].into()).unwrap();
        assert_eq!(buf, [9, 8, 7]);
        d.write(&mut buf, 0, &vec![1u8].into()).unwrap();
        assert_eq!(buf, [1, 8, 7]);
    }
}
