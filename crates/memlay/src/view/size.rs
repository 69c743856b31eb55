// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 memlay contributors

//! Runtime size and offset resolution.
//!
//! Counters are read from the buffer on every call. Nothing here caches
//! across calls: a counter written a microsecond ago is honored by the next
//! access.

use crate::config::SAFE_COUNTER_MAX;
use crate::error::{Error, Result};
use crate::schema::StructDescriptor;
use crate::types::{TypeDescriptor, TypeKind};

/// Runtime size in bytes of an instance of `desc` at absolute `base`.
///
/// For static types this equals [`TypeDescriptor::size`]. For dynamic
/// composites the counters in the buffer are consulted, so the result can
/// change between calls as the instance is mutated.
pub fn dynamic_size(buf: &[u8], base: usize, desc: &TypeDescriptor) -> Result<usize> {
    match &desc.kind {
        TypeKind::Primitive(p) => Ok(p.size() as usize),
        TypeKind::Array(a) => {
            if a.length == 0 {
                // A counted array has no meaning outside its struct.
                return Err(Error::InvalidType(desc.name.clone()));
            }
            if !a.element.is_dynamic() {
                return Ok(desc.size() as usize);
            }
            let mut cursor = base;
            for _ in 0..a.length {
                cursor += dynamic_size(buf, cursor, &a.element)?;
            }
            Ok(cursor - base)
        }
        TypeKind::Struct(s) => {
            let mut size = s.static_size as usize;
            for index in 0..s.fields.len() {
                size += field_extra(buf, base, s, index)?;
            }
            Ok(size)
        }
    }
}

/// Bytes a field occupies beyond its static size.
///
/// Zero for every static field, and notably zero for capacity-bounded
/// counted arrays, which always occupy their full capacity.
pub(crate) fn field_extra(
    buf: &[u8],
    base: usize,
    s: &StructDescriptor,
    index: usize,
) -> Result<usize> {
    let field = &s.fields[index];
    if !field.is_dynamic() {
        return Ok(0);
    }
    let offset = field_offset(buf, base, s, index)?;
    match field.ty.as_array() {
        Some(a) if a.length == 0 => {
            let counted = field
                .counted_by
                .as_ref()
                .ok_or_else(|| Error::schema(format!("{} has no counter", field.decl)))?;
            let count = read_counter(buf, base, s, counted.index)?;
            if a.element.is_dynamic() {
                let mut cursor = offset;
                for _ in 0..count {
                    cursor += dynamic_size(buf, cursor, &a.element)?;
                }
                Ok(cursor - offset)
            } else {
                count
                    .checked_mul(a.element.size() as usize)
                    .ok_or(Error::Overflow(count as u64))
            }
        }
        // Fixed array of dynamic elements, or a nested dynamic composite.
        _ => {
            let runtime = dynamic_size(buf, offset, &field.ty)?;
            Ok(runtime - field.ty.size() as usize)
        }
    }
}

/// Effective absolute offset of field `index` of the instance at `base`.
///
/// The static offset shifted right by the extra bytes of every dynamic
/// predecessor. Recomputed per call; predecessor counters are strictly
/// earlier fields, so the recursion terminates.
pub(crate) fn field_offset(
    buf: &[u8],
    base: usize,
    s: &StructDescriptor,
    index: usize,
) -> Result<usize> {
    let mut offset = base + s.fields[index].offset as usize;
    for earlier in 0..index {
        if s.fields[earlier].is_dynamic() {
            offset += field_extra(buf, base, s, earlier)?;
        }
    }
    Ok(offset)
}

/// Read the counter field at `index` and coerce it to an element count.
///
/// Negative counters are [`Error::InvalidValue`]; counters above
/// [`SAFE_COUNTER_MAX`] are [`Error::Overflow`].
pub(crate) fn read_counter(
    buf: &[u8],
    base: usize,
    s: &StructDescriptor,
    index: usize,
) -> Result<usize> {
    let field = &s.fields[index];
    let kind = field
        .ty
        .as_primitive()
        .ok_or_else(|| Error::schema(format!("counter {} is not primitive", field.name)))?;
    let offset = field_offset(buf, base, s, index)?;
    let value = kind.read_at(buf, offset, field.little_endian)?;
    let raw = value
        .as_int()
        .ok_or_else(|| Error::InvalidValue(format!("counter {} is not integral", field.name)))?;
    if kind.is_signed() {
        if raw < 0 {
            return Err(Error::InvalidValue(format!(
                "counter {} is negative ({raw})",
                field.name
            )));
        }
        if raw as u64 > SAFE_COUNTER_MAX {
            return Err(Error::Overflow(raw as u64));
        }
        Ok(raw as usize)
    } else {
        // Unsigned counters recover the full bit pattern.
        let raw = raw as u64;
        if raw > SAFE_COUNTER_MAX {
            return Err(Error::Overflow(raw));
        }
        Ok(raw as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::StructBuilder;
    use crate::types::PrimitiveKind;
    use std::sync::Arc;

    fn prim(kind: PrimitiveKind) -> Arc<TypeDescriptor> {
        Arc::new(TypeDescriptor::primitive(kind))
    }

    #[test]
    fn counted_array_tracks_counter() {
        let desc = StructBuilder::new("Blob")
            .packed()
            .field("len", prim(PrimitiveKind::U8))
            .counted_array("data", prim(PrimitiveKind::U8), "len")
            .build()
            .unwrap();
        let mut buf = [0u8; 16];
        assert_eq!(dynamic_size(&buf, 0, &desc).unwrap(), 1);
        buf[0] = 5;
        assert_eq!(dynamic_size(&buf, 0, &desc).unwrap(), 6);
        buf[0] = 3;
        assert_eq!(dynamic_size(&buf, 0, &desc).unwrap(), 4);
    }

    #[test]
    fn negative_counter_is_invalid() {
        let desc = StructBuilder::new("Blob")
            .packed()
            .field("len", prim(PrimitiveKind::I8))
            .counted_array("data", prim(PrimitiveKind::U8), "len")
            .build()
            .unwrap();
        let buf = [0xFFu8; 4];
        assert!(matches!(
            dynamic_size(&buf, 0, &desc).unwrap_err(),
            Error::InvalidValue(_)
        ));
    }

    #[test]
    fn unsigned_counter_high_bit_is_a_length() {
        let desc = StructBuilder::new("Blob")
            .packed()
            .field("len", prim(PrimitiveKind::U8))
            .counted_array("data", prim(PrimitiveKind::U8), "len")
            .build()
            .unwrap();
        let mut buf = [0u8; 256];
        buf[0] = 200; // same bit pattern as int8 -56
        assert_eq!(dynamic_size(&buf, 0, &desc).unwrap(), 201);
    }

    #[test]
    fn huge_counter_overflows() {
        let desc = StructBuilder::new("Blob")
            .packed()
            .field("len", prim(PrimitiveKind::U64))
            .counted_array("data", prim(PrimitiveKind::U8), "len")
            .build()
            .unwrap();
        let mut buf = [0u8; 16];
        buf[..8].copy_from_slice(&u64::MAX.to_le_bytes());
        assert_eq!(
            dynamic_size(&buf, 0, &desc).unwrap_err(),
            Error::Overflow(u64::MAX)
        );
    }

    #[test]
    fn bounded_counted_array_has_static_size() {
        let desc = StructBuilder::new("Name")
            .packed()
            .field("len", prim(PrimitiveKind::U8))
            .bounded_counted_array("chars", prim(PrimitiveKind::U8), 32, "len")
            .build()
            .unwrap();
        let mut buf = [0u8; 64];
        buf[0] = 200; // counter beyond capacity does not grow the struct
        assert_eq!(dynamic_size(&buf, 0, &desc).unwrap(), 33);
    }
}
