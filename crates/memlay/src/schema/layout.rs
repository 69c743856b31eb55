// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 memlay contributors

//! Layout engine for composite types.
//!
//! Offsets, padding, and total size follow C compiler rules: each field is
//! placed at the next multiple of its alignment, the struct's alignment is
//! the maximum field alignment, and the total size is padded to a multiple
//! of the struct alignment. Packed composites place every field at the next
//! free byte and have alignment 1. Unions place every member at offset 0
//! and size to the largest member.

use crate::config::MAX_ALIGNMENT;
use crate::error::{Error, Result};
use crate::schema::Field;
use crate::types::TypeDescriptor;

/// Laid-out composite descriptor: the payload of
/// [`crate::types::TypeKind::Struct`].
#[derive(Debug, Clone, PartialEq)]
pub struct StructDescriptor {
    /// Fields in declaration order, with resolved offsets.
    pub fields: Vec<Field>,
    /// Size assuming every counter reads zero, including tail padding.
    pub static_size: u32,
    /// Maximum field alignment (1 for packed composites).
    pub alignment: u32,
    pub is_union: bool,
    pub is_packed: bool,
    /// True when any field's runtime extent can exceed its static size.
    pub is_dynamic: bool,
}

impl StructDescriptor {
    /// Field by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Declaration index of a field.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

/// Next multiple of `align` at or above `value`, or `None` when the
/// result leaves `u32`. `align` must be non-zero.
pub(crate) fn align_up(value: u32, align: u32) -> Option<u32> {
    value.checked_next_multiple_of(align)
}

/// A field declaration with its overrides resolved, ready for placement.
pub(crate) struct Placement {
    pub field: Field,
    pub align_override: Option<u32>,
}

/// Run the layout over `placements`, filling in each field's offset and
/// computing the composite totals.
pub(crate) fn lay_out(
    mut placements: Vec<Placement>,
    is_union: bool,
    is_packed: bool,
) -> Result<StructDescriptor> {
    let mut size: u32 = 0;
    let mut max_align: u32 = 1;
    let mut is_dynamic = false;

    for p in &mut placements {
        let natural = p.field.ty.alignment().max(1);
        let align = match p.align_override {
            Some(a) => a,
            None if is_packed => 1,
            None => natural,
        };
        if align == 0 || !align.is_power_of_two() || align > MAX_ALIGNMENT {
            return Err(Error::schema(format!(
                "field {} has invalid alignment {align}",
                p.field.name
            )));
        }
        p.field.alignment = align;
        p.field.size = p.field.ty.try_size().map_err(|_| {
            Error::schema(format!(
                "field {} exceeds the 32-bit size space",
                p.field.name
            ))
        })?;

        if is_union {
            p.field.offset = 0;
            size = size.max(p.field.size);
        } else {
            size = align_up(size, align).ok_or(Error::Overflow(u32::MAX as u64))?;
            p.field.offset = size;
            size = size
                .checked_add(p.field.size)
                .ok_or(Error::Overflow(u32::MAX as u64))?;
        }
        max_align = max_align.max(align);
        is_dynamic |= p.field.is_dynamic();
    }

    let alignment = if is_packed { 1 } else { max_align };
    let static_size = align_up(size, alignment).ok_or(Error::Overflow(u32::MAX as u64))?;

    Ok(StructDescriptor {
        fields: placements.into_iter().map(|p| p.field).collect(),
        static_size,
        alignment,
        is_union,
        is_packed,
        is_dynamic,
    })
}

/// Static byte offset of a field within a composite descriptor.
///
/// For fields that follow a dynamic predecessor this is the offset under
/// the all-counters-zero assumption; the counter-aware offset is computed
/// per access by [`crate::view`].
pub fn offset_of(desc: &TypeDescriptor, field: &str) -> Result<u32> {
    let s = desc
        .as_struct()
        .ok_or_else(|| Error::InvalidType(desc.name.clone()))?;
    s.field(field)
        .map(|f| f.offset)
        .ok_or_else(|| Error::InvalidValue(format!("{} has no field {field}", desc.name)))
}

/// Static size of a descriptor in bytes (counters assumed zero).
pub fn size_of(desc: &TypeDescriptor) -> u32 {
    desc.size()
}
