// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 memlay contributors

//! Fluent builders for composite descriptors.
//!
//! ```
//! use std::sync::Arc;
//! use memlay::schema::StructBuilder;
//! use memlay::types::{PrimitiveKind, TypeDescriptor};
//!
//! let u8_ty = Arc::new(TypeDescriptor::primitive(PrimitiveKind::U8));
//! let u32_ty = Arc::new(TypeDescriptor::primitive(PrimitiveKind::U32));
//! let packet = StructBuilder::new("Packet")
//!     .field("kind", u8_ty.clone())
//!     .field("length", u32_ty)
//!     .counted_array("payload", u8_ty, "length")
//!     .build()
//!     .unwrap();
//! assert_eq!(packet.size(), 8); // 1 + 3 padding + 4, payload is dynamic
//! ```

use std::collections::HashSet;
use std::sync::Arc;

use crate::config::MAX_ALIGNMENT;
use crate::error::{Error, Result};
use crate::schema::layout::{align_up, lay_out, Placement};
use crate::schema::{CountedBy, Field, FieldDef};
use crate::types::TypeDescriptor;

/// Builder for struct descriptors.
///
/// Fields are laid out in declaration order. At most one field per
/// definition may be dynamic (a counted array of capacity 0, or a nested
/// dynamic struct) and it must be declared last; extending a dynamic base
/// is the one sanctioned way to place fields after a dynamic one.
#[derive(Debug)]
pub struct StructBuilder {
    name: String,
    defs: Vec<(String, FieldDef)>,
    is_packed: bool,
    align: Option<u32>,
    base: Option<Arc<TypeDescriptor>>,
}

impl StructBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            defs: Vec::new(),
            is_packed: false,
            align: None,
            base: None,
        }
    }

    /// Start from an existing struct descriptor: its fields are prepended
    /// and re-laid-out together with the new ones, and its packing mode is
    /// inherited (until overridden).
    pub fn extend(name: impl Into<String>, base: Arc<TypeDescriptor>) -> Self {
        let is_packed = base.as_struct().is_some_and(|s| s.is_packed);
        Self {
            name: name.into(),
            defs: Vec::new(),
            is_packed,
            align: None,
            base: Some(base),
        }
    }

    /// Place every field at the next free byte, with no padding anywhere.
    pub fn packed(mut self) -> Self {
        self.is_packed = true;
        self
    }

    /// Raise the struct's alignment to at least `align`; the total size is
    /// rounded up to match.
    pub fn align(mut self, align: u32) -> Self {
        self.align = Some(align);
        self
    }

    /// Declare a field with default placement.
    pub fn field(self, name: impl Into<String>, ty: Arc<TypeDescriptor>) -> Self {
        self.field_with(name, FieldDef::new(ty))
    }

    /// Declare a field with explicit overrides.
    pub fn field_with(mut self, name: impl Into<String>, def: FieldDef) -> Self {
        self.defs.push((name.into(), def));
        self
    }

    /// Declare a fixed-length array field.
    pub fn array(self, name: impl Into<String>, element: Arc<TypeDescriptor>, length: u32) -> Self {
        let ty = Arc::new(TypeDescriptor::array(element, length));
        self.field(name, ty)
    }

    /// Declare a counted array: zero static size, with the element count
    /// read from `counter` at access time. Must be the last field.
    pub fn counted_array(
        self,
        name: impl Into<String>,
        element: Arc<TypeDescriptor>,
        counter: impl Into<String>,
    ) -> Self {
        let ty = Arc::new(TypeDescriptor::array(element, 0));
        self.field_with(name, FieldDef::new(ty).counted_by(counter))
    }

    /// Declare a capacity-bounded counted array: it always occupies
    /// `capacity` elements of static room, while reads clamp to the lesser
    /// of `counter` and `capacity`.
    pub fn bounded_counted_array(
        self,
        name: impl Into<String>,
        element: Arc<TypeDescriptor>,
        capacity: u32,
        counter: impl Into<String>,
    ) -> Self {
        let ty = Arc::new(TypeDescriptor::array(element, capacity));
        self.field_with(name, FieldDef::new(ty).counted_by(counter))
    }

    /// Declare a nested composite field.
    pub fn nested(self, name: impl Into<String>, ty: Arc<TypeDescriptor>) -> Self {
        self.field(name, ty)
    }

    /// Validate and lay out the struct.
    pub fn build(self) -> Result<Arc<TypeDescriptor>> {
        build_composite(
            self.name,
            self.base,
            self.defs,
            false,
            self.is_packed,
            self.align,
        )
    }
}

/// Builder for union descriptors.
///
/// All members sit at offset 0 and the union sizes to its largest member.
/// Members must have a static size; counted arrays and dynamic composites
/// are rejected.
#[derive(Debug)]
pub struct UnionBuilder {
    name: String,
    defs: Vec<(String, FieldDef)>,
}

impl UnionBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            defs: Vec::new(),
        }
    }

    pub fn field(self, name: impl Into<String>, ty: Arc<TypeDescriptor>) -> Self {
        self.field_with(name, FieldDef::new(ty))
    }

    pub fn field_with(mut self, name: impl Into<String>, def: FieldDef) -> Self {
        self.defs.push((name.into(), def));
        self
    }

    pub fn build(self) -> Result<Arc<TypeDescriptor>> {
        build_composite(self.name, None, self.defs, true, false, None)
    }
}

fn build_composite(
    name: String,
    base: Option<Arc<TypeDescriptor>>,
    defs: Vec<(String, FieldDef)>,
    is_union: bool,
    is_packed: bool,
    min_align: Option<u32>,
) -> Result<Arc<TypeDescriptor>> {
    if name.is_empty() {
        return Err(Error::schema("composite type needs a name"));
    }
    let mut placements: Vec<Placement> = Vec::new();

    if let Some(base) = &base {
        let base_struct = base.as_struct().ok_or_else(|| {
            Error::schema(format!("{name}: cannot extend non-struct type {}", base.name))
        })?;
        if base_struct.is_union {
            return Err(Error::schema(format!("{name}: cannot extend union {}", base.name)));
        }
        for field in &base_struct.fields {
            placements.push(Placement {
                align_override: Some(field.alignment),
                field: field.clone(),
            });
        }
    }

    let mut seen: HashSet<String> = placements.iter().map(|p| p.field.name.clone()).collect();
    for (field_name, _) in &defs {
        if !seen.insert(field_name.clone()) {
            return Err(Error::schema(format!("{name}: duplicate field {field_name}")));
        }
    }

    // Resolve counters against everything declared so far, base included.
    let mut resolved: Vec<Placement> = Vec::with_capacity(defs.len());
    for (field_name, def) in defs {
        let counted_by = match def.counted_by {
            Some(counter) => Some(resolve_counter(
                &name,
                &field_name,
                &counter,
                &placements,
                &resolved,
                is_union,
            )?),
            None => None,
        };
        if counted_by.is_some() && def.ty.as_array().is_none() {
            return Err(Error::schema(format!(
                "{name}: counted_by on non-array field {field_name}"
            )));
        }
        if def.ty.as_array().is_some_and(|a| a.length == 0) && counted_by.is_none() {
            return Err(Error::schema(format!(
                "{name}: zero-length array {field_name} needs a counter"
            )));
        }
        if is_union && def.ty.is_dynamic() {
            return Err(Error::schema(format!(
                "{name}: union member {field_name} must have a static size"
            )));
        }
        let decl = Field::build_decl(
            &field_name,
            &def.ty,
            counted_by.as_ref().map(|c| c.field.as_str()),
        );
        resolved.push(Placement {
            field: Field {
                name: field_name,
                ty: def.ty,
                offset: 0,
                size: 0,
                alignment: 0,
                counted_by,
                little_endian: !def.big_endian,
                is_union_member: is_union,
                decl,
            },
            align_override: def.align,
        });
    }

    // Among the fields added by this definition, a dynamic field must be
    // unique and last. Base fields are exempt: extension is how fields end
    // up after a dynamic one.
    let dynamic_positions: Vec<usize> = resolved
        .iter()
        .enumerate()
        .filter(|(_, p)| p.field.is_dynamic())
        .map(|(i, _)| i)
        .collect();
    if dynamic_positions.len() > 1 {
        return Err(Error::schema(format!(
            "{name}: more than one dynamic field ({} and {})",
            resolved[dynamic_positions[0]].field.name,
            resolved[dynamic_positions[1]].field.name,
        )));
    }
    if let Some(&pos) = dynamic_positions.first() {
        if pos != resolved.len() - 1 {
            return Err(Error::schema(format!(
                "{name}: dynamic field {} must be declared last",
                resolved[pos].field.name
            )));
        }
    }

    placements.extend(resolved);
    if placements.is_empty() {
        return Err(Error::schema(format!("{name}: no fields")));
    }

    let mut desc = lay_out(placements, is_union, is_packed)?;
    if let Some(min_align) = min_align {
        if min_align == 0 || !min_align.is_power_of_two() || min_align > MAX_ALIGNMENT {
            return Err(Error::schema(format!(
                "{name}: invalid struct alignment {min_align}"
            )));
        }
        if min_align > desc.alignment {
            desc.alignment = min_align;
            desc.static_size = align_up(desc.static_size, min_align)
                .ok_or(Error::Overflow(u32::MAX as u64))?;
        }
    }
    log::debug!(
        "laid out {name}: size {} align {} dynamic {}",
        desc.static_size,
        desc.alignment,
        desc.is_dynamic
    );
    Ok(Arc::new(TypeDescriptor::composite(name, desc)))
}

fn resolve_counter(
    struct_name: &str,
    field_name: &str,
    counter: &str,
    base: &[Placement],
    earlier: &[Placement],
    is_union: bool,
) -> Result<CountedBy> {
    if is_union {
        return Err(Error::schema(format!(
            "{struct_name}: counted_by({counter}) not allowed in a union"
        )));
    }
    let found = base
        .iter()
        .chain(earlier.iter())
        .enumerate()
        .find(|(_, p)| p.field.name == counter);
    let Some((index, placement)) = found else {
        return Err(Error::schema(format!(
            "{struct_name}: field {field_name} counted by {counter}, which is not an earlier field"
        )));
    };
    let counter_ty = &placement.field.ty;
    let integral = counter_ty
        .as_primitive()
        .is_some_and(|p| p.is_integral());
    if !integral {
        return Err(Error::schema(format!(
            "{struct_name}: counter {counter} must be an integer field, not {}",
            counter_ty.name
        )));
    }
    Ok(CountedBy {
        field: counter.to_string(),
        index,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PrimitiveKind;

    fn prim(kind: PrimitiveKind) -> Arc<TypeDescriptor> {
        Arc::new(TypeDescriptor::primitive(kind))
    }

    #[test]
    fn c_layout_with_padding() {
        // struct { uint8 a; uint32 b; uint16 c; } -> a@0, b@4, c@8, size 12
        let desc = StructBuilder::new("Mixed")
            .field("a", prim(PrimitiveKind::U8))
            .field("b", prim(PrimitiveKind::U32))
            .field("c", prim(PrimitiveKind::U16))
            .build()
            .unwrap();
        let s = desc.as_struct().unwrap();
        assert_eq!(s.field("a").unwrap().offset, 0);
        assert_eq!(s.field("b").unwrap().offset, 4);
        assert_eq!(s.field("c").unwrap().offset, 8);
        assert_eq!(s.static_size, 12);
        assert_eq!(s.alignment, 4);
    }

    #[test]
    fn packed_layout_has_no_padding() {
        let desc = StructBuilder::new("Tight")
            .packed()
            .field("a", prim(PrimitiveKind::U8))
            .field("b", prim(PrimitiveKind::U32))
            .field("c", prim(PrimitiveKind::U16))
            .build()
            .unwrap();
        let s = desc.as_struct().unwrap();
        assert_eq!(s.field("b").unwrap().offset, 1);
        assert_eq!(s.field("c").unwrap().offset, 5);
        assert_eq!(s.static_size, 7);
        assert_eq!(s.alignment, 1);
    }

    #[test]
    fn explicit_alignment_override() {
        let desc = StructBuilder::new("Aligned")
            .field("a", prim(PrimitiveKind::U8))
            .field_with("b", FieldDef::new(prim(PrimitiveKind::U8)).align(8))
            .build()
            .unwrap();
        let s = desc.as_struct().unwrap();
        assert_eq!(s.field("b").unwrap().offset, 8);
        assert_eq!(s.static_size, 16);
        assert_eq!(s.alignment, 8);
    }

    #[test]
    fn struct_level_alignment_raises_and_rounds() {
        let desc = StructBuilder::new("Page")
            .align(8)
            .field("a", prim(PrimitiveKind::U8))
            .build()
            .unwrap();
        let s = desc.as_struct().unwrap();
        assert_eq!(s.alignment, 8);
        assert_eq!(s.static_size, 8);

        let err = StructBuilder::new("Bad")
            .align(3)
            .field("a", prim(PrimitiveKind::U8))
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidSchema(_)));
    }

    #[test]
    fn oversized_fixed_array_is_rejected() {
        // 0x2000_0000 * 8 bytes leaves the 32-bit address space.
        let err = StructBuilder::new("Huge")
            .array("blob", prim(PrimitiveKind::U64), 0x2000_0000)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidSchema(_)));
    }

    #[test]
    fn empty_name_rejected() {
        let err = StructBuilder::new("")
            .field("a", prim(PrimitiveKind::U8))
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidSchema(_)));
    }

    #[test]
    fn union_members_at_offset_zero() {
        let desc = UnionBuilder::new("Scalar")
            .field("as_u32", prim(PrimitiveKind::U32))
            .field("as_f64", prim(PrimitiveKind::F64))
            .field("as_u8", prim(PrimitiveKind::U8))
            .build()
            .unwrap();
        let s = desc.as_struct().unwrap();
        assert!(s.is_union);
        for f in &s.fields {
            assert_eq!(f.offset, 0);
        }
        assert_eq!(s.static_size, 8);
        assert_eq!(s.alignment, 8);
    }

    #[test]
    fn counted_array_must_reference_earlier_integral() {
        let err = StructBuilder::new("Bad")
            .counted_array("data", prim(PrimitiveKind::U8), "len")
            .field("len", prim(PrimitiveKind::U32))
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidSchema(_)));

        let err = StructBuilder::new("Bad")
            .field("len", prim(PrimitiveKind::F32))
            .counted_array("data", prim(PrimitiveKind::U8), "len")
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidSchema(_)));
    }

    #[test]
    fn dynamic_field_must_be_last() {
        let err = StructBuilder::new("Bad")
            .field("len", prim(PrimitiveKind::U32))
            .counted_array("data", prim(PrimitiveKind::U8), "len")
            .field("tail", prim(PrimitiveKind::U8))
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidSchema(_)));
    }

    #[test]
    fn duplicate_field_rejected() {
        let err = StructBuilder::new("Bad")
            .field("x", prim(PrimitiveKind::U8))
            .field("x", prim(PrimitiveKind::U16))
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidSchema(_)));
    }

    #[test]
    fn union_rejects_counted_members() {
        let err = UnionBuilder::new("Bad")
            .field("len", prim(PrimitiveKind::U32))
            .field_with(
                "data",
                FieldDef::new(Arc::new(TypeDescriptor::array(prim(PrimitiveKind::U8), 0)))
                    .counted_by("len"),
            )
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidSchema(_)));
    }

    #[test]
    fn extension_reruns_layout() {
        let header = StructBuilder::new("Header")
            .field("magic", prim(PrimitiveKind::U32))
            .field("version", prim(PrimitiveKind::U16))
            .build()
            .unwrap();
        let extended = StructBuilder::extend("ExtHeader", header.clone())
            .array("reserved", prim(PrimitiveKind::U8), 10)
            .build()
            .unwrap();
        let s = extended.as_struct().unwrap();
        assert_eq!(s.field("magic").unwrap().offset, 0);
        assert_eq!(s.field("reserved").unwrap().offset, 6);
        // 4 + 2 + 10 = 16, already a multiple of the alignment
        assert_eq!(s.static_size, 16);
        assert_eq!(s.static_size, header.size() + 8);
    }

    #[test]
    fn extending_dynamic_base_is_allowed() {
        let msg = StructBuilder::new("Msg")
            .field("len", prim(PrimitiveKind::U32))
            .counted_array("body", prim(PrimitiveKind::U8), "len")
            .build()
            .unwrap();
        let framed = StructBuilder::extend("Framed", msg)
            .field("crc", prim(PrimitiveKind::U32))
            .build()
            .unwrap();
        let s = framed.as_struct().unwrap();
        assert!(s.is_dynamic);
        assert_eq!(s.field("crc").unwrap().offset, 4);
    }

    #[test]
    fn nested_struct_field() {
        let point = StructBuilder::new("Point")
            .field("x", prim(PrimitiveKind::F32))
            .field("y", prim(PrimitiveKind::F32))
            .build()
            .unwrap();
        let line = StructBuilder::new("Line")
            .nested("from", point.clone())
            .nested("to", point)
            .build()
            .unwrap();
        let s = line.as_struct().unwrap();
        assert_eq!(s.field("to").unwrap().offset, 8);
        assert_eq!(s.static_size, 16);
    }
}
