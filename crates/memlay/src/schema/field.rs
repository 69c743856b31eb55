// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 memlay contributors

//! Field model for composite descriptors.

use std::sync::Arc;

use crate::types::{TypeDescriptor, TypeKind};

/// Resolved counted-by relation: a back-reference to an integral sibling
/// field declared strictly earlier in the same struct. Never an ownership
/// edge.
#[derive(Debug, Clone, PartialEq)]
pub struct CountedBy {
    /// Counter field name.
    pub field: String,
    /// Counter field index within the composite.
    pub index: usize,
}

/// A laid-out field of a composite descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub ty: Arc<TypeDescriptor>,
    /// Static byte offset within the composite (0 for union members).
    pub offset: u32,
    /// Static size (0 for counted arrays).
    pub size: u32,
    pub alignment: u32,
    pub counted_by: Option<CountedBy>,
    pub little_endian: bool,
    pub is_union_member: bool,
    /// C-style declaration string, used for diagnostics.
    pub decl: String,
}

impl Field {
    /// True when this field's runtime extent can differ from its static
    /// size (counted array or nested dynamic composite).
    pub fn is_dynamic(&self) -> bool {
        self.ty.is_dynamic()
    }

    /// Element capacity for array fields (`None` otherwise).
    ///
    /// A capacity of 0 with a counter is a fully dynamic counted array; a
    /// positive capacity with a counter is a bounded counted array whose
    /// reads clamp to `min(capacity, counter)`.
    pub fn capacity(&self) -> Option<u32> {
        self.ty.as_array().map(|a| a.length)
    }

    pub(crate) fn build_decl(
        name: &str,
        ty: &TypeDescriptor,
        counted_by: Option<&str>,
    ) -> String {
        let counted = match counted_by {
            Some(counter) => format!(" counted_by({counter})"),
            None => String::new(),
        };
        match &ty.kind {
            TypeKind::Array(a) => format!("{} {name}[{}]{counted}", a.element.name, a.length),
            _ => format!("{} {name}{counted}", ty.name),
        }
    }
}

/// Per-field declaration: a type plus the recognized overrides.
#[derive(Debug, Clone)]
pub struct FieldDef {
    pub(crate) ty: Arc<TypeDescriptor>,
    pub(crate) align: Option<u32>,
    pub(crate) big_endian: bool,
    pub(crate) counted_by: Option<String>,
}

impl FieldDef {
    pub fn new(ty: Arc<TypeDescriptor>) -> Self {
        Self {
            ty,
            align: None,
            big_endian: false,
            counted_by: None,
        }
    }

    /// Align the field to the given byte boundary instead of its natural
    /// alignment.
    pub fn align(mut self, align: u32) -> Self {
        self.align = Some(align);
        self
    }

    /// Store the field big-endian. Applies to scalar fields; array
    /// elements and nested composites always use the little-endian
    /// default.
    pub fn big_endian(mut self) -> Self {
        self.big_endian = true;
        self
    }

    /// Mark the field's length as counted by an earlier sibling field.
    pub fn counted_by(mut self, counter: impl Into<String>) -> Self {
        self.counted_by = Some(counter.into());
        self
    }
}

impl From<Arc<TypeDescriptor>> for FieldDef {
    fn from(ty: Arc<TypeDescriptor>) -> Self {
        Self::new(ty)
    }
}
