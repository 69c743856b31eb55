// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 memlay contributors

//! memlay - binary struct layout with C compiler semantics.
//!
//! Describe structs, unions, and arrays as runtime type descriptors, lay
//! them out with C offset and padding rules, and read or write instances
//! in place inside a flat byte arena. Counted arrays resolve their length
//! from a sibling counter field on every access, so a buffer is always
//! interpreted against its live contents.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use memlay::{Memory, StructBuilder, Value};
//! use memlay::types::{PrimitiveKind, TypeDescriptor};
//!
//! # fn main() -> memlay::Result<()> {
//! let u8_ty = Arc::new(TypeDescriptor::primitive(PrimitiveKind::U8));
//! let u32_ty = Arc::new(TypeDescriptor::primitive(PrimitiveKind::U32));
//! let packet = StructBuilder::new("Packet")
//!     .field("kind", u8_ty.clone())
//!     .field("len", u32_ty)
//!     .counted_array("body", u8_ty, "len")
//!     .build()?;
//!
//! let mut mem = Memory::new(1024);
//! let packet_ptr = mem.alloc(packet.size() + 16)?.cast(packet);
//!
//! let mut view = packet_ptr.deref_struct_mut(&mut mem)?;
//! view.set("kind", &Value::U8(7))?;
//! view.set("len", &Value::U32(3))?;
//! view.set("body", &vec![1u8, 2, 3].into())?;
//!
//! let view = packet_ptr.deref_struct(&mem)?;
//! assert_eq!(view.get("kind")?, Value::U8(7));
//! assert_eq!(view.dynamic_size()?, 11); // 8 static + 3 counted bytes
//! # Ok(()) }
//! ```

pub mod config;
pub mod error;
pub mod mem;
pub mod schema;
pub mod types;
pub mod view;

pub use error::{Error, Result};
pub use mem::{Memory, MemoryUsage, Pointer, SharedMemory};
pub use schema::{offset_of, size_of, FieldDef, StructBuilder, UnionBuilder};
pub use types::{TypeDescriptor, TypeRegistry, Value};
pub use view::{dynamic_size, ArrayMut, ArrayRef, StructMut, StructRef};
