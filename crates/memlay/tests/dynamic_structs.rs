// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 memlay contributors

//! End-to-end dynamic struct scenarios: counted arrays, bounded counted
//! arrays, extension, and per-access offset resolution.

use std::sync::Arc;

use memlay::types::{PrimitiveKind, TypeDescriptor};
use memlay::{
    dynamic_size, offset_of, size_of, StructBuilder, StructMut, StructRef, TypeRegistry, Value,
};

fn prim(kind: PrimitiveKind) -> Arc<TypeDescriptor> {
    Arc::new(TypeDescriptor::primitive(kind))
}

/// Packed 77-byte record with a capacity-bounded counted name.
fn duck_type() -> Arc<TypeDescriptor> {
    StructBuilder::new("Duck")
        .packed()
        .field("id", prim(PrimitiveKind::U32))
        .field("name_length", prim(PrimitiveKind::U8))
        .bounded_counted_array("name", prim(PrimitiveKind::U8), 64, "name_length")
        .field("hatched_at", prim(PrimitiveKind::U64))
        .build()
        .unwrap()
}

#[test]
fn duck_occupies_its_full_capacity() {
    let duck = duck_type();
    assert_eq!(duck.size(), 77); // 4 + 1 + 64 + 8, packed
    assert!(!duck.is_dynamic());
}

#[test]
fn static_offset_helpers() {
    let duck = duck_type();
    assert_eq!(size_of(&duck), 77);
    assert_eq!(offset_of(&duck, "name_length").unwrap(), 4);
    assert_eq!(offset_of(&duck, "hatched_at").unwrap(), 69);
    assert!(offset_of(&duck, "beak").is_err());
}

#[test]
fn bounded_name_reads_clamp_to_counter() {
    let duck = duck_type();
    let mut buf = vec![0u8; duck.size() as usize];
    let mut view = StructMut::new(&mut buf, 0, duck.clone()).unwrap();
    view.set("name", &b"Gertrude".to_vec().into()).unwrap();
    view.set("name_length", &Value::U8(5)).unwrap();

    let view = StructRef::new(&buf, 0, duck).unwrap();
    let name = view.array("name").unwrap();
    assert_eq!(name.len(), 5);
    let bytes: Vec<u8> = name
        .iter()
        .map(|v| match v.unwrap() {
            Value::U8(b) => b,
            other => panic!("unexpected {other:?}"),
        })
        .collect();
    assert_eq!(&bytes, b"Gertr");
}

#[test]
fn mama_duck_extends_with_a_counted_tail() {
    let duck = duck_type();
    let mama = StructBuilder::extend("MamaDuck", duck.clone())
        .field("duckling_count", prim(PrimitiveKind::U8))
        .counted_array("ducklings", duck.clone(), "duckling_count")
        .build()
        .unwrap();
    assert_eq!(mama.size(), 78);
    assert!(mama.is_dynamic());

    let mut buf = vec![0u8; 1024];
    {
        let mut view = StructMut::new(&mut buf, 0, mama.clone()).unwrap();
        view.set("id", &Value::U32(1)).unwrap();
        view.set("duckling_count", &Value::U8(2)).unwrap();
        let mut ducklings = view.array_mut("ducklings").unwrap();
        ducklings
            .set(0, &Value::Struct(vec![("id".into(), Value::U32(10))]))
            .unwrap();
        ducklings
            .set(1, &Value::Struct(vec![("id".into(), Value::U32(11))]))
            .unwrap();
    }

    let view = StructRef::new(&buf, 0, mama.clone()).unwrap();
    assert_eq!(view.dynamic_size().unwrap(), 78 + 2 * 77);
    let ducklings = view.array("ducklings").unwrap();
    assert_eq!(ducklings.len(), 2);
    assert_eq!(ducklings.at(1).unwrap().get("id").unwrap(), Value::U32(11));
    assert_eq!(dynamic_size(&buf, 0, &mama).unwrap(), 232);
}

#[test]
fn extension_appends_after_the_base_layout() {
    let header = StructBuilder::new("Header")
        .field("magic", prim(PrimitiveKind::U32))
        .field("version", prim(PrimitiveKind::U16))
        .build()
        .unwrap();
    let another = StructBuilder::extend("AnotherHeader", header.clone())
        .array("reserved", prim(PrimitiveKind::U8), 10)
        .build()
        .unwrap();
    assert_eq!(another.size(), header.size() + 8);
    let s = another.as_struct().unwrap();
    assert_eq!(s.field("reserved").unwrap().offset, 6);
    assert_eq!(s.alignment, 4);
}

#[test]
fn counter_drives_size_and_view_length() {
    let blob = StructBuilder::new("Blob")
        .packed()
        .field("len", prim(PrimitiveKind::U8))
        .counted_array("data", prim(PrimitiveKind::U8), "len")
        .build()
        .unwrap();

    let mut buf = vec![0u8; 32];
    buf[0] = 5;
    assert_eq!(dynamic_size(&buf, 0, &blob).unwrap(), 6);

    buf[0] = 3;
    let view = StructRef::new(&buf, 0, blob).unwrap();
    assert_eq!(view.array("data").unwrap().len(), 3);
}

#[test]
fn field_after_dynamic_base_moves_with_the_counter() {
    let msg = StructBuilder::new("Msg")
        .packed()
        .field("len", prim(PrimitiveKind::U8))
        .counted_array("body", prim(PrimitiveKind::U8), "len")
        .build()
        .unwrap();
    let framed = StructBuilder::extend("Framed", msg)
        .field("crc", prim(PrimitiveKind::U16))
        .build()
        .unwrap();

    let mut buf = vec![0u8; 32];
    {
        let mut view = StructMut::new(&mut buf, 0, framed.clone()).unwrap();
        view.set("len", &Value::U8(4)).unwrap();
        view.set("body", &vec![1u8, 2, 3, 4].into()).unwrap();
        view.set("crc", &Value::U16(0xCAFE)).unwrap();
    }
    let view = StructRef::new(&buf, 0, framed).unwrap();
    assert_eq!(view.offset_of("crc").unwrap(), 5);
    assert_eq!(view.get("crc").unwrap(), Value::U16(0xCAFE));
    assert_eq!(view.dynamic_size().unwrap(), 7);
}

#[test]
fn registry_round_trips_composites() {
    let mut registry = TypeRegistry::with_primitives();
    let duck = duck_type();
    registry.register(duck.clone());
    registry.register_alias("duck_t", duck.clone());

    assert!(Arc::ptr_eq(&registry.lookup("Duck").unwrap(), &duck));
    assert!(Arc::ptr_eq(&registry.lookup("duck_t").unwrap(), &duck));

    // Composites built from registry lookups behave identically.
    let pond = StructBuilder::new("Pond")
        .field("resident", registry.lookup("Duck").unwrap())
        .build()
        .unwrap();
    assert_eq!(pond.size(), 77);
}

#[test]
fn big_endian_fields_coexist_with_little_endian() {
    let desc = StructBuilder::new("Mixed")
        .packed()
        .field_with(
            "be",
            memlay::FieldDef::new(prim(PrimitiveKind::U32)).big_endian(),
        )
        .field("le", prim(PrimitiveKind::U32))
        .build()
        .unwrap();
    let mut buf = vec![0u8; 8];
    let mut view = StructMut::new(&mut buf, 0, desc).unwrap();
    view.set("be", &Value::U32(0x0102_0304)).unwrap();
    view.set("le", &Value::U32(0x0102_0304)).unwrap();
    assert_eq!(buf[..4], [1, 2, 3, 4]);
    assert_eq!(buf[4..], [4, 3, 2, 1]);
}
