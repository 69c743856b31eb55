// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 memlay contributors

//! Fixed-size numeric codecs.

use crate::error::{Error, Result};
use crate::types::Value;

/// Primitive type kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
}

impl PrimitiveKind {
    /// Canonical type name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::I8 => "int8",
            Self::U8 => "uint8",
            Self::I16 => "int16",
            Self::U16 => "uint16",
            Self::I32 => "int32",
            Self::U32 => "uint32",
            Self::I64 => "int64",
            Self::U64 => "uint64",
            Self::F32 => "float32",
            Self::F64 => "float64",
        }
    }

    /// Size in bytes.
    pub fn size(&self) -> u32 {
        match self {
            Self::I8 | Self::U8 => 1,
            Self::I16 | Self::U16 => 2,
            Self::I32 | Self::U32 | Self::F32 => 4,
            Self::I64 | Self::U64 | Self::F64 => 8,
        }
    }

    /// C alignment requirement (equal to the size for all primitives).
    pub fn alignment(&self) -> u32 {
        self.size()
    }

    /// True for the integer kinds, which are the only valid counted-by
    /// counter types.
    pub fn is_integral(&self) -> bool {
        !matches!(self, Self::F32 | Self::F64)
    }

    /// True for the signed integer kinds.
    pub fn is_signed(&self) -> bool {
        matches!(self, Self::I8 | Self::I16 | Self::I32 | Self::I64)
    }

    /// Decode a value at an absolute byte offset.
    pub fn read_at(&self, buf: &[u8], offset: usize, little_endian: bool) -> Result<Value> {
        let bytes = self.slice(buf, offset)?;
        macro_rules! decode {
            ($ty:ty, $variant:ident) => {{
                let raw: [u8; std::mem::size_of::<$ty>()] =
                    bytes.try_into().expect("slice length checked");
                Value::$variant(if little_endian {
                    <$ty>::from_le_bytes(raw)
                } else {
                    <$ty>::from_be_bytes(raw)
                })
            }};
        }
        Ok(match self {
            Self::I8 => decode!(i8, I8),
            Self::U8 => decode!(u8, U8),
            Self::I16 => decode!(i16, I16),
            Self::U16 => decode!(u16, U16),
            Self::I32 => decode!(i32, I32),
            Self::U32 => decode!(u32, U32),
            Self::I64 => decode!(i64, I64),
            Self::U64 => decode!(u64, U64),
            Self::F32 => decode!(f32, F32),
            Self::F64 => decode!(f64, F64),
        })
    }

    /// Encode a value at an absolute byte offset.
    ///
    /// Integral targets accept any integral scalar and store its truncated
    /// two's-complement pattern; float targets accept any numeric scalar.
    /// Anything else is [`Error::InvalidValue`].
    pub fn write_at(
        &self,
        buf: &mut [u8],
        offset: usize,
        little_endian: bool,
        value: &Value,
    ) -> Result<()> {
        let size = self.size() as usize;
        let len = buf.len();
        let bytes = buf
            .get_mut(offset..offset + size)
            .ok_or(Error::Fault { offset, len })?;

        macro_rules! encode {
            ($v:expr) => {{
                let raw = if little_endian {
                    $v.to_le_bytes()
                } else {
                    $v.to_be_bytes()
                };
                bytes.copy_from_slice(&raw);
            }};
        }

        match self {
            Self::F32 => encode!(self.require_float(value)? as f32),
            Self::F64 => encode!(self.require_float(value)?),
            _ => {
                let v = self.require_int(value)?;
                match self {
                    Self::I8 => encode!(v as i8),
                    Self::U8 => encode!(v as u8),
                    Self::I16 => encode!(v as i16),
                    Self::U16 => encode!(v as u16),
                    Self::I32 => encode!(v as i32),
                    Self::U32 => encode!(v as u32),
                    Self::I64 => encode!(v),
                    Self::U64 => encode!(v as u64),
                    Self::F32 | Self::F64 => unreachable!(),
                }
            }
        }
        Ok(())
    }

    fn slice<'b>(&self, buf: &'b [u8], offset: usize) -> Result<&'b [u8]> {
        let size = self.size() as usize;
        buf.get(offset..offset + size)
            .ok_or(Error::fault(offset, buf.len()))
    }

    fn require_int(&self, value: &Value) -> Result<i64> {
        value.as_int().ok_or_else(|| {
            Error::InvalidValue(format!(
                "cannot store {} value into {}",
                value.kind_name(),
                self.name()
            ))
        })
    }

    fn require_float(&self, value: &Value) -> Result<f64> {
        value.as_float().ok_or_else(|| {
            Error::InvalidValue(format!(
                "cannot store {} value into {}",
                value.kind_name(),
                self.name()
            ))
        })
    }
}

/// All primitive kinds, in canonical registration order.
pub const ALL_PRIMITIVES: [PrimitiveKind; 10] = [
    PrimitiveKind::I8,
    PrimitiveKind::U8,
    PrimitiveKind::I16,
    PrimitiveKind::U16,
    PrimitiveKind::I32,
    PrimitiveKind::U32,
    PrimitiveKind::I64,
    PrimitiveKind::U64,
    PrimitiveKind::F32,
    PrimitiveKind::F64,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_and_alignment() {
        assert_eq!(PrimitiveKind::U8.size(), 1);
        assert_eq!(PrimitiveKind::I16.size(), 2);
        assert_eq!(PrimitiveKind::F32.size(), 4);
        assert_eq!(PrimitiveKind::U64.size(), 8);
        for p in ALL_PRIMITIVES {
            assert_eq!(p.size(), p.alignment());
        }
    }

    #[test]
    fn signedness_classification() {
        assert!(PrimitiveKind::I8.is_signed());
        assert!(PrimitiveKind::I64.is_signed());
        assert!(!PrimitiveKind::U32.is_signed());
        assert!(!PrimitiveKind::F32.is_signed());
    }

    #[test]
    fn roundtrip_all_primitives() {
        let mut buf = [0u8; 16];
        let cases: [(PrimitiveKind, Value); 10] = [
            (PrimitiveKind::I8, Value::I8(-5)),
            (PrimitiveKind::U8, Value::U8(200)),
            (PrimitiveKind::I16, Value::I16(-30_000)),
            (PrimitiveKind::U16, Value::U16(60_000)),
            (PrimitiveKind::I32, Value::I32(-2_000_000)),
            (PrimitiveKind::U32, Value::U32(4_000_000_000)),
            (PrimitiveKind::I64, Value::I64(i64::MIN)),
            (PrimitiveKind::U64, Value::U64(u64::MAX)),
            (PrimitiveKind::F32, Value::F32(1.5)),
            (PrimitiveKind::F64, Value::F64(-0.125)),
        ];
        for (kind, value) in cases {
            for le in [true, false] {
                kind.write_at(&mut buf, 3, le, &value).unwrap();
                assert_eq!(kind.read_at(&buf, 3, le).unwrap(), value);
            }
        }
    }

    #[test]
    fn endianness_byte_order() {
        let mut buf = [0u8; 4];
        PrimitiveKind::U32
            .write_at(&mut buf, 0, true, &Value::U32(0xAABBCCDD))
            .unwrap();
        assert_eq!(buf, [0xDD, 0xCC, 0xBB, 0xAA]);
        PrimitiveKind::U32
            .write_at(&mut buf, 0, false, &Value::U32(0xAABBCCDD))
            .unwrap();
        assert_eq!(buf, [0xAA, 0xBB, 0xCC, 0xDD]);
    }

    #[test]
    fn integral_coercion_truncates() {
        let mut buf = [0u8; 1];
        PrimitiveKind::U8
            .write_at(&mut buf, 0, true, &Value::U32(0x1FF))
            .unwrap();
        assert_eq!(buf[0], 0xFF);
    }

    #[test]
    fn out_of_bounds_is_fault() {
        let buf = [0u8; 2];
        let err = PrimitiveKind::U32.read_at(&buf, 0, true).unwrap_err();
        assert!(matches!(err, Error::Fault { .. }));
    }

    #[test]
    fn float_into_int_is_invalid() {
        let mut buf = [0u8; 4];
        let err = PrimitiveKind::U32
            .write_at(&mut buf, 0, true, &Value::F64(1.0))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidValue(_)));
    }
}
