// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 memlay contributors

//! Runtime values read from and written to buffers.

/// A value decoded from (or encodable into) a buffer.
///
/// Scalars mirror the primitive kinds; `Array` and `Struct` are the copying
/// representations of composites (the zero-copy path is
/// [`crate::view::StructRef`] / [`crate::view::ArrayRef`]).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
    Array(Vec<Value>),
    Struct(Vec<(String, Value)>),
}

impl Value {
    /// Short kind name used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::I8(_) => "i8",
            Self::U8(_) => "u8",
            Self::I16(_) => "i16",
            Self::U16(_) => "u16",
            Self::I32(_) => "i32",
            Self::U32(_) => "u32",
            Self::I64(_) => "i64",
            Self::U64(_) => "u64",
            Self::F32(_) => "f32",
            Self::F64(_) => "f64",
            Self::Array(_) => "array",
            Self::Struct(_) => "struct",
        }
    }

    /// Coerce any integral scalar to `i64`. `None` for floats and composites.
    ///
    /// `u64` values wider than `i64::MAX` keep their bit pattern, matching
    /// two's-complement store semantics.
    pub fn as_int(&self) -> Option<i64> {
        match *self {
            Self::I8(v) => Some(v as i64),
            Self::U8(v) => Some(v as i64),
            Self::I16(v) => Some(v as i64),
            Self::U16(v) => Some(v as i64),
            Self::I32(v) => Some(v as i64),
            Self::U32(v) => Some(v as i64),
            Self::I64(v) => Some(v),
            Self::U64(v) => Some(v as i64),
            _ => None,
        }
    }

    /// Coerce any integral scalar to `u64`. `None` for floats, composites,
    /// and negative values.
    pub fn as_uint(&self) -> Option<u64> {
        match *self {
            Self::I8(v) if v >= 0 => Some(v as u64),
            Self::U8(v) => Some(v as u64),
            Self::I16(v) if v >= 0 => Some(v as u64),
            Self::U16(v) => Some(v as u64),
            Self::I32(v) if v >= 0 => Some(v as u64),
            Self::U32(v) => Some(v as u64),
            Self::I64(v) if v >= 0 => Some(v as u64),
            Self::U64(v) => Some(v),
            _ => None,
        }
    }

    /// Coerce any numeric scalar to `f64`. `None` for composites.
    pub fn as_float(&self) -> Option<f64> {
        match *self {
            Self::F32(v) => Some(v as f64),
            Self::F64(v) => Some(v),
            _ => self.as_int().map(|v| v as f64),
        }
    }

    /// True for any integral scalar variant.
    pub fn is_integral(&self) -> bool {
        self.as_int().is_some()
    }

    pub fn as_u8(&self) -> Option<u8> {
        match *self {
            Self::U8(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_u16(&self) -> Option<u16> {
        match *self {
            Self::U16(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        match *self {
            Self::U32(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Self::U64(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match *self {
            Self::I32(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Self::I64(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match *self {
            Self::F32(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::F64(v) => Some(v),
            _ => None,
        }
    }

    /// Elements of an `Array` value.
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(v) => Some(v),
            _ => None,
        }
    }

    /// Field of a `Struct` value, by name.
    pub fn field(&self, name: &str) -> Option<&Value> {
        match self {
            Self::Struct(fields) => fields.iter().find(|(n, _)| n == name).map(|(_, v)| v),
            _ => None,
        }
    }
}

macro_rules! impl_from_scalar {
    ($ty:ty, $variant:ident) => {
        impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Self::$variant(v)
            }
        }
    };
}

impl_from_scalar!(i8, I8);
impl_from_scalar!(u8, U8);
impl_from_scalar!(i16, I16);
impl_from_scalar!(u16, U16);
impl_from_scalar!(i32, I32);
impl_from_scalar!(u32, U32);
impl_from_scalar!(i64, I64);
impl_from_scalar!(u64, U64);
impl_from_scalar!(f32, F32);
impl_from_scalar!(f64, F64);

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Self::Array(v.into_iter().map(Into::into).collect())
    }
}
