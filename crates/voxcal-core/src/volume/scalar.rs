//! Scalar element types and the per-sample numeric conversion contract.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::VolumeData;

/// Element type of every sample in a volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarType {
    /// 8-bit signed integer.
    I8,
    /// 8-bit unsigned integer.
    U8,
    /// 16-bit signed integer.
    I16,
    /// 16-bit unsigned integer.
    U16,
    /// 32-bit signed integer.
    I32,
    /// 32-bit unsigned integer.
    U32,
    /// 64-bit signed integer.
    I64,
    /// 64-bit unsigned integer.
    U64,
    /// 32-bit floating point.
    F32,
    /// 64-bit floating point.
    F64,
}

impl ScalarType {
    /// Human-readable label for logs and error messages.
    pub const fn label(&self) -> &'static str {
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

    /// Size of one sample in bytes.
    pub const fn size_bytes(&self) -> usize {
        match self {
            Self::I8 | Self::U8 => 1,
            Self::I16 | Self::U16 => 2,
            Self::I32 | Self::U32 | Self::F32 => 4,
            Self::I64 | Self::U64 | Self::F64 => 8,
        }
    }

    /// Every supported element type.
    pub fn all() -> &'static [Self] {
        const ALL: [ScalarType; 10] = [
            ScalarType::I8,
            ScalarType::U8,
            ScalarType::I16,
            ScalarType::U16,
            ScalarType::I32,
            ScalarType::U32,
            ScalarType::I64,
            ScalarType::U64,
            ScalarType::F32,
            ScalarType::F64,
        ];
        &ALL
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A primitive type that can be stored as a volume sample.
///
/// The kernel widens every sample to `f64`, evaluates, and narrows back with
/// [`Sample::from_f64`]. Narrowing follows Rust `as` semantics:
///
/// - float → integer truncates toward zero and saturates at the type's bounds
/// - NaN → integer yields `0`
/// - `f64` → `f32` rounds to nearest, overflowing to ±infinity
pub trait Sample: bytemuck::Pod + Send + Sync + PartialEq + fmt::Debug {
    /// Type tag matching this primitive.
    const SCALAR_TYPE: ScalarType;

    fn to_f64(self) -> f64;

    fn from_f64(value: f64) -> Self;

    /// Borrow the typed buffer if `data` holds this element type.
    fn samples(data: &VolumeData) -> Option<&[Self]>;

    /// Wrap an owned buffer into the matching [`VolumeData`] variant.
    fn into_data(samples: Vec<Self>) -> VolumeData;
}

macro_rules! impl_sample {
    ($($ty:ty => $tag:ident),* $(,)?) => {
        $(
            impl Sample for $ty {
                const SCALAR_TYPE: ScalarType = ScalarType::$tag;

                #[inline]
                fn to_f64(self) -> f64 {
                    self as f64
                }

                #[inline]
                fn from_f64(value: f64) -> Self {
                    value as $ty
                }

                fn samples(data: &VolumeData) -> Option<&[Self]> {
                    match data {
                        VolumeData::$tag(v) => Some(v.as_slice()),
                        _ => None,
                    }
                }

                fn into_data(samples: Vec<Self>) -> VolumeData {
                    VolumeData::$tag(samples)
                }
            }
        )*
    };
}

impl_sample!(
    i8 => I8,
    u8 => U8,
    i16 => I16,
    u16 => U16,
    i32 => I32,
    u32 => U32,
    i64 => I64,
    u64 => U64,
    f32 => F32,
    f64 => F64,
);
