//! Storage type resolution for generated struct fields
//!
//! Picks the smallest C type that can hold a signal's scaled physical range.
//! A fractional scale factor forces `float`; otherwise the width follows from
//! `2^bit_size * scale`, doubled for signed signals to cover the negative
//! half of the range.

use crate::model::Signal;
use std::fmt;

/// C storage type of a generated struct field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageType {
    Uint8,
    Int8,
    Uint16,
    Int16,
    Uint32,
    Int32,
    Float,
}

impl StorageType {
    /// The C spelling of this type
    pub fn c_type(&self) -> &'static str {
        match self {
            StorageType::Uint8 => "uint8_t",
            StorageType::Int8 => "int8_t",
            StorageType::Uint16 => "uint16_t",
            StorageType::Int16 => "int16_t",
            StorageType::Uint32 => "uint32_t",
            StorageType::Int32 => "int32_t",
            StorageType::Float => "float",
        }
    }

    fn to_signed(self) -> StorageType {
        match self {
            StorageType::Uint8 => StorageType::Int8,
            StorageType::Uint16 => StorageType::Int16,
            StorageType::Uint32 => StorageType::Int32,
            other => other,
        }
    }
}

impl fmt::Display for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.c_type())
    }
}

/// Resolve the storage type for a signal.
///
/// The decision looks at the scale factor's source text, not its parsed
/// value: `(10,0)` is an integer scale while `(10.0,0)` forces `float`.
pub fn storage_type(signal: &Signal) -> StorageType {
    if signal.scale_str.contains('.') {
        return StorageType::Float;
    }

    let mut upper = 2_f64.powi(i32::from(signal.bit_size)) * signal.scale;
    if !signal.is_unsigned {
        upper *= 2.0;
    }

    let unsigned = if upper <= 256.0 {
        StorageType::Uint8
    } else if upper <= 65536.0 {
        StorageType::Uint16
    } else {
        StorageType::Uint32
    };

    if signal.is_unsigned {
        unsigned
    } else {
        unsigned.to_signed()
    }
}
