//! A [`Transform`] converts between physical values and the raw values carried
//! in the frame:
//! - **Storage kind**: integer (signed or unsigned, held in an 8/16/32/64-bit
//!   container), IEEE 754 single or IEEE 754 double.
//! - **Linear modifiers**: `physical = raw * scale + offset` for integers.
//!   Float signals are carried as-is.
//!
//! ## Encoding
//!
//! `raw = (physical - offset) / scale`, truncated toward zero and wrapped to
//! the storage width. Out-of-range physical values wrap; they never saturate.

use crate::bits::{mask, sign_extend};

/// How the raw bits of a signal are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageKind {
    /// Two's complement or unsigned integer.
    #[default]
    Integer,
    /// IEEE 754 single precision, exactly 32 bits.
    Float32,
    /// IEEE 754 double precision, exactly 64 bits.
    Float64,
}

/// A raw signal value as carried on the wire, before scale/offset are applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawValue {
    Unsigned(u64),
    Signed(i64),
    Float32(f32),
    Float64(f64),
}

impl RawValue {
    /// Bit pattern placed into the frame. Signed values are two's complement.
    pub fn to_bits(self) -> u64 {
        match self {
            RawValue::Unsigned(v) => v,
            RawValue::Signed(v) => v as u64,
            RawValue::Float32(v) => v.to_bits() as u64,
            RawValue::Float64(v) => v.to_bits(),
        }
    }

    /// Numeric value as `f64`. Lossy above 2^53 for integers.
    pub fn as_f64(self) -> f64 {
        match self {
            RawValue::Unsigned(v) => v as f64,
            RawValue::Signed(v) => v as f64,
            RawValue::Float32(v) => v as f64,
            RawValue::Float64(v) => v,
        }
    }

    /// Exact integer value, or `None` for float values.
    pub fn as_i128(self) -> Option<i128> {
        match self {
            RawValue::Unsigned(v) => Some(v as i128),
            RawValue::Signed(v) => Some(v as i128),
            RawValue::Float32(_) | RawValue::Float64(_) => None,
        }
    }
}

/// Conversion between physical and raw values for one signal.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    pub storage: StorageKind,
    /// Integer raws only: two's complement interpretation.
    pub signed: bool,
    /// Width of the integer container (8, 16, 32 or 64).
    pub storage_bits: usize,
    pub scale: f64,
    pub offset: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            storage: StorageKind::Integer,
            signed: false,
            storage_bits: 64,
            scale: 1.0,
            offset: 0.0,
        }
    }
}

impl Transform {
    /// Raw value representing zero for this storage kind.
    pub fn zero(&self) -> RawValue {
        match self.storage {
            StorageKind::Integer if self.signed => RawValue::Signed(0),
            StorageKind::Integer => RawValue::Unsigned(0),
            StorageKind::Float32 => RawValue::Float32(0.0),
            StorageKind::Float64 => RawValue::Float64(0.0),
        }
    }

    /// Encodes a physical value into its raw representation.
    pub fn encode(&self, physical: f64) -> RawValue {
        match self.storage {
            StorageKind::Float32 => RawValue::Float32(physical as f32),
            StorageKind::Float64 => RawValue::Float64(physical),
            StorageKind::Integer => {
                let quotient = (physical - self.offset) / self.scale;
                // i128 holds every u64/i64; the cast back to u64 wraps.
                let wrapped = (quotient.trunc() as i128) as u64 & mask(self.storage_bits);

                self.integer(wrapped, self.storage_bits)
            }
        }
    }

    /// Decodes a raw value into its physical value.
    pub fn decode(&self, raw: RawValue) -> f64 {
        match self.storage {
            StorageKind::Float32 | StorageKind::Float64 => raw.as_f64(),
            StorageKind::Integer => raw.as_f64() * self.scale + self.offset,
        }
    }

    /// Builds a raw value from the `bit_length` bits unpacked from the frame.
    pub fn from_bits(&self, bits: u64, bit_length: usize) -> RawValue {
        match self.storage {
            StorageKind::Float32 => RawValue::Float32(f32::from_bits(bits as u32)),
            StorageKind::Float64 => RawValue::Float64(f64::from_bits(bits)),
            StorageKind::Integer => self.integer(bits & mask(bit_length), bit_length),
        }
    }

    fn integer(&self, bits: u64, bit_length: usize) -> RawValue {
        if self.signed {
            RawValue::Signed(sign_extend(bits, bit_length, self.storage_bits))
        } else {
            RawValue::Unsigned(bits)
        }
    }
}
