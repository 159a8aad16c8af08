//! Signal descriptors: where a physical quantity lives in the frame and how it
//! is encoded.

use std::collections::BTreeMap;

use crate::{
    bits::{BitSpan, ByteOrder, storage_bits},
    errors::{CodecError, DescriptorError},
    range::RawBounds,
    transform::{RawValue, StorageKind, Transform},
};

/// Immutable description of one signal. Build with [SignalDescriptor::builder].
#[derive(Debug, Clone, PartialEq)]
pub struct SignalDescriptor {
    name: String,
    start_bit: usize,
    bit_length: usize,
    byte_order: ByteOrder,
    span: BitSpan,
    transform: Transform,
    bounds: RawBounds,
    unit: Option<String>,
    comment: Option<String>,
    choices: BTreeMap<i64, String>,
}

impl SignalDescriptor {
    /// Starts a builder for an unsigned, unscaled, little endian integer signal.
    pub fn builder(name: impl Into<String>, start_bit: usize, bit_length: usize) -> SignalBuilder {
        SignalBuilder::new(name, start_bit, bit_length)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Start bit as declared: the LSB for little endian signals, the MSB for big endian ones.
    pub fn start_bit(&self) -> usize {
        self.start_bit
    }

    pub fn bit_length(&self) -> usize {
        self.bit_length
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    pub fn is_signed(&self) -> bool {
        self.transform.signed
    }

    pub fn storage(&self) -> StorageKind {
        self.transform.storage
    }

    /// Width of the integer container holding the raw value.
    pub fn storage_bits(&self) -> usize {
        self.transform.storage_bits
    }

    pub fn scale(&self) -> f64 {
        self.transform.scale
    }

    pub fn offset(&self) -> f64 {
        self.transform.offset
    }

    pub fn raw_min(&self) -> Option<RawValue> {
        self.bounds.min
    }

    pub fn raw_max(&self) -> Option<RawValue> {
        self.bounds.max
    }

    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn choices(&self) -> &BTreeMap<i64, String> {
        &self.choices
    }

    /// Label of an integer raw value from the signal's value table.
    pub fn choice(&self, raw: RawValue) -> Option<&str> {
        let key = i64::try_from(raw.as_i128()?).ok()?;
        self.choices.get(&key).map(String::as_str)
    }

    pub fn span(&self) -> &BitSpan {
        &self.span
    }

    pub(crate) fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Encodes a physical value into its raw value.
    pub fn encode(&self, physical: f64) -> RawValue {
        self.transform.encode(physical)
    }

    /// Decodes a raw value into its physical value.
    pub fn decode(&self, raw: RawValue) -> f64 {
        self.transform.decode(raw)
    }

    /// Restricts a physical value to the decoded raw bounds. Never applied by pack/unpack.
    pub fn clamp(&self, physical: f64) -> f64 {
        let min = self.bounds.min.map(|raw| self.decode(raw));
        let max = self.bounds.max.map(|raw| self.decode(raw));

        // A negative scale turns the raw minimum into the physical maximum.
        let (lo, hi) = if self.transform.scale < 0.0 {
            (max, min)
        } else {
            (min, max)
        };

        let mut value = physical;
        if let Some(lo) = lo {
            if value < lo {
                value = lo;
            }
        }
        if let Some(hi) = hi {
            if value > hi {
                value = hi;
            }
        }

        value
    }

    /// True when the raw value lies within the declared bounds (always true without bounds).
    pub fn is_in_range(&self, raw: RawValue) -> bool {
        self.bounds.contains(raw)
    }

    /// Packs `raw` into `data`, OR-ing into the existing content.
    pub fn pack(&self, data: &mut [u8], raw: RawValue) -> Result<(), CodecError> {
        self.span.check(data.len())?;
        self.span.write(data, raw.to_bits());

        Ok(())
    }

    /// Unpacks and sign-extends this signal's raw value from `data`.
    pub fn unpack(&self, data: &[u8]) -> Result<RawValue, CodecError> {
        self.span.check(data.len())?;

        Ok(self.raw_from_frame(data))
    }

    /// Caller guarantees `data` covers the span.
    pub(crate) fn raw_from_frame(&self, data: &[u8]) -> RawValue {
        self.transform
            .from_bits(self.span.read(data), self.bit_length)
    }
}

/// Builder for [SignalDescriptor]. [SignalBuilder::build] validates the result.
#[derive(Debug, Clone)]
pub struct SignalBuilder {
    name: String,
    start_bit: usize,
    bit_length: usize,
    byte_order: ByteOrder,
    signed: bool,
    storage: StorageKind,
    scale: f64,
    offset: f64,
    raw_min: Option<RawValue>,
    raw_max: Option<RawValue>,
    unit: Option<String>,
    comment: Option<String>,
    choices: BTreeMap<i64, String>,
}

impl SignalBuilder {
    pub fn new(name: impl Into<String>, start_bit: usize, bit_length: usize) -> Self {
        Self {
            name: name.into(),
            start_bit,
            bit_length,
            byte_order: ByteOrder::LittleEndian,
            signed: false,
            storage: StorageKind::Integer,
            scale: 1.0,
            offset: 0.0,
            raw_min: None,
            raw_max: None,
            unit: None,
            comment: None,
            choices: BTreeMap::new(),
        }
    }

    pub fn byte_order(mut self, byte_order: ByteOrder) -> Self {
        self.byte_order = byte_order;
        self
    }

    pub fn big_endian(self) -> Self {
        self.byte_order(ByteOrder::BigEndian)
    }

    pub fn signed(mut self, signed: bool) -> Self {
        self.signed = signed;
        self
    }

    pub fn storage(mut self, storage: StorageKind) -> Self {
        self.storage = storage;
        self
    }

    /// `physical = raw * scale + offset`.
    pub fn scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }

    pub fn raw_min(mut self, min: RawValue) -> Self {
        self.raw_min = Some(min);
        self
    }

    pub fn raw_max(mut self, max: RawValue) -> Self {
        self.raw_max = Some(max);
        self
    }

    /// Sets both inclusive raw bounds.
    pub fn raw_range(self, min: RawValue, max: RawValue) -> Self {
        self.raw_min(min).raw_max(max)
    }

    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn choice(mut self, raw: i64, label: impl Into<String>) -> Self {
        self.choices.insert(raw, label.into());
        self
    }

    /// Validates the signal and computes its bit span.
    pub fn build(self) -> Result<SignalDescriptor, DescriptorError> {
        if self.name.is_empty() {
            return Err(DescriptorError::EmptyName);
        }

        if self.bit_length == 0 || self.bit_length > 64 {
            return Err(DescriptorError::InvalidBitLength {
                name: self.name,
                bit_length: self.bit_length,
            });
        }

        // Motorola spans reach up to 7 bits past `start_bit + bit_length`.
        if self.start_bit.checked_add(self.bit_length + 7).is_none() {
            return Err(DescriptorError::InvalidStartBit {
                name: self.name,
                start_bit: self.start_bit,
            });
        }

        let expected = match self.storage {
            StorageKind::Integer => None,
            StorageKind::Float32 => Some(32),
            StorageKind::Float64 => Some(64),
        };

        if let Some(expected) = expected {
            if self.bit_length != expected {
                return Err(DescriptorError::FloatBitLength {
                    name: self.name,
                    expected,
                    bit_length: self.bit_length,
                });
            }
            if self.scale != 1.0 || self.offset != 0.0 {
                return Err(DescriptorError::FloatScaling { name: self.name });
            }
        }

        if !self.scale.is_finite() || self.scale == 0.0 || !self.offset.is_finite() {
            return Err(DescriptorError::InvalidScaleOffset {
                name: self.name,
                scale: self.scale,
                offset: self.offset,
            });
        }

        let transform = Transform {
            storage: self.storage,
            signed: self.signed && self.storage == StorageKind::Integer,
            storage_bits: storage_bits(self.bit_length),
            scale: self.scale,
            offset: self.offset,
        };

        let min = self
            .raw_min
            .map(|bound| normalize_bound(&self.name, &transform, bound))
            .transpose()?;
        let max = self
            .raw_max
            .map(|bound| normalize_bound(&self.name, &transform, bound))
            .transpose()?;

        if let (Some(min), Some(max)) = (min, max) {
            if !matches!(
                crate::range::compare(min, max),
                Some(std::cmp::Ordering::Less | std::cmp::Ordering::Equal)
            ) {
                return Err(DescriptorError::InvalidRange { name: self.name });
            }
        }

        Ok(SignalDescriptor {
            span: BitSpan::new(self.start_bit, self.bit_length, self.byte_order),
            name: self.name,
            start_bit: self.start_bit,
            bit_length: self.bit_length,
            byte_order: self.byte_order,
            transform,
            bounds: RawBounds::new(min, max),
            unit: self.unit,
            comment: self.comment,
            choices: self.choices,
        })
    }
}

/// Converts a bound into the raw value kind the signal produces.
fn normalize_bound(
    name: &str,
    transform: &Transform,
    bound: RawValue,
) -> Result<RawValue, DescriptorError> {
    let invalid = || DescriptorError::InvalidBound {
        name: name.to_string(),
        bound: format!("{bound:?}"),
    };

    match transform.storage {
        StorageKind::Float32 => Ok(RawValue::Float32(bound.as_f64() as f32)),
        StorageKind::Float64 => Ok(RawValue::Float64(bound.as_f64())),
        StorageKind::Integer => {
            let value = bound.as_i128().ok_or_else(invalid)?;

            if transform.signed {
                i64::try_from(value)
                    .map(RawValue::Signed)
                    .map_err(|_| invalid())
            } else {
                u64::try_from(value)
                    .map(RawValue::Unsigned)
                    .map_err(|_| invalid())
            }
        }
    }
}

#[cfg(feature = "serde")]
impl TryFrom<crate::serde::SignalDef> for SignalDescriptor {
    type Error = DescriptorError;

    fn try_from(value: crate::serde::SignalDef) -> Result<Self, Self::Error> {
        let mut builder = SignalDescriptor::builder(value.name, value.start_bit, value.bit_length)
            .byte_order(value.byte_order.into())
            .signed(value.signed)
            .storage(value.storage.into())
            .scale(value.scale)
            .offset(value.offset);

        if let Some(min) = value.raw_min {
            builder = builder.raw_min(min.into());
        }
        if let Some(max) = value.raw_max {
            builder = builder.raw_max(max.into());
        }
        if let Some(unit) = value.unit {
            builder = builder.unit(unit);
        }
        if let Some(comment) = value.comment {
            builder = builder.comment(comment);
        }
        for (raw, label) in value.choices {
            builder = builder.choice(raw, label);
        }

        builder.build()
    }
}
