//! JSON‑deserializable message descriptions.
//!
//! These types describe the *layout* of a frame. They are intended to be
//! produced by whatever tool reads your CAN database and then compiled into
//! validated [`crate::message::MessageDescriptor`]s via `TryFrom`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{bits::ByteOrder, transform::{RawValue, StorageKind}};

/// Byte order of a signal.
#[derive(Debug, Deserialize, Serialize, Default, Clone, Copy)]
pub enum ByteOrderDef {
    /// Intel, low-order byte first.
    #[default]
    LittleEndian,
    /// Motorola, high-order byte first.
    BigEndian,
}

impl From<ByteOrderDef> for ByteOrder {
    fn from(value: ByteOrderDef) -> Self {
        match value {
            ByteOrderDef::LittleEndian => ByteOrder::LittleEndian,
            ByteOrderDef::BigEndian => ByteOrder::BigEndian,
        }
    }
}

/// Raw storage of a signal.
#[derive(Debug, Deserialize, Serialize, Default, Clone, Copy)]
pub enum StorageDef {
    #[default]
    Integer,
    Float32,
    Float64,
}

impl From<StorageDef> for StorageKind {
    fn from(value: StorageDef) -> Self {
        match value {
            StorageDef::Integer => StorageKind::Integer,
            StorageDef::Float32 => StorageKind::Float32,
            StorageDef::Float64 => StorageKind::Float64,
        }
    }
}

/// A raw bound as written in JSON: an integer or a float.
#[derive(Debug, Deserialize, Serialize, Clone, Copy)]
#[serde(untagged)]
pub enum BoundDef {
    Signed(i64),
    Unsigned(u64),
    Float(f64),
}

impl From<BoundDef> for RawValue {
    fn from(value: BoundDef) -> Self {
        match value {
            BoundDef::Signed(v) => RawValue::Signed(v),
            BoundDef::Unsigned(v) => RawValue::Unsigned(v),
            BoundDef::Float(v) => RawValue::Float64(v),
        }
    }
}

/// Description of one frame and its signals.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MessageDef {
    pub name: String,
    pub frame_id: u32,
    /// Extended (29-bit) identifier flag.
    #[serde(default)]
    pub is_extended: bool,
    /// Frame length in bytes.
    pub dlc: usize,
    #[serde(default)]
    pub cycle_time_ms: Option<u32>,
    /// Signals in packing order.
    pub signals: Vec<SignalDef>,
}

/// Description of a single signal.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SignalDef {
    pub name: String,
    /// LSB for little endian signals, MSB for big endian ones.
    pub start_bit: usize,
    pub bit_length: usize,
    #[serde(default)]
    pub byte_order: ByteOrderDef,
    #[serde(default)]
    pub signed: bool,
    #[serde(default)]
    pub storage: StorageDef,
    #[serde(default = "default_scale")]
    pub scale: f64,
    #[serde(default)]
    pub offset: f64,
    /// Inclusive bounds on the raw value.
    #[serde(default)]
    pub raw_min: Option<BoundDef>,
    #[serde(default)]
    pub raw_max: Option<BoundDef>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    /// Value table: raw value → label.
    #[serde(default)]
    pub choices: BTreeMap<i64, String>,
}

fn default_scale() -> f64 {
    1.0
}
