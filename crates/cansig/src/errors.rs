//! Error types for descriptor construction and frame encoding/decoding.

/// Errors produced when building a [crate::signal::SignalDescriptor] or a
/// [crate::message::MessageDescriptor].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DescriptorError {
    /// Signal or message name is empty.
    #[error("name must not be empty")]
    EmptyName,
    /// Two signals of one message share a name.
    #[error("duplicate signal name `{0}`")]
    DuplicateSignal(String),
    /// Bit length is 0 or greater than 64.
    #[error("signal `{name}`: bit length {bit_length} is outside 1..=64")]
    InvalidBitLength { name: String, bit_length: usize },
    /// Start bit so large that the signal's last bit has no position.
    #[error("signal `{name}`: start bit {start_bit} is out of range")]
    InvalidStartBit { name: String, start_bit: usize },
    /// IEEE float signal whose bit length does not match its storage kind.
    #[error("signal `{name}`: float storage needs exactly {expected} bits, got {bit_length}")]
    FloatBitLength {
        name: String,
        expected: usize,
        bit_length: usize,
    },
    /// IEEE float signals are carried as-is and cannot be scaled.
    #[error("signal `{name}`: float signals require scale 1 and offset 0")]
    FloatScaling { name: String },
    /// Scale is zero, NaN or infinite, or offset is NaN or infinite.
    #[error("signal `{name}`: invalid scale {scale} / offset {offset}")]
    InvalidScaleOffset { name: String, scale: f64, offset: f64 },
    /// A raw bound cannot be represented by the signal's raw type.
    #[error("signal `{name}`: raw bound {bound} does not fit the signal's raw type")]
    InvalidBound { name: String, bound: String },
    /// Raw minimum is greater than raw maximum.
    #[error("signal `{name}`: raw minimum is greater than raw maximum")]
    InvalidRange { name: String },
    /// The signal's bit span reaches past the end of the frame.
    #[error("signal `{name}`: bit span ends in byte {end_byte}, frame has {dlc} bytes")]
    SpanOutOfFrame {
        name: String,
        end_byte: usize,
        dlc: usize,
    },
    /// The descriptor text could not be deserialized.
    #[cfg(feature = "serde")]
    #[error("invalid descriptor definition: {0}")]
    Definition(String),
}

/// Errors produced by [crate::message::MessageDescriptor] pack/unpack calls and the
/// validated wrappers built on top of them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// Caller buffer is shorter than the frame's DLC. Nothing was written.
    #[error("buffer too small: frame needs {needed} bytes, buffer has {actual}")]
    BufferTooSmall { needed: usize, actual: usize },
    /// A raw value violates its declared bounds. `index` is 1-based, in descriptor order.
    #[error("signal {index} (`{name}`) is out of range")]
    OutOfRange { index: usize, name: String },
    /// Number of supplied values does not match the number of signals.
    #[error("expected {expected} signal values, got {actual}")]
    ValueCount { expected: usize, actual: usize },
    /// A single-signal bit operation reached past the end of the buffer.
    #[error("bit span ends in byte {end_byte}, buffer has {len} bytes")]
    OutOfBounds { end_byte: usize, len: usize },
}

impl CodecError {
    /// Integer status for this error: the 1-based signal index for
    /// [CodecError::OutOfRange], `-1` for everything else.
    pub fn status_code(&self) -> i32 {
        match self {
            CodecError::OutOfRange { index, .. } => i32::try_from(*index).unwrap_or(i32::MAX),
            _ => -1,
        }
    }
}

/// Integer status of a codec call: `0` on success, otherwise [CodecError::status_code].
pub fn status_code_of<T>(result: &Result<T, CodecError>) -> i32 {
    match result {
        Ok(_) => 0,
        Err(err) => err.status_code(),
    }
}
