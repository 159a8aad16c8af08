//! Message descriptors: a fixed-length frame and the ordered signals inside it.

use std::collections::HashSet;

use tracing::{debug, trace, warn};

use crate::{
    errors::{CodecError, DescriptorError},
    signal::SignalDescriptor,
    transform::RawValue,
};

/// A compiled message: frame metadata and signals in declaration order. Use
/// [MessageDescriptor::builder] to build one, then [MessageDescriptor::pack] and
/// [MessageDescriptor::unpack] to move raw values in and out of frame buffers.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageDescriptor {
    name: String,
    frame_id: u32,
    is_extended: bool,
    dlc: usize,
    cycle_time_ms: Option<u32>,
    signals: Vec<SignalDescriptor>,
}

/// The in-memory message record: one raw value per signal, in descriptor order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawFrame {
    values: Vec<RawValue>,
}

impl RawFrame {
    /// A record holding the zero raw value of every signal.
    pub fn zeroed(message: &MessageDescriptor) -> Self {
        Self {
            values: message
                .signals
                .iter()
                .map(|signal| signal.transform().zero())
                .collect(),
        }
    }

    pub fn values(&self) -> &[RawValue] {
        &self.values
    }

    pub fn get(&self, index: usize) -> Option<RawValue> {
        self.values.get(index).copied()
    }

    /// Replaces the value at `index`. Returns false if `index` is past the end.
    pub fn set(&mut self, index: usize, raw: RawValue) -> bool {
        match self.values.get_mut(index) {
            Some(slot) => {
                *slot = raw;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<Vec<RawValue>> for RawFrame {
    fn from(values: Vec<RawValue>) -> Self {
        Self { values }
    }
}

impl MessageDescriptor {
    pub fn builder(name: impl Into<String>, frame_id: u32, dlc: usize) -> MessageBuilder {
        MessageBuilder::new(name, frame_id, dlc)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn frame_id(&self) -> u32 {
        self.frame_id
    }

    /// Extended (29-bit) identifier flag, as declared.
    pub fn is_extended(&self) -> bool {
        self.is_extended
    }

    /// Frame length in bytes.
    pub fn dlc(&self) -> usize {
        self.dlc
    }

    pub fn cycle_time_ms(&self) -> Option<u32> {
        self.cycle_time_ms
    }

    pub fn signals(&self) -> &[SignalDescriptor] {
        &self.signals
    }

    pub fn signal(&self, name: &str) -> Option<&SignalDescriptor> {
        self.signals.iter().find(|signal| signal.name() == name)
    }

    /// Zero-based position of the named signal.
    pub fn signal_index(&self, name: &str) -> Option<usize> {
        self.signals.iter().position(|signal| signal.name() == name)
    }

    /// Every pair of signals (zero-based, `i < j`) whose bit spans share a bit.
    pub fn overlapping_signals(&self) -> Vec<(usize, usize)> {
        let occupancy: Vec<Vec<u8>> = self
            .signals
            .iter()
            .map(|signal| signal.span().occupancy(self.dlc))
            .collect();

        let mut pairs = Vec::new();
        for i in 0..occupancy.len() {
            for j in i + 1..occupancy.len() {
                let shared = occupancy[i]
                    .iter()
                    .zip(&occupancy[j])
                    .any(|(a, b)| a & b != 0);
                if shared {
                    pairs.push((i, j));
                }
            }
        }

        pairs
    }

    fn check_size(&self, actual: usize) -> Result<(), CodecError> {
        if actual < self.dlc {
            return Err(CodecError::BufferTooSmall {
                needed: self.dlc,
                actual,
            });
        }

        Ok(())
    }

    /// Packs `frame` into `buffer`. Zero-fills the first `dlc` bytes, then ORs
    /// each signal in descriptor order. Returns the number of bytes written.
    ///
    /// Fails with [CodecError::BufferTooSmall] when `buffer` is shorter than
    /// `dlc`, leaving it untouched. Values are not range checked here.
    pub fn pack(&self, buffer: &mut [u8], frame: &RawFrame) -> Result<usize, CodecError> {
        self.check_size(buffer.len())?;

        if frame.len() != self.signals.len() {
            return Err(CodecError::ValueCount {
                expected: self.signals.len(),
                actual: frame.len(),
            });
        }

        let data = &mut buffer[..self.dlc];
        data.fill(0);

        for (signal, raw) in self.signals.iter().zip(frame.values()) {
            signal.span().write(data, raw.to_bits());
        }

        trace!(frame_id = self.frame_id, dlc = self.dlc, "packed frame");

        Ok(self.dlc)
    }

    /// Unpacks every signal's raw value from `buffer`, in descriptor order.
    ///
    /// Only fails when `buffer` is shorter than `dlc`; signal contents never fail.
    pub fn unpack(&self, buffer: &[u8]) -> Result<RawFrame, CodecError> {
        self.check_size(buffer.len())?;

        let data = &buffer[..self.dlc];
        let values = self
            .signals
            .iter()
            .map(|signal| signal.raw_from_frame(data))
            .collect();

        trace!(frame_id = self.frame_id, dlc = self.dlc, "unpacked frame");

        Ok(RawFrame { values })
    }
}

/// Builder for [MessageDescriptor].
#[derive(Debug, Clone)]
pub struct MessageBuilder {
    name: String,
    frame_id: u32,
    is_extended: bool,
    dlc: usize,
    cycle_time_ms: Option<u32>,
    signals: Vec<SignalDescriptor>,
}

impl MessageBuilder {
    pub fn new(name: impl Into<String>, frame_id: u32, dlc: usize) -> Self {
        Self {
            name: name.into(),
            frame_id,
            is_extended: false,
            dlc,
            cycle_time_ms: None,
            signals: Vec::new(),
        }
    }

    pub fn extended(mut self, is_extended: bool) -> Self {
        self.is_extended = is_extended;
        self
    }

    pub fn cycle_time_ms(mut self, cycle_time_ms: u32) -> Self {
        self.cycle_time_ms = Some(cycle_time_ms);
        self
    }

    pub fn signal(mut self, signal: SignalDescriptor) -> Self {
        self.signals.push(signal);
        self
    }

    pub fn signals(mut self, signals: impl IntoIterator<Item = SignalDescriptor>) -> Self {
        self.signals.extend(signals);
        self
    }

    /// Checks names and that every signal fits in `dlc` bytes. Overlapping
    /// spans are accepted and logged.
    pub fn build(self) -> Result<MessageDescriptor, DescriptorError> {
        if self.name.is_empty() {
            return Err(DescriptorError::EmptyName);
        }

        let mut names = HashSet::with_capacity(self.signals.len());
        for signal in &self.signals {
            if !names.insert(signal.name()) {
                return Err(DescriptorError::DuplicateSignal(signal.name().to_string()));
            }

            if signal.span().required_len() > self.dlc {
                return Err(DescriptorError::SpanOutOfFrame {
                    name: signal.name().to_string(),
                    end_byte: signal.span().last_byte,
                    dlc: self.dlc,
                });
            }
        }

        let message = MessageDescriptor {
            name: self.name,
            frame_id: self.frame_id,
            is_extended: self.is_extended,
            dlc: self.dlc,
            cycle_time_ms: self.cycle_time_ms,
            signals: self.signals,
        };

        for (i, j) in message.overlapping_signals() {
            warn!(
                message = %message.name,
                first = %message.signals[i].name(),
                second = %message.signals[j].name(),
                "signal bit spans overlap"
            );
        }

        debug!(
            message = %message.name,
            frame_id = message.frame_id,
            dlc = message.dlc,
            signals = message.signals.len(),
            "built message descriptor"
        );

        Ok(message)
    }
}

#[cfg(feature = "serde")]
impl TryFrom<crate::serde::MessageDef> for MessageDescriptor {
    type Error = DescriptorError;

    fn try_from(value: crate::serde::MessageDef) -> Result<Self, Self::Error> {
        let signals = value
            .signals
            .into_iter()
            .map(SignalDescriptor::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let mut builder = MessageDescriptor::builder(value.name, value.frame_id, value.dlc)
            .extended(value.is_extended)
            .signals(signals);

        if let Some(cycle_time_ms) = value.cycle_time_ms {
            builder = builder.cycle_time_ms(cycle_time_ms);
        }

        builder.build()
    }
}

#[cfg(feature = "serde")]
impl MessageDescriptor {
    /// Deserializes a [crate::serde::MessageDef] from JSON and validates it.
    pub fn from_json(json: &str) -> Result<Self, DescriptorError> {
        let def: crate::serde::MessageDef =
            serde_json::from_str(json).map_err(|e| DescriptorError::Definition(e.to_string()))?;

        def.try_into()
    }
}
