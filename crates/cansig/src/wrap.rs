//! Physical-value round trips: encode + range check + pack, and unpack + range
//! check + decode, behind one call each.

use tracing::debug;

use crate::{
    errors::CodecError,
    message::{MessageDescriptor, RawFrame},
    range::first_out_of_range,
};

/// Physical values decoded from one frame.
///
/// Values are always delivered, including for signals that failed the range
/// check. `first_out_of_range` is the 1-based index of the first such signal.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedFrame {
    pub values: Vec<f64>,
    pub first_out_of_range: Option<usize>,
}

impl DecodedFrame {
    /// `0` when every signal is in range, otherwise the 1-based index of the first offender.
    pub fn status_code(&self) -> i32 {
        self.first_out_of_range
            .map_or(0, |index| i32::try_from(index).unwrap_or(i32::MAX))
    }
}

impl MessageDescriptor {
    /// Encodes every physical value (one per signal, in descriptor order).
    pub fn encode(&self, physical: &[f64]) -> Result<RawFrame, CodecError> {
        if physical.len() != self.signals().len() {
            return Err(CodecError::ValueCount {
                expected: self.signals().len(),
                actual: physical.len(),
            });
        }

        Ok(self
            .signals()
            .iter()
            .zip(physical)
            .map(|(signal, value)| signal.encode(*value))
            .collect::<Vec<_>>()
            .into())
    }

    /// Decodes every raw value of `frame` into its physical value.
    pub fn decode(&self, frame: &RawFrame) -> Vec<f64> {
        self.signals()
            .iter()
            .zip(frame.values())
            .map(|(signal, raw)| signal.decode(*raw))
            .collect()
    }

    fn out_of_range_error(&self, index: usize) -> CodecError {
        CodecError::OutOfRange {
            index,
            name: self.signals()[index - 1].name().to_string(),
        }
    }

    /// Encodes `physical`, range checks every raw value in descriptor order and
    /// packs the frame into `buffer`.
    ///
    /// All values are encoded first. The first out-of-range signal is reported
    /// as [CodecError::OutOfRange] and nothing is packed.
    pub fn wrap_pack(&self, buffer: &mut [u8], physical: &[f64]) -> Result<(), CodecError> {
        let frame = self.encode(physical)?;

        if let Some(index) = first_out_of_range(self.signals(), frame.values()) {
            debug!(message = %self.name(), index, "signal out of range, frame not packed");
            return Err(self.out_of_range_error(index));
        }

        self.pack(buffer, &frame).inspect_err(|err| {
            debug!(message = %self.name(), %err, "frame not packed");
        })?;

        Ok(())
    }

    /// Unpacks `buffer`, range checks the raw values and decodes all of them.
    ///
    /// Fails only when `buffer` is shorter than `dlc`. Out-of-range signals are
    /// reported in [DecodedFrame::first_out_of_range] next to the values.
    pub fn decode_frame(&self, buffer: &[u8]) -> Result<DecodedFrame, CodecError> {
        let frame = self.unpack(buffer).inspect_err(|err| {
            debug!(message = %self.name(), %err, "frame not unpacked");
        })?;

        let first_out_of_range = first_out_of_range(self.signals(), frame.values());
        if let Some(index) = first_out_of_range {
            debug!(message = %self.name(), index, "decoded signal out of range");
        }

        Ok(DecodedFrame {
            values: self.decode(&frame),
            first_out_of_range,
        })
    }

    /// Unpacks `buffer` and writes each decoded value to the matching output
    /// slot; `None` slots are skipped. `outputs` holds one slot per signal.
    ///
    /// Outputs are written even when the result is [CodecError::OutOfRange];
    /// that error only flags the first offending signal. On
    /// [CodecError::BufferTooSmall] nothing is written.
    pub fn wrap_unpack(
        &self,
        buffer: &[u8],
        outputs: &mut [Option<&mut f64>],
    ) -> Result<(), CodecError> {
        let decoded = self.decode_frame(buffer)?;

        if outputs.len() != decoded.values.len() {
            return Err(CodecError::ValueCount {
                expected: decoded.values.len(),
                actual: outputs.len(),
            });
        }

        for (slot, value) in outputs.iter_mut().zip(&decoded.values) {
            if let Some(out) = slot {
                **out = *value;
            }
        }

        match decoded.first_out_of_range {
            Some(index) => Err(self.out_of_range_error(index)),
            None => Ok(()),
        }
    }
}
