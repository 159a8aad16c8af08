//! Range validation of raw values against declared bounds.

use std::cmp::Ordering;

use crate::{signal::SignalDescriptor, transform::RawValue};

/// Optional inclusive bounds on a signal's raw value.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RawBounds {
    pub min: Option<RawValue>,
    pub max: Option<RawValue>,
}

impl RawBounds {
    pub fn new(min: Option<RawValue>, max: Option<RawValue>) -> Self {
        Self { min, max }
    }

    /// True when `raw` lies within every declared bound. Undeclared bounds always pass.
    pub fn contains(&self, raw: RawValue) -> bool {
        let above_min = self
            .min
            .is_none_or(|min| matches!(compare(min, raw), Some(Ordering::Less | Ordering::Equal)));
        let below_max = self
            .max
            .is_none_or(|max| matches!(compare(raw, max), Some(Ordering::Less | Ordering::Equal)));

        above_min && below_max
    }
}

/// Compares two raw values numerically. Integers compare exactly; anything
/// involving a float compares as `f64` and is unordered for NaN.
pub fn compare(a: RawValue, b: RawValue) -> Option<Ordering> {
    match (a.as_i128(), b.as_i128()) {
        (Some(a), Some(b)) => Some(a.cmp(&b)),
        _ => a.as_f64().partial_cmp(&b.as_f64()),
    }
}

/// Returns the 1-based index of the first signal whose raw value is out of range,
/// checking in descriptor order.
pub fn first_out_of_range(signals: &[SignalDescriptor], raws: &[RawValue]) -> Option<usize> {
    signals
        .iter()
        .zip(raws)
        .position(|(signal, raw)| !signal.is_in_range(*raw))
        .map(|i| i + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unbounded() {
        let bounds = RawBounds::default();
        assert!(bounds.contains(RawValue::Unsigned(u64::MAX)));
        assert!(bounds.contains(RawValue::Float64(f64::NAN)));
    }

    #[test]
    fn test_inclusive_bounds() {
        let bounds = RawBounds::new(Some(RawValue::Signed(-2048)), Some(RawValue::Signed(2047)));
        assert!(bounds.contains(RawValue::Signed(-2048)));
        assert!(bounds.contains(RawValue::Signed(2047)));
        assert!(!bounds.contains(RawValue::Signed(2048)));
        assert!(!bounds.contains(RawValue::Signed(-2049)));
    }

    #[test]
    fn test_single_bound() {
        let bounds = RawBounds::new(None, Some(RawValue::Unsigned(50)));
        assert!(bounds.contains(RawValue::Unsigned(0)));
        assert!(bounds.contains(RawValue::Unsigned(50)));
        assert!(!bounds.contains(RawValue::Unsigned(51)));
    }

    #[test]
    fn test_compare_mixed() {
        assert_eq!(
            compare(RawValue::Signed(-1), RawValue::Unsigned(u64::MAX)),
            Some(Ordering::Less)
        );
        assert_eq!(
            compare(RawValue::Float32(1.5), RawValue::Unsigned(1)),
            Some(Ordering::Greater)
        );
        assert_eq!(compare(RawValue::Float64(f64::NAN), RawValue::Float64(0.0)), None);
    }

    #[test]
    fn test_nan_fails_declared_bounds() {
        let bounds = RawBounds::new(Some(RawValue::Float64(0.0)), None);
        assert!(!bounds.contains(RawValue::Float64(f64::NAN)));
    }
}
