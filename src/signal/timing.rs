//! Bit timing classification
//!
//! DCC encodes bits in the width of a square-wave period: a "1" bit is two
//! half-cycles of nominally 58 µs each, a "0" bit two half-cycles of 100 µs
//! or more. Classification is a pure function of the measured half-cycle
//! durations and the configured tolerance.

/// Nominal half-period of a "1" bit in microseconds.
pub const ONE_HALF_US: f64 = 58.0;

/// Nominal half-period of a "0" bit in microseconds.
pub const ZERO_HALF_US: f64 = 100.0;

/// Maximum half-cycle asymmetry tolerated for a "1" bit in microseconds.
pub const ONE_MAX_SKEW_US: f64 = 30.0;

/// Result of classifying one bit cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BitClass {
    One,
    Zero,
    /// Neither timing window matched; carries the measured half-cycle
    /// durations in microseconds for diagnostics.
    Ambiguous(f64, f64),
}

/// Injectable bit classification strategy.
///
/// Implementations must be pure: no side effects, same output for the same
/// half-cycle durations.
pub trait BitClassifier {
    /// Classify one bit cell from its two half-cycle durations in µs.
    fn classify(&self, half1_us: f64, half2_us: f64) -> BitClass;
}

/// Edge-pair classifier with a symmetry check, the canonical algorithm.
///
/// A "1" requires both halves inside the short-pulse window and near
/// symmetry between them; a "0" requires both halves inside the long-pulse
/// window, with asymmetry tolerated.
#[derive(Debug, Clone, Copy)]
pub struct DccBitClassifier {
    tolerance: f64,
}

impl DccBitClassifier {
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }

    fn in_window(&self, half_us: f64, nominal_us: f64) -> bool {
        half_us >= nominal_us * (1.0 - self.tolerance)
            && half_us <= nominal_us * (1.0 + self.tolerance)
    }
}

impl BitClassifier for DccBitClassifier {
    fn classify(&self, half1_us: f64, half2_us: f64) -> BitClass {
        if self.in_window(half1_us, ONE_HALF_US)
            && self.in_window(half2_us, ONE_HALF_US)
            && (half1_us - half2_us).abs() <= ONE_MAX_SKEW_US
        {
            BitClass::One
        } else if self.in_window(half1_us, ZERO_HALF_US) && self.in_window(half2_us, ZERO_HALF_US) {
            BitClass::Zero
        } else {
            BitClass::Ambiguous(half1_us, half2_us)
        }
    }
}

/// Full-period classifier without a symmetry check.
///
/// Compatibility mode for the old single-delta algorithm, which measured
/// the time between consecutive same-polarity transitions (one full bit
/// period) instead of the two half-cycles. The zero window's upper bound is
/// relaxed beyond the nominal tolerance, as the old windows were.
#[derive(Debug, Clone, Copy)]
pub struct LegacyPeriodClassifier {
    tolerance: f64,
}

impl LegacyPeriodClassifier {
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }
}

impl BitClassifier for LegacyPeriodClassifier {
    fn classify(&self, half1_us: f64, half2_us: f64) -> BitClass {
        let period = half1_us + half2_us;
        let one_nominal = 2.0 * ONE_HALF_US;
        let zero_nominal = 2.0 * ZERO_HALF_US;

        if period >= one_nominal * (1.0 - self.tolerance)
            && period <= one_nominal * (1.0 + self.tolerance)
        {
            BitClass::One
        } else if period >= zero_nominal * (1.0 - self.tolerance)
            && period <= zero_nominal * (1.0 + 2.0 * self.tolerance)
        {
            BitClass::Zero
        } else {
            BitClass::Ambiguous(half1_us, half2_us)
        }
    }
}
