//! Analog filter band classification.
//!
//! The RF switch network routes each direction through one of a fixed set of
//! analog filter banks. Which bank serves a frequency is a step function over
//! a strictly increasing table of cutover frequencies; the tables differ
//! between hardware variants and between the RX and TX paths (the filter
//! banks are physically different parts).
//!
//! Classification is total: every input maps to exactly one band, with
//! out-of-range inputs mapping to the `Invalid` variant. Callers that go on
//! to synthesize switch registers must treat `Invalid` as a fatal
//! configuration fault, never clamp it to a neighboring band.

use crate::consts::FREQ_COMPARE_EPSILON;

/// Signal path direction, used in diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Receive path.
    Rx,
    /// Transmit path.
    Tx,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rx => f.write_str("RX"),
            Self::Tx => f.write_str("TX"),
        }
    }
}

/// RX analog filter bands, in increasing frequency order.
///
/// `B2` through `B7` are the low-band sub-ranges; `Hb` is the high band above
/// the last low-band cutover. The derived ordering follows the frequency
/// ordering, with `Invalid` sorting first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RxBand {
    /// Below the minimum or above the maximum tunable frequency.
    Invalid,
    #[allow(missing_docs)]
    B2,
    #[allow(missing_docs)]
    B3,
    #[allow(missing_docs)]
    B4,
    #[allow(missing_docs)]
    B5,
    #[allow(missing_docs)]
    B6,
    #[allow(missing_docs)]
    B7,
    /// High band, above all low-band cutovers.
    Hb,
}

/// TX analog filter bands, in increasing frequency order.
///
/// The low bands are named for the nominal center frequency (in MHz) of the
/// filter that serves them, not for their cutover points.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TxBand {
    /// Below the minimum or above the maximum tunable frequency.
    Invalid,
    #[allow(missing_docs)]
    Lb80,
    #[allow(missing_docs)]
    Lb160,
    #[allow(missing_docs)]
    Lb225,
    #[allow(missing_docs)]
    Lb400,
    #[allow(missing_docs)]
    Lb575,
    #[allow(missing_docs)]
    Lb1000,
    #[allow(missing_docs)]
    Lb1700,
    #[allow(missing_docs)]
    Lb2750,
    /// High band, above all low-band cutovers.
    Hb,
}

/// `a < b`, with a frequency within [`FREQ_COMPARE_EPSILON`] of the bound
/// counting as *not* less - boundary frequencies belong to the upper band.
pub(crate) fn freq_lt(a: f64, b: f64) -> bool {
    a < b - FREQ_COMPARE_EPSILON
}

/// `a <= b` with the same epsilon tolerance.
pub(crate) fn freq_le(a: f64, b: f64) -> bool {
    a <= b + FREQ_COMPARE_EPSILON
}

/// Walk an ordered cutover table and return the first band whose upper bound
/// exceeds `freq`. `top` covers everything from the last cutover up to and
/// including `max`.
pub(crate) fn classify<B: Copy>(
    freq: f64,
    min: f64,
    max: f64,
    cutovers: &[(f64, B)],
    top: B,
    invalid: B,
) -> B {
    if freq_lt(freq, min) {
        return invalid;
    }
    for &(bound, band) in cutovers {
        if freq_lt(freq, bound) {
            return band;
        }
    }
    if freq_le(freq, max) { top } else { invalid }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CUTOVERS: &[(f64, u8)] = &[(100.0, 1), (200.0, 2), (300.0, 3)];

    fn cls(freq: f64) -> u8 {
        classify(freq, 50.0, 400.0, CUTOVERS, 4, 0)
    }

    #[test]
    fn step_function() {
        assert_eq!(cls(49.0), 0);
        assert_eq!(cls(50.0), 1);
        assert_eq!(cls(99.0), 1);
        assert_eq!(cls(100.0), 2);
        assert_eq!(cls(250.0), 3);
        assert_eq!(cls(300.0), 4);
        assert_eq!(cls(400.0), 4);
        assert_eq!(cls(401.0), 0);
    }

    #[test]
    fn boundary_goes_to_upper_band() {
        // Within epsilon of a cutover counts as the upper band.
        assert_eq!(cls(100.0 - FREQ_COMPARE_EPSILON / 2.0), 2);
        assert_eq!(cls(400.0 + FREQ_COMPARE_EPSILON / 2.0), 4);
    }

    #[test]
    fn band_ordering_matches_frequency_ordering() {
        assert!(RxBand::Invalid < RxBand::B2);
        assert!(RxBand::B2 < RxBand::B7);
        assert!(RxBand::B7 < RxBand::Hb);
        assert!(TxBand::Lb80 < TxBand::Lb2750);
        assert!(TxBand::Lb2750 < TxBand::Hb);
    }
}
