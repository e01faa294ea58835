//! Digital tuning and rate-change control for one DSP path.
//!
//! Each direction of each channel owns one DSP core in the FPGA: a CORDIC
//! fine-frequency shifter, a cascade of half-band filters, and a CIC stage
//! for the remaining integer rate change. [`DspCore`] programs the three
//! registers of that block and tracks the scaling bookkeeping the rate
//! change implies, so the host can undo the chain's gain in software.

use std::ops::RangeInclusive;

use crate::Transport;
use crate::consts::{
    CIC_GAIN_CONSTANT, CIC_ORDER, DEFAULT_MAX_HALFBANDS, DSP_SCALE_BITS, FULL_SCALE_I16,
    REG_DSP_FREQ, REG_DSP_RATE, REG_DSP_SCALE_IQ,
};
use crate::error::Error;

/// Over-the-wire sample format, as it affects DSP and host scaling.
///
/// The reduced-width formats carry a `peak` hint: the largest sample
/// magnitude (relative to full scale) the link is expected to see, which
/// trades headroom for dynamic range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WireFormat {
    /// 16-bit signed complex integers.
    Sc16,
    /// 12-bit signed complex integers packed on the wire.
    Sc12 {
        /// Expected peak sample magnitude, `0.0..=1.0`.
        peak: f64,
    },
    /// 8-bit signed complex integers.
    Sc8 {
        /// Expected peak sample magnitude, `0.0..=1.0`.
        peak: f64,
    },
    /// 32-bit floating point complex; scaling handled entirely on the host.
    Fc32,
}

fn ceil_log2(x: f64) -> f64 {
    (x.ln() / std::f64::consts::LN_2).ceil()
}

/// Control over one direction's digital tuning and resampling chain.
///
/// Register addresses are `base`-relative per [`crate::consts`]; the core
/// performs a write only from the explicit setters, never from construction.
#[derive(Debug)]
pub struct DspCore<T: Transport> {
    transport: T,
    base: u32,
    max_halfbands: u32,
    tick_rate: f64,
    scaling_adjustment: f64,
    dsp_extra_scaling: f64,
    host_extra_scaling: f64,
    host_fullscale: f64,
    fxpt_scalar_correction: f64,
}

impl<T: Transport> DspCore<T> {
    /// Create a core over `transport` with its registers at `base`.
    pub fn new(transport: T, base: u32) -> Self {
        Self {
            transport,
            base,
            max_halfbands: DEFAULT_MAX_HALFBANDS,
            tick_rate: 1.0,
            scaling_adjustment: 1.0,
            dsp_extra_scaling: 1.0,
            host_extra_scaling: 1.0,
            host_fullscale: 1.0,
            fxpt_scalar_correction: 1.0,
        }
    }

    /// Set the number of cascaded half-band stages the loaded FPGA image
    /// provides. Rate factors decompose into at most this many factor-of-two
    /// stages before the CIC absorbs the rest.
    pub fn with_max_halfbands(mut self, max_halfbands: u32) -> Self {
        self.max_halfbands = max_halfbands;
        self
    }

    /// Set the master clock rate, in Hz. All rates and frequencies are
    /// derived from this.
    pub fn set_tick_rate(&mut self, tick_rate: f64) {
        self.tick_rate = tick_rate;
    }

    /// The current master clock rate, in Hz.
    pub fn tick_rate(&self) -> f64 {
        self.tick_rate
    }

    /// The tunable digital frequency range, in Hz.
    pub fn freq_range(&self) -> RangeInclusive<f64> {
        -self.tick_rate / 2.0..=self.tick_rate / 2.0
    }

    /// The tuning-word step size, in Hz.
    pub fn freq_resolution(&self) -> f64 {
        self.tick_rate / 2f64.powi(32)
    }

    /// Tune the digital frequency shifter to `freq` Hz.
    ///
    /// The request wraps modulo the tick rate into the first Nyquist zone,
    /// then quantizes to a 32-bit tuning word. Returns the frequency the
    /// word actually encodes.
    pub fn set_freq(&mut self, freq: f64) -> Result<f64, Error> {
        let tick = self.tick_rate;
        let mut wrapped = freq % tick;
        if wrapped.abs() > tick / 2.0 {
            wrapped -= wrapped.signum() * tick;
        }

        // The rails are reachable through rounding at exactly +tick/2.
        let scale = wrapped / tick;
        let word = if scale >= f64::from(i32::MAX) / 2f64.powi(32) {
            i32::MAX
        } else if scale <= f64::from(i32::MIN) / 2f64.powi(32) {
            i32::MIN
        } else {
            (scale * 2f64.powi(32)).round() as i32
        };

        self.transport.poke32(self.base + REG_DSP_FREQ, word as u32)?;
        Ok(f64::from(word) / 2f64.powi(32) * tick)
    }

    /// Every host sample rate the chain can produce at the current tick
    /// rate, ascending.
    ///
    /// Large factors are thinned out (steps of 4, then 2) because the FPGA
    /// only honors even factors there once the half-bands are engaged.
    pub fn host_rates(&self) -> Vec<f64> {
        let mut factors: Vec<u32> = Vec::new();
        let mut f = 512u32;
        while f > 256 {
            factors.push(f);
            f -= 4;
        }
        while f > 128 {
            factors.push(f);
            f -= 2;
        }
        while f >= 1 {
            factors.push(f);
            f -= 1;
        }
        factors
            .into_iter()
            .map(|f| self.tick_rate / f64::from(f))
            .collect()
    }

    /// Set the host-side sample rate, in samples per second.
    ///
    /// The request is clipped into the achievable range, the rate factor is
    /// split into half-band stages plus a CIC rate, and the droop-scaling
    /// state is recomputed. Returns the rate actually configured.
    pub fn set_host_rate(&mut self, rate: f64) -> Result<f64, Error> {
        if !(rate > 0.0) {
            return Err(Error::InvalidParameter("host rate must be positive"));
        }
        // Snap to the nearest achievable rate. The factor set is non-uniform
        // above 128, so an endpoint clamp alone would accept factors the
        // hardware cannot realize.
        let mut clipped = self.tick_rate;
        for candidate in self.host_rates() {
            if (candidate - rate).abs() < (clipped - rate).abs() {
                clipped = candidate;
            }
        }
        let factor = ((self.tick_rate / clipped).round() as u32).clamp(1, 512);

        let mut cic = factor;
        let mut halfbands = 0u32;
        while halfbands < self.max_halfbands && cic % 2 == 0 {
            halfbands += 1;
            cic /= 2;
        }
        if cic > 1 && halfbands == 0 {
            tracing::warn!(
                factor,
                "rate factor is odd; CIC-only resampling has passband rolloff"
            );
        }

        let mut reg = cic & 0xff;
        for i in 0..halfbands {
            reg |= 1 << (8 + i);
        }
        self.transport.poke32(self.base + REG_DSP_RATE, reg)?;

        // Compensate the CIC gain of rate^order up to the next power of two.
        let rate_pow = f64::from(cic & 0xff).powi(CIC_ORDER);
        self.scaling_adjustment = 2f64.powf(ceil_log2(rate_pow)) / (CIC_GAIN_CONSTANT * rate_pow);
        self.update_scalar()?;

        Ok(self.tick_rate / f64::from(factor))
    }

    /// Configure scaling for the over-the-wire sample format.
    pub fn set_wire_format(&mut self, format: WireFormat) -> Result<(), Error> {
        match format {
            WireFormat::Sc16 | WireFormat::Fc32 => {
                self.dsp_extra_scaling = 1.0;
                self.host_extra_scaling = 1.0;
            }
            WireFormat::Sc12 { peak } => {
                let peak = peak.max(1.0 / 16.0);
                self.host_extra_scaling = peak * 16.0;
                self.dsp_extra_scaling = peak;
            }
            WireFormat::Sc8 { peak } => {
                let peak = peak.max(1.0 / 256.0);
                self.host_extra_scaling = peak * 256.0;
                self.dsp_extra_scaling = peak;
            }
        }
        self.update_scalar()
    }

    /// Set an extra host-side full-scale factor folded into
    /// [`DspCore::scaling_adjustment`].
    pub fn set_host_scale(&mut self, scale: f64) -> Result<(), Error> {
        if !(scale > 0.0) {
            return Err(Error::InvalidParameter("host scale must be positive"));
        }
        self.host_fullscale = scale;
        self.update_scalar()
    }

    /// The factor host software must multiply samples by to undo the
    /// chain's net gain, referenced to 16-bit full scale.
    pub fn scaling_adjustment(&self) -> f64 {
        self.fxpt_scalar_correction * self.host_extra_scaling * self.host_fullscale * FULL_SCALE_I16
    }

    fn update_scalar(&mut self) -> Result<(), Error> {
        // Keep the fixed-point scalar in range by shifting any adjustment
        // above unity into the host-side correction.
        let factor = 1.0 + ceil_log2(self.scaling_adjustment).max(0.0);
        let target = f64::from(1u32 << DSP_SCALE_BITS) * self.scaling_adjustment
            / self.dsp_extra_scaling
            / factor;
        let actual = target.round() as i32;
        self.fxpt_scalar_correction = target / f64::from(actual) * factor;
        self.transport
            .poke32(self.base + REG_DSP_SCALE_IQ, actual as u32)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{REG_DSP_FREQ, REG_DSP_RATE, REG_DSP_SCALE_IQ};
    use crate::transport::testing::RecordingTransport;

    const TICK: f64 = 200e6;

    fn core() -> DspCore<RecordingTransport> {
        let mut core = DspCore::new(RecordingTransport::new(), 0x100);
        core.set_tick_rate(TICK);
        core
    }

    #[test]
    fn freq_round_trip_within_resolution() {
        let mut core = core();
        let actual = core.set_freq(10.123456e6).unwrap();
        assert!((actual - 10.123456e6).abs() <= core.freq_resolution());

        // Retuning to the reported actual frequency must be a fixed point.
        let word = core.transport.last(0x100 + REG_DSP_FREQ).unwrap();
        let again = core.set_freq(actual).unwrap();
        assert_eq!(again, actual);
        assert_eq!(core.transport.last(0x100 + REG_DSP_FREQ).unwrap(), word);
    }

    #[test]
    fn negative_freq_uses_twos_complement_word() {
        let mut core = core();
        let actual = core.set_freq(-10e6).unwrap();
        assert!((actual + 10e6).abs() <= core.freq_resolution());
        let word = core.transport.last(0x100 + REG_DSP_FREQ).unwrap() as i32;
        assert!(word < 0);
    }

    #[test]
    fn freq_wraps_modulo_tick_rate() {
        let mut core = core();
        let a = core.set_freq(10e6).unwrap();
        let b = core.set_freq(10e6 + TICK).unwrap();
        assert!((a - b).abs() <= core.freq_resolution());
    }

    #[test]
    fn even_factor_engages_halfbands() {
        let mut core = core();
        // 12 = 2 * 2 * 3: both half-bands on, CIC at 3.
        let rate = core.set_host_rate(TICK / 12.0).unwrap();
        assert_eq!(rate, TICK / 12.0);
        assert_eq!(core.transport.last(0x100 + REG_DSP_RATE).unwrap(), 0x303);
    }

    #[test]
    fn odd_factor_is_cic_only() {
        let mut core = core();
        let rate = core.set_host_rate(TICK / 9.0).unwrap();
        assert_eq!(rate, TICK / 9.0);
        assert_eq!(core.transport.last(0x100 + REG_DSP_RATE).unwrap(), 9);
    }

    #[test]
    fn deeper_cascade_absorbs_more_twos() {
        let mut core = DspCore::new(RecordingTransport::new(), 0)
            .with_max_halfbands(3);
        core.set_tick_rate(TICK);
        core.set_host_rate(TICK / 8.0).unwrap();
        assert_eq!(core.transport.last(REG_DSP_RATE).unwrap(), 0x701);
    }

    #[test]
    fn unachievable_factor_snaps_to_set_member() {
        let mut core = core();
        // 259 is not an achievable factor; the nearest achievable rate is
        // TICK/260 (two half-bands, CIC at 65). Accepting 259 would truncate
        // the CIC field to 3.
        let rate = core.set_host_rate(TICK / 259.0).unwrap();
        assert_eq!(rate, TICK / 260.0);
        assert_eq!(core.transport.last(0x100 + REG_DSP_RATE).unwrap(), 0x341);

        // Odd factors in the step-2 tier snap to an even neighbor.
        let rate = core.set_host_rate(TICK / 255.0).unwrap();
        assert_eq!(rate, TICK / 256.0);
        assert_eq!(core.transport.last(0x100 + REG_DSP_RATE).unwrap(), 0x340);
    }

    #[test]
    fn out_of_range_rate_is_clipped() {
        let mut core = core();
        let rate = core.set_host_rate(TICK / 1000.0).unwrap();
        assert_eq!(rate, TICK / 512.0);
        let rate = core.set_host_rate(TICK * 2.0).unwrap();
        assert_eq!(rate, TICK);
    }

    #[test]
    fn rate_table_covers_the_factor_range() {
        let core = core();
        let rates = core.host_rates();
        assert_eq!(rates.first().copied(), Some(TICK / 512.0));
        assert_eq!(rates.last().copied(), Some(TICK));
        assert!(rates.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn droop_compensation_scalar_lands_near_target() {
        let mut core = core();
        // Factor 4 decomposes to half-bands only (CIC rate 1), so the
        // adjustment is the bare gain constant.
        core.set_host_rate(TICK / 4.0).unwrap();
        let scalar = core.transport.last(0x100 + REG_DSP_SCALE_IQ).unwrap();
        let target = f64::from(1u32 << DSP_SCALE_BITS) / CIC_GAIN_CONSTANT;
        assert!((f64::from(scalar) - target).abs() <= 0.5);
        assert!(core.scaling_adjustment().is_finite());
        assert!(core.scaling_adjustment() > 0.0);
    }

    #[test]
    fn wire_format_rescales() {
        let mut core = core();
        core.set_host_rate(TICK / 4.0).unwrap();
        let wide = core.scaling_adjustment();
        core.set_wire_format(WireFormat::Sc8 { peak: 1.0 }).unwrap();
        let narrow = core.scaling_adjustment();
        assert!(narrow > wide);
        core.set_wire_format(WireFormat::Fc32).unwrap();
        let reset = core.scaling_adjustment();
        assert!((reset - wide).abs() < 1e-9);
    }

    #[test]
    fn host_scale_folds_into_adjustment() {
        let mut core = core();
        core.set_host_rate(TICK / 2.0).unwrap();
        let base = core.scaling_adjustment();
        core.set_host_scale(2.0).unwrap();
        assert!((core.scaling_adjustment() - base * 2.0).abs() < 1e-9);
        assert!(core.set_host_scale(0.0).is_err());
    }
}
