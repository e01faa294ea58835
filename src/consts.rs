//! Register map offsets and fixed DSP constants.
//!
//! The ATR and DSP register *offsets* here are relative to a per-channel (or
//! per-path) base address supplied by the caller; the absolute addresses vary
//! between FPGA images, the relative layout does not.

/// ATR idle-state register, relative to the channel's ATR base address.
pub const ATR_IDLE_OFFSET: u32 = 0;
/// ATR receive-only register offset.
pub const ATR_RX_ONLY_OFFSET: u32 = 4;
/// ATR transmit-only register offset.
pub const ATR_TX_ONLY_OFFSET: u32 = 8;
/// ATR full-duplex register offset.
pub const ATR_FULL_DUPLEX_OFFSET: u32 = 12;

/// DSP tuning-word register, relative to the DSP path's base address.
pub const REG_DSP_FREQ: u32 = 0;
/// DSP IQ scale register offset.
pub const REG_DSP_SCALE_IQ: u32 = 4;
/// DSP rate register offset (half-band enables + CIC rate).
pub const REG_DSP_RATE: u32 = 8;

/// Width of the fixed-point scale register, in bits.
pub const DSP_SCALE_BITS: u32 = 17;

/// Order of the CIC resampling stage. The passband droop compensated for in
/// [`DspCore`][crate::DspCore] grows as `rate^CIC_ORDER`.
pub const CIC_ORDER: i32 = 3;

/// Asymptotic CIC/CORDIC gain constant used in droop compensation.
pub const CIC_GAIN_CONSTANT: f64 = 1.65;

/// Number of cascaded half-band stages available in the stock FPGA image.
/// Deeper cascades exist on some variants; see
/// [`DspCore::with_max_halfbands`][crate::DspCore::with_max_halfbands].
pub const DEFAULT_MAX_HALFBANDS: u32 = 2;

/// Full-scale value of a 16-bit sample, used when reporting the host-side
/// scaling adjustment.
pub const FULL_SCALE_I16: f64 = 32767.0;

/// Absolute tolerance, in Hz, for band cutover comparisons. A frequency this
/// close to a cutover classifies into the upper band.
pub const FREQ_COMPARE_EPSILON: f64 = 1e-3;

/// Lowest RX frequency the transceiver can tune, in Hz.
pub const RX_MIN_FREQ: f64 = 70e6;
/// Highest RX frequency the transceiver can tune, in Hz.
pub const RX_MAX_FREQ: f64 = 6e9;
/// Lowest TX frequency the transceiver can tune, in Hz.
pub const TX_MIN_FREQ: f64 = 47e6;
/// Highest TX frequency the transceiver can tune, in Hz.
pub const TX_MAX_FREQ: f64 = 6e9;
