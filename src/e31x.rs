//! E31x hardware variant.
//!
//! The E31x generation predates the E320's switch fabric: band selection is
//! done with three cascaded RX band-select elements (`RX_BANDSEL_A/B/C`) and
//! a single shared TX band select, while port routing runs through two
//! voltage-controlled switch pairs (`VCRX_SW` for the receive input,
//! `VCTXRX_SW` for the shared TX/RX port). The TX amplifiers have separate
//! enable and bias lines per band half.
//!
//! Unlike the E320, the channel mirroring here is twofold: the logical
//! channel indices are swapped relative to the physical paths (a routing
//! artifact fixed at construction), and physical channel 1's `VCTXRX_SW`
//! control lines are cross-wired, so its 2-bit code is bit-swapped.

use std::ops::RangeInclusive;

use crate::bands::classify;
use crate::consts::{RX_MAX_FREQ, RX_MIN_FREQ, TX_MAX_FREQ, TX_MIN_FREQ};
use crate::frontend::{Frontend, LedCodes, RxAntenna};
use crate::{Direction, Error, RxBand, TxBand};

const RX_CUTOVERS: &[(f64, RxBand)] = &[
    (450e6, RxBand::B2),
    (700e6, RxBand::B3),
    (1200e6, RxBand::B4),
    (1800e6, RxBand::B5),
    (2350e6, RxBand::B6),
    (2600e6, RxBand::B7),
];

const TX_CUTOVERS: &[(f64, TxBand)] = &[
    (117.7e6, TxBand::Lb80),
    (178.2e6, TxBand::Lb160),
    (284.3e6, TxBand::Lb225),
    (453.7e6, TxBand::Lb400),
    (723.8e6, TxBand::Lb575),
    (1154.9e6, TxBand::Lb1000),
    (1842.6e6, TxBand::Lb1700),
    (2940.0e6, TxBand::Lb2750),
];

// Element bit offsets.
const RX_BANDSEL_A_SHIFT: u32 = 0; // 3 bits
const RX_BANDSEL_B_SHIFT: u32 = 3; // 2 bits
const RX_BANDSEL_C_SHIFT: u32 = 5; // 2 bits
const TX_BANDSEL_SHIFT: u32 = 7; // 3 bits
const TX_BIAS_SHIFT: u32 = 10; // 2 bits
const TX_ENABLE_SHIFT: u32 = 12; // 2 bits
const VCRX_SW_SHIFT: u32 = 14; // 2 bits
const VCTXRX_SW_SHIFT: u32 = 16; // 2 bits

// VCRX_SW codes: bit 1 drives the V1 line, bit 0 drives V2.
const VCRX_RX_LB_TRX: u32 = 0b10;
const VCRX_RX_LB_RX2: u32 = 0b01;
const VCRX_RX_HB_TRX: u32 = 0b01;
const VCRX_RX_HB_RX2: u32 = 0b10;

// VCTXRX_SW codes for physical channel 0; channel 1's lines are cross-wired
// and get the bit-swapped code.
const VCTXRX_RX_TRX: u32 = 0b01;
const VCTXRX_RX_RX2: u32 = 0b10;
const VCTXRX_TX_LB: u32 = 0b10;
const VCTXRX_TX_HB: u32 = 0b11;

// TX amplifier enable/bias: bit 0 is the high-band amp, bit 1 the low-band
// amp.
const TX_AMP_HB: u32 = 0b01;
const TX_AMP_LB: u32 = 0b10;
const TX_AMP_OFF: u32 = 0b00;

/// RX band-select codes `(a, b, c)` per physical channel. The don't-care
/// elements repeat the value the schematic marks for the neighboring state.
const RX_BANDSELS: [[(u32, u32, u32); 7]; 2] = [
    // Physical channel 0: B2..B7, then HB (band selects are don't-care).
    [
        (5, 0, 1),
        (3, 0, 3),
        (1, 0, 2),
        (0, 1, 0),
        (2, 3, 0),
        (4, 2, 0),
        (5, 0, 1),
    ],
    // Physical channel 1.
    [
        (4, 0, 2),
        (2, 0, 3),
        (0, 0, 1),
        (1, 2, 0),
        (3, 3, 0),
        (5, 1, 0),
        (5, 0, 1),
    ],
];

/// TX band-select codes, shared by both channels, `Lb80..Lb2750` then the HB
/// don't-care value.
const TX_BANDSELS: [u32; 9] = [7, 6, 5, 4, 3, 2, 1, 0, 7];

// Front-panel LED lines.
const LED_TXRX_GRN_SHIFT: u32 = 0;
const LED_TX_RED_SHIFT: u32 = 1;
const LED_RX_GRN_SHIFT: u32 = 2;

/// Swap the two bits of a 2-bit switch code.
fn bitswap2(code: u32) -> u32 {
    (code & 0b01) << 1 | (code & 0b10) >> 1
}

/// The E31x front end.
#[derive(Clone, Copy, Debug)]
pub struct E31x {
    fe_swap: bool,
}

impl E31x {
    /// Create an E31x front end.
    ///
    /// `fe_swap` selects whether logical channel 0 is wired to the second
    /// physical path. Production boards are swapped; see [`E31x::default`].
    pub fn new(fe_swap: bool) -> Self {
        Self { fe_swap }
    }

    fn phys_chan(&self, chan: usize) -> Result<usize, Error> {
        if chan >= 2 {
            return Err(Error::InvalidParameter("channel index out of range"));
        }
        Ok(if self.fe_swap { 1 - chan } else { chan })
    }

    fn vctxrx(chan: usize, code: u32) -> u32 {
        if chan == 1 { bitswap2(code) } else { code }
    }
}

impl Default for E31x {
    /// The production wiring: logical and physical channels swapped.
    fn default() -> Self {
        Self::new(true)
    }
}

impl Frontend for E31x {
    fn classify_rx(&self, freq: f64) -> RxBand {
        classify(
            freq,
            RX_MIN_FREQ,
            RX_MAX_FREQ,
            RX_CUTOVERS,
            RxBand::Hb,
            RxBand::Invalid,
        )
    }

    fn classify_tx(&self, freq: f64) -> TxBand {
        classify(
            freq,
            TX_MIN_FREQ,
            TX_MAX_FREQ,
            TX_CUTOVERS,
            TxBand::Hb,
            TxBand::Invalid,
        )
    }

    fn rx_freq_range(&self) -> RangeInclusive<f64> {
        RX_MIN_FREQ..=RX_MAX_FREQ
    }

    fn tx_freq_range(&self) -> RangeInclusive<f64> {
        TX_MIN_FREQ..=TX_MAX_FREQ
    }

    fn tx_switches(&self, chan: usize, freq: f64) -> Result<u32, Error> {
        let chan = self.phys_chan(chan)?;
        let band = self.classify_tx(freq);
        let (bandsel, vctxrx, amp) = match band {
            TxBand::Lb80
            | TxBand::Lb160
            | TxBand::Lb225
            | TxBand::Lb400
            | TxBand::Lb575
            | TxBand::Lb1000
            | TxBand::Lb1700
            | TxBand::Lb2750 => {
                let idx = match band {
                    TxBand::Lb80 => 0,
                    TxBand::Lb160 => 1,
                    TxBand::Lb225 => 2,
                    TxBand::Lb400 => 3,
                    TxBand::Lb575 => 4,
                    TxBand::Lb1000 => 5,
                    TxBand::Lb1700 => 6,
                    _ => 7,
                };
                (TX_BANDSELS[idx], VCTXRX_TX_LB, TX_AMP_LB)
            }
            TxBand::Hb => (TX_BANDSELS[8], VCTXRX_TX_HB, TX_AMP_HB),
            TxBand::Invalid => {
                return Err(Error::InvalidBand {
                    dir: Direction::Tx,
                    freq,
                    range: self.tx_freq_range(),
                });
            }
        };

        Ok(bandsel << TX_BANDSEL_SHIFT
            | amp << TX_BIAS_SHIFT
            | amp << TX_ENABLE_SHIFT
            | Self::vctxrx(chan, vctxrx) << VCTXRX_SW_SHIFT)
    }

    fn rx_switches(&self, chan: usize, freq: f64, ant: RxAntenna) -> Result<u32, Error> {
        let chan = self.phys_chan(chan)?;
        let band = self.classify_rx(freq);
        let band_idx = match band {
            RxBand::B2 => 0,
            RxBand::B3 => 1,
            RxBand::B4 => 2,
            RxBand::B5 => 3,
            RxBand::B6 => 4,
            RxBand::B7 => 5,
            RxBand::Hb => 6,
            RxBand::Invalid => {
                return Err(Error::InvalidBand {
                    dir: Direction::Rx,
                    freq,
                    range: self.rx_freq_range(),
                });
            }
        };
        let (sel_a, sel_b, sel_c) = RX_BANDSELS[chan][band_idx];

        // The high band inverts the VCRX wiring relative to the low bands.
        let vcrx = match (band, ant) {
            (RxBand::Hb, RxAntenna::TxRx) => VCRX_RX_HB_TRX,
            (RxBand::Hb, RxAntenna::Rx2) => VCRX_RX_HB_RX2,
            (_, RxAntenna::TxRx) => VCRX_RX_LB_TRX,
            (_, RxAntenna::Rx2) => VCRX_RX_LB_RX2,
        };
        let vctxrx = match ant {
            RxAntenna::TxRx => VCTXRX_RX_TRX,
            RxAntenna::Rx2 => VCTXRX_RX_RX2,
        };

        Ok(sel_a << RX_BANDSEL_A_SHIFT
            | sel_b << RX_BANDSEL_B_SHIFT
            | sel_c << RX_BANDSEL_C_SHIFT
            | vcrx << VCRX_SW_SHIFT
            | Self::vctxrx(chan, vctxrx) << VCTXRX_SW_SHIFT)
    }

    fn idle_switches(&self) -> u32 {
        // Amps and bias off, VC switches released, band selects parked at
        // the lowest band's codes.
        let (sel_a, sel_b, sel_c) = RX_BANDSELS[0][0];
        sel_a << RX_BANDSEL_A_SHIFT
            | sel_b << RX_BANDSEL_B_SHIFT
            | sel_c << RX_BANDSEL_C_SHIFT
            | TX_BANDSELS[0] << TX_BANDSEL_SHIFT
            | TX_AMP_OFF << TX_BIAS_SHIFT
            | TX_AMP_OFF << TX_ENABLE_SHIFT
    }

    fn led_codes(&self) -> LedCodes {
        LedCodes {
            rx: 1 << LED_RX_GRN_SHIFT,
            tx: 1 << LED_TX_RED_SHIFT,
            txrx: 1 << LED_TXRX_GRN_SHIFT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::AtrRegisters;

    #[test]
    fn classification_matches_band_tables() {
        let fe = E31x::default();
        assert_eq!(fe.classify_rx(69e6), RxBand::Invalid);
        assert_eq!(fe.classify_rx(100e6), RxBand::B2);
        assert_eq!(fe.classify_rx(1e9), RxBand::B4);
        assert_eq!(fe.classify_rx(3e9), RxBand::Hb);
        assert_eq!(fe.classify_tx(100e6), TxBand::Lb80);
        assert_eq!(fe.classify_tx(1.5e9), TxBand::Lb1700);
        assert_eq!(fe.classify_tx(3e9), TxBand::Hb);
    }

    #[test]
    fn fe_swap_selects_the_other_physical_path() {
        let straight = E31x::new(false);
        let swapped = E31x::new(true);
        let a = straight.rx_switches(0, 915e6, RxAntenna::Rx2).unwrap();
        let b = swapped.rx_switches(1, 915e6, RxAntenna::Rx2).unwrap();
        assert_eq!(a, b);
        let a = straight.rx_switches(1, 915e6, RxAntenna::Rx2).unwrap();
        let b = swapped.rx_switches(0, 915e6, RxAntenna::Rx2).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn channel_one_vctxrx_lines_are_cross_wired() {
        let fe = E31x::new(false);
        let ch0 = fe.tx_switches(0, 915e6).unwrap();
        let ch1 = fe.tx_switches(1, 915e6).unwrap();
        let code0 = ch0 >> VCTXRX_SW_SHIFT & 0b11;
        let code1 = ch1 >> VCTXRX_SW_SHIFT & 0b11;
        assert_eq!(code1, bitswap2(code0));
        // Everything below the VCTXRX element is channel-independent on TX.
        assert_eq!(ch0 & ((1 << VCTXRX_SW_SHIFT) - 1), ch1 & ((1 << VCTXRX_SW_SHIFT) - 1));
    }

    #[test]
    fn register_layout_is_frozen() {
        // These two offsets are load-bearing for deployed FPGA images.
        assert_eq!(VCRX_SW_SHIFT, 14);
        assert_eq!(TX_BIAS_SHIFT, 10);
    }

    #[test]
    fn rx_band_selects_follow_the_per_channel_tables() {
        let fe = E31x::new(false);
        // Physical channel 0, B3 (450..700 MHz): a=3, b=0, c=3.
        let regs = fe.rx_switches(0, 600e6, RxAntenna::Rx2).unwrap();
        assert_eq!(regs & 0x7, 3);
        assert_eq!(regs >> RX_BANDSEL_B_SHIFT & 0x3, 0);
        assert_eq!(regs >> RX_BANDSEL_C_SHIFT & 0x3, 3);
        // Physical channel 1, B3: a=2, b=0, c=3.
        let regs = fe.rx_switches(1, 600e6, RxAntenna::Rx2).unwrap();
        assert_eq!(regs & 0x7, 2);
    }

    #[test]
    fn amps_track_the_band_half() {
        let fe = E31x::default();
        let lb = fe.tx_switches(0, 915e6).unwrap();
        assert_eq!(lb >> TX_ENABLE_SHIFT & 0x3, TX_AMP_LB);
        assert_eq!(lb >> TX_BIAS_SHIFT & 0x3, TX_AMP_LB);
        let hb = fe.tx_switches(0, 5.8e9).unwrap();
        assert_eq!(hb >> TX_ENABLE_SHIFT & 0x3, TX_AMP_HB);
        assert_eq!(hb >> TX_BIAS_SHIFT & 0x3, TX_AMP_HB);
        assert_eq!(fe.idle_switches() >> TX_ENABLE_SHIFT & 0x3, TX_AMP_OFF);
    }

    #[test]
    fn full_duplex_is_or_of_rx_and_tx() {
        let fe = E31x::default();
        let freqs = [80e6, 200e6, 500e6, 1e9, 2e9, 2.5e9, 4e9];
        for chan in 0..2 {
            for ant in [RxAntenna::TxRx, RxAntenna::Rx2] {
                for rx_freq in freqs {
                    for tx_freq in freqs {
                        let regs =
                            AtrRegisters::synthesize(&fe, chan, rx_freq, tx_freq, ant).unwrap();
                        assert_eq!(regs.full_duplex, regs.rx_only | regs.tx_only);
                    }
                }
            }
        }
    }

    #[test]
    fn high_band_inverts_vcrx() {
        let fe = E31x::new(false);
        let lb = fe.rx_switches(0, 915e6, RxAntenna::TxRx).unwrap();
        let hb = fe.rx_switches(0, 5.8e9, RxAntenna::TxRx).unwrap();
        assert_eq!(lb >> VCRX_SW_SHIFT & 0b11, VCRX_RX_LB_TRX);
        assert_eq!(hb >> VCRX_SW_SHIFT & 0b11, VCRX_RX_HB_TRX);
        assert_ne!(
            lb >> VCRX_SW_SHIFT & 0b11,
            hb >> VCRX_SW_SHIFT & 0b11
        );
    }
}
