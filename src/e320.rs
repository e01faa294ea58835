//! E320 hardware variant.
//!
//! The E320 front end routes each channel through a three-stage RX switch
//! chain (`RX_SW1`/`RX_SW2` band selects plus the `RX_SW3` port selector), a
//! two-stage TX band select (`TX_SW1`/`TX_SW2`), a shared TX/RX port switch
//! (`TRX_SW`), and a two-position TX amplifier selector (`TX_AMP`). The two
//! channels share the register layout but use different `TRX_SW` codes - the
//! physical switch is wired mirror-imaged between the channels, so the swap
//! is baked into the per-channel code tables rather than applied at call
//! sites.

use std::ops::RangeInclusive;

use crate::bands::classify;
use crate::consts::{RX_MAX_FREQ, RX_MIN_FREQ, TX_MAX_FREQ, TX_MIN_FREQ};
use crate::frontend::{Frontend, LedCodes, RxAntenna};
use crate::{Direction, Error, RxBand, TxBand};

/// RX band cutover frequencies, in Hz. Strictly increasing; each entry is the
/// exclusive upper bound of its band.
const RX_CUTOVERS: &[(f64, RxBand)] = &[
    (450e6, RxBand::B2),
    (700e6, RxBand::B3),
    (1200e6, RxBand::B4),
    (1800e6, RxBand::B5),
    (2350e6, RxBand::B6),
    (2600e6, RxBand::B7),
];

/// TX band cutover frequencies, in Hz.
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

// Element bit offsets. RX_SW1/RX_SW2, TX_SW1/TX_SW2 and TRX_SW are 3-bit
// switch elements; RX_SW3 and TX_AMP are 2-bit.
const RX_SW1_SHIFT: u32 = 0;
const RX_SW2_SHIFT: u32 = 3;
const RX_SW3_SHIFT: u32 = 6;
const TX_SW1_SHIFT: u32 = 8;
const TX_SW2_SHIFT: u32 = 11;
const TRX_SW_SHIFT: u32 = 14;
const TX_AMP_SHIFT: u32 = 17;

// TX amplifier selector.
const TX_AMP_HF_ON: u32 = 2;
const TX_AMP_LF_ON: u32 = 1;
const TX_AMP_OFF: u32 = 3;

// Shared TX/RX port switch, per channel.
const TRX1_SW_TX_HB: u32 = 2;
const TRX1_SW_TX_LB: u32 = 1;
const TRX1_SW_RX: u32 = 4;
const TRX2_SW_TX_HB: u32 = 2;
const TRX2_SW_TX_LB: u32 = 4;
const TRX2_SW_RX: u32 = 1;

// RX first-stage band select.
const RX_SW1_LB_B2: u32 = 4;
const RX_SW1_LB_B3: u32 = 2;
const RX_SW1_LB_B4: u32 = 0;
const RX_SW1_LB_B5: u32 = 1;
const RX_SW1_LB_B6: u32 = 5;
const RX_SW1_LB_B7: u32 = 3;
const RX_SW1_OFF: u32 = 7;

// RX second-stage band select.
const RX_SW2_LB_B2: u32 = 5;
const RX_SW2_LB_B3: u32 = 1;
const RX_SW2_LB_B4: u32 = 0;
const RX_SW2_LB_B5: u32 = 2;
const RX_SW2_LB_B6: u32 = 6;
const RX_SW2_LB_B7: u32 = 3;
const RX_SW2_OFF: u32 = 7;

// RX port selector: routes high band and low band to the TRX or RX2 port.
const RX_SW3_HBRX_LBTRX: u32 = 1;
const RX_SW3_HBTRX_LBRX: u32 = 2;
const RX_SW3_OFF: u32 = 0;

// TX first-stage band select.
const TX_SW1_LB_80: u32 = 7;
const TX_SW1_LB_160: u32 = 6;
const TX_SW1_LB_225: u32 = 5;
const TX_SW1_LB_400: u32 = 4;
const TX_SW1_LB_575: u32 = 3;
const TX_SW1_LB_1000: u32 = 2;
const TX_SW1_LB_1700: u32 = 1;
const TX_SW1_LB_2750: u32 = 0;

// TX second-stage band select.
const TX_SW2_LB_80: u32 = 7;
const TX_SW2_LB_160: u32 = 6;
const TX_SW2_LB_225: u32 = 5;
const TX_SW2_LB_400: u32 = 4;
const TX_SW2_LB_575: u32 = 3;
const TX_SW2_LB_1000: u32 = 2;
const TX_SW2_LB_1700: u32 = 1;
const TX_SW2_LB_2750: u32 = 0;

// Front-panel LED lines.
const TRX_LED_GRN_SHIFT: u32 = 0;
const TX_LED_RED_SHIFT: u32 = 1;
const RX_LED_GRN_SHIFT: u32 = 2;

/// The E320 front end. Stateless; both channels share one instance.
#[derive(Clone, Copy, Debug, Default)]
pub struct E320;

impl E320 {
    fn check_chan(chan: usize) -> Result<(), Error> {
        if chan < 2 {
            Ok(())
        } else {
            Err(Error::InvalidParameter("channel index out of range"))
        }
    }
}

impl Frontend for E320 {
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
        Self::check_chan(chan)?;
        let mut tx_sw1 = TX_SW1_LB_160;
        let mut tx_sw2 = TX_SW2_LB_160;
        let mut trx_sw = if chan == 0 {
            TRX1_SW_TX_LB
        } else {
            TRX2_SW_TX_LB
        };
        let mut tx_amp = TX_AMP_LF_ON;

        match self.classify_tx(freq) {
            TxBand::Lb80 => {
                tx_sw1 = TX_SW1_LB_80;
                tx_sw2 = TX_SW2_LB_80;
            }
            TxBand::Lb160 => {
                tx_sw1 = TX_SW1_LB_160;
                tx_sw2 = TX_SW2_LB_160;
            }
            TxBand::Lb225 => {
                tx_sw1 = TX_SW1_LB_225;
                tx_sw2 = TX_SW2_LB_225;
            }
            TxBand::Lb400 => {
                tx_sw1 = TX_SW1_LB_400;
                tx_sw2 = TX_SW2_LB_400;
            }
            TxBand::Lb575 => {
                tx_sw1 = TX_SW1_LB_575;
                tx_sw2 = TX_SW2_LB_575;
            }
            TxBand::Lb1000 => {
                tx_sw1 = TX_SW1_LB_1000;
                tx_sw2 = TX_SW2_LB_1000;
            }
            TxBand::Lb1700 => {
                tx_sw1 = TX_SW1_LB_1700;
                tx_sw2 = TX_SW2_LB_1700;
            }
            TxBand::Lb2750 => {
                tx_sw1 = TX_SW1_LB_2750;
                tx_sw2 = TX_SW2_LB_2750;
            }
            TxBand::Hb => {
                // The high band bypasses the low-band filter chain; SW1/SW2
                // are don't-care and stay at their defaults.
                trx_sw = if chan == 0 {
                    TRX1_SW_TX_HB
                } else {
                    TRX2_SW_TX_HB
                };
                tx_amp = TX_AMP_HF_ON;
            }
            TxBand::Invalid => {
                return Err(Error::InvalidBand {
                    dir: Direction::Tx,
                    freq,
                    range: self.tx_freq_range(),
                });
            }
        }

        Ok(tx_amp << TX_AMP_SHIFT
            | trx_sw << TRX_SW_SHIFT
            | tx_sw2 << TX_SW2_SHIFT
            | tx_sw1 << TX_SW1_SHIFT)
    }

    fn rx_switches(&self, chan: usize, freq: f64, ant: RxAntenna) -> Result<u32, Error> {
        Self::check_chan(chan)?;
        let mut rx_sw1 = RX_SW1_OFF;
        let mut rx_sw2 = RX_SW2_OFF;
        let mut rx_sw3;
        let trx_sw;
        match ant {
            RxAntenna::TxRx => {
                rx_sw3 = RX_SW3_HBRX_LBTRX;
                trx_sw = if chan == 0 { TRX1_SW_RX } else { TRX2_SW_RX };
            }
            RxAntenna::Rx2 => {
                rx_sw3 = RX_SW3_HBTRX_LBRX;
                // Park the TRX switch on the TX side while receiving on RX2.
                trx_sw = TRX1_SW_TX_HB;
            }
        }

        match self.classify_rx(freq) {
            RxBand::B2 => {
                rx_sw1 = RX_SW1_LB_B2;
                rx_sw2 = RX_SW2_LB_B2;
            }
            RxBand::B3 => {
                rx_sw1 = RX_SW1_LB_B3;
                rx_sw2 = RX_SW2_LB_B3;
            }
            RxBand::B4 => {
                rx_sw1 = RX_SW1_LB_B4;
                rx_sw2 = RX_SW2_LB_B4;
            }
            RxBand::B5 => {
                rx_sw1 = RX_SW1_LB_B5;
                rx_sw2 = RX_SW2_LB_B5;
            }
            RxBand::B6 => {
                rx_sw1 = RX_SW1_LB_B6;
                rx_sw2 = RX_SW2_LB_B6;
            }
            RxBand::B7 => {
                rx_sw1 = RX_SW1_LB_B7;
                rx_sw2 = RX_SW2_LB_B7;
            }
            RxBand::Hb => {
                // High band skips the low-band chain (SW1/SW2 stay off) and
                // flips the port selector relative to the low-band wiring.
                rx_sw3 = match ant {
                    RxAntenna::TxRx => RX_SW3_HBTRX_LBRX,
                    RxAntenna::Rx2 => RX_SW3_HBRX_LBTRX,
                };
            }
            RxBand::Invalid => {
                return Err(Error::InvalidBand {
                    dir: Direction::Rx,
                    freq,
                    range: self.rx_freq_range(),
                });
            }
        }

        Ok(trx_sw << TRX_SW_SHIFT
            | rx_sw3 << RX_SW3_SHIFT
            | rx_sw2 << RX_SW2_SHIFT
            | rx_sw1 << RX_SW1_SHIFT)
    }

    fn idle_switches(&self) -> u32 {
        TX_AMP_OFF << TX_AMP_SHIFT
            | TRX1_SW_TX_HB << TRX_SW_SHIFT
            | TX_SW2_LB_80 << TX_SW2_SHIFT
            | TX_SW1_LB_80 << TX_SW1_SHIFT
            | RX_SW3_OFF << RX_SW3_SHIFT
            | RX_SW2_OFF << RX_SW2_SHIFT
            | RX_SW1_OFF << RX_SW1_SHIFT
    }

    fn led_codes(&self) -> LedCodes {
        // The signal names are reversed, but are consistent with the
        // schematic.
        LedCodes {
            rx: 1 << TRX_LED_GRN_SHIFT,
            tx: 1 << TX_LED_RED_SHIFT,
            txrx: 1 << RX_LED_GRN_SHIFT,
        }
    }
}
