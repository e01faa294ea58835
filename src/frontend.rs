//! The hardware-variant seam and ATR register assembly.
//!
//! Each supported board variant implements [`Frontend`]: band classification
//! plus the bit-exact synthesis of the switch/filter network register for
//! every traffic state. The variant is chosen once, at channel construction;
//! call sites never branch on the board type themselves.

use std::ops::RangeInclusive;
use std::str::FromStr;

use crate::consts::{
    ATR_FULL_DUPLEX_OFFSET, ATR_IDLE_OFFSET, ATR_RX_ONLY_OFFSET, ATR_TX_ONLY_OFFSET,
};
use crate::{Error, RxBand, Transport, TxBand};

/// RX antenna selection.
///
/// `TxRx` receives on the shared TX/RX port; `Rx2` receives on the dedicated
/// RX port. TX always transmits on the TX/RX port.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RxAntenna {
    /// The shared transmit/receive port, `"TX/RX"`.
    TxRx,
    /// The receive-only port, `"RX2"`.
    Rx2,
}

impl std::fmt::Display for RxAntenna {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TxRx => f.write_str("TX/RX"),
            Self::Rx2 => f.write_str("RX2"),
        }
    }
}

impl FromStr for RxAntenna {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TX/RX" => Ok(Self::TxRx),
            "RX2" => Ok(Self::Rx2),
            other => Err(Error::UnknownAntenna(other.to_string())),
        }
    }
}

/// Per-variant front-panel LED codes, one bit pattern per indicator.
#[derive(Clone, Copy, Debug)]
pub struct LedCodes {
    /// Green RX indicator on the RX2 port.
    pub rx: u32,
    /// Red TX indicator on the TX/RX port.
    pub tx: u32,
    /// Green RX indicator on the TX/RX port.
    pub txrx: u32,
}

/// A hardware variant's front-end capability: band classification and switch
/// register synthesis.
///
/// All methods are pure. The logical-to-physical channel mapping (some boards
/// wire logical channel 0 to the second physical path) is fixed per variant
/// at construction and applied internally before any table lookup.
pub trait Frontend {
    /// Classify an RX frequency (Hz) into an analog filter band.
    fn classify_rx(&self, freq: f64) -> RxBand;

    /// Classify a TX frequency (Hz) into an analog filter band.
    fn classify_tx(&self, freq: f64) -> TxBand;

    /// The RX tunable range, in Hz.
    fn rx_freq_range(&self) -> RangeInclusive<f64>;

    /// The TX tunable range, in Hz.
    fn tx_freq_range(&self) -> RangeInclusive<f64>;

    /// Synthesize the TX-state switch register for `chan` at `freq`.
    ///
    /// Fails with [`Error::InvalidBand`] if `freq` classifies to no band -
    /// range validation belongs upstream, so this is a loud fault, not a
    /// clamp.
    fn tx_switches(&self, chan: usize, freq: f64) -> Result<u32, Error>;

    /// Synthesize the RX-state switch register for `chan` at `freq` with the
    /// given antenna selection.
    ///
    /// Same failure contract as [`Frontend::tx_switches`].
    fn rx_switches(&self, chan: usize, freq: f64, ant: RxAntenna) -> Result<u32, Error>;

    /// The frequency-independent idle encoding: all paths deselected,
    /// amplifiers off, switches parked at the lowest band's safe state.
    fn idle_switches(&self) -> u32;

    /// Front-panel LED bit patterns for this variant.
    fn led_codes(&self) -> LedCodes;
}

/// The four ATR-state registers for one channel.
///
/// The hardware selects among these automatically based on the current
/// traffic state; the host only rewrites them when frequency or antenna
/// configuration changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AtrRegisters {
    /// Neither receiving nor transmitting.
    pub idle: u32,
    /// Receiving only.
    pub rx_only: u32,
    /// Transmitting only.
    pub tx_only: u32,
    /// Receiving and transmitting. Always `rx_only | tx_only`.
    pub full_duplex: u32,
}

impl AtrRegisters {
    /// Compute all four states from the current channel configuration.
    pub fn synthesize<F: Frontend + ?Sized>(
        frontend: &F,
        chan: usize,
        rx_freq: f64,
        tx_freq: f64,
        ant: RxAntenna,
    ) -> Result<Self, Error> {
        let rx_only = frontend.rx_switches(chan, rx_freq, ant)?;
        let tx_only = frontend.tx_switches(chan, tx_freq)?;
        Ok(Self {
            idle: frontend.idle_switches(),
            rx_only,
            tx_only,
            full_duplex: rx_only | tx_only,
        })
    }

    /// LED ATR states for the given antenna selection.
    ///
    /// The active-RX indicator follows the port the receiver is actually
    /// listening on.
    pub fn leds(codes: LedCodes, ant: RxAntenna) -> Self {
        let rx_only = if ant == RxAntenna::TxRx {
            codes.txrx
        } else {
            codes.rx
        };
        Self {
            idle: 0,
            rx_only,
            tx_only: codes.tx,
            full_duplex: codes.rx | codes.tx,
        }
    }

    /// Write the four states to their registers at `base`.
    pub fn write<T: Transport>(&self, transport: &mut T, base: u32) -> Result<(), Error> {
        transport.poke32(base + ATR_IDLE_OFFSET, self.idle)?;
        transport.poke32(base + ATR_RX_ONLY_OFFSET, self.rx_only)?;
        transport.poke32(base + ATR_TX_ONLY_OFFSET, self.tx_only)?;
        transport.poke32(base + ATR_FULL_DUPLEX_OFFSET, self.full_duplex)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn antenna_round_trip() {
        assert_eq!("TX/RX".parse::<RxAntenna>().unwrap(), RxAntenna::TxRx);
        assert_eq!("RX2".parse::<RxAntenna>().unwrap(), RxAntenna::Rx2);
        assert_eq!(RxAntenna::TxRx.to_string(), "TX/RX");
        assert!(matches!(
            "RX3".parse::<RxAntenna>(),
            Err(Error::UnknownAntenna(_))
        ));
    }

    #[test]
    fn led_states() {
        let codes = LedCodes {
            rx: 1 << 2,
            tx: 1 << 1,
            txrx: 1 << 0,
        };
        let on_rx2 = AtrRegisters::leds(codes, RxAntenna::Rx2);
        assert_eq!(on_rx2.idle, 0);
        assert_eq!(on_rx2.rx_only, 1 << 2);
        assert_eq!(on_rx2.full_duplex, (1 << 2) | (1 << 1));
        let on_trx = AtrRegisters::leds(codes, RxAntenna::TxRx);
        assert_eq!(on_trx.rx_only, 1 << 0);
    }
}
