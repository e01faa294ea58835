//! RF front-end control for E3xx-class software-defined radios.
//!
//! This crate computes and programs the register state that keeps an E3xx
//! transceiver's analog front end consistent with its tuning: which filter
//! bank each direction routes through, how the antenna switch network is
//! set for every transmit/receive state, and how the digital tuning and
//! rate-change chain is configured.
//!
//! The crate never talks to hardware itself. Callers supply a [`Transport`]
//! (anything that can land a 32-bit register write) and a hardware variant
//! ([`E320`] or [`E31x`], both implementing [`Frontend`]); everything above
//! that seam is pure computation and is tested without a device.
//!
//! The switch network is programmed through ATR (automatic transmit/receive)
//! registers: four per channel, one per traffic state, selected by the FPGA
//! in real time. Software only rewrites them on configuration changes; see
//! [`AtrRegisters`].
//!
//! ```
//! use std::collections::BTreeMap;
//!
//! use e3xx_frontend::{DspCore, E320, RadioChannel, RxAntenna, Transport};
//!
//! struct Bus(BTreeMap<u32, u32>);
//!
//! impl Transport for Bus {
//!     fn poke32(&mut self, addr: u32, value: u32) -> Result<(), e3xx_frontend::Error> {
//!         self.0.insert(addr, value);
//!         Ok(())
//!     }
//! }
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut bus = Bus(BTreeMap::new());
//!
//! {
//!     let mut chan = RadioChannel::new(E320, &mut bus, 0, 0x00, 0x40);
//!     chan.set_rx_antenna(RxAntenna::Rx2)?;
//!     let rx = chan.set_rx_frequency(915e6)?;
//!     assert_eq!(rx, 915e6);
//! }
//!
//! let mut dsp = DspCore::new(&mut bus, 0x80);
//! dsp.set_tick_rate(200e6);
//! dsp.set_host_rate(200e6 / 4.0)?;
//! dsp.set_freq(1.25e6)?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod bands;
pub mod consts;
mod dsp;
mod e31x;
mod e320;
mod error;
mod frontend;
mod transport;

pub use bands::{Direction, RxBand, TxBand};
pub use dsp::{DspCore, WireFormat};
pub use e31x::E31x;
pub use e320::E320;
pub use error::Error;
pub use frontend::{AtrRegisters, Frontend, LedCodes, RxAntenna};
pub use transport::Transport;

/// One radio channel's front-end state and its register programming.
///
/// Owns the channel's tuning configuration (RX/TX frequency, RX antenna) and
/// keeps the hardware's ATR switch and LED registers in sync with it: every
/// setter recomputes all four traffic states and rewrites both register
/// blocks. Construction performs no I/O; call [`RadioChannel::apply`] to
/// program the initial state.
#[derive(Debug)]
pub struct RadioChannel<F: Frontend, T: Transport> {
    frontend: F,
    transport: T,
    chan: usize,
    atr_base: u32,
    led_base: u32,
    rx_freq: f64,
    tx_freq: f64,
    rx_antenna: RxAntenna,
}

impl<F: Frontend, T: Transport> RadioChannel<F, T> {
    /// Create a channel controller for logical channel `chan`.
    ///
    /// `atr_base` and `led_base` are the channel's switch and LED ATR
    /// register block addresses. The initial configuration is the bottom of
    /// each tunable range on the `RX2` antenna; nothing is written until a
    /// setter or [`RadioChannel::apply`] runs.
    pub fn new(frontend: F, transport: T, chan: usize, atr_base: u32, led_base: u32) -> Self {
        let rx_freq = *frontend.rx_freq_range().start();
        let tx_freq = *frontend.tx_freq_range().start();
        Self {
            frontend,
            transport,
            chan,
            atr_base,
            led_base,
            rx_freq,
            tx_freq,
            rx_antenna: RxAntenna::Rx2,
        }
    }

    /// Tune the RX front end, coercing `freq` into the tunable range.
    /// Returns the coerced frequency.
    pub fn set_rx_frequency(&mut self, freq: f64) -> Result<f64, Error> {
        let range = self.frontend.rx_freq_range();
        let coerced = freq.clamp(*range.start(), *range.end());
        self.rx_freq = coerced;
        self.apply()?;
        tracing::debug!(chan = self.chan, freq = coerced, "RX front end tuned");
        Ok(coerced)
    }

    /// Tune the TX front end, coercing `freq` into the tunable range.
    /// Returns the coerced frequency.
    pub fn set_tx_frequency(&mut self, freq: f64) -> Result<f64, Error> {
        let range = self.frontend.tx_freq_range();
        let coerced = freq.clamp(*range.start(), *range.end());
        self.tx_freq = coerced;
        self.apply()?;
        tracing::debug!(chan = self.chan, freq = coerced, "TX front end tuned");
        Ok(coerced)
    }

    /// Select the RX antenna port.
    pub fn set_rx_antenna(&mut self, ant: RxAntenna) -> Result<(), Error> {
        self.rx_antenna = ant;
        self.apply()?;
        tracing::debug!(chan = self.chan, antenna = %ant, "RX antenna selected");
        Ok(())
    }

    /// Recompute all four ATR states from the current configuration and
    /// rewrite the switch and LED register blocks.
    pub fn apply(&mut self) -> Result<(), Error> {
        let switches = AtrRegisters::synthesize(
            &self.frontend,
            self.chan,
            self.rx_freq,
            self.tx_freq,
            self.rx_antenna,
        )?;
        switches.write(&mut self.transport, self.atr_base)?;
        let leds = AtrRegisters::leds(self.frontend.led_codes(), self.rx_antenna);
        leds.write(&mut self.transport, self.led_base)?;
        Ok(())
    }

    /// The current RX frequency, in Hz.
    pub fn rx_frequency(&self) -> f64 {
        self.rx_freq
    }

    /// The current TX frequency, in Hz.
    pub fn tx_frequency(&self) -> f64 {
        self.tx_freq
    }

    /// The current RX antenna selection.
    pub fn rx_antenna(&self) -> RxAntenna {
        self.rx_antenna
    }
}
