use std::ops::RangeInclusive;

use crate::bands::Direction;

/// An error from operating the front end.
///
/// The important distinction for operators is between [`Error::InvalidBand`]
/// ("this frequency is outside what the analog hardware can represent" - a
/// configuration fault that retrying will never fix) and the transport
/// variants ("the device did not respond" - possibly transient). The band
/// fault is always detected before any register write happens, so a failed
/// setter never leaves a channel with partially updated switch state from
/// this cause.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Underlying OS I/O error from a memory-mapped register access.
    #[error("I/O error")]
    Io(#[from] std::io::Error),

    /// Failure reported by the register-write transport. Passed through
    /// uninterpreted.
    #[error("register transport error")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A frequency failed to classify into any analog filter band.
    ///
    /// Frequency validation belongs upstream of switch synthesis, so hitting
    /// this from a setter indicates the caller bypassed range clipping.
    #[error(
        "no {dir} band covers {freq} Hz (tunable range {}..={} Hz)",
        .range.start(),
        .range.end()
    )]
    #[allow(missing_docs)]
    InvalidBand {
        dir: Direction,
        freq: f64,
        range: RangeInclusive<f64>,
    },

    /// The requested RX antenna is not one of the fixed options.
    #[error("unknown RX antenna option: {0}")]
    UnknownAntenna(String),

    /// Some argument to a function is invalid in a way not easily expressed
    /// as a range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(&'static str),
}
