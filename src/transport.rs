use crate::Error;

/// A synchronous register-write transport.
///
/// This is the seam between the pure front-end computation and the actual
/// hardware: a memory-mapped bus window, a network register-access protocol,
/// or anything else that can land a 32-bit value at an address. Every call is
/// a complete round trip; the crate never batches or reorders writes, and a
/// returned error is propagated to the caller uninterpreted.
///
/// Implementations for shared buses should hand out one handle per channel
/// (for example a cloneable session object); the crate takes the handle by
/// value at construction and never reaches for globals.
pub trait Transport {
    /// Write `value` to the register at `addr`.
    fn poke32(&mut self, addr: u32, value: u32) -> Result<(), Error>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn poke32(&mut self, addr: u32, value: u32) -> Result<(), Error> {
        (**self).poke32(addr, value)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn poke32(&mut self, addr: u32, value: u32) -> Result<(), Error> {
        (**self).poke32(addr, value)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::Transport;
    use crate::Error;

    /// Records every poke in order, for asserting on register traffic.
    #[derive(Default)]
    pub(crate) struct RecordingTransport {
        pub writes: Vec<(u32, u32)>,
    }

    impl RecordingTransport {
        pub fn new() -> Self {
            Self::default()
        }

        /// The most recent value written to `addr`, if any.
        pub fn last(&self, addr: u32) -> Option<u32> {
            self.writes
                .iter()
                .rev()
                .find(|(a, _)| *a == addr)
                .map(|(_, v)| *v)
        }
    }

    impl Transport for RecordingTransport {
        fn poke32(&mut self, addr: u32, value: u32) -> Result<(), Error> {
            self.writes.push((addr, value));
            Ok(())
        }
    }
}
