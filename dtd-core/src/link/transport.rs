//! Byte transport underneath the exchange engine
//!
//! The engine only moves bytes; which codec they carry is decided by the
//! caller that builds the engine.

use dtd_hal::{UartRx, UartTx};

/// Half-duplex byte pipe to the radio
pub trait Transport {
    type Error: core::fmt::Debug;

    /// Write `data`, returning how many bytes were accepted
    fn send(&mut self, data: &[u8]) -> Result<usize, Self::Error>;

    /// Copy whatever has arrived into `buf` without waiting
    ///
    /// `Ok(0)` means nothing is pending.
    fn receive(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;
}

/// [`Transport`] over a serial radio module
pub struct SerialTransport<U> {
    uart: U,
}

impl<U> SerialTransport<U> {
    pub fn new(uart: U) -> Self {
        Self { uart }
    }

    pub fn into_inner(self) -> U {
        self.uart
    }
}

impl<U, E> Transport for SerialTransport<U>
where
    U: UartTx<Error = E> + UartRx<Error = E>,
    E: core::fmt::Debug,
{
    type Error = E;

    fn send(&mut self, data: &[u8]) -> Result<usize, E> {
        let written = self.uart.write_blocking(data)?;
        self.uart.flush()?;
        Ok(written)
    }

    fn receive(&mut self, buf: &mut [u8]) -> Result<usize, E> {
        self.uart.read_available(buf)
    }
}

/// Transport used when no radio is fitted
///
/// Never constructed; lets `RadioLink` be named without a physical type.
pub enum NoTransport {}

impl Transport for NoTransport {
    type Error = core::convert::Infallible;

    fn send(&mut self, _data: &[u8]) -> Result<usize, Self::Error> {
        match *self {}
    }

    fn receive(&mut self, _buf: &mut [u8]) -> Result<usize, Self::Error> {
        match *self {}
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::vec::Vec;

    #[derive(Default)]
    struct LoopbackUart {
        written: Vec<u8>,
        flushed: bool,
        pending: Vec<u8>,
    }

    impl UartTx for LoopbackUart {
        type Error = ();

        fn write_blocking(&mut self, data: &[u8]) -> Result<usize, ()> {
            self.written.extend_from_slice(data);
            self.pending.extend_from_slice(data);
            Ok(data.len())
        }

        fn flush(&mut self) -> Result<(), ()> {
            self.flushed = true;
            Ok(())
        }
    }

    impl UartRx for LoopbackUart {
        type Error = ();

        fn read_available(&mut self, buf: &mut [u8]) -> Result<usize, ()> {
            let n = self.pending.len().min(buf.len());
            buf[..n].copy_from_slice(&self.pending[..n]);
            self.pending.drain(..n);
            Ok(n)
        }
    }

    #[test]
    fn test_serial_transport_flushes_and_reads() {
        let mut transport = SerialTransport::new(LoopbackUart::default());
        assert_eq!(transport.send(b"POLL:01\n"), Ok(8));

        let mut buf = [0u8; 4];
        assert_eq!(transport.receive(&mut buf), Ok(4));
        assert_eq!(&buf, b"POLL");
        assert_eq!(transport.receive(&mut buf), Ok(4));
        assert_eq!(transport.receive(&mut buf), Ok(0));

        let uart = transport.into_inner();
        assert!(uart.flushed);
        assert_eq!(uart.written, b"POLL:01\n");
    }
}
