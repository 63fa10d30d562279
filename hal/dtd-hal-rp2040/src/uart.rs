//! Radio UART
//!
//! The serial radio module hangs off a buffered, interrupt-driven UART.
//! [`RadioUart`] exposes it through the blocking `dtd-hal` traits so the
//! exchange engine can poll it without awaiting.

use dtd_hal::uart::{DataBits, Parity, StopBits};
use dtd_hal::{UartConfig, UartRx, UartTx};
use embassy_rp::uart::{self, BufferedUart, BufferedUartRx, BufferedUartTx};
use embedded_io::{Read, ReadReady, Write};

/// Convert a board-agnostic UART configuration to embassy-rp's
pub fn to_embassy_config(config: &UartConfig) -> uart::Config {
    let mut cfg = uart::Config::default();
    cfg.baudrate = config.baudrate;
    cfg.data_bits = match config.data_bits {
        DataBits::Seven => uart::DataBits::DataBits7,
        DataBits::Eight => uart::DataBits::DataBits8,
    };
    cfg.parity = match config.parity {
        Parity::None => uart::Parity::ParityNone,
        Parity::Even => uart::Parity::ParityEven,
        Parity::Odd => uart::Parity::ParityOdd,
    };
    cfg.stop_bits = match config.stop_bits {
        StopBits::One => uart::StopBits::STOP1,
        StopBits::Two => uart::StopBits::STOP2,
    };
    cfg
}

/// Buffered UART wired to the radio module
pub struct RadioUart {
    tx: BufferedUartTx,
    rx: BufferedUartRx,
}

impl RadioUart {
    pub fn new(uart: BufferedUart) -> Self {
        let (tx, rx) = uart.split();
        Self { tx, rx }
    }

    pub fn split(self) -> (BufferedUartTx, BufferedUartRx) {
        (self.tx, self.rx)
    }
}

impl UartTx for RadioUart {
    type Error = uart::Error;

    fn write_blocking(&mut self, data: &[u8]) -> Result<usize, Self::Error> {
        self.tx.write_all(data)?;
        Ok(data.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Write::flush(&mut self.tx)
    }
}

impl UartRx for RadioUart {
    type Error = uart::Error;

    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if buf.is_empty() || !self.rx.read_ready()? {
            return Ok(0);
        }
        self.rx.read(buf)
    }
}
