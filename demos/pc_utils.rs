use std::cell::RefCell;
use std::time::Instant;

use embedded_hal::serial::{Read, Write};
use serialport::prelude::*;
use zfm20::MonotonicClock;

// We're cheating here and will use the host OS's serial port as our UART,
// and for that we have to implement the read/write interfaces from
// embedded-hal plus the driver's millisecond clock.

pub struct SerialReader<'a>(pub &'a RefCell<Box<dyn SerialPort>>);
pub struct SerialWriter<'a>(pub &'a RefCell<Box<dyn SerialPort>>);
pub struct WallClock(pub Instant);

impl Read<u8> for SerialReader<'_> {
    type Error = std::io::Error;

    fn read(&mut self) -> nb::Result<u8, Self::Error> {
        let mut buf: [u8; 1] = [0u8];
        match self.0.borrow_mut().read(&mut buf) {
            Ok(1) => Ok(buf[0]),
            Ok(_) => Err(nb::Error::WouldBlock),
            // The port timeout plays the role of "no bytes available"; the
            // driver's own deadline decides when to give up.
            Err(ref e) if e.kind() == std::io::ErrorKind::TimedOut => Err(nb::Error::WouldBlock),
            Err(e) => Err(nb::Error::from(e)),
        }
    }
}

impl Write<u8> for SerialWriter<'_> {
    type Error = std::io::Error;

    fn write(&mut self, word: u8) -> nb::Result<(), Self::Error> {
        let buf: [u8; 1] = [word];
        loop {
            match self.0.borrow_mut().write(&buf) {
                Ok(n) => {
                    if n == 1 {
                        return Ok(());
                    }
                }
                Err(e) => {
                    return Err(nb::Error::from(e));
                }
            }
        }
    }

    fn flush(&mut self) -> nb::Result<(), Self::Error> {
        match self.0.borrow_mut().flush() {
            Ok(_) => Ok(()),
            Err(e) => Err(nb::Error::from(e)),
        }
    }
}

impl MonotonicClock for WallClock {
    fn millis(&mut self) -> u32 {
        self.0.elapsed().as_millis() as u32
    }
}
