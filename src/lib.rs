//! **zfm20** is an embedded-hal driver for the ZFM-20 family of optical
//! fingerprint modules (ZhianTec ZFM-20 and similar sensors found on various
//! breakout boards).
//!
//! The module speaks a framed command/ack protocol over a byte-oriented
//! serial link: every exchange sends one command frame and waits up to a
//! second for one ack frame, validated against the session's device address
//! and an additive checksum. This crate covers template enrollment, search,
//! matching and database management; bulk image/template transfers are not
//! implemented.
//!
//! ## Example
//!
//! To authenticate with the module:
//! ```
//! # use embedded_hal::serial::{Read, Write};
//! use zfm20::{Zfm20, Command, MonotonicClock};
//! # struct TestTx;
//! # struct TestRx(usize);
//! # struct TestClock(u32);
//! #
//! # impl Write<u8> for TestTx {
//! #     type Error = ();
//! #     fn write(&mut self, _word: u8) -> nb::Result<(), Self::Error> {
//! #         return Ok(());
//! #     }
//! #     fn flush(&mut self) -> nb::Result<(), Self::Error> {
//! #         return Ok(());
//! #     }
//! # }
//! #
//! # const RES_DATA: &[u8] = &[ 0xef, 0x01, 0xff, 0xff, 0xff, 0xff, 0x07, 0x00, 0x03, 0x00, 0x00, 0x0a ];
//! #
//! # impl Read<u8> for TestRx {
//! #     type Error = ();
//! #     fn read(&mut self) -> nb::Result<u8, Self::Error> {
//! #         let word = RES_DATA[self.0];
//! #         self.0 += 1;
//! #         return Ok(word);
//! #     }
//! # }
//! #
//! # impl MonotonicClock for TestClock {
//! #     fn millis(&mut self) -> u32 {
//! #         self.0 += 1;
//! #         return self.0;
//! #     }
//! # }
//! # let rx = TestRx(0);
//! # let tx = TestTx;
//!
//! // Obtain tx, rx from some serial port implementation, plus a millisecond
//! // clock for the reply deadline
//! let mut sensor = Zfm20::new(tx, rx, TestClock(0), 0xffffffff, 0x00000000);
//! match sensor.send_command(Command::VerifyPassword) {
//!     Ok(reply) => println!("Status: {}", reply.status()),
//!     Err(error) => panic!("Error: {:#?}", error),
//! }
//! ```
#![warn(missing_debug_implementations, rust_2018_idioms)]
#![no_std]

mod commands;
mod driver;
pub mod frame;
mod responses;
mod utils;

pub use crate::commands::Command;
pub use crate::driver::{Zfm20, DEFAULT_ADDRESS, DEFAULT_PASSWORD};
pub use crate::frame::PacketType;
pub use crate::responses::{
    MatchScore, Reply, SearchHit, Status, SysParaResult, SystemParameters, TemplateCount,
    TemplateTable,
};
pub use crate::utils::{CommandWriter, Error, FromPayload, MonotonicClock};
