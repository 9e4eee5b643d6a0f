use arrayvec::ArrayVec;
use embedded_hal::serial::{Read, Write};
use log::{debug, trace};
use nb::block;

use crate::commands::Command;
use crate::frame::{self, PacketType};
use crate::responses::Reply;
use crate::utils::{Error, MonotonicClock};

/// How long to wait for a reply before giving up.
const REPLY_DEADLINE_MS: u32 = 1000;

/// Factory default device address.
pub const DEFAULT_ADDRESS: u32 = 0xFFFF_FFFF;

/// Factory default device password.
pub const DEFAULT_PASSWORD: u32 = 0x0000_0000;

/// Represents a ZFM-20 module connected to a U(S)ART.
///
/// The session owns the transmit and receive buffers, the device address the
/// module is expected to answer under, and the handshake password. Exactly
/// one command may be in flight at a time; [`send_command`](Zfm20::send_command)
/// takes `&mut self`, which is the exclusive-access guard for the shared
/// buffers - wrap the session in a mutex if multiple owners need it.
#[derive(Debug)]
pub struct Zfm20<TX, RX, CLK> {
    tx: TX,
    rx: RX,
    clock: CLK,
    address: u32,
    password: u32,
    verbose: bool,
    received: ArrayVec<[u8; 64]>,
    cmd_buffer: ArrayVec<[u8; 32]>,
}

impl<TX, RX, CLK> Zfm20<TX, RX, CLK>
where
    TX: Write<u8>,
    RX: Read<u8>,
    CLK: MonotonicClock,
{
    pub fn new(tx: TX, rx: RX, clock: CLK, address: u32, password: u32) -> Self {
        Self {
            tx,
            rx,
            clock,
            address,
            password,
            verbose: false,
            received: ArrayVec::new(),
            cmd_buffer: ArrayVec::new(),
        }
    }

    /// The device address replies are validated against.
    pub fn address(&self) -> u32 {
        self.address
    }

    /// The password [`Command::VerifyPassword`] will present.
    pub fn password(&self) -> u32 {
        self.password
    }

    /// Enables trace output of raw bytes sent and received, routed through
    /// the `log` facade. Purely observational.
    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    /// Sends a command to the module and blocks waiting for the ack.
    ///
    /// Returns the decoded reply, or an [`Error`] when the module never
    /// answered or answered malformed. A device-reported failure is not an
    /// `Err`: it comes back as the [`Status`](crate::Status) inside the
    /// reply, so callers can tell the two apart.
    pub fn send_command(&mut self, cmd: Command) -> Result<Reply, Error> {
        let mut payload = ArrayVec::<[u8; 8]>::new();
        cmd.write_payload(self.password, &mut payload);

        self.cmd_buffer.clear();
        frame::encode(&mut self.cmd_buffer, self.address, PacketType::Command, &payload);

        if self.verbose {
            debug!("command: {:?}", cmd);
            trace!("tx: {:02x?}", &self.cmd_buffer[..]);
        }
        self.send();

        let prior_address = self.address;
        match cmd {
            // The module acks SetAddress under the new address, so switch
            // before validating the reply; rolled back below on failure.
            Command::SetAddress { address } => self.address = address,
            // The stored password tracks the last one sent, success or not.
            // No rollback here, unlike SetAddress.
            Command::SetPassword { password } => self.password = password,
            _ => {}
        }

        let expected_len = frame::OVERHEAD + cmd.reply_len();
        if let Err(e) = self.receive(expected_len) {
            if let Command::SetAddress { .. } = cmd {
                self.address = prior_address;
            }
            return Err(e);
        }
        if self.verbose {
            trace!("rx: {:02x?}", &self.received[..]);
        }

        match frame::decode(&self.received, self.address, PacketType::Ack, cmd.reply_len()) {
            Ok(payload) => {
                let reply = Reply::decode(&cmd, payload);
                if self.verbose {
                    debug!("status: {}", reply.status());
                }
                Ok(reply)
            }
            Err(e) => {
                if let Command::SetAddress { .. } = cmd {
                    self.address = prior_address;
                }
                Err(e)
            }
        }
    }

    fn send(&mut self) {
        for byte in &self.cmd_buffer {
            block!(self.tx.write(*byte)).ok();
        }
    }

    /// Accumulates reply bytes until `expected_len` bytes arrived or the
    /// deadline elapsed. A short accumulation is not an error here; frame
    /// validation rejects it downstream.
    fn receive(&mut self, expected_len: usize) -> Result<(), Error> {
        self.received.clear();
        let start = self.clock.millis();
        loop {
            if let Ok(byte) = self.rx.read() {
                if !self.received.is_full() {
                    self.received.push(byte);
                }
                if self.received.len() == expected_len {
                    break;
                }
                continue;
            }
            // WouldBlock means no byte is waiting; hard read errors get the
            // same treatment and the deadline bounds the exchange.
            if self.clock.millis().wrapping_sub(start) > REPLY_DEADLINE_MS {
                break;
            }
        }

        if self.received.is_empty() {
            return Err(Error::NoResponse);
        }
        Ok(())
    }
}
