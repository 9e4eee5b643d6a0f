use arrayvec::{Array, ArrayVec};
use core::fmt;

/// Byte sink used when serialising commands and frames.
pub trait CommandWriter {
    fn write_cmd_bytes(&mut self, bytes: &[u8]);
}

impl<A: Array<Item = u8>> CommandWriter for ArrayVec<A> {
    fn write_cmd_bytes(&mut self, bytes: &[u8]) {
        self.try_extend_from_slice(bytes).unwrap();
    }
}

/// Decoding seam for reply payloads.
pub trait FromPayload {
    fn from_payload(payload: &[u8]) -> Self;
}

/// Monotonic time source for the receive deadline.
///
/// The driver only ever compares differences of consecutive readings, so the
/// epoch is arbitrary. On embedded targets this is typically backed by a
/// millisecond tick counter, on a PC by `std::time::Instant`.
pub trait MonotonicClock {
    fn millis(&mut self) -> u32;
}

/// Transport- and frame-level failures of a command exchange.
///
/// These are distinct from a device-reported [`Status`](crate::Status): an
/// `Error` means the module never answered, or answered malformed, while a
/// `Status` is carried inside a successfully validated reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Not a single byte arrived before the deadline.
    NoResponse,
    /// Some bytes arrived but the expected frame never completed.
    Timeout,
    /// The reply did not start with the 0xEF 0x01 start code.
    MagicMismatch,
    /// The reply carried a different device address than the session's.
    AddressMismatch,
    /// The reply was not of the expected packet type.
    TypeMismatch,
    /// The reply's length field did not match the expected payload length.
    LengthMismatch,
    /// The reply's checksum did not match its contents.
    ChecksumMismatch,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NoResponse => f.write_str("nothing was read"),
            Error::Timeout => f.write_str("reply frame incomplete before deadline"),
            Error::MagicMismatch => f.write_str("magic header does not match"),
            Error::AddressMismatch => f.write_str("device address does not match"),
            Error::TypeMismatch => f.write_str("packet identification does not match"),
            Error::LengthMismatch => f.write_str("packet length does not match"),
            Error::ChecksumMismatch => f.write_str("packet checksum does not match"),
        }
    }
}
