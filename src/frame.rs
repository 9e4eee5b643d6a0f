use byteorder::{BigEndian, ByteOrder};

use crate::utils::{CommandWriter, Error};

/// Every frame opens with these two bytes.
pub const START_CODE: [u8; 2] = [0xEF, 0x01];

const HEADER_LEN: usize = 9;
const CHECKSUM_LEN: usize = 2;

/// Framing bytes around a payload: start code, address, type, length, checksum.
pub const OVERHEAD: usize = HEADER_LEN + CHECKSUM_LEN;

/// Role marker in byte 6 of every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketType {
    Command = 0x01,
    Data = 0x02,
    Ack = 0x07,
    EndOfData = 0x08,
}

/// Additive checksum over the length field, type byte and payload.
///
/// The module computes the length term in 8-bit arithmetic, so its high byte
/// is lost for payloads of 254 bytes and up, even though the header carries
/// the full 16-bit length. The sum must match what the sensor computes, so
/// the truncation is reproduced here rather than corrected.
pub fn checksum(packet_type: PacketType, payload: &[u8]) -> u16 {
    let len = (payload.len() + 2) as u8;
    let mut sum = u16::from(len).wrapping_add(u16::from(packet_type as u8));
    for byte in payload {
        sum = sum.wrapping_add(u16::from(*byte));
    }
    sum
}

/// Writes one complete frame around `payload`.
///
/// Layout, all multi-byte fields big-endian:
/// ```text
/// headr  | 0xEF 0x01 [2]
/// addr   | address [4]
/// ident  | packet type [1]
/// length | payload length + 2 [2]
/// data   | payload [length - 2]
/// chksum | checksum [2]
/// ```
pub fn encode(out: &mut dyn CommandWriter, address: u32, packet_type: PacketType, payload: &[u8]) {
    out.write_cmd_bytes(&START_CODE);
    out.write_cmd_bytes(&address.to_be_bytes()[..]);
    out.write_cmd_bytes(&[packet_type as u8]);
    out.write_cmd_bytes(&(payload.len() as u16 + 2).to_be_bytes()[..]);
    out.write_cmd_bytes(payload);
    out.write_cmd_bytes(&checksum(packet_type, payload).to_be_bytes()[..]);
}

/// Validates a received frame and returns its payload.
///
/// Checks run in wire order: magic, address, type, length, checksum; the
/// first mismatch wins. A check that would read past the end of a short
/// accumulation reports [`Error::Timeout`] instead - the device started a
/// frame that never completed before the deadline.
pub fn decode<'a>(
    buf: &'a [u8],
    address: u32,
    packet_type: PacketType,
    payload_len: usize,
) -> Result<&'a [u8], Error> {
    need(buf, 2)?;
    if buf[0..2] != START_CODE {
        return Err(Error::MagicMismatch);
    }
    need(buf, 6)?;
    if BigEndian::read_u32(&buf[2..6]) != address {
        return Err(Error::AddressMismatch);
    }
    need(buf, 7)?;
    if buf[6] != packet_type as u8 {
        return Err(Error::TypeMismatch);
    }
    need(buf, HEADER_LEN)?;
    if usize::from(BigEndian::read_u16(&buf[7..9])) != payload_len + 2 {
        return Err(Error::LengthMismatch);
    }
    let total = HEADER_LEN + payload_len + CHECKSUM_LEN;
    need(buf, total)?;
    let payload = &buf[HEADER_LEN..HEADER_LEN + payload_len];
    if BigEndian::read_u16(&buf[total - 2..total]) != checksum(packet_type, payload) {
        return Err(Error::ChecksumMismatch);
    }
    Ok(payload)
}

fn need(buf: &[u8], len: usize) -> Result<(), Error> {
    if buf.len() < len {
        return Err(Error::Timeout);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrayvec::ArrayVec;

    const ADDRESS: u32 = 0xFFFF_FFFF;

    fn frame_for(payload: &[u8], packet_type: PacketType) -> ArrayVec<[u8; 512]> {
        let mut out = ArrayVec::<[u8; 512]>::new();
        encode(&mut out, ADDRESS, packet_type, payload);
        out
    }

    #[test]
    fn checksum_of_plain_ack() {
        // length term 3, type 0x07, single zero status byte
        assert_eq!(checksum(PacketType::Ack, &[0x00]), 0x000A);
    }

    #[test]
    fn checksum_length_term_is_truncated_to_8_bits() {
        // 300 bytes of 0xFF: length term (302 & 0xFF) = 46, type 0x01,
        // payload sum 76500; total 76547 mod 65536. A full 16-bit length
        // term would come out one higher.
        let payload = [0xFFu8; 300];
        assert_eq!(checksum(PacketType::Command, &payload), 0x2B03);
    }

    #[test]
    fn encode_verify_password_frame() {
        let frame = frame_for(&[0x13, 0x00, 0x00, 0x00, 0x00], PacketType::Command);
        assert_eq!(
            &frame[..],
            &[
                0xEF, 0x01, 0xFF, 0xFF, 0xFF, 0xFF, 0x01, 0x00, 0x07, 0x13, 0x00, 0x00, 0x00,
                0x00, 0x00, 0x1B,
            ][..]
        );
    }

    #[test]
    fn decode_returns_payload_unchanged() {
        let payload = [0x00, 0x00, 0x05, 0x01, 0x2C];
        let frame = frame_for(&payload, PacketType::Ack);
        let decoded = decode(&frame, ADDRESS, PacketType::Ack, payload.len()).unwrap();
        assert_eq!(decoded, &payload[..]);
    }

    #[test]
    fn large_payload_roundtrips() {
        // Exercises the truncated checksum on both sides of the exchange.
        let payload = [0xA5u8; 300];
        let frame = frame_for(&payload, PacketType::Data);
        let decoded = decode(&frame, ADDRESS, PacketType::Data, payload.len()).unwrap();
        assert_eq!(decoded, &payload[..]);
    }

    #[test]
    fn rejects_wrong_magic() {
        let mut frame = frame_for(&[0x00], PacketType::Ack);
        frame[0] = 0x55;
        assert_eq!(
            decode(&frame, ADDRESS, PacketType::Ack, 1),
            Err(Error::MagicMismatch)
        );
    }

    #[test]
    fn rejects_foreign_address() {
        let mut out = ArrayVec::<[u8; 64]>::new();
        encode(&mut out, 0x0000_0000, PacketType::Ack, &[0x00]);
        assert_eq!(
            decode(&out, 0xFFFF_FFFF, PacketType::Ack, 1),
            Err(Error::AddressMismatch)
        );
    }

    #[test]
    fn rejects_unexpected_packet_type() {
        let frame = frame_for(&[0x00], PacketType::Data);
        assert_eq!(
            decode(&frame, ADDRESS, PacketType::Ack, 1),
            Err(Error::TypeMismatch)
        );
    }

    #[test]
    fn rejects_wrong_length_field() {
        let frame = frame_for(&[0x00, 0x00, 0x2A], PacketType::Ack);
        assert_eq!(
            decode(&frame, ADDRESS, PacketType::Ack, 1),
            Err(Error::LengthMismatch)
        );
    }

    #[test]
    fn rejects_corrupted_checksum() {
        let mut frame = frame_for(&[0x00], PacketType::Ack);
        let last = frame.len() - 1;
        frame[last] ^= 0xFF;
        assert_eq!(
            decode(&frame, ADDRESS, PacketType::Ack, 1),
            Err(Error::ChecksumMismatch)
        );
    }

    #[test]
    fn magic_check_wins_over_later_mismatches() {
        // Bad magic and a foreign address; validation order fixes the error.
        let mut out = ArrayVec::<[u8; 64]>::new();
        encode(&mut out, 0x0000_0000, PacketType::Ack, &[0x00]);
        out[0] = 0x55;
        assert_eq!(
            decode(&out, 0xFFFF_FFFF, PacketType::Ack, 1),
            Err(Error::MagicMismatch)
        );
    }

    #[test]
    fn incomplete_frame_reports_timeout() {
        let frame = frame_for(&[0x00], PacketType::Ack);
        assert_eq!(
            decode(&frame[..5], ADDRESS, PacketType::Ack, 1),
            Err(Error::Timeout)
        );
        // A valid prefix that merely stops short of the checksum.
        assert_eq!(
            decode(&frame[..10], ADDRESS, PacketType::Ack, 1),
            Err(Error::Timeout)
        );
    }
}
