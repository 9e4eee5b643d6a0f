use byteorder::{BigEndian, ByteOrder};
use core::fmt;

use crate::commands::Command;
use crate::utils::FromPayload;

/// Replies returned by the module. Names mirror the commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    VerifyPassword(Status),
    SetPassword(Status),
    SetAddress(Status),
    ReadTemplateTable(TemplateTable),
    ReadTemplateNumber(TemplateCount),
    GenImage(Status),
    Img2Tz(Status),
    RegModel(Status),
    StoreModel(Status),
    Empty(Status),
    LoadChar(Status),
    DeleteChar(Status),
    Match(MatchScore),
    Search(SearchHit),
    ReadSysPara(SysParaResult),
}

impl Reply {
    /// Builds the reply for `cmd` from a validated ack payload. The payload
    /// length was already checked against the command's expected length.
    pub(crate) fn decode(cmd: &Command, payload: &[u8]) -> Reply {
        let status = Status::from(payload[0]);
        match cmd {
            Command::VerifyPassword => Reply::VerifyPassword(status),
            Command::SetPassword { .. } => Reply::SetPassword(status),
            Command::SetAddress { .. } => Reply::SetAddress(status),
            Command::ReadTemplateTable { .. } => {
                Reply::ReadTemplateTable(TemplateTable::from_payload(payload))
            }
            Command::ReadTemplateNumber => {
                Reply::ReadTemplateNumber(TemplateCount::from_payload(payload))
            }
            Command::GenImage => Reply::GenImage(status),
            Command::Img2Tz { .. } => Reply::Img2Tz(status),
            Command::RegModel => Reply::RegModel(status),
            Command::StoreModel { .. } => Reply::StoreModel(status),
            Command::Empty => Reply::Empty(status),
            Command::LoadChar { .. } => Reply::LoadChar(status),
            Command::DeleteChar { .. } => Reply::DeleteChar(status),
            Command::Match => Reply::Match(MatchScore::from_payload(payload)),
            Command::Search { .. } => Reply::Search(SearchHit::from_payload(payload)),
            Command::ReadSysPara => Reply::ReadSysPara(SysParaResult::from_payload(payload)),
        }
    }

    /// The device status carried by any reply.
    pub fn status(&self) -> Status {
        match self {
            Reply::VerifyPassword(s)
            | Reply::SetPassword(s)
            | Reply::SetAddress(s)
            | Reply::GenImage(s)
            | Reply::Img2Tz(s)
            | Reply::RegModel(s)
            | Reply::StoreModel(s)
            | Reply::Empty(s)
            | Reply::LoadChar(s)
            | Reply::DeleteChar(s) => *s,
            Reply::ReadTemplateTable(r) => r.status,
            Reply::ReadTemplateNumber(r) => r.status,
            Reply::Match(r) => r.status,
            Reply::Search(r) => r.status,
            Reply::ReadSysPara(r) => r.status,
        }
    }
}

/// One 256-slot page of the template index bitmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateTable {
    pub status: Status,
    pub bitmap: [u8; 32],
}

impl TemplateTable {
    /// True if the slot at `index` within this page holds a template.
    pub fn is_used(&self, index: u8) -> bool {
        self.bitmap[usize::from(index) / 8] & (1 << (index % 8)) != 0
    }
}

impl FromPayload for TemplateTable {
    fn from_payload(payload: &[u8]) -> Self {
        let mut bitmap = [0u8; 32];
        bitmap.copy_from_slice(&payload[1..33]);
        TemplateTable {
            status: Status::from(payload[0]),
            bitmap,
        }
    }
}

/// Number of templates stored in the flash database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateCount {
    pub status: Status,
    pub count: u16,
}

impl FromPayload for TemplateCount {
    fn from_payload(payload: &[u8]) -> Self {
        TemplateCount {
            status: Status::from(payload[0]),
            count: BigEndian::read_u16(&payload[1..3]),
        }
    }
}

/// Similarity score between character buffers 1 and 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchScore {
    pub status: Status,
    pub score: u16,
}

impl FromPayload for MatchScore {
    fn from_payload(payload: &[u8]) -> Self {
        MatchScore {
            status: Status::from(payload[0]),
            score: BigEndian::read_u16(&payload[1..3]),
        }
    }
}

/// Result of a database search. `position` and `score` are only meaningful
/// when `status` is [`Status::Ok`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchHit {
    pub status: Status,
    pub position: u16,
    pub score: u16,
}

impl FromPayload for SearchHit {
    fn from_payload(payload: &[u8]) -> Self {
        SearchHit {
            status: Status::from(payload[0]),
            position: BigEndian::read_u16(&payload[1..3]),
            score: BigEndian::read_u16(&payload[3..5]),
        }
    }
}

/// System status and configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SysParaResult {
    pub status: Status,
    pub params: SystemParameters,
}

impl FromPayload for SysParaResult {
    fn from_payload(payload: &[u8]) -> Self {
        SysParaResult {
            status: Status::from(payload[0]),
            params: SystemParameters::from_payload(&payload[1..17]),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemParameters {
    /// Status information. Use the instance methods to get to individual bits.
    pub status_register: u16,

    /// System identifier code; the datasheet gives a constant 0x0009.
    pub system_identifier_code: u16,

    /// Capacity of the template database.
    pub finger_library_size: u16,

    /// Security level [1-5].
    pub security_level: u16,

    /// Device address as the module knows it.
    pub device_address: u32,

    /// Packet size code [0-3]: 32, 64, 128 or 256 bytes.
    pub packet_size: u16,

    /// Baud setting; multiply by 9600 for the actual rate.
    pub baud_setting: u16,
}

impl SystemParameters {
    /// True if the module is busy executing another command.
    pub fn busy(&self) -> bool {
        self.status_register & (1 << 0) != 0
    }

    /// True if the module found a matching finger - but always check the
    /// reply to the actual matching request.
    pub fn has_finger_match(&self) -> bool {
        self.status_register & (1 << 1) != 0
    }

    /// True if the handshake password has been verified.
    pub fn password_ok(&self) -> bool {
        self.status_register & (1 << 2) != 0
    }

    /// True if the image buffer contains a valid image.
    pub fn has_valid_image(&self) -> bool {
        self.status_register & (1 << 3) != 0
    }
}

impl FromPayload for SystemParameters {
    fn from_payload(payload: &[u8]) -> Self {
        SystemParameters {
            status_register: BigEndian::read_u16(&payload[0..2]),
            system_identifier_code: BigEndian::read_u16(&payload[2..4]),
            finger_library_size: BigEndian::read_u16(&payload[4..6]),
            security_level: BigEndian::read_u16(&payload[6..8]),
            device_address: BigEndian::read_u32(&payload[8..12]),
            packet_size: BigEndian::read_u16(&payload[12..14]),
            baud_setting: BigEndian::read_u16(&payload[14..16]),
        }
    }
}

/// Status byte returned in every ack frame.
///
/// The mapping is total: codes this driver does not recognise come back as
/// [`Status::Unknown`] rather than a panic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    ReceiveError,
    NoFinger,
    ImageCaptureFailed,
    ImageTooMessy,
    ImageTooSmall,
    FingerprintMismatch,
    SearchFailed,
    MergeFailed,
    AddressOutOfRange,
    DatabaseReadError,
    FeatureUploadFailed,
    CannotAcceptData,
    ImageUploadFailed,
    TemplateDeleteFailed,
    EmptyDatabaseFailed,
    IncorrectPassword,
    IncorrectBuffer,
    FlashError,
    InvalidRegister,
    InvalidAddress,
    PasswordNotVerified,
    Unknown(u8),
}

impl Status {
    pub fn is_ok(&self) -> bool {
        *self == Status::Ok
    }
}

impl From<u8> for Status {
    fn from(byte: u8) -> Self {
        match byte {
            0x00 => Status::Ok,
            0x01 => Status::ReceiveError,
            0x02 => Status::NoFinger,
            0x03 => Status::ImageCaptureFailed,
            0x06 => Status::ImageTooMessy,
            0x07 => Status::ImageTooSmall,
            0x08 => Status::FingerprintMismatch,
            0x09 => Status::SearchFailed,
            0x0A => Status::MergeFailed,
            0x0B => Status::AddressOutOfRange,
            0x0C => Status::DatabaseReadError,
            0x0D => Status::FeatureUploadFailed,
            0x0E => Status::CannotAcceptData,
            0x0F => Status::ImageUploadFailed,
            0x10 => Status::TemplateDeleteFailed,
            0x11 => Status::EmptyDatabaseFailed,
            0x13 => Status::IncorrectPassword,
            0x15 => Status::IncorrectBuffer,
            0x18 => Status::FlashError,
            0x1A => Status::InvalidRegister,
            0x20 => Status::InvalidAddress,
            0x21 => Status::PasswordNotVerified,
            other => Status::Unknown(other),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Ok => f.write_str("OK"),
            Status::ReceiveError => f.write_str("Receive error"),
            Status::NoFinger => f.write_str("No finger"),
            Status::ImageCaptureFailed => f.write_str("Input fingerprint image failed"),
            Status::ImageTooMessy => f.write_str("Image too messy"),
            Status::ImageTooSmall => f.write_str("Too few feature points"),
            Status::FingerprintMismatch => f.write_str("Fingerprint mismatch"),
            Status::SearchFailed => f.write_str("Search failed"),
            Status::MergeFailed => f.write_str("Merge failed"),
            Status::AddressOutOfRange => f.write_str("Database address too big"),
            Status::DatabaseReadError => f.write_str("Database read error"),
            Status::FeatureUploadFailed => f.write_str("Feature upload error"),
            Status::CannotAcceptData => f.write_str("Can't accept data"),
            Status::ImageUploadFailed => f.write_str("Image upload error"),
            Status::TemplateDeleteFailed => f.write_str("Template delete error"),
            Status::EmptyDatabaseFailed => f.write_str("Empty database error"),
            Status::IncorrectPassword => f.write_str("Incorrect password"),
            Status::IncorrectBuffer => f.write_str("Incorrect buffer"),
            Status::FlashError => f.write_str("Flash read/write error"),
            Status::InvalidRegister => f.write_str("Invalid register"),
            Status::InvalidAddress => f.write_str("Invalid address"),
            Status::PasswordNotVerified => f.write_str("Password not verified"),
            Status::Unknown(code) => write!(f, "Unknown error ({:#04x})", code),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping_is_total() {
        assert_eq!(Status::from(0x00), Status::Ok);
        assert_eq!(Status::from(0x13), Status::IncorrectPassword);
        assert_eq!(Status::from(0x21), Status::PasswordNotVerified);
        assert_eq!(Status::from(0x42), Status::Unknown(0x42));
    }

    #[test]
    fn template_table_bit_lookup() {
        let mut payload = [0u8; 33];
        payload[1] = 0b0000_0101; // slots 0 and 2
        payload[5] = 0b1000_0000; // slot 39
        let table = TemplateTable::from_payload(&payload);
        assert!(table.is_used(0));
        assert!(!table.is_used(1));
        assert!(table.is_used(2));
        assert!(table.is_used(39));
        assert!(!table.is_used(40));
    }

    #[test]
    fn system_parameters_from_payload() {
        let mut payload = [0u8; 16];
        payload[0..2].copy_from_slice(&0x000Du16.to_be_bytes());
        payload[2..4].copy_from_slice(&0x0009u16.to_be_bytes());
        payload[4..6].copy_from_slice(&162u16.to_be_bytes());
        payload[6..8].copy_from_slice(&3u16.to_be_bytes());
        payload[8..12].copy_from_slice(&0xFFFF_FFFFu32.to_be_bytes());
        payload[12..14].copy_from_slice(&2u16.to_be_bytes());
        payload[14..16].copy_from_slice(&6u16.to_be_bytes());

        let params = SystemParameters::from_payload(&payload);
        assert_eq!(params.system_identifier_code, 0x0009);
        assert_eq!(params.finger_library_size, 162);
        assert_eq!(params.security_level, 3);
        assert_eq!(params.device_address, 0xFFFF_FFFF);
        assert_eq!(params.packet_size, 2);
        assert_eq!(params.baud_setting, 6);
        assert!(params.busy());
        assert!(!params.has_finger_match());
        assert!(params.password_ok());
        assert!(params.has_valid_image());
    }
}
