use crate::utils::CommandWriter;

/// Commands understood by the module. Names follow the ZFM-20 datasheet.
///
/// Each command is answered by a single ack frame carrying a status byte and,
/// for some commands, trailing result fields; see [`Reply`](crate::Reply).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Performs a handshake with the module to verify the session password.
    /// The factory default password is 0x00000000.
    VerifyPassword,

    /// Sets a new device password.
    SetPassword { password: u32 },

    /// Sets a new device address. The module acks under the new address.
    SetAddress { address: u32 },

    /// Reads one 256-slot page of the template index bitmap.
    ///
    /// **Note:** the module has 4 pages; the index is masked to its low
    /// 2 bits before transmission.
    ReadTemplateTable { page: u8 },

    /// Reads the number of templates stored in the flash database.
    ReadTemplateNumber,

    /// Captures a fingerprint image into the image buffer.
    GenImage,

    /// Processes the captured image into a _character buffer_.
    ///
    /// **Note:** buffer ids are masked to their low 2 bits; the module has
    /// only a small fixed set of working buffers.
    Img2Tz { buffer: u8 },

    /// Merges character buffers 1 and 2 into a template.
    RegModel,

    /// Writes the template in the given buffer to a flash position.
    StoreModel { buffer: u8, position: u16 },

    /// Erases the entire template database.
    Empty,

    /// Loads the template at a flash position into the given buffer.
    LoadChar { buffer: u8, position: u16 },

    /// Deletes `count` templates starting at position `start`.
    DeleteChar { start: u16, count: u16 },

    /// Compares character buffers 1 and 2 and reports a match score.
    Match,

    /// Searches `count` database slots from `page` onwards for the contents
    /// of the given character buffer.
    Search { buffer: u8, page: u16, count: u16 },

    /// Reads system status and basic configuration.
    ReadSysPara,
}

impl Command {
    /// Writes the command payload: opcode byte followed by big-endian
    /// parameters. `password` is the session password, used only by
    /// [`Command::VerifyPassword`].
    pub(crate) fn write_payload(&self, password: u32, writer: &mut dyn CommandWriter) {
        match self {
            // instr  | 0x13 [1]
            // passwd | session password [4]
            Command::VerifyPassword => {
                writer.write_cmd_bytes(&[0x13]);
                writer.write_cmd_bytes(&password.to_be_bytes()[..]);
            }

            Command::SetPassword { password } => {
                writer.write_cmd_bytes(&[0x12]);
                writer.write_cmd_bytes(&password.to_be_bytes()[..]);
            }

            Command::SetAddress { address } => {
                writer.write_cmd_bytes(&[0x15]);
                writer.write_cmd_bytes(&address.to_be_bytes()[..]);
            }

            Command::ReadTemplateTable { page } => {
                writer.write_cmd_bytes(&[0x1F, page & 0x03]);
            }

            Command::ReadTemplateNumber => writer.write_cmd_bytes(&[0x1D]),

            Command::GenImage => writer.write_cmd_bytes(&[0x01]),

            Command::Img2Tz { buffer } => writer.write_cmd_bytes(&[0x02, buffer & 0x03]),

            Command::RegModel => writer.write_cmd_bytes(&[0x05]),

            // instr  | 0x06 [1]
            // bufid  | buffer [1]
            // pageid | position [2]
            Command::StoreModel { buffer, position } => {
                writer.write_cmd_bytes(&[0x06, buffer & 0x03]);
                writer.write_cmd_bytes(&position.to_be_bytes()[..]);
            }

            Command::Empty => writer.write_cmd_bytes(&[0x0D]),

            Command::LoadChar { buffer, position } => {
                writer.write_cmd_bytes(&[0x07, buffer & 0x03]);
                writer.write_cmd_bytes(&position.to_be_bytes()[..]);
            }

            Command::DeleteChar { start, count } => {
                writer.write_cmd_bytes(&[0x0C]);
                writer.write_cmd_bytes(&start.to_be_bytes()[..]);
                writer.write_cmd_bytes(&count.to_be_bytes()[..]);
            }

            Command::Match => writer.write_cmd_bytes(&[0x03]),

            // instr  | 0x04 [1]
            // bufid  | buffer [1]
            // sstart | page [2]
            // snum   | count [2]
            Command::Search { buffer, page, count } => {
                writer.write_cmd_bytes(&[0x04, buffer & 0x03]);
                writer.write_cmd_bytes(&page.to_be_bytes()[..]);
                writer.write_cmd_bytes(&count.to_be_bytes()[..]);
            }

            Command::ReadSysPara => writer.write_cmd_bytes(&[0x0F]),
        }
    }

    /// Expected ack payload length, status byte included.
    pub(crate) fn reply_len(&self) -> usize {
        match self {
            Command::ReadTemplateTable { .. } => 33,
            Command::ReadTemplateNumber => 3,
            Command::Match => 3,
            Command::Search { .. } => 5,
            Command::ReadSysPara => 17,
            _ => 1,
        }
    }
}
