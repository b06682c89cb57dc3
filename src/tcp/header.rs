use std::fmt::Display;

use crate::utils::checksum::CheckSum;
use crate::utils::errors::ProtocolError;

pub const HEADER_LENGTH: usize = 8;
const DELIMITER: u8 = 0x0A;

/// Represents the type of message in a protocol packet.
///
/// Requests sit in `0x01..=0x2F`, successful responses in `0x30..=0x3F` and
/// errors at the top of the byte range.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderType {
    Disconnect = 0x00,
    Ping = 0x01,

    CreateDeck = 0x20,
    DrawCards = 0x21,
    GetDeck = 0x22,
    GetPile = 0x23,
    AddToPile = 0x24,
    ShufflePile = 0x25,
    GetCard = 0x26,

    Pong = 0x30,
    DeckState = 0x31,
    PileState = 0x32,
    PileShuffled = 0x33,
    CardState = 0x34,

    DeckNotFound = 0xE0,
    PileNotFound = 0xE1,
    CardNotFound = 0xE2,
    InvalidArgument = 0xE3,
    PartialMatch = 0xE4,

    InvalidHeader = 0xFA,
    InvalidChecksum = 0xFD,
    InvalidPacketPayload = 0xF1,
    ERROR = 0xFE,
}

impl Display for HeaderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let str = match self {
            HeaderType::Disconnect => "DISCONNECT",
            HeaderType::Ping => "PING",

            HeaderType::CreateDeck => "CREATE_DECK",
            HeaderType::DrawCards => "DRAW_CARDS",
            HeaderType::GetDeck => "GET_DECK",
            HeaderType::GetPile => "GET_PILE",
            HeaderType::AddToPile => "ADD_TO_PILE",
            HeaderType::ShufflePile => "SHUFFLE_PILE",
            HeaderType::GetCard => "GET_CARD",

            HeaderType::Pong => "PONG",
            HeaderType::DeckState => "DECK_STATE",
            HeaderType::PileState => "PILE_STATE",
            HeaderType::PileShuffled => "PILE_SHUFFLED",
            HeaderType::CardState => "CARD_STATE",

            HeaderType::DeckNotFound => "DECK_NOT_FOUND",
            HeaderType::PileNotFound => "PILE_NOT_FOUND",
            HeaderType::CardNotFound => "CARD_NOT_FOUND",
            HeaderType::InvalidArgument => "INVALID_ARGUMENT",
            HeaderType::PartialMatch => "PARTIAL_MATCH",

            HeaderType::InvalidHeader => "INVALID_HEADER",
            HeaderType::InvalidChecksum => "INVALID_CHECKSUM",
            HeaderType::InvalidPacketPayload => "INVALID_PACKET_PAYLOAD",
            HeaderType::ERROR => "ERROR",
        };

        write!(f, "{}", str)
    }
}

impl TryFrom<u8> for HeaderType {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(HeaderType::Disconnect),
            0x01 => Ok(HeaderType::Ping),

            0x20 => Ok(HeaderType::CreateDeck),
            0x21 => Ok(HeaderType::DrawCards),
            0x22 => Ok(HeaderType::GetDeck),
            0x23 => Ok(HeaderType::GetPile),
            0x24 => Ok(HeaderType::AddToPile),
            0x25 => Ok(HeaderType::ShufflePile),
            0x26 => Ok(HeaderType::GetCard),

            0x30 => Ok(HeaderType::Pong),
            0x31 => Ok(HeaderType::DeckState),
            0x32 => Ok(HeaderType::PileState),
            0x33 => Ok(HeaderType::PileShuffled),
            0x34 => Ok(HeaderType::CardState),

            0xE0 => Ok(HeaderType::DeckNotFound),
            0xE1 => Ok(HeaderType::PileNotFound),
            0xE2 => Ok(HeaderType::CardNotFound),
            0xE3 => Ok(HeaderType::InvalidArgument),
            0xE4 => Ok(HeaderType::PartialMatch),

            0xFA => Ok(HeaderType::InvalidHeader),
            0xFD => Ok(HeaderType::InvalidChecksum),
            0xF1 => Ok(HeaderType::InvalidPacketPayload),
            0xFE => Ok(HeaderType::ERROR),
            _ => Err(()),
        }
    }
}

/// Fixed-size header in front of every payload.
///
/// Wire format: `[type, payload_len (4 bytes BE), checksum (2 bytes BE), 0x0A]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub checksum: u16,
    pub payload_length: u32,
    pub header_type: HeaderType,
}

impl Header {
    /// Builds the header for `payload`, computing its length and checksum.
    pub fn new(header_type: HeaderType, payload: &[u8]) -> Self {
        Self {
            checksum: CheckSum::new(payload),
            payload_length: payload.len() as u32,
            header_type,
        }
    }

    pub fn wrap_header(&self) -> [u8; HEADER_LENGTH] {
        let length = self.payload_length.to_be_bytes();
        let checksum = self.checksum.to_be_bytes();
        [
            self.header_type as u8,
            length[0],
            length[1],
            length[2],
            length[3],
            checksum[0],
            checksum[1],
            DELIMITER,
        ]
    }

    /// Parses a header from exactly [`HEADER_LENGTH`] bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ProtocolError> {
        if bytes.len() != HEADER_LENGTH || bytes[HEADER_LENGTH - 1] != DELIMITER {
            return Err(ProtocolError::InvalidHeaderError(format!(
                "Format invalid: {:?}",
                bytes
            )));
        }

        let header_type = HeaderType::try_from(bytes[0]).map_err(|_| {
            ProtocolError::InvalidHeaderError(format!("Invalid message type 0x{:02X}", bytes[0]))
        })?;
        let payload_length = u32::from_be_bytes([bytes[1], bytes[2], bytes[3], bytes[4]]);
        let checksum = u16::from_be_bytes([bytes[5], bytes[6]]);

        Ok(Self {
            header_type,
            payload_length,
            checksum,
        })
    }
}
