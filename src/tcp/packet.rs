use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::logger;
use crate::tcp::header::{Header, HeaderType, HEADER_LENGTH};
use crate::utils::checksum::CheckSum;
use crate::utils::errors::ProtocolError;

/// Represents a complete network packet with a protocol header and payload.
#[derive(Debug, Clone)]
pub struct Packet {
    /// The header of the packet, containing metadata such as type and payload length.
    pub header: Header,
    /// CBOR-encoded body, possibly empty.
    pub payload: Box<[u8]>,
}

impl Packet {
    /// Parses a raw byte slice into a `Packet`.
    ///
    /// Expects an 8-byte header followed by exactly `payload_length` bytes.
    pub fn parse(protocol: &[u8]) -> Result<Self, ProtocolError> {
        if protocol.len() < HEADER_LENGTH {
            logger!(ERROR, "[PROTOCOL] Not enough bytes for a valid packet");
            return Err(ProtocolError::InvalidPacketError(
                "Not enough bytes for a valid packet".to_string(),
            ));
        }

        let header = Header::from_bytes(&protocol[..HEADER_LENGTH])?;
        let payload = &protocol[HEADER_LENGTH..];
        if payload.len() != header.payload_length as usize {
            return Err(ProtocolError::InvalidPacketError(format!(
                "Expected {} payload bytes, got {}",
                header.payload_length,
                payload.len()
            )));
        }

        Ok(Self {
            header,
            payload: payload.to_vec().into_boxed_slice(),
        })
    }

    /// Creates a new `Packet` from a message type and payload.
    pub fn new(header_type: HeaderType, payload: &[u8]) -> Self {
        let header = Header::new(header_type, payload);
        let payload = payload.to_vec().into_boxed_slice();
        Self { header, payload }
    }

    /// Creates a packet whose payload is `body` encoded as CBOR.
    pub fn encode<T: Serialize>(header_type: HeaderType, body: &T) -> Result<Self, ProtocolError> {
        let payload = serde_cbor::to_vec(body).map_err(|e| ProtocolError::PayloadError(e.to_string()))?;
        Ok(Packet::new(header_type, &payload))
    }

    /// Decodes the CBOR payload into `T`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, ProtocolError> {
        serde_cbor::from_slice::<T>(&self.payload).map_err(|e| ProtocolError::PayloadError(e.to_string()))
    }

    pub fn has_valid_checksum(&self) -> bool {
        CheckSum::check(self.header.checksum, &self.payload)
    }

    /// Serializes the packet into a byte slice ready to be written to a stream.
    pub fn wrap_packet(&self) -> Box<[u8]> {
        let header = self.header.wrap_header();
        let mut packet = Vec::with_capacity(header.len() + self.payload.len());

        packet.extend_from_slice(&header);
        packet.extend_from_slice(&self.payload);

        packet.into_boxed_slice()
    }
}
