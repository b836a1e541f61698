//! Short APDU frames as spoken by the card

mod command;
mod response;

pub use self::command::Command;
pub use self::response::Response;

pub const CLA_DEFAULT: u8 = 0x00;

/// Longest payload a short frame can carry, bounded by its single length byte.
pub const MAX_PAYLOAD_LEN: usize = 0xFF;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("Payload of {0} octets does not fit in a short APDU")]
    InvalidPayload(usize),

    #[error("Value {0} does not fit in 16 bits")]
    OutOfRange(usize),

    #[error("Malformed APDU frame: {0:02X?}")]
    MalformedFrame(Vec<u8>),
}

/// Encodes a length, offset or file identifier as two little-endian octets.
pub fn encode_short(x: usize) -> Result<[u8; 2], Error> {
    u16::try_from(x)
        .map(u16::to_le_bytes)
        .map_err(|_| Error::OutOfRange(x))
}

/// Decodes two little-endian octets produced by [`encode_short`].
pub fn decode_short(bytes: [u8; 2]) -> u16 {
    u16::from_le_bytes(bytes)
}
