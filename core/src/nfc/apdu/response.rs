/// An response that was received from the card
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Response {
    payload: Vec<u8>,
    trailer: (u8, u8),
}

impl Response {
    /// Creates a response from the payload and the status words.
    pub fn new(payload: Vec<u8>, sw1: u8, sw2: u8) -> Self {
        Self {
            payload,
            trailer: (sw1, sw2),
        }
    }

    /// Parses a response from the octets.
    /// Responses too short to carry status words are given the trailer `(0x00, 0x00)`.
    pub fn from_bytes(mut bytes: Vec<u8>) -> Self {
        let sw2 = bytes.pop();
        let sw1 = bytes.pop();

        match (sw1, sw2) {
            (Some(a), Some(b)) => Self::new(bytes, a, b),
            _ => Self::default(),
        }
    }

    /// Status words of the response, in `(SW1, SW2)` order.
    pub fn trailer(&self) -> (u8, u8) {
        self.trailer
    }

    pub fn into_payload(self) -> Vec<u8> {
        self.payload
    }
}
