use crate::nfc::apdu::{Error, CLA_DEFAULT, MAX_PAYLOAD_LEN};

const INS_SELECT_FILE: u8 = 0xA4;

/// An APDU command to be transmitted
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Command {
    cla: u8,
    ins: u8,
    p1: u8,
    p2: u8,
    le: Option<u8>,
    payload: Option<Vec<u8>>,
}

impl Command {
    /// Constructs an command with CLA, INS, P1, and P2.
    /// No payloads will be transmitted or received.
    pub fn new(cla: u8, ins: u8, p1: u8, p2: u8) -> Self {
        Self {
            cla,
            ins,
            p1,
            p2,
            le: None,
            payload: None,
        }
    }

    /// Constructs an command with CLA, INS, P1, P2, and Le.
    /// A payload will be received.
    pub fn new_with_le(cla: u8, ins: u8, p1: u8, p2: u8, le: u8) -> Self {
        Self {
            le: Some(le),
            ..Self::new(cla, ins, p1, p2)
        }
    }

    /// Constructs an command with CLA, INS, P1, P2, and a payload.
    /// No payload will be received.
    pub fn new_with_payload(cla: u8, ins: u8, p1: u8, p2: u8, payload: Vec<u8>) -> Self {
        Self {
            payload: Some(payload),
            ..Self::new(cla, ins, p1, p2)
        }
    }

    /// Constructs an command with CLA, INS, P1, P2, Le, and a payload.
    /// A payload will be received.
    pub fn new_with_payload_le(cla: u8, ins: u8, p1: u8, p2: u8, le: u8, payload: Vec<u8>) -> Self {
        Self {
            le: Some(le),
            payload: Some(payload),
            ..Self::new(cla, ins, p1, p2)
        }
    }

    /// Constructs a `SELECT` command choosing an application by its name.
    pub fn select_by_name(name: Vec<u8>) -> Self {
        Self::new_with_payload_le(CLA_DEFAULT, INS_SELECT_FILE, 0x04, 0x00, 0x00, name)
    }

    pub fn cla(&self) -> u8 {
        self.cla
    }

    pub fn ins(&self) -> u8 {
        self.ins
    }

    pub fn p1(&self) -> u8 {
        self.p1
    }

    pub fn p2(&self) -> u8 {
        self.p2
    }

    pub fn le(&self) -> Option<u8> {
        self.le
    }

    pub fn payload(&self) -> Option<&[u8]> {
        self.payload.as_deref()
    }

    /// Converts the command into octets.
    /// Fails if the payload is too long to be described by a single length octet.
    pub fn into_bytes(self) -> Result<Vec<u8>, Error> {
        let Self {
            cla,
            ins,
            p1,
            p2,
            le,
            payload,
        } = self;

        let mut buffer: Vec<u8> = vec![cla, ins, p1, p2];
        if let Some(mut p) = payload {
            if p.len() > MAX_PAYLOAD_LEN {
                return Err(Error::InvalidPayload(p.len()));
            }

            buffer.push(p.len() as u8);
            buffer.append(&mut p);
        }

        if let Some(l) = le {
            buffer.push(l);
        }

        Ok(buffer)
    }

    /// Parses a short command from the octets.
    /// A frame of exactly five octets is read as a header followed by Le.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        match *bytes {
            [cla, ins, p1, p2] => Ok(Self::new(cla, ins, p1, p2)),
            [cla, ins, p1, p2, le] => Ok(Self::new_with_le(cla, ins, p1, p2, le)),
            [cla, ins, p1, p2, lc, ref body @ ..] => {
                let lc = lc as usize;
                match body.len() - lc.min(body.len()) {
                    0 if body.len() == lc => {
                        Ok(Self::new_with_payload(cla, ins, p1, p2, body.to_vec()))
                    }
                    1 => Ok(Self::new_with_payload_le(
                        cla,
                        ins,
                        p1,
                        p2,
                        body[lc],
                        body[..lc].to_vec(),
                    )),
                    _ => Err(Error::MalformedFrame(bytes.to_vec())),
                }
            }
            _ => Err(Error::MalformedFrame(bytes.to_vec())),
        }
    }
}
