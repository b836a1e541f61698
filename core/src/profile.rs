//! The card holder's record, assembled from the JPN1-1, JPN1-2 and JPN1-4 blocks.

use std::fmt::{Display, Formatter};

use chrono::NaiveDate;

use crate::field::{self, decode_bcd_date, decode_bcd_postcode, decode_fixed_text, extract_photo};

/// Offset and length of a field inside its block.
#[derive(Clone, Copy)]
struct Field(usize, usize);

// JPN1-1
const NAME: Field = Field(3, 150);
const IC: Field = Field(273, 13);
const SEX: Field = Field(286, 1);
const OLD_IC: Field = Field(287, 8);
const BIRTH_DATE: Field = Field(295, 4);
const BIRTH_PLACE: Field = Field(299, 25);
const ISSUE_DATE: Field = Field(324, 4);
const CITIZENSHIP: Field = Field(328, 18);
const RACE: Field = Field(346, 25);
const RELIGION: Field = Field(371, 11);

// JPN1-2
const PHOTO: Field = Field(3, 4000);

// JPN1-4
const ADDRESS: [Field; 3] = [Field(3, 30), Field(33, 30), Field(63, 30)];
const POSTCODE: Field = Field(93, 3);
const CITY: Field = Field(96, 25);
const STATE: Field = Field(121, 30);

/// Code of the sex byte for male holders, `L` for _lelaki_.
const SEX_MALE: u8 = b'L';

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Sex {
    Male,
    Female,
}

impl From<u8> for Sex {
    /// Anything but the male code is read as female.
    fn from(code: u8) -> Self {
        match code {
            SEX_MALE => Self::Male,
            _ => Self::Female,
        }
    }
}

impl Display for Sex {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Male => "Male",
            Self::Female => "Female",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct MyKadProfile {
    pub ic: String,
    pub name: String,
    pub sex: Sex,
    pub old_ic: String,
    pub birth_date: NaiveDate,
    pub birth_place: String,
    pub issue_date: NaiveDate,
    pub citizenship: String,
    pub race: String,
    pub religion: String,
    pub address: [String; 3],
    pub postcode: u32,
    pub city: String,
    pub state: String,
    pub photo: Vec<u8>,
}

impl MyKadProfile {
    /// Decodes the profile from the raw personal, photo and address blocks.
    pub fn assemble(personal: &[u8], photo: &[u8], address: &[u8]) -> Result<Self, field::Error> {
        let text = |block: &[u8], Field(offset, length): Field| {
            decode_fixed_text(block, offset, length)
        };

        Ok(Self {
            ic: text(personal, IC),
            name: text(personal, NAME),
            sex: personal.get(SEX.0).copied().map(Sex::from).unwrap_or(Sex::Female),
            old_ic: text(personal, OLD_IC),
            birth_date: decode_bcd_date(personal, BIRTH_DATE.0)?,
            birth_place: text(personal, BIRTH_PLACE),
            issue_date: decode_bcd_date(personal, ISSUE_DATE.0)?,
            citizenship: text(personal, CITIZENSHIP),
            race: text(personal, RACE),
            religion: text(personal, RELIGION),
            address: ADDRESS.map(|line| text(address, line)),
            postcode: decode_bcd_postcode(address, POSTCODE.0)?,
            city: text(address, CITY),
            state: text(address, STATE),
            photo: extract_photo(photo, PHOTO.0, PHOTO.1)?.to_vec(),
        })
    }

    pub fn photo_len(&self) -> usize {
        self.photo.len()
    }
}
