//! Decoders for the fixed-layout fields stored in the blocks of the card.
//!
//! Every decoder addresses the block with an absolute offset; no cursor is kept.
//! Dates and postcodes are packed BCD, one decimal digit per nibble with the high nibble first.
//! Texts are fixed-width ASCII padded with spaces.

use chrono::NaiveDate;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("Invalid date {year:04}-{month:02}-{day:02}")]
    InvalidDate { year: u32, month: u32, day: u32 },

    #[error("Field of {length} octets at {offset} exceeds the block of {size} octets")]
    Truncated {
        offset: usize,
        length: usize,
        size: usize,
    },
}

fn region(block: &[u8], offset: usize, length: usize) -> Result<&[u8], Error> {
    offset
        .checked_add(length)
        .and_then(|end| block.get(offset..end))
        .ok_or(Error::Truncated {
            offset,
            length,
            size: block.len(),
        })
}

/// Accumulates the BCD digits of the octets, two per octet.
fn bcd(bytes: &[u8]) -> u32 {
    bytes.iter().fold(0, |n, &b| {
        n * 100 + u32::from((b >> 4) & 0x0F) * 10 + u32::from(b & 0x0F)
    })
}

/// Decodes a date stored as `YYYY MM DD` in four BCD octets.
pub fn decode_bcd_date(block: &[u8], offset: usize) -> Result<NaiveDate, Error> {
    let bytes = region(block, offset, 4)?;
    let (year, month, day) = (bcd(&bytes[..2]), bcd(&bytes[2..3]), bcd(&bytes[3..]));

    // Year 0 is a blank field, not 1 BC.
    Some(year)
        .filter(|&y| y > 0)
        .and_then(|y| NaiveDate::from_ymd_opt(y as i32, month, day))
        .ok_or(Error::InvalidDate { year, month, day })
}

/// Decodes a postcode stored in three BCD octets.
/// The sixth digit is padding and is dropped.
pub fn decode_bcd_postcode(block: &[u8], offset: usize) -> Result<u32, Error> {
    region(block, offset, 3).map(|bytes| bcd(bytes) / 10)
}

/// Decodes a space-padded text, dropping octets outside printable ASCII.
/// The region is clamped to the block, so this never fails.
pub fn decode_fixed_text(block: &[u8], start: usize, length: usize) -> String {
    let end = start.saturating_add(length).min(block.len());
    let start = start.min(end);

    block[start..end]
        .iter()
        .filter(|&&b| matches!(b, b' '..=b'~'))
        .map(|&b| char::from(b))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Extracts the raw photo, a JPEG image in practice.
pub fn extract_photo(block: &[u8], start: usize, length: usize) -> Result<&[u8], Error> {
    region(block, start, length)
}
