//! JPN AP: Application holding the personal record, photo and address of the card holder.

use std::rc::Rc;

#[cfg(feature = "tracing")]
use tracing::info;

use crate::card::{BlockSpec, LengthDeclared};
use crate::profile::MyKadProfile;
use crate::{card, nfc, Card};

const AID: [u8; 10] = [0xA0, 0x00, 0x00, 0x00, 0x74, 0x4A, 0x50, 0x4E, 0x00, 0x10];

/// JPN1-1: name, identity numbers, birth and issue details.
pub const JPN1_1: BlockSpec = BlockSpec::new(1, 1, 0, 459);

/// JPN1-2: photo of the holder.
pub const JPN1_2: BlockSpec = BlockSpec::new(1, 2, 0, 4011);

/// JPN1-4: postal address.
pub const JPN1_4: BlockSpec = BlockSpec::new(1, 4, 0, 171);

pub struct JpnAp<T, Ctx>
where
    T: nfc::HandlerInCtx<Ctx>,
    Ctx: Copy,
{
    card: Rc<Card<T, Ctx>>,
}

impl<T, Ctx> JpnAp<T, Ctx>
where
    T: nfc::HandlerInCtx<Ctx>,
    Ctx: Copy,
{
    /// Opens the AP in the card by selecting the application.
    pub fn open(ctx: Ctx, card: Rc<Card<T, Ctx>>) -> Result<Self, card::Error> {
        let ap = Self { card };

        ap.card.select_df(ctx, &AID).map(|_| ap)
    }

    /// Declares the length of the block to be read next.
    /// The AP stays borrowed until the block has been read or the read failed.
    pub fn declare_length(
        &mut self,
        ctx: Ctx,
        length: usize,
    ) -> Result<LengthDeclared<'_, T, Ctx>, card::Error> {
        LengthDeclared::declare(&self.card, ctx, length)
    }

    /// Reads a whole block, from declaring its length to the last chunk.
    pub fn read_block(&mut self, ctx: Ctx, spec: &BlockSpec) -> Result<Vec<u8>, card::Error> {
        self.declare_length(ctx, spec.length)?
            .select_region(ctx, spec.file_id1, spec.file_id2, spec.offset)?
            .read_to_end(ctx)
    }

    /// Reads the personal record as raw octets.
    pub fn read_personal_raw(&mut self, ctx: Ctx) -> Result<Vec<u8>, card::Error> {
        self.read_block(ctx, &JPN1_1)
    }

    /// Reads the photo block as raw octets.
    pub fn read_photo_raw(&mut self, ctx: Ctx) -> Result<Vec<u8>, card::Error> {
        self.read_block(ctx, &JPN1_2)
    }

    /// Reads the address block as raw octets.
    pub fn read_address_raw(&mut self, ctx: Ctx) -> Result<Vec<u8>, card::Error> {
        self.read_block(ctx, &JPN1_4)
    }

    /// Reads all the blocks and decodes them into the profile of the holder.
    pub fn read_mykad(&mut self, ctx: Ctx) -> Result<MyKadProfile, crate::Error> {
        let personal = self.read_personal_raw(ctx)?;
        let photo = self.read_photo_raw(ctx)?;
        let address = self.read_address_raw(ctx)?;

        info!("Read all blocks from the card");

        Ok(MyKadProfile::assemble(&personal, &photo, &address)?)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use chrono::NaiveDate;

    use super::*;
    use crate::nfc::fake::FakeCard;
    use crate::nfc::{Command, Response};
    use crate::profile::tests::{address_block, personal_block, photo_block};

    /// Emulates the card, serving the blocks from the region selected last.
    fn virtual_card(blocks: [(u16, Vec<u8>); 3]) -> FakeCard {
        let cursor: RefCell<Option<(Vec<u8>, usize)>> = RefCell::new(None);

        FakeCard::new(move |command: &Command| {
            Ok(match (command.cla(), command.ins()) {
                (0x00, 0xA4) if command.payload() == Some(&AID[..]) => {
                    Response::new(vec![], 0x90, 0x00)
                }
                (0x00, 0xA4) => Response::new(vec![], 0x6A, 0x82),
                (0xC8, 0x32) => Response::new(vec![], 0x91, 0x08),
                (0xCC, 0x00) => {
                    let payload = command.payload().unwrap_or_default();
                    let file = blocks
                        .iter()
                        .find(|(id, _)| payload.first() == Some(&(*id as u8)));

                    match file {
                        Some((_, block)) => {
                            *cursor.borrow_mut() = Some((block.clone(), 0));
                            Response::new(vec![], 0x94, 0x00)
                        }
                        None => Response::new(vec![], 0x6A, 0x82),
                    }
                }
                (0xCC, 0x06) => match cursor.borrow_mut().as_mut() {
                    Some((block, pos)) => {
                        let end = (*pos + command.le().unwrap_or(0) as usize).min(block.len());
                        let chunk = block[*pos..end].to_vec();
                        *pos = end;

                        Response::new(chunk, 0x94, 0x00)
                    }
                    None => Response::new(vec![], 0x69, 0x85),
                },
                _ => Response::new(vec![], 0x6D, 0x00),
            })
        })
    }

    fn open(fake: FakeCard) -> Result<JpnAp<FakeCard, ()>, card::Error> {
        JpnAp::open((), Rc::new(Card::new(Box::new(fake))))
    }

    #[test]
    fn test_read_mykad() {
        let fake = virtual_card([
            (1, personal_block()),
            (2, photo_block()),
            (4, address_block()),
        ]);
        let sent = fake.sent();

        let profile = open(fake).unwrap().read_mykad(()).unwrap();

        assert_eq!("900517105678", profile.ic);
        assert_eq!(NaiveDate::from_ymd_opt(1990, 5, 17), Some(profile.birth_date));
        assert_eq!(50480, profile.postcode);
        assert_eq!(4000, profile.photo_len());

        // SELECT, then per block: declare, select region, and ceil(length / 255) reads.
        assert_eq!(1 + (2 + 2) + (2 + 16) + (2 + 1), sent.borrow().len());
    }

    #[test]
    fn test_read_block_order() {
        let fake = virtual_card([
            (1, personal_block()),
            (2, photo_block()),
            (4, address_block()),
        ]);
        let sent = fake.sent();

        let block = open(fake).unwrap().read_address_raw(()).unwrap();
        let kinds: Vec<(u8, u8)> = sent
            .borrow()
            .iter()
            .map(|c| (c.cla(), c.ins()))
            .collect();

        assert_eq!(address_block(), block);
        assert_eq!(
            vec![(0x00, 0xA4), (0xC8, 0x32), (0xCC, 0x00), (0xCC, 0x06)],
            kinds,
        );
    }

    #[test]
    fn test_open_rejects_other_cards() {
        let fake = FakeCard::scripted(vec![Response::new(vec![], 0x6A, 0x82)]);

        assert!(matches!(
            open(fake),
            Err(card::Error::ApplicationNotFound(0x6A, 0x82)),
        ));
    }

    #[test]
    fn test_read_mykad_stops_at_first_failure() {
        let fake = FakeCard::scripted(vec![
            Response::new(vec![], 0x90, 0x00),
            Response::new(vec![], 0x91, 0x08),
            Response::new(vec![], 0x94, 0x00),
            Response::new(vec![0x20; 255], 0x94, 0x00),
            Response::new(vec![], 0x6F, 0x00),
        ]);
        let sent = fake.sent();

        let result = open(fake).unwrap().read_mykad(());

        assert!(matches!(
            result,
            Err(crate::Error::Card(card::Error::ReadFailed(0x6F, 0x00))),
        ));
        assert_eq!(5, sent.borrow().len());
    }

    #[test]
    fn test_read_mykad_invalid_date() {
        let mut personal = personal_block();
        personal[298] = 0x32;

        let fake = virtual_card([(1, personal), (2, photo_block()), (4, address_block())]);
        let result = open(fake).unwrap().read_mykad(());

        assert!(matches!(
            result,
            Err(crate::Error::Field(crate::field::Error::InvalidDate { day: 32, .. })),
        ));
    }
}
