use std::marker::PhantomData;

#[cfg(feature = "tracing")]
use tracing::debug;

use crate::nfc;
use crate::nfc::apdu::{self, encode_short, Command, Response};

const DECLARE_CLA: u8 = 0xC8;
const DECLARE_INS: u8 = 0x32;
const DECLARE_HEADER: [u8; 3] = [0x08, 0x00, 0x00];

const REGION_CLA: u8 = 0xCC;
const SELECT_REGION_INS: u8 = 0x00;
const READ_REGION_INS: u8 = 0x06;

/// Largest chunk requested by a single read command.
pub const MAX_CHUNK_LEN: usize = 0xFF;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("The card reader is unavailable: {0}")]
    TransportUnavailable(#[from] nfc::Error),

    #[error("Failed to build an APDU command: {0}")]
    Frame(#[from] apdu::Error),

    #[error("The application was not found on the card ({0:#04X}, {1:#04X})")]
    ApplicationNotFound(u8, u8),

    #[error("The card did not accept the block length ({0:#04X}, {1:#04X})")]
    ProtocolDesync(u8, u8),

    #[error("The card did not select the region ({0:#04X}, {1:#04X})")]
    RegionNotSelected(u8, u8),

    #[error("The card failed to read the region ({0:#04X}, {1:#04X})")]
    ReadFailed(u8, u8),

    #[error("Expected a block of {expected} octets, but the card returned {actual}")]
    LengthMismatch { expected: usize, actual: usize },
}

/// Location of a logical data block stored on the card.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockSpec {
    pub file_id1: u16,
    pub file_id2: u16,
    pub offset: usize,
    pub length: usize,
}

impl BlockSpec {
    pub const fn new(file_id1: u16, file_id2: u16, offset: usize, length: usize) -> Self {
        Self {
            file_id1,
            file_id2,
            offset,
            length,
        }
    }
}

/// An adapter to communicate with the card through the delegate.
///
/// Applications are selected through their AP only:
/// ```rust,compile_fail
/// use mykad::nfc::{self, HandlerInCtx, Response};
/// use mykad::Card;
///
/// struct Reader;
///
/// impl HandlerInCtx for Reader {
///     fn handle_in_ctx(&self, _: (), _frame: &[u8]) -> Result<Response, nfc::Error> {
///         Err(nfc::Error::NoCard)
///     }
/// }
///
/// let card = Card::new(Box::new(Reader));
/// let _ = card.select_df((), &[0xA0, 0x00]);
/// ```
pub struct Card<T, Ctx>
where
    T: nfc::HandlerInCtx<Ctx>,
    Ctx: Copy,
{
    delegate: Box<T>,
    _ctx: PhantomData<Ctx>,
}

impl<T, Ctx> Card<T, Ctx>
where
    T: nfc::HandlerInCtx<Ctx>,
    Ctx: Copy,
{
    /// Initiates an adapter with the delegate.
    pub fn new(delegate: Box<T>) -> Self {
        Self {
            delegate,
            _ctx: PhantomData,
        }
    }

    /// Selects an application with their name.
    /// Besides `9000`, the card family answers `61xx` and other `90xx` on success.
    pub(crate) fn select_df(&self, ctx: Ctx, name: &[u8]) -> Result<(), Error> {
        match self
            .handle(ctx, Command::select_by_name(name.to_vec()))?
            .trailer()
        {
            (0x90, _) | (0x61, _) => Ok(()),
            (sw1, sw2) => Err(Error::ApplicationNotFound(sw1, sw2)),
        }
    }

    fn handle(&self, ctx: Ctx, command: Command) -> Result<Response, Error> {
        let frame = command.into_bytes()?;

        Ok(self.delegate.handle_in_ctx(ctx, &frame)?)
    }
}

/// The card has been told the length of the block to be read next.
pub struct LengthDeclared<'a, T, Ctx>
where
    T: nfc::HandlerInCtx<Ctx>,
    Ctx: Copy,
{
    card: &'a Card<T, Ctx>,
    length: usize,
}

impl<'a, T, Ctx> LengthDeclared<'a, T, Ctx>
where
    T: nfc::HandlerInCtx<Ctx>,
    Ctx: Copy,
{
    /// Declares the length of the upcoming block.
    /// Only callable once the application is selected.
    pub(crate) fn declare(card: &'a Card<T, Ctx>, ctx: Ctx, length: usize) -> Result<Self, Error> {
        debug!("Declaring a block of {} octets", length);

        let mut payload = Vec::from(DECLARE_HEADER);
        payload.extend_from_slice(&encode_short(length)?);

        match card
            .handle(
                ctx,
                Command::new_with_payload_le(DECLARE_CLA, DECLARE_INS, 0x00, 0x00, 0x00, payload),
            )?
            .trailer()
        {
            (0x91, 0x08) => Ok(Self { card, length }),
            (sw1, sw2) => Err(Error::ProtocolDesync(sw1, sw2)),
        }
    }

    /// Positions the cursor of the card at the region of the declared length.
    pub fn select_region(
        self,
        ctx: Ctx,
        file_id1: u16,
        file_id2: u16,
        offset: usize,
    ) -> Result<RegionSelected<'a, T, Ctx>, Error> {
        debug!(
            "Selecting region {}-{} at {} for {} octets",
            file_id1, file_id2, offset, self.length
        );

        let mut payload = Vec::with_capacity(8);
        payload.extend_from_slice(&encode_short(file_id2.into())?);
        payload.extend_from_slice(&encode_short(file_id1.into())?);
        payload.extend_from_slice(&encode_short(offset)?);
        payload.extend_from_slice(&encode_short(self.length)?);

        match self
            .card
            .handle(
                ctx,
                Command::new_with_payload_le(
                    REGION_CLA,
                    SELECT_REGION_INS,
                    0x00,
                    0x00,
                    0x00,
                    payload,
                ),
            )?
            .trailer()
        {
            (0x94, _) => Ok(RegionSelected {
                card: self.card,
                length: self.length,
                remaining: self.length,
            }),
            (sw1, sw2) => Err(Error::RegionNotSelected(sw1, sw2)),
        }
    }
}

/// The card cursor sits on a region that is being read in chunks.
pub struct RegionSelected<'a, T, Ctx>
where
    T: nfc::HandlerInCtx<Ctx>,
    Ctx: Copy,
{
    card: &'a Card<T, Ctx>,
    length: usize,
    remaining: usize,
}

impl<'a, T, Ctx> RegionSelected<'a, T, Ctx>
where
    T: nfc::HandlerInCtx<Ctx>,
    Ctx: Copy,
{
    /// Octets not requested from the card yet.
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// Reads the next chunk of at most [`MAX_CHUNK_LEN`] octets.
    /// Returns `None` once the whole region has been requested.
    pub fn read_chunk(&mut self, ctx: Ctx) -> Result<Option<Vec<u8>>, Error> {
        if self.remaining == 0 {
            return Ok(None);
        }

        let le = self.remaining.min(MAX_CHUNK_LEN);
        let response = self.card.handle(
            ctx,
            Command::new_with_le(REGION_CLA, READ_REGION_INS, 0x00, 0x00, le as u8),
        )?;

        match response.trailer() {
            (0x94, _) | (0x90, _) => {
                self.remaining -= le;

                Ok(Some(response.into_payload()))
            }
            (sw1, sw2) => Err(Error::ReadFailed(sw1, sw2)),
        }
    }

    /// Reads the rest of the region.
    /// Chunks read before a failure are discarded along with the state.
    pub fn read_to_end(mut self, ctx: Ctx) -> Result<Vec<u8>, Error> {
        let mut buf: Vec<u8> = Vec::with_capacity(self.length);

        while let Some(mut chunk) = self.read_chunk(ctx)? {
            buf.append(&mut chunk);
        }

        if buf.len() != self.length {
            return Err(Error::LengthMismatch {
                expected: self.length,
                actual: buf.len(),
            });
        }

        Ok(buf)
    }
}
