//! PC/SC support for mykad library.
//! Can be enabled by turning `pcsc` feature on.
//!
//! ## What is PC/SC?
//! PC/SC (Personal Computer/Smart Card) is an abstraction layer for communicating with Smart Cards
//! from Windows. Using this layer, applications can connect to any devices that supports PC/SC,
//! without depending on their driver implementation.
//! Windows and macOS supports PC/SC by themselves,
//! Linux also supports by installing pcsc-lite shared library.
//!
//! ## Supported platform
//! Linux, Windows and macOS are supported by pcsc-rust, backend of this implementation.
//! Refer the documentation of pcsc-rust for details:
//! <https://github.com/bluetech/pcsc-rust>
//!
//! ## Usage
//! ```rust,no_run
//! use std::rc::Rc;
//!
//! use mykad::Card;
//! use mykad::ap::JpnAp;
//! use mykad::pcsc::Context;
//!
//! let ctx = Context::try_new().unwrap();
//! let device = ctx.open().unwrap();
//! let pcsc_card = device.connect(&ctx).unwrap();
//!
//! let card = Rc::new(Card::new(Box::new(pcsc_card)));
//! let mut jpn_ap = JpnAp::open((), Rc::clone(&card)).unwrap();
//! let profile = jpn_ap.read_mykad(()).unwrap();
//! ```

use std::ffi::{CStr, CString};
use std::thread::sleep;
use std::time::Duration;

use pcsc::{Card, Protocols, Scope, ShareMode, MAX_BUFFER_SIZE};

#[cfg(feature = "tracing")]
use tracing::{debug, info};

use crate::nfc::{self, HandlerInCtx, Response};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Error occurred while communicating with PC/SC: {0}")]
    PcscError(#[from] pcsc::Error),

    #[error("Reader not found on PC/SC service")]
    ReaderNotFound,

    #[error("No card present on the reader. Please insert your MyKad and try again.")]
    CardNotFound,

    #[error("Failed to connect to the card on the reader: {0}")]
    ConnectFailed(#[source] pcsc::Error),
}

pub(crate) type Result<T> = std::result::Result<T, Error>;

/// PC/SC context.
pub struct Context {
    ctx: pcsc::Context,
}

impl Context {
    /// Creates a PC/SC context in user scope.
    pub fn try_new() -> Result<Self> {
        Ok(Self {
            ctx: pcsc::Context::establish(Scope::User).map_err(Error::PcscError)?,
        })
    }

    /// Lists the names of the readers known to the PC/SC service.
    pub fn readers(&self) -> Result<Vec<String>> {
        let mut buf = [0u8; 2048];

        Ok(self
            .list_readers(&mut buf)?
            .map(|r| r.to_string_lossy().into_owned())
            .collect())
    }

    /// Finds the first PC/SC device.
    pub fn open(&self) -> Result<Device> {
        let mut buf = [0u8; 2048];

        Ok(Device::new(
            self.list_readers(&mut buf)?
                .next()
                .ok_or(Error::ReaderNotFound)?,
        ))
    }

    /// Finds a PC/SC device whose name contains the pattern.
    pub fn open_by_name(&self, pattern: &str) -> Result<Device> {
        let mut buf = [0u8; 2048];

        Ok(Device::new(
            self.list_readers(&mut buf)?
                .find(|r| r.to_string_lossy().contains(pattern))
                .ok_or(Error::ReaderNotFound)?,
        ))
    }

    fn list_readers<'b>(&self, buf: &'b mut [u8]) -> Result<pcsc::ReaderNames<'b>> {
        self.ctx.list_readers(buf).map_err(|e| match e {
            pcsc::Error::NoReadersAvailable => Error::ReaderNotFound,
            e => Error::PcscError(e),
        })
    }
}

/// PC/SC device handle.
pub struct Device {
    reader: CString,
}

impl Device {
    fn new(reader: &CStr) -> Self {
        debug!("Using device: {}", reader.to_str().unwrap_or_default());

        Self {
            reader: reader.to_owned(),
        }
    }

    /// Name of the reader.
    pub fn name(&self) -> String {
        self.reader.to_string_lossy().into_owned()
    }

    /// Connects to the card inserted to the device.
    pub fn connect(&self, ctx: &Context) -> Result<PcscCard> {
        let card = ctx
            .ctx
            .connect(&self.reader, ShareMode::Shared, Protocols::ANY)
            .map_err(connect_error)?;

        debug!("Connected to your card");

        Ok(PcscCard::new(card))
    }

    /// Connects to the card inserted to the device after waiting them, polling at the interval.
    pub fn wait_for_card(&self, ctx: &Context, interval: Duration) -> Result<PcscCard> {
        debug!("Waiting for a card");

        loop {
            match self.connect(ctx) {
                Err(Error::CardNotFound) => {
                    info!("Still waiting for your card...");
                    sleep(interval);
                }
                result => return result,
            }
        }
    }
}

/// Once the reader is found, a failed connection blames the card.
fn connect_error(e: pcsc::Error) -> Error {
    match e {
        pcsc::Error::NoSmartcard | pcsc::Error::RemovedCard => Error::CardNotFound,
        pcsc::Error::UnknownReader | pcsc::Error::ReaderUnavailable => Error::ReaderNotFound,
        e => Error::ConnectFailed(e),
    }
}

/// A card to be communicated through PC/SC.
pub struct PcscCard {
    card: Card,
}

impl PcscCard {
    fn new(card: Card) -> Self {
        Self { card }
    }

    /// Transmits an APDU command to the card, then receives a response from them.
    pub fn transmit(&self, tx: &[u8]) -> Result<Vec<u8>> {
        debug!("TX: {}", hex::encode(tx));

        let mut rx = [0u8; MAX_BUFFER_SIZE];
        let rx = self.card.transmit(tx, &mut rx).map_err(Error::PcscError)?;

        debug!("RX: {}", hex::encode(rx));

        Ok(Vec::from(rx))
    }
}

type Ctx = ();

impl HandlerInCtx<Ctx> for PcscCard {
    fn handle_in_ctx(&self, _: Ctx, frame: &[u8]) -> std::result::Result<Response, nfc::Error> {
        self.transmit(frame)
            .map(Response::from_bytes)
            .map_err(|e| match e {
                Error::PcscError(
                    pcsc::Error::NoSmartcard | pcsc::Error::RemovedCard | pcsc::Error::ResetCard,
                )
                | Error::CardNotFound => nfc::Error::NoCard,
                Error::PcscError(
                    pcsc::Error::NoReadersAvailable
                    | pcsc::Error::UnknownReader
                    | pcsc::Error::ReaderUnavailable,
                )
                | Error::ReaderNotFound => nfc::Error::NoReader,
                e => nfc::Error::Transmit(e.to_string()),
            })
    }
}
