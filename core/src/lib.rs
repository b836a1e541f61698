//! A crate to read MyKad, the Malaysian identity card, through an APDU delegate.
//!
//! ## Usage
//! ```rust,no_run
//! use std::rc::Rc;
//!
//! use mykad::ap::JpnAp;
//! use mykad::nfc::{self, HandlerInCtx, Response};
//! use mykad::Card;
//!
//! struct Reader;
//!
//! impl HandlerInCtx for Reader {
//!     fn handle_in_ctx(&self, _: (), _frame: &[u8]) -> Result<Response, nfc::Error> {
//!         // Transmit the frame to the card here.
//!         Err(nfc::Error::NoReader)
//!     }
//! }
//!
//! let card = Rc::new(Card::new(Box::new(Reader)));
//! let mut jpn_ap = JpnAp::open((), Rc::clone(&card)).unwrap();
//! let profile = jpn_ap.read_mykad(()).unwrap();
//!
//! println!("{} ({})", profile.name, profile.ic);
//! ```

#[cfg(not(feature = "tracing"))]
macro_rules! debug {
    ($($t: tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
macro_rules! info {
    ($($t: tt)*) => {};
}

#[cfg(feature = "pcsc")]
pub mod pcsc;

pub mod ap;
pub mod card;
pub mod field;
pub mod nfc;
pub mod profile;

pub use card::Card;
pub use profile::{MyKadProfile, Sex};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Card(#[from] card::Error),

    #[error("The card holds a malformed field: {0}")]
    Field(#[from] field::Error),
}
