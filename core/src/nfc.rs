//! Communicating with the card through a reader

pub mod apdu;

#[cfg(test)]
pub(crate) mod fake;

pub use self::apdu::{Command, Response};

/// Failures of the reader itself, as opposed to the card answering with an error status.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("No card reader is available")]
    NoReader,

    #[error("No card is present on the reader")]
    NoCard,

    #[error("Failed to transmit the command: {0}")]
    Transmit(String),
}

/// An handler to transmit a serialised APDU command and receive a response in the context.
pub trait HandlerInCtx<Ctx = ()> {
    /// Handles the APDU command.
    /// Implementations must transmit the frame to the card through a reader,
    /// then receive the response from them, including the trailing status words.
    fn handle_in_ctx(&self, ctx: Ctx, frame: &[u8]) -> Result<Response, Error>;
}
