//! Scripted stand-in for a reader, used by unit tests.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::nfc::{Command, Error, HandlerInCtx, Response};

type Responder = Box<dyn Fn(&Command) -> Result<Response, Error>>;

pub(crate) struct FakeCard {
    responder: Responder,
    sent: Rc<RefCell<Vec<Command>>>,
}

impl FakeCard {
    /// Answers every command with the closure.
    pub(crate) fn new<F>(responder: F) -> Self
    where
        F: Fn(&Command) -> Result<Response, Error> + 'static,
    {
        Self {
            responder: Box::new(responder),
            sent: Default::default(),
        }
    }

    /// Answers commands with the responses in order, then behaves as if the card was removed.
    pub(crate) fn scripted(responses: Vec<Response>) -> Self {
        let responses = RefCell::new(VecDeque::from(responses));

        Self::new(move |_| responses.borrow_mut().pop_front().ok_or(Error::NoCard))
    }

    /// Shared log of the commands received so far.
    pub(crate) fn sent(&self) -> Rc<RefCell<Vec<Command>>> {
        Rc::clone(&self.sent)
    }
}

impl HandlerInCtx<()> for FakeCard {
    fn handle_in_ctx(&self, _: (), frame: &[u8]) -> Result<Response, Error> {
        let command = Command::from_bytes(frame).map_err(|e| Error::Transmit(e.to_string()))?;
        let response = (self.responder)(&command);

        self.sent.borrow_mut().push(command);
        response
    }
}
