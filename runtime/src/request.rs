//! Requests a renderer may raise against the machine driving it.

use crate::error::MachineError;
use crate::machine::TokenStateMachine;
use tessera_core::{StateId, ValueLike};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    Transition,
    Archive,
    Unarchive,
    RemoveArchivedValue(usize),
    RemoveArchivedValues,
    Rewind,
    Focus,
    Blur,
    Cancel,
}

/// Signals the machine does not handle; the UI layer acts on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiSignal {
    Focus,
    Blur,
    Cancel,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestOutcome {
    /// The machine moved to another state.
    Moved(StateId),
    Archived,
    Unarchived,
    Removed(Vec<ValueLike>),
    Ui(UiSignal),
}

impl TokenStateMachine {
    /// Apply one renderer request.
    ///
    /// Rewinding at the root turns into a [`UiSignal::Cancel`].
    pub fn handle_request(&mut self, request: Request) -> Result<RequestOutcome, MachineError> {
        tracing::trace!(machine = %self.id, ?request, "Handling request");
        let outcome = match request {
            Request::Transition => RequestOutcome::Moved(self.transition()?),
            Request::Archive => {
                self.archive()?;
                RequestOutcome::Archived
            }
            Request::Unarchive => {
                self.unarchive()?;
                RequestOutcome::Unarchived
            }
            Request::RemoveArchivedValue(index) => RequestOutcome::Removed(vec![self.remove_archived_value(index)?]),
            Request::RemoveArchivedValues => RequestOutcome::Removed(self.remove_archived_values()),
            Request::Rewind => match self.rewind() {
                Some(parent) => RequestOutcome::Moved(parent),
                None => RequestOutcome::Ui(UiSignal::Cancel),
            },
            Request::Focus => RequestOutcome::Ui(UiSignal::Focus),
            Request::Blur => RequestOutcome::Ui(UiSignal::Blur),
            Request::Cancel => RequestOutcome::Ui(UiSignal::Cancel),
        };
        Ok(outcome)
    }

    /// Apply queued requests in order, stopping at the first failure.
    pub fn handle_requests(
        &mut self,
        requests: impl IntoIterator<Item = Request>,
    ) -> Result<Vec<RequestOutcome>, MachineError> {
        requests
            .into_iter()
            .map(|request| self.handle_request(request))
            .collect()
    }
}
