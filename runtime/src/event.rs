use tessera_core::{StateId, TokenValue, ValueLike};

/// Notifications emitted by a [`TokenStateMachine`](crate::machine::TokenStateMachine).
#[derive(Debug, Clone, PartialEq)]
pub enum MachineEvent {
    StateChanged { from: StateId, to: StateId },
    /// The machine entered a terminal state; carries the finished token.
    EndToken { value: TokenValue },
    ValueArchived { state: StateId },
    ValueUnarchived { state: StateId },
    ArchivedValueRemoved {
        state: StateId,
        index: usize,
        value: ValueLike,
    },
    ArchivedValuesRemoved { state: StateId, values: Vec<ValueLike> },
}

impl MachineEvent {
    pub fn name(&self) -> &'static str {
        match self {
            MachineEvent::StateChanged { .. } => "state changed",
            MachineEvent::EndToken { .. } => "end token",
            MachineEvent::ValueArchived { .. } => "value archived",
            MachineEvent::ValueUnarchived { .. } => "value unarchived",
            MachineEvent::ArchivedValueRemoved { .. } => "archived value removed",
            MachineEvent::ArchivedValuesRemoved { .. } => "archived values removed",
        }
    }
}
