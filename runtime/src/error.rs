use serde_json::Value;
use tessera_core::{ArchiveError, StateError};
use thiserror::Error;

/// An advance was refused; the UI reports the current input as invalid.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransitionError {
    #[error("state '{state}' is invalid with value {value}")]
    InvalidState { state: String, value: Value },
    #[error("no child of state '{state}' accepts value {value}")]
    NoMatchingChild { state: String, value: Value },
}

impl TransitionError {
    pub fn state(&self) -> &str {
        match self {
            TransitionError::InvalidState { state, .. } | TransitionError::NoMatchingChild { state, .. } => state,
        }
    }
}

#[derive(Error, Debug)]
pub enum MachineError {
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error(transparent)]
    Archive(#[from] ArchiveError),
    /// A validator raised an error: the grammar definition is broken.
    #[error("validator of state '{state}' failed")]
    Validator {
        state: String,
        #[source]
        source: anyhow::Error,
    },
    #[error("failed to hydrate state '{state}'")]
    Hydration {
        state: String,
        #[source]
        source: anyhow::Error,
    },
    #[error("value {value} for '{vkey}' has no boxed form")]
    Unboxable { vkey: String, value: Value },
    #[error("values left unbound: {}", keys.join(", "))]
    UnmatchedValues { keys: Vec<String> },
}

impl MachineError {
    /// Whether the error stems from user input rather than a broken grammar.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, MachineError::Transition(_) | MachineError::Archive(_))
    }
}

impl From<StateError> for MachineError {
    fn from(error: StateError) -> Self {
        match error {
            StateError::Validator { state, source } => MachineError::Validator { state, source },
            StateError::Archive(archive) => MachineError::Archive(archive),
            StateError::Hydration { state, source } => MachineError::Hydration { state, source },
        }
    }
}
