use thiserror::Error;

/// A multivalue archive operation violated its capacity or emptiness rules.
///
/// Recoverable: the UI reports the current input as invalid.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArchiveError {
    #[error("state '{state}' does not accept multiple values")]
    NotMultivalue { state: String },
    #[error("cannot archive invalid value {value} of state '{state}'")]
    InvalidValue { state: String, value: String },
    #[error("state '{state}' has no value to archive")]
    NoValue { state: String },
    #[error("archive of state '{state}' is full ({limit} values)")]
    LimitReached { state: String, limit: usize },
    #[error("archive of state '{state}' is empty")]
    Empty { state: String },
    #[error("archived value index {index} is out of range for state '{state}' ({len} values)")]
    IndexOutOfRange {
        state: String,
        index: usize,
        len: usize,
    },
}

#[derive(Error, Debug)]
pub enum StateError {
    /// A validator raised an error: the grammar definition itself is broken.
    #[error("validator of state '{state}' failed")]
    Validator {
        state: String,
        #[source]
        source: anyhow::Error,
    },
    #[error(transparent)]
    Archive(#[from] ArchiveError),
    #[error("failed to hydrate state '{state}'")]
    Hydration {
        state: String,
        #[source]
        source: anyhow::Error,
    },
}
