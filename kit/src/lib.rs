//! Tessera facade crate.
//!
//! This crate re-exports the core, runtime and std crates with a single entry point.

pub use tessera_core as core;
pub use tessera_runtime as runtime;
#[cfg(feature = "std")]
pub use tessera_std as std;

pub use tessera_core::{Schematic, State, StateConfig, StateTemplate, Step, TokenValue, ValueLike};
pub use tessera_runtime::{EngineConfig, MachineError, TokenStateMachine};

pub mod prelude {
    pub use tessera_core::prelude::*;
    pub use tessera_runtime::prelude::*;
    #[cfg(feature = "std")]
    pub use tessera_std::prelude::*;
}
