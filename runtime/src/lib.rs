//! Traversal engine driving one token-building session over a grammar.

mod bind;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod machine;
pub mod request;
pub mod telemetry;

pub mod prelude {
    pub use crate::config::{EngineConfig, MachineConfig};
    pub use crate::dispatch::{DispatchError, RenderContext, Renderer, RendererRegistry, Requests};
    pub use crate::error::{MachineError, TransitionError};
    pub use crate::event::MachineEvent;
    pub use crate::machine::TokenStateMachine;
    pub use crate::request::{Request, RequestOutcome, UiSignal};
}

pub use config::{EngineConfig, LogFormat, MachineConfig, TelemetryConfig};
pub use dispatch::{DispatchError, RendererRegistry};
pub use error::{MachineError, TransitionError};
pub use event::MachineEvent;
pub use machine::TokenStateMachine;
pub use telemetry::init_tracing;
