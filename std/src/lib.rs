//! Ready-made steps for common grammars.
//!
//! Each builder returns a [`Step`](tessera_core::Step) that specialises only
//! boxing, validation and options; control flow stays in the runtime.

pub mod nodes;
pub mod prelude;
