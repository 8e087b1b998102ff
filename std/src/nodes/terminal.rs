use tessera_core::{Guard, NodeType, StateConfig, Step};

/// Invisible marker ending a branch.
///
/// Append it after the last value step so that value can be entered before
/// the token completes.
pub fn terminal() -> Step {
    Step::new(NodeType::Terminal, StateConfig::new("End").read_only())
}

/// A marker reachable only when the parent's value passes `guard`; list it
/// before the remaining branches to let a choice end the token early.
pub fn terminal_when(guard: Guard) -> Step {
    terminal().configure(|config| config.guard(guard))
}
