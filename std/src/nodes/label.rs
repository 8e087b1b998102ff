use tessera_core::{NodeType, StateConfig, Step};

/// A cosmetic step that only shows `text`, e.g. "is" between a field and
/// its relation. Chain it without a vkey so it stays out of the token.
pub fn label(text: impl Into<String>) -> Step {
    Step::new(NodeType::Label, StateConfig::new(text).read_only())
}
