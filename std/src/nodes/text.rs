use serde_json::Value;
use tessera_core::{Boxer, NodeType, Raw, StateConfig, Step, Validator, ValueLike};

/// Boxes trimmed strings; blank input has no value.
///
/// Numbers and booleans are accepted and stored as their text.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextBoxer;

impl Boxer for TextBoxer {
    fn box_value(&self, raw: &Raw, _options: &[ValueLike]) -> Option<ValueLike> {
        let text = match raw {
            Value::String(text) => text.trim().to_string(),
            Value::Number(number) => number.to_string(),
            Value::Bool(flag) => flag.to_string(),
            _ => return None,
        };
        (!text.is_empty()).then(|| ValueLike::new(text))
    }

    fn unbox_value(&self, value: &ValueLike) -> Raw {
        value.key().clone()
    }
}

pub fn text_entry(name: impl Into<String>) -> Step {
    Step::new(
        NodeType::TextEntry,
        StateConfig::new(name)
            .boxer(TextBoxer)
            .validator(Validator::required()),
    )
}
