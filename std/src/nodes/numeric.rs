//! Numeric entry: numbers or numeric strings, optionally bounded.

use serde_json::{Number, Value};
use tessera_core::{Boxer, NodeType, Raw, StateConfig, Step, Validator, ValueLike};

/// Parse a raw value as a JSON number, keeping integers integral.
pub(crate) fn parse_number(raw: &Raw) -> Option<Number> {
    match raw {
        Value::Number(number) => Some(number.clone()),
        Value::String(text) => {
            let text = text.trim();
            if let Ok(integer) = text.parse::<i64>() {
                return Some(integer.into());
            }
            text.parse::<f64>().ok().and_then(Number::from_f64)
        }
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NumericBoxer;

impl Boxer for NumericBoxer {
    fn box_value(&self, raw: &Raw, _options: &[ValueLike]) -> Option<ValueLike> {
        parse_number(raw).map(ValueLike::new)
    }

    fn unbox_value(&self, value: &ValueLike) -> Raw {
        value.key().clone()
    }
}

pub fn numeric_entry(name: impl Into<String>) -> Step {
    Step::new(
        NodeType::NumericEntry,
        StateConfig::new(name)
            .boxer(NumericBoxer)
            .validator(Validator::required()),
    )
}

/// Like [`numeric_entry`], rejecting values outside `min..=max`.
pub fn bounded_numeric_entry(name: impl Into<String>, min: Option<f64>, max: Option<f64>) -> Step {
    numeric_entry(name).configure(|config| config.validator(numeric_range(min, max)))
}

/// Requires a numeric value within the inclusive bounds.
pub fn numeric_range(min: Option<f64>, max: Option<f64>) -> Validator {
    Validator::new(move |value, _archive| {
        let Some(number) = value.and_then(|v| v.key().as_f64()) else {
            return false;
        };
        min.is_none_or(|min| number >= min) && max.is_none_or(|max| number <= max)
    })
}
