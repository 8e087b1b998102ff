//! Conversion between raw (unboxed) values and their boxed form.
//!
//! Domain steps (text, numbers, dates, currency) specialise only this trait;
//! they add no control flow to the runtime node.

use crate::value::{Raw, ValueLike};
use serde_json::Value;

pub trait Boxer: Send + Sync {
    /// Box a raw value. `None` means the raw value has no boxed form; null
    /// always boxes to `None`.
    fn box_value(&self, raw: &Raw, options: &[ValueLike]) -> Option<ValueLike>;

    fn unbox_value(&self, value: &ValueLike) -> Raw;
}

/// Wraps any non-null raw value as its own key.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityBoxer;

impl Boxer for IdentityBoxer {
    fn box_value(&self, raw: &Raw, _options: &[ValueLike]) -> Option<ValueLike> {
        match raw {
            Value::Null => None,
            other => Some(ValueLike::new(other.clone())),
        }
    }

    fn unbox_value(&self, value: &ValueLike) -> Raw {
        value.key().clone()
    }
}

/// Resolves a raw key against the step's current options.
#[derive(Debug, Clone, Copy, Default)]
pub struct OptionBoxer {
    /// Box keys missing from the option list as fresh values instead of rejecting them.
    pub allow_unknown: bool,
}

impl Boxer for OptionBoxer {
    fn box_value(&self, raw: &Raw, options: &[ValueLike]) -> Option<ValueLike> {
        if raw.is_null() {
            return None;
        }
        options
            .iter()
            .find(|option| option.key() == raw)
            .cloned()
            .or_else(|| self.allow_unknown.then(|| ValueLike::new(raw.clone())))
    }

    fn unbox_value(&self, value: &ValueLike) -> Raw {
        value.key().clone()
    }
}
