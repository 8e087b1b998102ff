//! Guard predicates gating whether a child step is reachable.
//!
//! A guard sees only the parent's current boxed value. Children are tried in
//! declaration order and the first passing guard wins, so guards on sibling
//! branches do not need to be mutually exclusive.

use crate::value::{Raw, ValueLike};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// A pure predicate over the parent's value.
#[derive(Clone)]
pub struct Guard(Arc<dyn Fn(Option<&ValueLike>) -> bool + Send + Sync>);

impl Guard {
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(Option<&ValueLike>) -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(predicate))
    }

    pub fn always() -> Self {
        Self::new(|_| true)
    }

    pub fn check(&self, parent_value: Option<&ValueLike>) -> bool {
        (self.0)(parent_value)
    }

    pub fn not(self) -> Self {
        Self::new(move |value| !self.check(value))
    }

    pub fn and(self, other: Guard) -> Self {
        Self::new(move |value| self.check(value) && other.check(value))
    }

    pub fn or(self, other: Guard) -> Self {
        Self::new(move |value| self.check(value) || other.check(value))
    }
}

impl Default for Guard {
    fn default() -> Self {
        Self::always()
    }
}

impl fmt::Debug for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Guard").finish()
    }
}

/// Passes when the parent's option key equals `key`.
pub fn option_key_is(key: impl Into<Raw>) -> Guard {
    let key = key.into();
    Guard::new(move |value| value.is_some_and(|v| *v.key() == key))
}

/// Passes when the parent has a value whose key differs from `key`.
pub fn option_key_is_not(key: impl Into<Raw>) -> Guard {
    let key = key.into();
    Guard::new(move |value| value.is_some_and(|v| *v.key() != key))
}

/// Passes when the parent's option key is one of `keys`.
pub fn option_key_in<I, K>(keys: I) -> Guard
where
    I: IntoIterator<Item = K>,
    K: Into<Raw>,
{
    let keys: Vec<Raw> = keys.into_iter().map(Into::into).collect();
    Guard::new(move |value| value.is_some_and(|v| keys.contains(v.key())))
}

/// Passes when every field of `expected` is present with an equal value in the
/// parent option's metadata.
pub fn option_meta_matches(expected: Value) -> Guard {
    Guard::new(move |value| {
        let Some(meta) = value.and_then(|v| v.meta().as_object()) else {
            return false;
        };
        match &expected {
            Value::Object(fields) => fields.iter().all(|(k, v)| meta.get(k) == Some(v)),
            _ => false,
        }
    })
}

/// Passes whenever the parent holds any value.
pub fn has_value() -> Guard {
    Guard::new(|value| value.is_some())
}
