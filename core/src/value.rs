//! Value wrappers shared by every step of a grammar.
//!
//! A [`ValueLike`] is the boxed form of a step's value: a key that is unique
//! within its option set plus free-form metadata. The unboxed form is plain
//! JSON ([`Raw`]), which is also what the token output is made of.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;

/// The unboxed, user-facing representation of a value.
pub type Raw = Value;

/// Ordered `{vkey: value}` mapping produced by a machine and accepted by
/// `bind_values`.
pub type TokenValue = Map<String, Value>;

fn is_false(flag: &bool) -> bool {
    !*flag
}

/// An immutable key + metadata pair representing a selectable or enterable value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueLike {
    key: Value,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    meta: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    display_key: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    hidden: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    highlighted: bool,
}

impl ValueLike {
    pub fn new(key: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            meta: Value::Null,
            display_key: None,
            hidden: false,
            highlighted: false,
        }
    }

    pub fn with_meta(mut self, meta: impl Into<Value>) -> Self {
        self.meta = meta.into();
        self
    }

    pub fn with_display_key(mut self, display_key: impl Into<String>) -> Self {
        self.display_key = Some(display_key.into());
        self
    }

    /// Hidden values are valid selections that suggestion lists should not show.
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn highlighted(mut self) -> Self {
        self.highlighted = true;
        self
    }

    pub fn key(&self) -> &Value {
        &self.key
    }

    pub fn meta(&self) -> &Value {
        &self.meta
    }

    /// The label shown to the user, falling back to the key's text.
    pub fn display_key(&self) -> Cow<'_, str> {
        match (&self.display_key, &self.key) {
            (Some(display), _) => Cow::Borrowed(display.as_str()),
            (None, Value::String(key)) => Cow::Borrowed(key.as_str()),
            (None, key) => Cow::Owned(key.to_string()),
        }
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn is_highlighted(&self) -> bool {
        self.highlighted
    }

    /// JSON projection used in token output; omits empty metadata and unset flags.
    pub fn to_json(&self) -> Value {
        let mut object = Map::new();
        object.insert("key".to_string(), self.key.clone());
        if !self.meta.is_null() {
            object.insert("meta".to_string(), self.meta.clone());
        }
        if let Some(display) = &self.display_key {
            object.insert("displayKey".to_string(), Value::String(display.clone()));
        }
        if self.hidden {
            object.insert("hidden".to_string(), Value::Bool(true));
        }
        if self.highlighted {
            object.insert("highlighted".to_string(), Value::Bool(true));
        }
        Value::Object(object)
    }
}

impl From<&str> for ValueLike {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for ValueLike {
    fn from(key: String) -> Self {
        Self::new(key)
    }
}

impl From<i64> for ValueLike {
    fn from(key: i64) -> Self {
        Self::new(key)
    }
}

impl From<Value> for ValueLike {
    fn from(key: Value) -> Self {
        Self::new(key)
    }
}

/// Text used when a raw value doubles as a search hint.
pub fn raw_to_hint(raw: &Raw) -> String {
    match raw {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
