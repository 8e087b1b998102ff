use crate::value::ValueLike;

/// One ancestor step as seen by option providers.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextEntry {
    pub vkey: Option<String>,
    pub name: String,
    pub value: Option<ValueLike>,
}

/// The values chosen so far on the way to a step, ordered from the root.
///
/// Option providers use it to tailor suggestions to earlier choices, e.g.
/// offering relations that fit the selected field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    entries: Vec<ContextEntry>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: ContextEntry) {
        self.entries.push(entry);
    }

    /// Value of the nearest ancestor stored under `vkey`.
    pub fn get(&self, vkey: &str) -> Option<&ValueLike> {
        self.entries
            .iter()
            .rev()
            .find(|entry| entry.vkey.as_deref() == Some(vkey))
            .and_then(|entry| entry.value.as_ref())
    }

    pub fn entries(&self) -> &[ContextEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
