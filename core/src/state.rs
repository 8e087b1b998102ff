//! # State: one live step of a token under construction
//!
//! A `State` holds a step's in-progress value, its transient preview, the
//! archive of committed values for multivalue steps, and the option list used
//! for suggestions. Every mutation completes before its events are emitted,
//! so listeners never observe a half-updated value/archive pair.

use crate::context::Context;
use crate::error::{ArchiveError, StateError};
use crate::event::{Emitter, ListenerId, StateEvent};
use crate::node_type::NodeType;
use crate::options::OptionStore;
use crate::step::StateConfig;
use crate::value::{Raw, ValueLike, raw_to_hint};
use serde_json::Value;
use std::fmt;

/// Index of a runtime node within its [`StateTree`](crate::tree::StateTree).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateId(pub(crate) usize);

impl StateId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

pub struct State {
    id: StateId,
    parent: Option<StateId>,
    pub(crate) children: Vec<StateId>,
    vkey: Option<String>,
    node_type: NodeType,
    config: StateConfig,
    value: Option<ValueLike>,
    preview_value: Option<ValueLike>,
    archive: Vec<ValueLike>,
    initialized: bool,
    options: OptionStore,
    events: Emitter<StateEvent>,
}

impl State {
    pub(crate) fn new(
        id: StateId,
        parent: Option<StateId>,
        vkey: Option<String>,
        node_type: NodeType,
        config: StateConfig,
    ) -> Self {
        let options = OptionStore::new(config.options.clone(), config.suggestion_limit);
        Self {
            id,
            parent,
            children: Vec::new(),
            vkey,
            node_type,
            value: config.default_value.clone(),
            preview_value: None,
            archive: Vec::new(),
            initialized: false,
            options,
            events: Emitter::new(),
            config,
        }
    }

    pub fn id(&self) -> StateId {
        self.id
    }

    pub fn parent(&self) -> Option<StateId> {
        self.parent
    }

    pub fn children(&self) -> &[StateId] {
        &self.children
    }

    pub fn vkey(&self) -> Option<&str> {
        self.vkey.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Type identity used by renderer registries.
    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    pub fn is_read_only(&self) -> bool {
        self.config.read_only
    }

    pub fn is_bind_only(&self) -> bool {
        self.config.bind_only
    }

    pub fn is_multivalue(&self) -> bool {
        self.config.multivalue
    }

    pub fn multivalue_limit(&self) -> Option<usize> {
        self.config.multivalue_limit
    }

    pub fn default_value(&self) -> Option<&ValueLike> {
        self.config.default_value.as_ref()
    }

    pub fn hints(&self) -> &Value {
        &self.config.hints
    }

    pub fn is_terminal(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn options(&self) -> &OptionStore {
        &self.options
    }

    pub fn on<F>(&mut self, listener: F) -> ListenerId
    where
        F: Fn(&StateEvent) + Send + Sync + 'static,
    {
        self.events.on(listener)
    }

    pub fn off(&mut self, id: ListenerId) -> bool {
        self.events.off(id)
    }

    // --- Boxing ---

    pub fn box_value(&self, raw: &Raw) -> Option<ValueLike> {
        self.options
            .with_options(|options| self.config.boxer.box_value(raw, options))
    }

    pub fn unbox_value(&self, value: &ValueLike) -> Raw {
        self.config.boxer.unbox_value(value)
    }

    fn unbox_opt(&self, value: Option<&ValueLike>) -> Raw {
        value.map_or(Value::Null, |v| self.unbox_value(v))
    }

    // --- Value and preview ---

    pub fn value(&self) -> Option<&ValueLike> {
        self.value.as_ref()
    }

    pub fn unboxed_value(&self) -> Raw {
        self.unbox_opt(self.value.as_ref())
    }

    pub fn set_value(&mut self, value: Option<ValueLike>) {
        let old = std::mem::replace(&mut self.value, value);
        self.emit_value_changed(old);
    }

    /// Box `raw` and make it the current value.
    ///
    /// Returns the resulting value; `None` when `raw` is null or has no boxed form.
    /// A raw array on a multivalue state is refused and leaves the value as is.
    pub fn set_unboxed_value(&mut self, raw: Raw) -> Option<&ValueLike> {
        self.events.emit(&StateEvent::UnboxedValueChangeAttempted {
            new_unboxed: raw.clone(),
            old_unboxed: self.unboxed_value(),
        });
        if self.config.multivalue && raw.is_array() {
            tracing::warn!(
                state = %self.config.name,
                "Multivalue states take one value at a time; archive each entry instead"
            );
            return None;
        }
        let boxed = self.box_value(&raw);
        self.set_value(boxed);
        self.value.as_ref()
    }

    pub fn preview_value(&self) -> Option<&ValueLike> {
        self.preview_value.as_ref()
    }

    pub fn unboxed_preview_value(&self) -> Raw {
        self.unbox_opt(self.preview_value.as_ref())
    }

    /// Show a candidate without committing it; never touches value or archive.
    pub fn set_preview_value(&mut self, preview: Option<ValueLike>) {
        let old = std::mem::replace(&mut self.preview_value, preview);
        self.emit_preview_changed(old);
    }

    pub fn set_unboxed_preview_value(&mut self, raw: Raw) {
        let boxed = self.box_value(&raw);
        self.set_preview_value(boxed);
    }

    fn emit_value_changed(&self, old: Option<ValueLike>) {
        if old == self.value {
            return;
        }
        self.events.emit(&StateEvent::ValueChanged {
            new: self.value.clone(),
            new_unboxed: self.unboxed_value(),
            old_unboxed: self.unbox_opt(old.as_ref()),
            old,
        });
    }

    fn emit_preview_changed(&self, old: Option<ValueLike>) {
        if old == self.preview_value {
            return;
        }
        self.events.emit(&StateEvent::PreviewValueChanged {
            new: self.preview_value.clone(),
            new_unboxed: self.unboxed_preview_value(),
            old_unboxed: self.unbox_opt(old.as_ref()),
            old,
        });
    }

    // --- Validation and reachability ---

    /// Run the validator against the committed value and archive.
    ///
    /// Validator errors are logged with the state's name and propagated.
    pub fn is_valid(&self) -> Result<bool, StateError> {
        self.config
            .validator
            .validate(self.value.as_ref(), &self.archive)
            .map_err(|source| {
                tracing::error!(state = %self.config.name, error = %source, "Validator raised an error");
                StateError::Validator {
                    state: self.config.name.clone(),
                    source,
                }
            })
    }

    /// Whether this state may be entered given its parent's value.
    pub fn accepts_transition(&self, parent_value: Option<&ValueLike>, ignore_bind_only: bool) -> bool {
        if self.config.bind_only && !ignore_bind_only {
            return false;
        }
        self.config.guard.check(parent_value)
    }

    // --- Multivalue archive ---

    pub fn archive(&self) -> &[ValueLike] {
        &self.archive
    }

    fn archive_error(&self, build: impl FnOnce(String) -> ArchiveError) -> ArchiveError {
        build(self.config.name.clone())
    }

    /// Commit the current value to the archive and start a fresh one.
    pub fn archive_value(&mut self) -> Result<(), StateError> {
        if !self.config.multivalue {
            return Err(self.archive_error(|state| ArchiveError::NotMultivalue { state }).into());
        }
        if !self.is_valid()? {
            let value = self.unboxed_value().to_string();
            return Err(self.archive_error(|state| ArchiveError::InvalidValue { state, value }).into());
        }
        if let Some(limit) = self.config.multivalue_limit {
            if self.archive.len() >= limit {
                return Err(self.archive_error(|state| ArchiveError::LimitReached { state, limit }).into());
            }
        }
        let Some(archived) = self.value.take() else {
            return Err(self.archive_error(|state| ArchiveError::NoValue { state }).into());
        };

        self.archive.push(archived.clone());
        self.value = self.config.default_value.clone();
        let old_preview = self.preview_value.take();

        self.emit_value_changed(Some(archived));
        self.emit_preview_changed(old_preview);
        self.events.emit(&StateEvent::ValueArchived);
        Ok(())
    }

    /// Restore the most recently archived value (LIFO), replacing the current one.
    pub fn unarchive_value(&mut self) -> Result<(), ArchiveError> {
        let Some(restored) = self.archive.pop() else {
            return Err(self.archive_error(|state| ArchiveError::Empty { state }));
        };
        let old = self.value.replace(restored);
        self.emit_value_changed(old);
        self.events.emit(&StateEvent::ValueUnarchived);
        Ok(())
    }

    pub fn remove_archived_value(&mut self, index: usize) -> Result<ValueLike, ArchiveError> {
        if index >= self.archive.len() {
            let len = self.archive.len();
            return Err(self.archive_error(|state| ArchiveError::IndexOutOfRange { state, index, len }));
        }
        let value = self.archive.remove(index);
        self.events.emit(&StateEvent::ArchivedValueRemoved {
            index,
            value: value.clone(),
        });
        Ok(value)
    }

    pub fn remove_archived_values(&mut self) -> Vec<ValueLike> {
        let values = std::mem::take(&mut self.archive);
        if !values.is_empty() {
            self.events.emit(&StateEvent::ArchivedValuesRemoved {
                values: values.clone(),
            });
        }
        values
    }

    // --- Lifecycle ---

    /// One-shot hydration run when this state becomes active.
    ///
    /// Loads the unfiltered option list and then applies `initial_value`.
    /// Only when the value has no boxed form in that list are the options
    /// fetched again with the value's text as the hint. Subsequent calls are
    /// no-ops until [`reset`](Self::reset).
    pub async fn initialize(&mut self, context: &Context, initial_value: Option<&Raw>) -> Result<(), StateError> {
        if self.initialized {
            return Ok(());
        }
        self.hydrate_options("", context).await?;
        if let Some(raw) = initial_value {
            let hint = raw_to_hint(raw);
            if self.set_unboxed_value(raw.clone()).is_none() && !hint.is_empty() && self.options.has_source() {
                self.hydrate_options(&hint, context).await?;
                self.set_unboxed_value(raw.clone());
            }
        }
        self.initialized = true;
        tracing::debug!(state = %self.config.name, id = %self.id, "State initialized");
        Ok(())
    }

    async fn hydrate_options(&self, hint: &str, context: &Context) -> Result<(), StateError> {
        self.options
            .refresh(hint, context, &self.archive)
            .await
            .map(|_| ())
            .map_err(|source| StateError::Hydration {
                state: self.config.name.clone(),
                source,
            })
    }

    /// Restore the default value and clear preview, archive and initialisation.
    pub fn reset(&mut self) {
        let archived = std::mem::take(&mut self.archive);
        let old = std::mem::replace(&mut self.value, self.config.default_value.clone());
        let old_preview = self.preview_value.take();
        self.initialized = false;
        self.options.reset();

        self.emit_value_changed(old);
        self.emit_preview_changed(old_preview);
        if !archived.is_empty() {
            self.events
                .emit(&StateEvent::ArchivedValuesRemoved { values: archived });
        }
    }
}

impl fmt::Debug for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("id", &self.id)
            .field("name", &self.config.name)
            .field("vkey", &self.vkey)
            .field("node_type", &self.node_type)
            .field("value", &self.value)
            .field("archive", &self.archive)
            .field("children", &self.children)
            .finish_non_exhaustive()
    }
}
