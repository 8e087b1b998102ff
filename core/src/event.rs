//! Observer notifications for runtime nodes.
//!
//! Listeners are registered on an [`Emitter`] and run synchronously, in
//! registration order, after the mutation they describe is complete.

use crate::value::{Raw, ValueLike};
use std::fmt;
use std::sync::Arc;

pub type Listener<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// Handle returned by [`Emitter::on`], used to unregister a listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// An explicit listener list.
pub struct Emitter<E> {
    listeners: Vec<(ListenerId, Listener<E>)>,
    next_id: u64,
}

impl<E> Emitter<E> {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
            next_id: 0,
        }
    }

    pub fn on<F>(&mut self, listener: F) -> ListenerId
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Arc::new(listener)));
        id
    }

    pub fn off(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    pub fn emit(&self, event: &E) {
        for (_, listener) in &self.listeners {
            listener(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl<E> Default for Emitter<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for Emitter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("listener_count", &self.listeners.len())
            .finish()
    }
}

/// Notifications emitted by a single runtime node.
#[derive(Debug, Clone, PartialEq)]
pub enum StateEvent {
    ValueChanged {
        new: Option<ValueLike>,
        old: Option<ValueLike>,
        new_unboxed: Raw,
        old_unboxed: Raw,
    },
    PreviewValueChanged {
        new: Option<ValueLike>,
        old: Option<ValueLike>,
        new_unboxed: Raw,
        old_unboxed: Raw,
    },
    ValueArchived,
    ValueUnarchived,
    /// Fired before boxing, even when boxing yields no effective change.
    UnboxedValueChangeAttempted {
        new_unboxed: Raw,
        old_unboxed: Raw,
    },
    ArchivedValueRemoved {
        index: usize,
        value: ValueLike,
    },
    ArchivedValuesRemoved {
        values: Vec<ValueLike>,
    },
}

impl StateEvent {
    pub fn name(&self) -> &'static str {
        match self {
            StateEvent::ValueChanged { .. } => "value changed",
            StateEvent::PreviewValueChanged { .. } => "preview value changed",
            StateEvent::ValueArchived => "value archived",
            StateEvent::ValueUnarchived => "value unarchived",
            StateEvent::UnboxedValueChangeAttempted { .. } => "unboxed value change attempted",
            StateEvent::ArchivedValueRemoved { .. } => "archived value removed",
            StateEvent::ArchivedValuesRemoved { .. } => "archived values removed",
        }
    }
}
