use crate::context::{Context, ContextEntry};
use crate::state::{State, StateId};
use crate::template::StateTemplate;
use crate::value::ValueLike;
use std::ops::{Index, IndexMut};

/// A live tree of runtime nodes, private to one token-building session.
///
/// Nodes live in an arena and refer to each other by [`StateId`]; the root is
/// always the first node.
///
/// Indexing with `tree[id]` panics when `id` does not belong to this tree, as
/// can happen when ids from two machines are mixed; use [`get`](Self::get) or
/// [`get_mut`](Self::get_mut) for ids of unknown origin.
#[derive(Debug)]
pub struct StateTree {
    states: Vec<State>,
}

impl StateTree {
    pub(crate) fn from_template(template: &StateTemplate) -> Self {
        let mut states = Vec::new();
        Self::build(template, None, &mut states);
        Self { states }
    }

    fn build(template: &StateTemplate, parent: Option<StateId>, states: &mut Vec<State>) -> StateId {
        let id = StateId(states.len());
        states.push(State::new(
            id,
            parent,
            template.vkey.clone(),
            template.node_type,
            template.config.clone(),
        ));
        for child in &template.children {
            let child_id = Self::build(child, Some(id), states);
            states[id.0].children.push(child_id);
        }
        id
    }

    pub fn root(&self) -> StateId {
        StateId(0)
    }

    /// The node for `id`, or `None` when the id lies outside this tree.
    pub fn get(&self, id: StateId) -> Option<&State> {
        self.states.get(id.0)
    }

    pub fn get_mut(&mut self, id: StateId) -> Option<&mut State> {
        self.states.get_mut(id.0)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &State> {
        self.states.iter()
    }

    pub fn parent_value(&self, id: StateId) -> Option<&ValueLike> {
        self[id].parent().and_then(|parent| self[parent].value())
    }

    /// Whether `id` may be entered from its parent's current value.
    ///
    /// The root has no guard to evaluate and is never a transition target.
    pub fn is_valid_transition(&self, id: StateId, ignore_bind_only: bool) -> bool {
        let state = &self[id];
        match state.parent() {
            Some(parent) => state.accepts_transition(self[parent].value(), ignore_bind_only),
            None => false,
        }
    }

    /// First child, in declaration order, whose guard passes.
    pub fn first_valid_child(&self, id: StateId, ignore_bind_only: bool) -> Option<StateId> {
        self[id]
            .children()
            .iter()
            .copied()
            .find(|&child| self.is_valid_transition(child, ignore_bind_only))
    }

    /// Ids from the root down to and including `id`.
    pub fn path_to(&self, id: StateId) -> Vec<StateId> {
        let mut path: Vec<StateId> =
            std::iter::successors(Some(id), |&current| self[current].parent()).collect();
        path.reverse();
        path
    }

    /// The ancestors of `id`, root first, as handed to option providers.
    pub fn context_for(&self, id: StateId) -> Context {
        let mut context = Context::new();
        let path = self.path_to(id);
        for &ancestor in &path[..path.len().saturating_sub(1)] {
            let state = &self[ancestor];
            context.push(ContextEntry {
                vkey: state.vkey().map(str::to_owned),
                name: state.name().to_string(),
                value: state.value().cloned(),
            });
        }
        context
    }

    /// Reset every node to its default value with empty preview and archive.
    pub fn reset(&mut self) {
        for state in &mut self.states {
            state.reset();
        }
    }
}

/// Panics on an id outside this tree.
impl Index<StateId> for StateTree {
    type Output = State;

    fn index(&self, id: StateId) -> &State {
        &self.states[id.0]
    }
}

impl IndexMut<StateId> for StateTree {
    fn index_mut(&mut self, id: StateId) -> &mut State {
        &mut self.states[id.0]
    }
}
