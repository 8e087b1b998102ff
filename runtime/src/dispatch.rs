//! # Renderer dispatch
//!
//! The engine renders nothing itself. A UI layer registers one renderer per
//! [`NodeType`]; resolution walks the type's fallback chain until it finds a
//! registered renderer, so a `currency-entry` state is served by a
//! `numeric-entry` renderer when no dedicated one exists.

use crate::machine::TokenStateMachine;
use crate::request::Request;
use ahash::AHashMap;
use tessera_core::{NodeType, State};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("no renderer registered for node type '{node_type}' or any of its fallbacks")]
    NoRenderer { node_type: NodeType },
}

/// Read-only view handed to a renderer.
pub struct RenderContext<'a> {
    pub state: &'a State,
    pub machine: &'a TokenStateMachine,
}

/// Callbacks a renderer may fire; the owner applies them with
/// [`TokenStateMachine::handle_requests`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Requests {
    queue: Vec<Request>,
}

impl Requests {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_transition(&mut self) {
        self.queue.push(Request::Transition);
    }

    pub fn request_archive(&mut self) {
        self.queue.push(Request::Archive);
    }

    pub fn request_unarchive(&mut self) {
        self.queue.push(Request::Unarchive);
    }

    pub fn request_remove_archived_value(&mut self, index: usize) {
        self.queue.push(Request::RemoveArchivedValue(index));
    }

    pub fn request_remove_archived_values(&mut self) {
        self.queue.push(Request::RemoveArchivedValues);
    }

    pub fn request_rewind(&mut self) {
        self.queue.push(Request::Rewind);
    }

    pub fn request_focus(&mut self) {
        self.queue.push(Request::Focus);
    }

    pub fn request_blur(&mut self) {
        self.queue.push(Request::Blur);
    }

    pub fn request_cancel(&mut self) {
        self.queue.push(Request::Cancel);
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn drain(&mut self) -> impl Iterator<Item = Request> + '_ {
        self.queue.drain(..)
    }
}

pub trait Renderer: Send + Sync {
    type Output;

    fn render(&self, ctx: RenderContext<'_>, requests: &mut Requests) -> Self::Output;
}

impl<R: Renderer + ?Sized> Renderer for Box<R> {
    type Output = R::Output;

    fn render(&self, ctx: RenderContext<'_>, requests: &mut Requests) -> Self::Output {
        (**self).render(ctx, requests)
    }
}

/// Renderers keyed by node type.
pub struct RendererRegistry<R> {
    renderers: AHashMap<NodeType, R>,
}

impl<R> Default for RendererRegistry<R> {
    fn default() -> Self {
        Self {
            renderers: AHashMap::new(),
        }
    }
}

impl<R> RendererRegistry<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `renderer` for `node_type`, returning the one it replaces.
    pub fn register(&mut self, node_type: NodeType, renderer: R) -> Option<R> {
        self.renderers.insert(node_type, renderer)
    }

    pub fn with(mut self, node_type: NodeType, renderer: R) -> Self {
        self.register(node_type, renderer);
        self
    }

    /// Nearest registered renderer along `node_type`'s fallback chain.
    pub fn resolve(&self, node_type: NodeType) -> Result<&R, DispatchError> {
        node_type
            .ancestry()
            .find_map(|candidate| self.renderers.get(&candidate))
            .ok_or(DispatchError::NoRenderer { node_type })
    }

    pub fn resolve_state(&self, state: &State) -> Result<&R, DispatchError> {
        self.resolve(state.node_type())
    }

    pub fn len(&self) -> usize {
        self.renderers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.renderers.is_empty()
    }
}

impl<R: Renderer> RendererRegistry<R> {
    /// Render the machine's current state, collecting any requests raised.
    pub fn render_current(
        &self,
        machine: &TokenStateMachine,
        requests: &mut Requests,
    ) -> Result<R::Output, DispatchError> {
        let state = machine.current_state();
        let renderer = self.resolve_state(state)?;
        Ok(renderer.render(RenderContext { state, machine }, requests))
    }
}
