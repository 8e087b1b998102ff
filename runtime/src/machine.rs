//! # TokenStateMachine: one token-building session
//!
//! The machine owns a private [`StateTree`] instantiated from a blueprint and
//! a cursor on its active node. Interactive input advances the cursor with
//! [`transition`](TokenStateMachine::transition), which commits to the first
//! child (in declaration order) whose guard accepts the current value.
//!
//! The machine is not meant for concurrent use: callers serialize interaction
//! with one instance, which `&mut self` on every mutating method enforces.

use crate::config::MachineConfig;
use crate::error::{MachineError, TransitionError};
use crate::event::MachineEvent;
use serde_json::Value;
use tessera_core::event::Emitter;
use tessera_core::{ListenerId, Raw, State, StateId, StateTemplate, StateTree, TokenValue, ValueLike};
use tracing::Instrument;
use uuid::Uuid;

pub struct TokenStateMachine {
    pub(crate) id: Uuid,
    pub(crate) tree: StateTree,
    pub(crate) current: StateId,
    pub(crate) events: Emitter<MachineEvent>,
    pub(crate) config: MachineConfig,
}

impl TokenStateMachine {
    pub fn new(template: &StateTemplate) -> Self {
        Self::with_config(template, MachineConfig::default())
    }

    pub fn with_config(template: &StateTemplate, config: MachineConfig) -> Self {
        let tree = template.instantiate();
        let current = tree.root();
        let id = Uuid::new_v4();
        tracing::debug!(machine = %id, states = tree.len(), "Machine created");
        Self {
            id,
            tree,
            current,
            events: Emitter::new(),
            config,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    pub fn tree(&self) -> &StateTree {
        &self.tree
    }

    pub fn root_state(&self) -> &State {
        &self.tree[self.tree.root()]
    }

    pub fn current_id(&self) -> StateId {
        self.current
    }

    pub fn current_state(&self) -> &State {
        &self.tree[self.current]
    }

    /// Mutable access to the active node, for its value and preview setters.
    pub fn current_state_mut(&mut self) -> &mut State {
        &mut self.tree[self.current]
    }

    pub fn is_terminal(&self) -> bool {
        self.current_state().is_terminal()
    }

    pub fn on<F>(&mut self, listener: F) -> ListenerId
    where
        F: Fn(&MachineEvent) + Send + Sync + 'static,
    {
        self.events.on(listener)
    }

    pub fn off(&mut self, id: ListenerId) -> bool {
        self.events.off(id)
    }

    // --- Traversal ---

    /// Advance to the first child accepting the current value.
    ///
    /// Bind-only children are skipped. Fails without moving when the current
    /// state is invalid or no child accepts its value.
    pub fn transition(&mut self) -> Result<StateId, MachineError> {
        self.advance(false)
    }

    pub(crate) fn advance(&mut self, ignore_bind_only: bool) -> Result<StateId, MachineError> {
        let state = &self.tree[self.current];
        if !state.is_valid()? {
            return Err(TransitionError::InvalidState {
                state: state.name().to_string(),
                value: state.unboxed_value(),
            }
            .into());
        }
        let Some(next) = self.tree.first_valid_child(self.current, ignore_bind_only) else {
            return Err(TransitionError::NoMatchingChild {
                state: state.name().to_string(),
                value: state.unboxed_value(),
            }
            .into());
        };
        let from = std::mem::replace(&mut self.current, next);
        tracing::debug!(
            machine = %self.id,
            from = %self.tree[from].name(),
            to = %self.tree[next].name(),
            "Transitioned"
        );
        self.events.emit(&MachineEvent::StateChanged { from, to: next });
        if self.tree[next].is_terminal() {
            let value = self.unboxed_value();
            tracing::info!(machine = %self.id, token = %serde_json::Value::Object(value.clone()), "Token complete");
            self.events.emit(&MachineEvent::EndToken { value });
        }
        Ok(next)
    }

    /// Step back to the parent without validating the current state.
    ///
    /// Returns `None` at the root, where the caller should cancel the token
    /// instead. Values entered on the departed state are kept.
    pub fn rewind(&mut self) -> Option<StateId> {
        let parent = self.current_state().parent()?;
        let from = std::mem::replace(&mut self.current, parent);
        tracing::debug!(machine = %self.id, from = %self.tree[from].name(), "Rewound");
        self.events.emit(&MachineEvent::StateChanged { from, to: parent });
        Some(parent)
    }

    /// Return to the root and clear every value, preview and archive.
    pub fn reset(&mut self) {
        self.tree.reset();
        let root = self.tree.root();
        let from = std::mem::replace(&mut self.current, root);
        if from != root {
            self.events.emit(&MachineEvent::StateChanged { from, to: root });
        }
    }

    /// Hydrate the active state, typically right after it became active.
    pub async fn initialize_current(&mut self, initial_value: Option<&Raw>) -> Result<(), MachineError> {
        let context = self.tree.context_for(self.current);
        let span = tracing::info_span!("Initialize", machine = %self.id, state = %self.current);
        self.tree[self.current]
            .initialize(&context, initial_value)
            .instrument(span)
            .await?;
        Ok(())
    }

    // --- Multivalue archive ---

    pub fn archive(&mut self) -> Result<(), MachineError> {
        self.tree[self.current].archive_value()?;
        self.events.emit(&MachineEvent::ValueArchived { state: self.current });
        Ok(())
    }

    pub fn unarchive(&mut self) -> Result<(), MachineError> {
        self.tree[self.current].unarchive_value()?;
        self.events.emit(&MachineEvent::ValueUnarchived { state: self.current });
        Ok(())
    }

    pub fn remove_archived_value(&mut self, index: usize) -> Result<ValueLike, MachineError> {
        let value = self.tree[self.current].remove_archived_value(index)?;
        self.events.emit(&MachineEvent::ArchivedValueRemoved {
            state: self.current,
            index,
            value: value.clone(),
        });
        Ok(value)
    }

    pub fn remove_archived_values(&mut self) -> Vec<ValueLike> {
        let values = self.tree[self.current].remove_archived_values();
        if !values.is_empty() {
            self.events.emit(&MachineEvent::ArchivedValuesRemoved {
                state: self.current,
                values: values.clone(),
            });
        }
        values
    }

    // --- Output ---

    /// Boxed token so far: `{vkey: {"key": .., ..}}` for every state with a
    /// vkey from the root to the current state.
    pub fn value(&self) -> TokenValue {
        self.collect(|_, value| value.to_json())
    }

    /// Unboxed token so far, in the shape accepted by `bind_values`.
    pub fn unboxed_value(&self) -> TokenValue {
        self.collect(|state, value| state.unbox_value(value))
    }

    fn collect(&self, project: impl Fn(&State, &ValueLike) -> Value) -> TokenValue {
        let mut token = TokenValue::new();
        for id in self.tree.path_to(self.current) {
            let state = &self.tree[id];
            let Some(vkey) = state.vkey() else {
                continue;
            };
            let entry = if state.is_multivalue() {
                Value::Array(
                    state
                        .archive()
                        .iter()
                        .chain(state.value())
                        .map(|value| project(state, value))
                        .collect(),
                )
            } else {
                state.value().map_or(Value::Null, |value| project(state, value))
            };
            token.insert(vkey.to_string(), entry);
        }
        token
    }
}

impl std::fmt::Debug for TokenStateMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStateMachine")
            .field("id", &self.id)
            .field("current", &self.current)
            .field("tree", &self.tree)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use serde_json::json;
    use std::sync::Arc;
    use tessera_core::guard::option_key_is;
    use tessera_core::{ArchiveError, NodeType, OptionBoxer, StateConfig, Validator};

    fn options(name: &str, keys: &[&str]) -> StateConfig {
        StateConfig::new(name)
            .static_options(keys.iter().copied())
            .boxer(OptionBoxer::default())
            .validator(Validator::required())
    }

    fn required(name: &str) -> StateConfig {
        StateConfig::new(name).validator(Validator::required())
    }

    fn record(machine: &mut TokenStateMachine) -> Arc<Mutex<Vec<MachineEvent>>> {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = log.clone();
        machine.on(move |event| sink.lock().push(event.clone()));
        log
    }

    #[test]
    fn transition_refuses_invalid_state() {
        let template = StateTemplate::start("field", NodeType::Option, options("Field", &["Age"]))
            .to("value", NodeType::Value, required("Value"))
            .build();
        let mut machine = TokenStateMachine::new(&template);

        let err = machine.transition().unwrap_err();

        assert!(matches!(
            err,
            MachineError::Transition(TransitionError::InvalidState { ref state, value: Value::Null }) if state == "Field"
        ));
        assert_eq!(machine.current_id(), machine.tree().root());
    }

    #[test]
    fn earliest_declared_matching_child_wins() {
        let template = StateTemplate::start("field", NodeType::Option, options("Field", &["Age"])).branch([
            StateTemplate::start("first", NodeType::Value, StateConfig::new("First").guard(option_key_is("Age"))),
            StateTemplate::start("second", NodeType::Value, StateConfig::new("Second")),
        ]);
        let mut machine = TokenStateMachine::new(&template);
        machine.current_state_mut().set_unboxed_value(json!("Age"));

        machine.transition().unwrap();

        assert_eq!(machine.current_state().name(), "First");
    }

    #[test]
    fn transition_at_leaf_has_no_matching_child() {
        let template = StateTemplate::start("field", NodeType::Value, StateConfig::new("Only")).build();
        let mut machine = TokenStateMachine::new(&template);
        machine.current_state_mut().set_unboxed_value(json!("x"));

        let err = machine.transition().unwrap_err();

        assert!(matches!(err, MachineError::Transition(TransitionError::NoMatchingChild { .. })));
        assert!(err.is_recoverable());
    }

    #[test]
    fn entering_terminal_emits_end_token_with_value() {
        let template = StateTemplate::start("field", NodeType::Value, required("Field"))
            .to(None, NodeType::Terminal, StateConfig::new("End"))
            .build();
        let mut machine = TokenStateMachine::new(&template);
        let log = record(&mut machine);
        machine.current_state_mut().set_unboxed_value(json!("x"));

        machine.transition().unwrap();

        assert!(machine.is_terminal());
        let names: Vec<_> = log.lock().iter().map(MachineEvent::name).collect();
        assert_eq!(names, vec!["state changed", "end token"]);
        let mut expected = TokenValue::new();
        expected.insert("field".into(), json!("x"));
        assert_eq!(log.lock()[1], MachineEvent::EndToken { value: expected });
    }

    #[test]
    fn rewind_at_root_is_a_no_op() {
        let template = StateTemplate::start("field", NodeType::Value, StateConfig::new("Field"))
            .to("value", NodeType::Value, StateConfig::new("Value"))
            .build();
        let mut machine = TokenStateMachine::new(&template);
        machine.current_state_mut().set_unboxed_value(json!("a"));
        let log = record(&mut machine);
        let before = machine.unboxed_value();

        assert_eq!(machine.rewind(), None);
        assert_eq!(machine.current_id(), machine.tree().root());
        assert_eq!(machine.unboxed_value(), before);
        assert!(log.lock().is_empty());
    }

    #[test]
    fn rewind_keeps_departed_value() {
        let template = StateTemplate::start("field", NodeType::Value, StateConfig::new("Field"))
            .to("value", NodeType::Value, StateConfig::new("Value"))
            .build();
        let mut machine = TokenStateMachine::new(&template);
        machine.current_state_mut().set_unboxed_value(json!("a"));
        let child = machine.transition().unwrap();
        machine.current_state_mut().set_unboxed_value(json!("b"));

        assert_eq!(machine.rewind(), Some(machine.tree().root()));
        assert_eq!(machine.tree()[child].unboxed_value(), json!("b"));
        assert_eq!(Value::Object(machine.unboxed_value()), json!({"field": "a"}));
    }

    #[test]
    fn output_lists_archive_then_in_progress_value() {
        let template = StateTemplate::start("tags", NodeType::Value, StateConfig::new("Tags").multivalue(Some(2)))
            .build();
        let mut machine = TokenStateMachine::new(&template);
        let log = record(&mut machine);
        for tag in ["a", "b"] {
            machine.current_state_mut().set_unboxed_value(json!(tag));
            machine.archive().unwrap();
        }
        machine.current_state_mut().set_unboxed_value(json!("c"));

        let err = machine.archive().unwrap_err();

        assert!(matches!(err, MachineError::Archive(ArchiveError::LimitReached { limit: 2, .. })));
        assert_eq!(Value::Object(machine.unboxed_value()), json!({"tags": ["a", "b", "c"]}));
        assert_eq!(
            Value::Object(machine.value()),
            json!({"tags": [{"key": "a"}, {"key": "b"}, {"key": "c"}]})
        );
        assert_eq!(
            log.lock().iter().filter(|e| e.name() == "value archived").count(),
            2
        );
    }

    #[test]
    fn archive_maintenance_emits_machine_events() {
        let template = StateTemplate::start("tags", NodeType::Value, StateConfig::new("Tags").multivalue(None)).build();
        let mut machine = TokenStateMachine::new(&template);
        for tag in ["a", "b", "c"] {
            machine.current_state_mut().set_unboxed_value(json!(tag));
            machine.archive().unwrap();
        }
        let log = record(&mut machine);

        machine.unarchive().unwrap();
        assert_eq!(machine.remove_archived_value(0).unwrap(), ValueLike::new("a"));
        assert!(matches!(
            machine.remove_archived_value(5),
            Err(MachineError::Archive(ArchiveError::IndexOutOfRange { .. }))
        ));
        assert_eq!(machine.remove_archived_values(), vec![ValueLike::new("b")]);
        assert!(machine.remove_archived_values().is_empty());

        let names: Vec<_> = log.lock().iter().map(MachineEvent::name).collect();
        assert_eq!(
            names,
            vec!["value unarchived", "archived value removed", "archived values removed"]
        );
    }

    #[test]
    fn validator_defect_is_not_recoverable() {
        let template = StateTemplate::start(
            "field",
            NodeType::Value,
            StateConfig::new("Broken").validator(Validator::try_new(|_, _| {
                anyhow::bail!("no rules loaded")
            })),
        )
        .to("value", NodeType::Value, StateConfig::new("Value"))
        .build();
        let mut machine = TokenStateMachine::new(&template);

        let err = machine.transition().unwrap_err();

        assert!(matches!(err, MachineError::Validator { ref state, .. } if state == "Broken"));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn reset_returns_to_root_and_clears_values() {
        let template = StateTemplate::start("field", NodeType::Value, StateConfig::new("Field"))
            .to("tags", NodeType::Value, StateConfig::new("Tags").multivalue(None))
            .build();
        let mut machine = TokenStateMachine::new(&template);
        machine.current_state_mut().set_unboxed_value(json!("a"));
        let tags = machine.transition().unwrap();
        machine.current_state_mut().set_unboxed_value(json!("t"));
        machine.archive().unwrap();
        let log = record(&mut machine);

        machine.reset();

        assert_eq!(machine.current_id(), machine.tree().root());
        assert!(machine.tree()[tags].archive().is_empty());
        assert_eq!(Value::Object(machine.unboxed_value()), json!({"field": null}));
        assert_eq!(
            log.lock().clone(),
            vec![MachineEvent::StateChanged {
                from: tags,
                to: machine.tree().root()
            }]
        );
    }

    #[tokio::test]
    async fn initialize_current_hydrates_with_ancestor_context() {
        use futures_util::FutureExt;
        use tessera_core::options::provider_fn;

        let template = StateTemplate::start("field", NodeType::Value, StateConfig::new("Field"))
            .to(
                "relation",
                NodeType::Option,
                StateConfig::new("Relation").options_provider(provider_fn(|_hint, context, _archive| {
                    let numeric = context.get("field") == Some(&ValueLike::new("Age"));
                    async move {
                        let keys: &[&str] = if numeric { &["between", "equals"] } else { &["is"] };
                        Ok::<_, anyhow::Error>(keys.iter().map(|k| ValueLike::new(*k)).collect())
                    }
                    .boxed()
                })),
            )
            .build();
        let mut machine = TokenStateMachine::new(&template);
        machine.current_state_mut().set_unboxed_value(json!("Age"));
        machine.transition().unwrap();

        machine.initialize_current(None).await.unwrap();

        assert_eq!(
            machine.current_state().options().options(),
            vec![ValueLike::new("between"), ValueLike::new("equals")]
        );
    }
}
