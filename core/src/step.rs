use crate::boxing::{Boxer, IdentityBoxer};
use crate::guard::Guard;
use crate::node_type::NodeType;
use crate::options::{OptionProvider, OptionSource, StaticOptions};
use crate::validate::Validator;
use crate::value::ValueLike;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Declarative configuration of one step, shared by every runtime node built
/// from it.
#[derive(Clone)]
pub struct StateConfig {
    pub(crate) name: String,
    pub(crate) guard: Guard,
    pub(crate) validator: Validator,
    pub(crate) default_value: Option<ValueLike>,
    pub(crate) read_only: bool,
    pub(crate) bind_only: bool,
    pub(crate) multivalue: bool,
    pub(crate) multivalue_limit: Option<usize>,
    pub(crate) boxer: Arc<dyn Boxer>,
    pub(crate) options: OptionSource,
    pub(crate) suggestion_limit: Option<usize>,
    pub(crate) hints: Value,
}

impl StateConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            guard: Guard::always(),
            validator: Validator::always(),
            default_value: None,
            read_only: false,
            bind_only: false,
            multivalue: false,
            multivalue_limit: None,
            boxer: Arc::new(IdentityBoxer),
            options: OptionSource::None,
            suggestion_limit: None,
            hints: Value::Null,
        }
    }

    /// Predicate over the parent's value deciding whether this step is reachable.
    pub fn guard(mut self, guard: Guard) -> Self {
        self.guard = guard;
        self
    }

    pub fn validator(mut self, validator: Validator) -> Self {
        self.validator = validator;
        self
    }

    pub fn default_value(mut self, value: impl Into<ValueLike>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Reachable only through programmatic binding, never interactively.
    pub fn bind_only(mut self) -> Self {
        self.bind_only = true;
        self
    }

    /// Collect several values through the archive, optionally capped at `limit`.
    pub fn multivalue(mut self, limit: Option<usize>) -> Self {
        self.multivalue = true;
        self.multivalue_limit = limit;
        self
    }

    pub fn boxer(mut self, boxer: impl Boxer + 'static) -> Self {
        self.boxer = Arc::new(boxer);
        self
    }

    pub fn static_options<I, V>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<ValueLike>,
    {
        self.options = OptionSource::Static(StaticOptions(options.into_iter().map(Into::into).collect()));
        self
    }

    pub fn options_provider(mut self, provider: impl OptionProvider + 'static) -> Self {
        self.options = OptionSource::Provider(Arc::new(provider));
        self
    }

    pub fn suggestion_limit(mut self, limit: usize) -> Self {
        self.suggestion_limit = Some(limit);
        self
    }

    /// Free-form presentation hints passed through to renderers
    /// (placeholder text, icon, css class...).
    pub fn hints(mut self, hints: Value) -> Self {
        self.hints = hints;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_bind_only(&self) -> bool {
        self.bind_only
    }

    pub fn is_multivalue(&self) -> bool {
        self.multivalue
    }
}

impl fmt::Debug for StateConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateConfig")
            .field("name", &self.name)
            .field("default_value", &self.default_value)
            .field("read_only", &self.read_only)
            .field("bind_only", &self.bind_only)
            .field("multivalue", &self.multivalue)
            .field("multivalue_limit", &self.multivalue_limit)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// A node type paired with its configuration, as produced by step libraries.
#[derive(Debug, Clone)]
pub struct Step {
    pub node_type: NodeType,
    pub config: StateConfig,
}

impl Step {
    pub fn new(node_type: NodeType, config: StateConfig) -> Self {
        Self { node_type, config }
    }

    /// Adjust the configuration, e.g. `step.configure(|c| c.guard(g))`.
    pub fn configure(mut self, f: impl FnOnce(StateConfig) -> StateConfig) -> Self {
        self.config = f(self.config);
        self
    }
}
