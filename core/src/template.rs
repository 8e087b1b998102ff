//! # StateTemplate: the grammar blueprint
//!
//! A blueprint is declared once, at language-definition time, and then
//! instantiated into a fresh [`StateTree`] for every token-building session.
//!
//! * **Builder pattern**: `StateTemplate::start(..).to(..).branch([..])`
//! * **Immutable**: once built, a template exposes no way to change it, so it
//!   can be shared (e.g. behind an `Arc`) by any number of sessions
//! * **Tree, not DAG**: children are owned, so cycles and shared subtrees
//!   cannot be expressed

use crate::node_type::NodeType;
use crate::step::{StateConfig, Step};
use crate::tree::StateTree;

#[derive(Debug, Clone)]
pub struct StateTemplate {
    pub(crate) vkey: Option<String>,
    pub(crate) node_type: NodeType,
    pub(crate) config: StateConfig,
    pub(crate) children: Vec<StateTemplate>,
}

impl StateTemplate {
    /// Start a chain at a root step.
    ///
    /// Steps without a `vkey` are cosmetic: they never appear in the token output.
    pub fn start<'a>(
        vkey: impl Into<Option<&'a str>>,
        node_type: NodeType,
        config: StateConfig,
    ) -> TemplateChain {
        TemplateChain {
            root: Self::node(vkey.into(), node_type, config),
            links: Vec::new(),
        }
    }

    pub fn from_step<'a>(vkey: impl Into<Option<&'a str>>, step: Step) -> TemplateChain {
        Self::start(vkey, step.node_type, step.config)
    }

    fn node(vkey: Option<&str>, node_type: NodeType, config: StateConfig) -> Self {
        Self {
            vkey: vkey.map(str::to_owned),
            node_type,
            config,
            children: Vec::new(),
        }
    }

    pub fn vkey(&self) -> Option<&str> {
        self.vkey.as_deref()
    }

    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    pub fn config(&self) -> &StateConfig {
        &self.config
    }

    pub fn children(&self) -> &[StateTemplate] {
        &self.children
    }

    /// Number of steps in this blueprint.
    pub fn len(&self) -> usize {
        1 + self.children.iter().map(StateTemplate::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Build a fresh, independently mutable runtime tree.
    pub fn instantiate(&self) -> StateTree {
        StateTree::from_template(self)
    }
}

/// A linear run of steps whose tail is still open for extension.
#[derive(Debug, Clone)]
pub struct TemplateChain {
    root: StateTemplate,
    links: Vec<StateTemplate>,
}

impl TemplateChain {
    /// Append one linear child to the tail of the chain.
    pub fn to<'a>(mut self, vkey: impl Into<Option<&'a str>>, node_type: NodeType, config: StateConfig) -> Self {
        self.links.push(StateTemplate::node(vkey.into(), node_type, config));
        self
    }

    pub fn then<'a>(self, vkey: impl Into<Option<&'a str>>, step: Step) -> Self {
        self.to(vkey, step.node_type, step.config)
    }

    /// Close the chain with several divergent next steps, tried in order.
    pub fn branch<I>(self, subtrees: I) -> StateTemplate
    where
        I: IntoIterator,
        I::Item: Into<StateTemplate>,
    {
        let mut children: Vec<StateTemplate> = subtrees.into_iter().map(Into::into).collect();
        for mut link in self.links.into_iter().rev() {
            link.children = children;
            children = vec![link];
        }
        let mut root = self.root;
        root.children = children;
        root
    }

    pub fn build(self) -> StateTemplate {
        self.branch(std::iter::empty::<StateTemplate>())
    }
}

impl From<TemplateChain> for StateTemplate {
    fn from(chain: TemplateChain) -> Self {
        chain.build()
    }
}
