//! Stable type identity of a step.
//!
//! Every runtime node carries the [`NodeType`] of the blueprint node it was
//! built from. Renderer layers resolve a handler by walking
//! [`NodeType::ancestry`], so each variant declares the variant it falls back to.

use std::fmt;

/// Type tag of a step, with an explicit fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    /// Generic step; root of every fallback chain.
    State,
    /// Purely cosmetic step without a value of its own.
    Label,
    /// Invisible marker that ends a branch.
    Terminal,
    /// Choice among a list of options.
    Option,
    /// Free value with optional suggestions.
    Value,
    TextEntry,
    NumericEntry,
    CurrencyEntry,
    DateTimeEntry,
    /// Integrator-defined type.
    Custom(&'static CustomNodeType),
}

/// Declaration of an integrator-defined node type.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct CustomNodeType {
    pub name: &'static str,
    pub fallback: NodeType,
}

impl NodeType {
    pub fn name(&self) -> &'static str {
        match self {
            NodeType::State => "state",
            NodeType::Label => "label",
            NodeType::Terminal => "terminal",
            NodeType::Option => "option",
            NodeType::Value => "value",
            NodeType::TextEntry => "text-entry",
            NodeType::NumericEntry => "numeric-entry",
            NodeType::CurrencyEntry => "currency-entry",
            NodeType::DateTimeEntry => "datetime-entry",
            NodeType::Custom(custom) => custom.name,
        }
    }

    /// The type whose handler applies when none is registered for this one.
    pub fn fallback(&self) -> Option<NodeType> {
        match self {
            NodeType::State => None,
            NodeType::Label | NodeType::Terminal | NodeType::Option => Some(NodeType::State),
            NodeType::Value => Some(NodeType::Option),
            NodeType::TextEntry => Some(NodeType::Value),
            NodeType::NumericEntry | NodeType::DateTimeEntry => Some(NodeType::TextEntry),
            NodeType::CurrencyEntry => Some(NodeType::NumericEntry),
            NodeType::Custom(custom) => Some(custom.fallback),
        }
    }

    /// This type followed by each successive fallback.
    pub fn ancestry(&self) -> impl Iterator<Item = NodeType> {
        std::iter::successors(Some(*self), NodeType::fallback)
    }

    pub fn is_a(&self, other: NodeType) -> bool {
        self.ancestry().any(|t| t == other)
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static RANGE: CustomNodeType = CustomNodeType {
        name: "range",
        fallback: NodeType::NumericEntry,
    };

    #[test]
    fn currency_falls_back_through_numeric_chain() {
        let chain: Vec<_> = NodeType::CurrencyEntry.ancestry().map(|t| t.name()).collect();
        assert_eq!(
            chain,
            vec!["currency-entry", "numeric-entry", "text-entry", "value", "option", "state"]
        );
    }

    #[test]
    fn custom_types_join_builtin_chain() {
        let range = NodeType::Custom(&RANGE);
        assert_eq!(range.name(), "range");
        assert!(range.is_a(NodeType::TextEntry));
        assert!(!range.is_a(NodeType::Label));
    }
}
