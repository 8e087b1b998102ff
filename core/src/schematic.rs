use crate::template::StateTemplate;
use serde::{Deserialize, Serialize};

/// The static view of a grammar blueprint.
///
/// `Schematic` is the graph representation extracted from a [`StateTemplate`].
/// It is used for visualization, documentation and grammar review.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Schematic {
    pub name: String,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Schematic {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Node {
    /// Child-index path from the root, e.g. `0.1.0`; the root is `0`.
    pub id: String,
    pub node_type: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vkey: Option<String>,
    pub multivalue: bool,
    pub read_only: bool,
    pub terminal: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeKind {
    Next,
    BindOnly,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub kind: EdgeKind,
}

impl StateTemplate {
    pub fn schematic(&self, name: impl Into<String>) -> Schematic {
        let mut schematic = Schematic::new(name);
        collect(self, "0".to_string(), &mut schematic);
        schematic
    }
}

fn collect(template: &StateTemplate, id: String, schematic: &mut Schematic) {
    schematic.nodes.push(Node {
        id: id.clone(),
        node_type: template.node_type.name().to_string(),
        label: template.config.name.clone(),
        vkey: template.vkey.clone(),
        multivalue: template.config.multivalue,
        read_only: template.config.read_only,
        terminal: template.children.is_empty(),
    });
    for (index, child) in template.children.iter().enumerate() {
        let child_id = format!("{id}.{index}");
        schematic.edges.push(Edge {
            from: id.clone(),
            to: child_id.clone(),
            kind: if child.config.bind_only {
                EdgeKind::BindOnly
            } else {
                EdgeKind::Next
            },
        });
        collect(child, child_id, schematic);
    }
}
