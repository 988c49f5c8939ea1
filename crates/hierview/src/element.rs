//! Graph elements handed to a graph consumer.
//!
//! Elements serialize in the shape Cytoscape-style renderers accept:
//!
//! ```json
//! { "group": "nodes", "data": { "id": "cpu0_CPU", "label": "cpu0 (CPU)", ... } }
//! { "group": "edges", "data": { "source": "cpu0_CPU", "target": "cpu0_CPU::alu0_ALU", "label": "instantiates" } }
//! ```

use serde::Serialize;

use hierview_core::{design::Instance, identifier::Id};

/// Label carried by every tree-mode edge.
pub const INSTANTIATES: &str = "instantiates";

/// One node or edge of a transformed design.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "group", content = "data")]
pub enum GraphElement {
    #[serde(rename = "nodes")]
    Node(NodeElement),

    #[serde(rename = "edges")]
    Edge(EdgeElement),
}

impl GraphElement {
    /// Returns the node if this element is one.
    pub fn as_node(&self) -> Option<&NodeElement> {
        match self {
            Self::Node(node) => Some(node),
            Self::Edge(_) => None,
        }
    }

    /// Returns the edge if this element is one.
    pub fn as_edge(&self) -> Option<&EdgeElement> {
        match self {
            Self::Node(_) => None,
            Self::Edge(edge) => Some(edge),
        }
    }
}

/// A design instance rendered as a graph node.
///
/// `parent` is only set in containment mode and names the node that
/// structurally encloses this one.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeElement {
    id: Id,
    label: String,
    module_type: String,
    instance_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent: Option<Id>,
}

impl NodeElement {
    pub(crate) fn from_instance(id: Id, instance: &Instance, parent: Option<Id>) -> Self {
        Self {
            id,
            label: format!("{} ({})", instance.instance_name(), instance.module_type()),
            module_type: instance.module_type().to_string(),
            instance_name: instance.instance_name().to_string(),
            parent,
        }
    }

    pub fn id(&self) -> Id {
        self.id
    }

    /// Display label, `"{instance_name} ({module_type})"`.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn module_type(&self) -> &str {
        &self.module_type
    }

    pub fn instance_name(&self) -> &str {
        &self.instance_name
    }

    /// Enclosing node in containment mode.
    pub fn parent(&self) -> Option<Id> {
        self.parent
    }
}

/// An "instantiates" relation from a parent instance to one of its children.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeElement {
    source: Id,
    target: Id,
    label: &'static str,
}

impl EdgeElement {
    pub(crate) fn instantiates(source: Id, target: Id) -> Self {
        Self {
            source,
            target,
            label: INSTANTIATES,
        }
    }

    pub fn source(&self) -> Id {
        self.source
    }

    pub fn target(&self) -> Id {
        self.target
    }

    pub fn label(&self) -> &str {
        self.label
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_node_label_format() {
        let instance = Instance::new("cpu0", "CPU");
        let node = NodeElement::from_instance(Id::new("cpu0_CPU"), &instance, None);

        assert_eq!(node.label(), "cpu0 (CPU)");
        assert_eq!(node.instance_name(), "cpu0");
        assert_eq!(node.module_type(), "CPU");
        assert_eq!(node.parent(), None);
    }

    #[test]
    fn test_node_serializes_as_cytoscape_node() {
        let instance = Instance::new("alu0", "ALU");
        let node = GraphElement::Node(NodeElement::from_instance(
            Id::new("cpu0_CPU::alu0_ALU"),
            &instance,
            Some(Id::new("cpu0_CPU")),
        ));

        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(
            value,
            json!({
                "group": "nodes",
                "data": {
                    "id": "cpu0_CPU::alu0_ALU",
                    "label": "alu0 (ALU)",
                    "moduleType": "ALU",
                    "instanceName": "alu0",
                    "parent": "cpu0_CPU",
                }
            })
        );
    }

    #[test]
    fn test_top_node_omits_parent() {
        let instance = Instance::new("cpu0", "CPU");
        let node = GraphElement::Node(NodeElement::from_instance(
            Id::new("cpu0_CPU"),
            &instance,
            None,
        ));

        let value = serde_json::to_value(&node).unwrap();
        assert!(value["data"].get("parent").is_none());
    }

    #[test]
    fn test_edge_serializes_as_cytoscape_edge() {
        let edge = GraphElement::Edge(EdgeElement::instantiates(
            Id::new("cpu0_CPU"),
            Id::new("cpu0_CPU::alu0_ALU"),
        ));

        let value = serde_json::to_value(&edge).unwrap();
        assert_eq!(
            value,
            json!({
                "group": "edges",
                "data": {
                    "source": "cpu0_CPU",
                    "target": "cpu0_CPU::alu0_ALU",
                    "label": "instantiates",
                }
            })
        );
        assert!(edge.as_node().is_none());
        assert_eq!(edge.as_edge().map(EdgeElement::label), Some(INSTANTIATES));
    }
}
