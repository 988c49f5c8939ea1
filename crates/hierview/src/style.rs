//! Named style bundles for graph consumers.
//!
//! Styles are fixed per element kind, never computed per instance. A
//! [`StyleSheet`] serializes as the selector/style list Cytoscape-style
//! renderers take:
//!
//! ```json
//! [ { "selector": "node", "style": { "label": "data(label)", ... } } ]
//! ```

use indexmap::IndexMap;
use serde::Serialize;

/// Selector matching every node.
pub const NODE_SELECTOR: &str = "node";

/// Selector matching compound nodes (nodes that contain other nodes).
pub const PARENT_SELECTOR: &str = "node:parent";

/// Selector matching every edge.
pub const EDGE_SELECTOR: &str = "edge";

/// Width of a plain node.
pub const NODE_WIDTH: f32 = 180.0;

/// Height of a plain node.
pub const NODE_HEIGHT: f32 = 80.0;

/// Padding between a compound node's border and its children.
pub const PARENT_PADDING: f32 = 60.0;

/// Opacity of a compound node's fill.
pub const PARENT_OPACITY: f32 = 0.8;

/// Colors used by the style bundles.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    pub(crate) node_fill: String,
    pub(crate) node_border: String,
    pub(crate) node_text: String,
    pub(crate) parent_fill: String,
    pub(crate) parent_border: String,
    pub(crate) edge_line: String,
    pub(crate) edge_text: String,
    pub(crate) background: Option<String>,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            node_fill: "#4a7ba6".to_string(),
            node_border: "#2b3a4a".to_string(),
            node_text: "#ffffff".to_string(),
            parent_fill: "#2b3a4a".to_string(),
            parent_border: "#1a2430".to_string(),
            edge_line: "#6c757d".to_string(),
            edge_text: "#333333".to_string(),
            background: None,
        }
    }
}

impl Palette {
    pub fn node_fill(&self) -> &str {
        &self.node_fill
    }

    pub fn parent_fill(&self) -> &str {
        &self.parent_fill
    }

    pub fn edge_line(&self) -> &str {
        &self.edge_line
    }

    pub fn background(&self) -> Option<&str> {
        self.background.as_deref()
    }
}

/// A single style property value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StyleValue {
    Number(f32),
    Text(String),
}

impl From<f32> for StyleValue {
    fn from(value: f32) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for StyleValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Style properties applied to elements matching `selector`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StyleRule {
    selector: &'static str,
    style: IndexMap<&'static str, StyleValue>,
}

impl StyleRule {
    fn new<const N: usize>(selector: &'static str, style: [(&'static str, StyleValue); N]) -> Self {
        Self {
            selector,
            style: IndexMap::from(style),
        }
    }

    pub fn selector(&self) -> &str {
        self.selector
    }

    /// Looks up a single property.
    pub fn get(&self, property: &str) -> Option<&StyleValue> {
        self.style.get(property)
    }

    /// Bundle for every node.
    pub fn base_node(palette: &Palette) -> Self {
        Self::new(
            NODE_SELECTOR,
            [
                ("label", "data(label)".into()),
                ("text-valign", "center".into()),
                ("text-halign", "center".into()),
                ("font-size", "14px".into()),
                ("font-weight", "normal".into()),
                ("font-family", "system-ui, sans-serif".into()),
                ("background-color", palette.node_fill.as_str().into()),
                ("color", palette.node_text.as_str().into()),
                ("text-outline-width", StyleValue::Number(0.0)),
                ("text-max-width", "180px".into()),
                ("text-wrap", "wrap".into()),
                ("width", StyleValue::Number(NODE_WIDTH)),
                ("height", StyleValue::Number(NODE_HEIGHT)),
                ("shape", "rectangle".into()),
                ("border-width", StyleValue::Number(2.0)),
                ("border-color", palette.node_border.as_str().into()),
                ("padding", "15px".into()),
            ],
        )
    }

    /// Bundle for compound nodes in the containment view.
    pub fn parent_node(palette: &Palette) -> Self {
        Self::new(
            PARENT_SELECTOR,
            [
                ("text-valign", "top".into()),
                ("text-halign", "center".into()),
                ("background-opacity", StyleValue::Number(PARENT_OPACITY)),
                ("background-color", palette.parent_fill.as_str().into()),
                ("border-width", StyleValue::Number(3.0)),
                ("border-color", palette.parent_border.as_str().into()),
                ("padding", StyleValue::Number(PARENT_PADDING)),
                ("shape", "rectangle".into()),
            ],
        )
    }

    /// Bundle for `instantiates` edges in the tree view.
    pub fn edge(palette: &Palette) -> Self {
        Self::new(
            EDGE_SELECTOR,
            [
                ("label", "data(label)".into()),
                ("curve-style", "bezier".into()),
                ("width", StyleValue::Number(2.0)),
                ("line-color", palette.edge_line.as_str().into()),
                ("target-arrow-shape", "triangle".into()),
                ("target-arrow-color", palette.edge_line.as_str().into()),
                ("font-size", "12px".into()),
                ("color", palette.edge_text.as_str().into()),
                ("text-background-color", "#ffffff".into()),
                ("text-background-opacity", StyleValue::Number(0.7)),
                ("text-background-padding", "3px".into()),
                ("edge-text-rotation", "autorotate".into()),
            ],
        )
    }
}

/// Ordered list of style rules.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct StyleSheet {
    rules: Vec<StyleRule>,
}

impl StyleSheet {
    pub(crate) fn new(rules: Vec<StyleRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[StyleRule] {
        &self.rules
    }

    /// Finds the rule for `selector`.
    pub fn rule(&self, selector: &str) -> Option<&StyleRule> {
        self.rules.iter().find(|rule| rule.selector == selector)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_base_node_uses_palette() {
        let palette = Palette {
            node_fill: "#123456".to_string(),
            ..Palette::default()
        };
        let rule = StyleRule::base_node(&palette);

        assert_eq!(rule.selector(), NODE_SELECTOR);
        assert_eq!(
            rule.get("background-color"),
            Some(&StyleValue::Text("#123456".to_string()))
        );
        assert_eq!(rule.get("width"), Some(&StyleValue::Number(NODE_WIDTH)));
    }

    #[test]
    fn test_rule_serializes_in_declaration_order() {
        let rule = StyleRule::parent_node(&Palette::default());
        let value = serde_json::to_value(&rule).unwrap();

        assert_eq!(value["selector"], json!("node:parent"));
        assert_eq!(value["style"]["padding"], json!(60.0));

        let keys: Vec<&String> = value["style"].as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 8);
    }

    #[test]
    fn test_sheet_lookup() {
        let palette = Palette::default();
        let sheet = StyleSheet::new(vec![
            StyleRule::base_node(&palette),
            StyleRule::edge(&palette),
        ]);

        assert!(sheet.rule(NODE_SELECTOR).is_some());
        assert!(sheet.rule(EDGE_SELECTOR).is_some());
        assert!(sheet.rule(PARENT_SELECTOR).is_none());
    }
}
