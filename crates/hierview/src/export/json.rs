//! Cytoscape-compatible JSON documents.
//!
//! The mounted document has the shape
//!
//! ```json
//! { "elements": [...], "style": [...], "layout": { "name": "breadthfirst", ... },
//!   "notices": ["Tree View - ..."] }
//! ```
//!
//! so a web front end can pass it straight to `cytoscape(...)`.

use log::trace;
use serde::Serialize;

use crate::{
    element::GraphElement,
    layout::LayoutOptions,
    session::{GraphConsumer, SurfaceError},
    style::StyleSheet,
    view::RenderPlan,
};

#[derive(Serialize)]
struct Document<'a> {
    elements: &'a [GraphElement],
    style: &'a StyleSheet,
    layout: &'a LayoutOptions,
    notices: Vec<String>,
}

/// Mounts plans as JSON text.
#[derive(Debug, Clone)]
pub struct JsonSurface {
    pretty: bool,
}

impl Default for JsonSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonSurface {
    /// Creates a surface producing indented JSON.
    pub fn new() -> Self {
        Self { pretty: true }
    }

    /// Produce single-line JSON instead.
    pub fn compact(mut self) -> Self {
        self.pretty = false;
        self
    }
}

impl GraphConsumer for JsonSurface {
    type Graph = String;

    fn mount(&mut self, plan: &RenderPlan) -> Result<String, SurfaceError> {
        let document = Document {
            elements: plan.elements(),
            style: plan.style(),
            layout: plan.layout(),
            notices: plan.notices().iter().map(ToString::to_string).collect(),
        };

        let text = if self.pretty {
            serde_json::to_string_pretty(&document)
        } else {
            serde_json::to_string(&document)
        };
        text.map_err(|err| SurfaceError::Render(err.to_string()))
    }

    fn unmount(&mut self, graph: String) {
        trace!(bytes = graph.len(); "Discarding JSON document");
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use hierview_core::design::{Design, Instance};

    use super::*;
    use crate::{
        config::AppConfig,
        view::{ViewMode, ViewSpec},
    };

    fn mount(mode: ViewMode) -> Value {
        let design =
            Design::new([Instance::new("cpu0", "CPU").with_child(Instance::new("alu0", "ALU"))]);
        let plan = ViewSpec::for_mode(mode, &AppConfig::default())
            .unwrap()
            .plan(Some(&design));
        let text = JsonSurface::new().compact().mount(&plan).unwrap();
        serde_json::from_str(&text).unwrap()
    }

    #[test]
    fn test_tree_document() {
        let document = mount(ViewMode::Tree);

        assert_eq!(document["elements"].as_array().unwrap().len(), 3);
        assert_eq!(document["elements"][2]["group"], json!("edges"));
        assert_eq!(document["layout"]["name"], json!("breadthfirst"));
        assert_eq!(document["style"][1]["selector"], json!("edge"));
        assert_eq!(document["notices"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_nested_document() {
        let document = mount(ViewMode::Nested);

        assert_eq!(
            document["elements"][1]["data"]["parent"],
            json!("cpu0_CPU")
        );
        assert_eq!(document["layout"]["name"], json!("fcose"));
        assert_eq!(document["style"][1]["selector"], json!("node:parent"));
        assert_eq!(document["notices"].as_array().unwrap().len(), 2);
    }
}
