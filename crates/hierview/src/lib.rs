//! hierview - Tree and nested-containment views of HDL design hierarchies.
//!
//! A design is the instance hierarchy an HDL parser reports: top-level
//! instances, each with a name, a module type and child instances. This
//! crate turns such a design into graph elements for two views:
//!
//! - the **tree** view, with one node per instance and an `instantiates`
//!   edge from every parent to each of its children, drawn with a layered
//!   `breadthfirst` layout;
//! - the **nested** view, with one node per instance placed inside the node
//!   of its parent, drawn with a compound force-directed `fcose` layout.
//!
//! [`ViewBuilder`] covers one-shot conversions. [`Viewer`] keeps a design,
//! a view mode and the rendered graph in sync for interactive front ends.

pub mod config;
pub mod element;
pub mod export;
pub mod layout;
pub mod load;
pub mod notice;
pub mod resolve;
pub mod session;
pub mod structure;
pub mod style;
pub mod transform;
pub mod view;

mod error;
mod viewer;

pub use hierview_core::{color, design, geometry, identifier};

pub use error::ViewError;
pub use viewer::Viewer;

use log::{debug, info};

use config::AppConfig;
use design::Design;
use export::{JsonSurface, SvgSurface};
use session::{GraphConsumer, RenderSession};
use view::{RenderPlan, ViewMode, ViewSpec};

/// Builder for converting design documents into rendered views.
///
/// # Examples
///
/// ```rust
/// use hierview::{ViewBuilder, config::AppConfig, view::ViewMode};
///
/// let source = r#"{"top_instances": [{
///     "instance_name": "cpu0", "module_type": "CPU",
///     "children": [{"instance_name": "alu0", "module_type": "ALU"}]
/// }]}"#;
///
/// let builder = ViewBuilder::new(AppConfig::default());
/// let design = builder.parse(source).expect("Failed to parse");
///
/// let plan = builder.plan(design.as_ref(), ViewMode::Tree).expect("Failed to plan");
/// assert_eq!(plan.node_count(), 2);
/// assert_eq!(plan.edge_count(), 1);
///
/// let svg = builder
///     .render_svg(design.as_ref(), ViewMode::Nested)
///     .expect("Failed to render");
/// assert!(svg.contains("alu0 (ALU)"));
/// ```
#[derive(Default)]
pub struct ViewBuilder {
    config: AppConfig,
}

impl ViewBuilder {
    /// Create a new view builder with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Parse a design document.
    ///
    /// Returns `Ok(None)` for a JSON `null` document.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::Design`] if `source` is not a valid design
    /// document.
    pub fn parse(&self, source: &str) -> Result<Option<Design>, ViewError> {
        info!("Parsing design document");
        load::parse_design_json(source)
    }

    /// Build the render plan of `design` in `mode`.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::Config`] if the style configuration is invalid.
    pub fn plan(
        &self,
        design: Option<&Design>,
        mode: ViewMode,
    ) -> Result<RenderPlan, ViewError> {
        let spec = ViewSpec::for_mode(mode, &self.config)?;
        Ok(spec.plan(design))
    }

    /// Render `design` in `mode` as a Cytoscape-compatible JSON document.
    ///
    /// # Errors
    ///
    /// Returns `ViewError` for configuration or serialization errors.
    pub fn render_json(
        &self,
        design: Option<&Design>,
        mode: ViewMode,
    ) -> Result<String, ViewError> {
        self.render_with(JsonSurface::new(), design, mode)
    }

    /// Render `design` in `mode` as a static SVG preview.
    ///
    /// # Errors
    ///
    /// Returns `ViewError` for configuration or layout errors.
    pub fn render_svg(
        &self,
        design: Option<&Design>,
        mode: ViewMode,
    ) -> Result<String, ViewError> {
        self.render_with(SvgSurface::new(), design, mode)
    }

    fn render_with<C>(
        &self,
        consumer: C,
        design: Option<&Design>,
        mode: ViewMode,
    ) -> Result<String, ViewError>
    where
        C: GraphConsumer<Graph = String>,
    {
        let plan = self.plan(design, mode)?;
        debug!(
            node_count = plan.node_count(),
            edge_count = plan.edge_count();
            "Rendering plan"
        );

        let mut session = RenderSession::new(consumer);
        let output = session.render(&plan)?.clone();

        info!(mode = mode.as_str(), bytes = output.len(); "View rendered successfully");
        Ok(output)
    }
}
