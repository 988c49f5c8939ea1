//! Static SVG previews.

use log::{debug, info, trace};
use svg::{
    Document,
    node::element::{Definitions, Group, Marker, Path, Rectangle, Text},
};

use hierview_core::geometry::{Bounds, Point};

use crate::{
    element::{EdgeElement, GraphElement, NodeElement},
    layout::{ElementLayout, EngineBuilder},
    session::{GraphConsumer, SurfaceError},
    structure::ElementGraph,
    style::PARENT_OPACITY,
    view::{RenderPlan, ViewMode},
};

const ARROW_MARKER_ID: &str = "edge-arrow";
const NODE_FONT_SIZE: f32 = 14.0;
const EDGE_FONT_SIZE: f32 = 12.0;

/// Lays plans out with the built-in engines and renders them as SVG text.
#[derive(Debug, Clone, Default)]
pub struct SvgSurface {
    engines: EngineBuilder,
}

impl SvgSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `engines` instead of the default engine configuration.
    pub fn with_engines(mut self, engines: EngineBuilder) -> Self {
        self.engines = engines;
        self
    }

    /// Lays out `plan` with the engine its layout options select.
    fn calculate_layout(&self, plan: &RenderPlan) -> Result<ElementLayout, SurfaceError> {
        let layout_error = |err: crate::ViewError| SurfaceError::Layout(err.to_string());

        let graph = ElementGraph::from_elements(plan.elements()).map_err(layout_error)?;
        let engine = self.engines.build(plan.layout()).map_err(layout_error)?;
        engine.calculate(&graph).map_err(layout_error)
    }

    fn render_document(&self, plan: &RenderPlan, layout: &ElementLayout) -> Document {
        let content = layout.content_bounds();
        // Mirror the leading padding on the trailing edges.
        let width = content.max_x() + content.min_x();
        let height = content.max_y() + content.min_y();

        let mut doc = Document::new()
            .set("viewBox", format!("0 0 {width} {height}"))
            .set("width", width)
            .set("height", height);

        if let Some(background) = plan.palette().background() {
            doc = doc.add(
                Rectangle::new()
                    .set("width", "100%")
                    .set("height", "100%")
                    .set("fill", background),
            );
        }

        if plan.edge_count() > 0 {
            doc = doc.add(self.create_marker_definitions(plan));
        }

        let mut nodes = Group::new().set("class", "nodes");
        let mut edges = Group::new().set("class", "edges");
        for element in plan.elements() {
            match element {
                GraphElement::Node(node) => {
                    if let Some(bounds) = layout.bounds(node.id()) {
                        nodes = nodes.add(self.render_node(plan, node, bounds));
                    }
                }
                GraphElement::Edge(edge) => {
                    if let (Some(source), Some(target)) =
                        (layout.bounds(edge.source()), layout.bounds(edge.target()))
                    {
                        edges = edges.add(self.render_edge(plan, edge, source, target));
                    }
                }
            }
        }

        // Parents precede children in the element order, so nested boxes
        // paint from the outside in.
        doc.add(nodes).add(edges)
    }

    fn create_marker_definitions(&self, plan: &RenderPlan) -> Definitions {
        let arrow = Path::new()
            .set("d", "M 0 0 L 10 5 L 0 10 z")
            .set("fill", plan.palette().edge_line());

        Definitions::new().add(
            Marker::new()
                .set("id", ARROW_MARKER_ID)
                .set("viewBox", "0 0 10 10")
                .set("refX", 10)
                .set("refY", 5)
                .set("markerWidth", 8)
                .set("markerHeight", 8)
                .set("orient", "auto")
                .add(arrow),
        )
    }

    fn render_node(&self, plan: &RenderPlan, node: &NodeElement, bounds: Bounds) -> Group {
        let palette = plan.palette();
        let compound = plan.mode() == ViewMode::Nested && plan.is_compound(node.id());

        let rect = Rectangle::new()
            .set("x", bounds.min_x())
            .set("y", bounds.min_y())
            .set("width", bounds.width())
            .set("height", bounds.height());

        let (rect, label_y) = if compound {
            (
                rect.set("fill", palette.parent_fill.as_str())
                    .set("fill-opacity", PARENT_OPACITY)
                    .set("stroke", palette.parent_border.as_str())
                    .set("stroke-width", 3),
                bounds.min_y() + NODE_FONT_SIZE * 1.5,
            )
        } else {
            (
                rect.set("fill", palette.node_fill.as_str())
                    .set("stroke", palette.node_border.as_str())
                    .set("stroke-width", 2),
                bounds.center().y(),
            )
        };

        let text = Text::new(node.label())
            .set("x", bounds.center().x())
            .set("y", label_y)
            .set("text-anchor", "middle")
            .set("dominant-baseline", "central")
            .set("font-family", "system-ui, sans-serif")
            .set("font-size", NODE_FONT_SIZE)
            .set("fill", palette.node_text.as_str());

        Group::new()
            .set("data-id", node.id().to_string())
            .add(rect)
            .add(text)
    }

    fn render_edge(
        &self,
        plan: &RenderPlan,
        edge: &EdgeElement,
        source: Bounds,
        target: Bounds,
    ) -> Group {
        let palette = plan.palette();
        let start = boundary_point(source, target.center());
        let end = boundary_point(target, source.center());

        let path = Path::new()
            .set("d", format!("M {} {} L {} {}", start.x(), start.y(), end.x(), end.y()))
            .set("stroke", palette.edge_line.as_str())
            .set("stroke-width", 2)
            .set("fill", "none")
            .set("marker-end", format!("url(#{ARROW_MARKER_ID})"));

        let mid = start.midpoint(end);
        let label_width = edge.label().chars().count() as f32 * EDGE_FONT_SIZE * 0.6;
        let background = Rectangle::new()
            .set("x", mid.x() - label_width / 2.0 - 3.0)
            .set("y", mid.y() - EDGE_FONT_SIZE / 2.0 - 3.0)
            .set("width", label_width + 6.0)
            .set("height", EDGE_FONT_SIZE + 6.0)
            .set("fill", "#ffffff")
            .set("fill-opacity", 0.7);
        let text = Text::new(edge.label())
            .set("x", mid.x())
            .set("y", mid.y())
            .set("text-anchor", "middle")
            .set("dominant-baseline", "central")
            .set("font-family", "system-ui, sans-serif")
            .set("font-size", EDGE_FONT_SIZE)
            .set("fill", palette.edge_text.as_str());

        Group::new().add(path).add(background).add(text)
    }
}

/// Point where the segment from the center of `bounds` towards `toward`
/// leaves the box.
fn boundary_point(bounds: Bounds, toward: Point) -> Point {
    let center = bounds.center();
    let direction = toward.sub_point(center);
    let half_width = bounds.width() / 2.0;
    let half_height = bounds.height() / 2.0;

    let scale_x = if direction.x().abs() > f32::EPSILON {
        half_width / direction.x().abs()
    } else {
        f32::INFINITY
    };
    let scale_y = if direction.y().abs() > f32::EPSILON {
        half_height / direction.y().abs()
    } else {
        f32::INFINITY
    };

    let scale = scale_x.min(scale_y);
    if scale.is_finite() {
        center.add_point(direction.scale(scale))
    } else {
        center
    }
}

impl GraphConsumer for SvgSurface {
    type Graph = String;

    fn mount(&mut self, plan: &RenderPlan) -> Result<String, SurfaceError> {
        info!(mode = plan.mode().as_str(); "Rendering SVG preview");
        let layout = self.calculate_layout(plan)?;
        debug!(node_count = layout.len(); "Layout calculated");

        let doc = self.render_document(plan, &layout);
        Ok(doc.to_string())
    }

    fn unmount(&mut self, graph: String) {
        trace!(bytes = graph.len(); "Discarding SVG document");
    }
}
