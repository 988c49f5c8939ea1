//! View selection: pairs a view mode with its transformer, layout and style.
//!
//! [`ViewSpec::for_mode`] is the only place where a [`ViewMode`] is mapped to
//! a transformer, a [`LayoutOptions`] variant and a [`StyleSheet`], and
//! [`RenderPlan`] keeps the result sealed. Tree elements therefore always
//! travel with the layered layout and nested elements with the compound
//! force layout.

use std::{fmt, str::FromStr};

use log::{debug, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use hierview_core::{design::Design, identifier::Id};

use crate::{
    config::AppConfig,
    element::GraphElement,
    error::ViewError,
    layout::LayoutOptions,
    notice::Notice,
    style::{Palette, StyleRule, StyleSheet},
    transform::{self, Transform},
};

/// Viewport padding used when fitting a tapped node.
pub const FIT_PADDING: f32 = 50.0;

/// How a design is drawn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Instances as nodes joined by `instantiates` edges.
    #[default]
    Tree,

    /// Instances drawn inside the instance that contains them.
    Nested,
}

impl ViewMode {
    pub const ALL: [ViewMode; 2] = [ViewMode::Tree, ViewMode::Nested];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tree => "tree",
            Self::Nested => "nested",
        }
    }

    /// The transformer producing this mode's element shape.
    pub fn transform(self) -> Transform {
        match self {
            Self::Tree => transform::flatten,
            Self::Nested => transform::nest,
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string names no [`ViewMode`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown view mode `{0}`, expected `tree` or `nested`")]
pub struct ParseViewModeError(String);

impl FromStr for ViewMode {
    type Err = ParseViewModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tree" => Ok(Self::Tree),
            "nested" => Ok(Self::Nested),
            _ => Err(ParseViewModeError(s.to_string())),
        }
    }
}

/// Transformer, layout and style selected for one view mode.
#[derive(Debug, Clone)]
pub struct ViewSpec {
    mode: ViewMode,
    transform: Transform,
    layout: LayoutOptions,
    style: StyleSheet,
    palette: Palette,
}

impl ViewSpec {
    /// Looks up everything `mode` needs from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::Config`] if a configured color is invalid.
    pub fn for_mode(mode: ViewMode, config: &AppConfig) -> Result<Self, ViewError> {
        let palette = config.style().palette()?;

        let (layout, rules) = match mode {
            ViewMode::Tree => (
                LayoutOptions::Breadthfirst(config.layout().tree().clone()),
                vec![StyleRule::base_node(&palette), StyleRule::edge(&palette)],
            ),
            ViewMode::Nested => (
                LayoutOptions::Fcose(config.layout().nested().clone()),
                vec![
                    StyleRule::base_node(&palette),
                    StyleRule::parent_node(&palette),
                ],
            ),
        };

        debug!(mode = mode.as_str(); "Selected view spec");

        Ok(Self {
            mode,
            transform: mode.transform(),
            layout,
            style: StyleSheet::new(rules),
            palette,
        })
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn layout(&self) -> &LayoutOptions {
        &self.layout
    }

    pub fn style(&self) -> &StyleSheet {
        &self.style
    }

    /// Transforms `design` and seals the result with this spec's layout and
    /// style.
    pub fn plan(&self, design: Option<&Design>) -> RenderPlan {
        let elements = (self.transform)(design);
        let notices = if elements.is_empty() {
            Vec::new()
        } else {
            Notice::for_mode(self.mode)
        };

        info!(
            mode = self.mode.as_str(),
            element_count = elements.len();
            "Planned view"
        );

        RenderPlan {
            mode: self.mode,
            elements,
            layout: self.layout.clone(),
            style: self.style.clone(),
            palette: self.palette.clone(),
            notices,
        }
    }
}

/// Everything a graph consumer needs to draw one view of a design.
///
/// Fields are only reachable through getters, so the element shape and the
/// layout chosen for it cannot be separated.
#[derive(Debug, Clone)]
pub struct RenderPlan {
    mode: ViewMode,
    elements: Vec<GraphElement>,
    layout: LayoutOptions,
    style: StyleSheet,
    palette: Palette,
    notices: Vec<Notice>,
}

impl RenderPlan {
    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    /// Elements in pre-order.
    pub fn elements(&self) -> &[GraphElement] {
        &self.elements
    }

    pub fn layout(&self) -> &LayoutOptions {
        &self.layout
    }

    pub fn style(&self) -> &StyleSheet {
        &self.style
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.elements.iter().filter(|e| e.as_node().is_some()).count()
    }

    pub fn edge_count(&self) -> usize {
        self.elements.iter().filter(|e| e.as_edge().is_some()).count()
    }

    /// Returns `true` if some node of this plan names `id` as its parent.
    pub fn is_compound(&self, id: Id) -> bool {
        self.elements
            .iter()
            .filter_map(GraphElement::as_node)
            .any(|node| node.parent() == Some(id))
    }

    /// Maps a tap to the viewport change it triggers.
    ///
    /// Tapping a node fits it with [`FIT_PADDING`], except compound nodes of
    /// the nested view which ignore taps. Tapping the background fits the
    /// whole graph.
    pub fn on_tap(&self, tap: Tap) -> Option<FitTarget> {
        match tap {
            Tap::Background => Some(FitTarget::All),
            Tap::Node(id) => {
                let known = self
                    .elements
                    .iter()
                    .filter_map(GraphElement::as_node)
                    .any(|node| node.id() == id);
                if !known || (self.mode == ViewMode::Nested && self.is_compound(id)) {
                    return None;
                }
                Some(FitTarget::Node {
                    id,
                    padding: FIT_PADDING,
                })
            }
        }
    }
}

/// A pointer tap on the rendered graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tap {
    Node(Id),
    Background,
}

/// Viewport change requested in response to a [`Tap`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FitTarget {
    Node { id: Id, padding: f32 },
    All,
}

/// What the viewer currently shows.
#[derive(Debug, Clone)]
pub enum ViewState {
    /// A load is outstanding.
    Loading,

    /// No design, or a design without top-level instances.
    Empty,

    /// A design ready to draw.
    Ready(RenderPlan),
}

impl ViewState {
    pub fn plan(&self) -> Option<&RenderPlan> {
        match self {
            Self::Ready(plan) => Some(plan),
            Self::Loading | Self::Empty => None,
        }
    }

    /// Placeholder text for states without a graph.
    pub fn message(&self) -> Option<&'static str> {
        match self {
            Self::Loading => Some("Loading design..."),
            Self::Empty => Some(
                "No Verilog modules found. Open Verilog files to visualize the design hierarchy",
            ),
            Self::Ready(_) => None,
        }
    }
}
