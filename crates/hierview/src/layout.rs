//! Layout options and built-in layout engines.
//!
//! Each view mode is paired with exactly one kind of layout:
//!
//! - [`LayoutOptions::Breadthfirst`] for tree elements, computed by the
//!   [`layered`] engine.
//! - [`LayoutOptions::Fcose`] for nested elements, computed by the
//!   compound-aware [`force`] engine.
//!
//! The options serialize under the names Cytoscape layout extensions use, so
//! external consumers can forward them unchanged. The built-in engines honour
//! the subset of options that affect a static picture.

pub mod force;
pub mod layered;

use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};

use hierview_core::{
    geometry::{Bounds, Insets, Size},
    identifier::Id,
};

use crate::{
    error::ViewError,
    style::{NODE_HEIGHT, NODE_WIDTH, PARENT_PADDING},
    structure::ElementGraph,
};

/// Layout configuration handed to graph consumers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "name", rename_all = "lowercase")]
pub enum LayoutOptions {
    Breadthfirst(BreadthfirstOptions),
    Fcose(FcoseOptions),
}

/// Direction in which ranks of a layered layout advance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RankDir {
    #[default]
    #[serde(rename = "TB")]
    TopToBottom,

    #[serde(rename = "LR")]
    LeftToRight,
}

/// Options of the layered tree layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all(serialize = "camelCase", deserialize = "snake_case"))]
pub struct BreadthfirstOptions {
    directed: bool,
    padding: f32,
    spacing_factor: f32,
    rank_dir: RankDir,
}

impl Default for BreadthfirstOptions {
    fn default() -> Self {
        Self {
            directed: true,
            padding: 30.0,
            spacing_factor: 1.5,
            rank_dir: RankDir::TopToBottom,
        }
    }
}

impl BreadthfirstOptions {
    pub fn with_spacing_factor(mut self, spacing_factor: f32) -> Self {
        self.spacing_factor = spacing_factor;
        self
    }

    pub fn with_rank_dir(mut self, rank_dir: RankDir) -> Self {
        self.rank_dir = rank_dir;
        self
    }

    pub fn directed(&self) -> bool {
        self.directed
    }

    pub fn padding(&self) -> f32 {
        self.padding
    }

    pub fn spacing_factor(&self) -> f32 {
        self.spacing_factor
    }

    pub fn rank_dir(&self) -> RankDir {
        self.rank_dir
    }
}

/// Quality preset of the compound force-directed layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FcoseQuality {
    Draft,
    #[default]
    Default,
    Proof,
}

/// Options of the compound force-directed layout.
///
/// The built-in engine uses `randomize`, `padding`, `pack_components`,
/// `node_separation`, `node_repulsion`, `ideal_edge_length`,
/// `edge_elasticity`, `num_iter`, `gravity` and `seed`. The remaining fields
/// only matter to interactive consumers and are forwarded as is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all(serialize = "camelCase", deserialize = "snake_case"))]
pub struct FcoseOptions {
    quality: FcoseQuality,
    randomize: bool,
    animate: bool,
    animation_duration: u32,
    fit: bool,
    padding: f32,
    node_dimensions_include_labels: bool,
    uniform_node_dimensions: bool,
    pack_components: bool,
    sampling_type: bool,
    sample_size: u32,
    node_separation: f32,
    node_repulsion: f32,
    ideal_edge_length: f32,
    edge_elasticity: f32,
    nesting_factor: f32,
    num_iter: u32,
    tile: bool,
    gravity: f32,
    gravity_range_compound: f32,
    gravity_compound: f32,
    gravity_range: f32,
    initial_energy_on_incremental: f32,
    /// Seed for the randomized initial placement of the built-in engine.
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u64>,
}

impl Default for FcoseOptions {
    fn default() -> Self {
        Self {
            quality: FcoseQuality::Default,
            randomize: true,
            animate: true,
            animation_duration: 200,
            fit: true,
            padding: 40.0,
            node_dimensions_include_labels: true,
            uniform_node_dimensions: false,
            pack_components: true,
            sampling_type: true,
            sample_size: 25,
            node_separation: 150.0,
            node_repulsion: 6000.0,
            ideal_edge_length: 150.0,
            edge_elasticity: 0.45,
            nesting_factor: 0.1,
            num_iter: 2500,
            tile: true,
            gravity: 0.25,
            gravity_range_compound: 3.0,
            gravity_compound: 2.0,
            gravity_range: 4.0,
            initial_energy_on_incremental: 0.5,
            seed: None,
        }
    }
}

impl FcoseOptions {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_randomize(mut self, randomize: bool) -> Self {
        self.randomize = randomize;
        self
    }

    pub fn with_num_iter(mut self, num_iter: u32) -> Self {
        self.num_iter = num_iter;
        self
    }

    pub fn with_pack_components(mut self, pack_components: bool) -> Self {
        self.pack_components = pack_components;
        self
    }

    pub fn quality(&self) -> FcoseQuality {
        self.quality
    }

    pub fn randomize(&self) -> bool {
        self.randomize
    }

    pub fn padding(&self) -> f32 {
        self.padding
    }

    pub fn pack_components(&self) -> bool {
        self.pack_components
    }

    pub fn node_separation(&self) -> f32 {
        self.node_separation
    }

    pub fn node_repulsion(&self) -> f32 {
        self.node_repulsion
    }

    pub fn ideal_edge_length(&self) -> f32 {
        self.ideal_edge_length
    }

    pub fn edge_elasticity(&self) -> f32 {
        self.edge_elasticity
    }

    pub fn num_iter(&self) -> u32 {
        self.num_iter
    }

    pub fn gravity(&self) -> f32 {
        self.gravity
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }
}

/// Computed node boxes, keyed by node id in element order.
#[derive(Debug, Clone, Default)]
pub struct ElementLayout {
    nodes: IndexMap<Id, Bounds>,
}

impl ElementLayout {
    pub(crate) fn new(nodes: IndexMap<Id, Bounds>) -> Self {
        Self { nodes }
    }

    /// Returns the box of node `id`.
    pub fn bounds(&self, id: Id) -> Option<Bounds> {
        self.nodes.get(&id).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Id, Bounds)> + '_ {
        self.nodes.iter().map(|(id, bounds)| (*id, *bounds))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The smallest box enclosing every node.
    pub fn content_bounds(&self) -> Bounds {
        self.nodes
            .values()
            .copied()
            .reduce(|acc, bounds| acc.merge(&bounds))
            .unwrap_or_default()
    }
}

/// A layout algorithm over an [`ElementGraph`].
pub trait LayoutEngine {
    /// Calculates a box for every node of `graph`.
    fn calculate(&self, graph: &ElementGraph<'_>) -> Result<ElementLayout, ViewError>;
}

/// Builder for the engine matching a set of [`LayoutOptions`].
#[derive(Debug, Clone)]
pub struct EngineBuilder {
    node_size: Size,
    container_padding: Insets,
    min_spacing: f32,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineBuilder {
    /// Creates a builder sized after the default style bundles.
    pub fn new() -> Self {
        Self {
            node_size: Size::new(NODE_WIDTH, NODE_HEIGHT),
            container_padding: Insets::uniform(PARENT_PADDING),
            min_spacing: 40.0,
        }
    }

    /// Set the size of a plain node
    pub fn with_node_size(mut self, size: Size) -> Self {
        self.node_size = size;
        self
    }

    /// Set the padding between a container and its children
    pub fn with_container_padding(mut self, padding: Insets) -> Self {
        self.container_padding = padding;
        self
    }

    /// Set the gap between neighbouring nodes of a layered layout
    pub fn with_min_spacing(mut self, spacing: f32) -> Self {
        self.min_spacing = spacing;
        self
    }

    /// Builds the engine for `options`.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::Layout`] if the options cannot produce a finite
    /// layout.
    pub fn build(&self, options: &LayoutOptions) -> Result<Box<dyn LayoutEngine>, ViewError> {
        match options {
            LayoutOptions::Breadthfirst(options) => {
                if !(options.spacing_factor().is_finite() && options.spacing_factor() > 0.0) {
                    return Err(ViewError::Layout(format!(
                        "spacing factor must be a positive number, got {}",
                        options.spacing_factor()
                    )));
                }
                debug!(spacing_factor = options.spacing_factor(); "Using layered engine");
                Ok(Box::new(layered::Engine::new(
                    options.clone(),
                    self.node_size,
                    self.min_spacing,
                )))
            }
            LayoutOptions::Fcose(options) => {
                if !(options.node_separation().is_finite() && options.node_separation() >= 0.0) {
                    return Err(ViewError::Layout(format!(
                        "node separation must be a non-negative number, got {}",
                        options.node_separation()
                    )));
                }
                debug!(num_iter = options.num_iter(); "Using compound force engine");
                Ok(Box::new(force::Engine::new(
                    options.clone(),
                    self.node_size,
                    self.container_padding,
                )))
            }
        }
    }
}
