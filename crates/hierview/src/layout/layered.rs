//! Layered layout engine for tree elements.
//!
//! Ranks follow the depth of a node below its root. Leaves take consecutive
//! slots in traversal order and every parent is centered over the span of its
//! children, which keeps sibling order intact and never crosses edges.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use log::{debug, trace};
use petgraph::graph::NodeIndex;

use hierview_core::geometry::{Bounds, Point, Size};

use crate::{
    error::ViewError,
    layout::{BreadthfirstOptions, ElementLayout, LayoutEngine, RankDir},
    structure::ElementGraph,
};

/// Layered engine configured from [`BreadthfirstOptions`].
pub struct Engine {
    options: BreadthfirstOptions,
    node_size: Size,
    min_spacing: f32,
}

/// Slot and rank of a placed node, before scaling to coordinates.
#[derive(Debug, Clone, Copy)]
struct Cell {
    slot: f32,
    rank: usize,
}

impl Engine {
    pub fn new(options: BreadthfirstOptions, node_size: Size, min_spacing: f32) -> Self {
        Self {
            options,
            node_size,
            min_spacing,
        }
    }

    /// Assigns a slot and a rank to every node.
    ///
    /// Walks each tree in post-order with an explicit stack so a parent is
    /// placed once all of its children are.
    fn assign_cells(&self, graph: &ElementGraph<'_>) -> HashMap<NodeIndex, Cell> {
        let mut cells: HashMap<NodeIndex, Cell> = HashMap::with_capacity(graph.node_count());
        let mut visited: HashSet<NodeIndex> = HashSet::with_capacity(graph.node_count());
        let mut next_leaf_slot = 0.0_f32;

        // Nodes unreachable from a root (none for well-formed trees) start
        // their own tree.
        let starts: Vec<NodeIndex> = graph.roots().chain(graph.node_indices()).collect();

        for start in starts {
            if !visited.insert(start) {
                continue;
            }

            // (node, rank, children, index of next child to visit)
            let mut stack = vec![(start, 0_usize, graph.successors(start), 0_usize)];
            while let Some((node, rank, children, next)) = stack.last_mut() {
                let (node, rank) = (*node, *rank);
                if let Some(&child) = children.get(*next) {
                    *next += 1;
                    if visited.insert(child) {
                        stack.push((child, rank + 1, graph.successors(child), 0));
                    }
                    continue;
                }

                let placed: Vec<f32> = children
                    .iter()
                    .filter_map(|child| cells.get(child).map(|cell| cell.slot))
                    .collect();
                let slot = match (placed.first(), placed.last()) {
                    (Some(first), Some(last)) => (first + last) / 2.0,
                    _ => {
                        let slot = next_leaf_slot;
                        next_leaf_slot += 1.0;
                        slot
                    }
                };
                trace!(
                    node = graph.node(node).id().to_string(),
                    slot = slot,
                    rank = rank;
                    "Placed node"
                );
                cells.insert(node, Cell { slot, rank });
                stack.pop();
            }
        }

        cells
    }
}

impl LayoutEngine for Engine {
    fn calculate(&self, graph: &ElementGraph<'_>) -> Result<ElementLayout, ViewError> {
        let cells = self.assign_cells(graph);

        let spacing = self.options.spacing_factor();
        let (slot_extent, rank_extent) = match self.options.rank_dir() {
            RankDir::TopToBottom => (self.node_size.width(), self.node_size.height()),
            RankDir::LeftToRight => (self.node_size.height(), self.node_size.width()),
        };
        let slot_step = (slot_extent + self.min_spacing) * spacing;
        let rank_step = (rank_extent + self.min_spacing) * spacing;
        let padding = self.options.padding();

        let mut nodes = IndexMap::with_capacity(graph.node_count());
        for idx in graph.node_indices() {
            let Some(cell) = cells.get(&idx) else {
                return Err(ViewError::Layout(format!(
                    "node `{}` was not placed",
                    graph.node(idx).id()
                )));
            };

            let along = cell.slot * slot_step;
            let across = cell.rank as f32 * rank_step;
            let center = match self.options.rank_dir() {
                RankDir::TopToBottom => Point::new(along, across),
                RankDir::LeftToRight => Point::new(across, along),
            };

            // Shift so the first slot and rank start at the padding.
            let offset = Point::new(
                padding + self.node_size.width() / 2.0,
                padding + self.node_size.height() / 2.0,
            );
            nodes.insert(
                graph.node(idx).id(),
                Bounds::new_from_center(center.add_point(offset), self.node_size),
            );
        }

        debug!(node_count = nodes.len(); "Layered layout calculated");
        Ok(ElementLayout::new(nodes))
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::approx_eq;

    use hierview_core::{
        design::{Design, Instance},
        identifier::Id,
    };

    use super::*;
    use crate::transform::flatten;

    fn engine() -> Engine {
        Engine::new(
            BreadthfirstOptions::default(),
            Size::new(100.0, 50.0),
            20.0,
        )
    }

    fn layout_of(design: &Design) -> ElementLayout {
        let elements = flatten(Some(design));
        let graph = ElementGraph::from_elements(&elements).unwrap();
        engine().calculate(&graph).unwrap()
    }

    #[test]
    fn test_parent_is_centered_over_children() {
        let design = Design::new([Instance::new("top", "TOP")
            .with_children([Instance::new("a", "A"), Instance::new("b", "B")])]);
        let layout = layout_of(&design);

        let top = layout.bounds(Id::new("top_TOP")).unwrap();
        let a = layout.bounds(Id::new("top_TOP::a_A")).unwrap();
        let b = layout.bounds(Id::new("top_TOP::b_B")).unwrap();

        assert!(approx_eq!(
            f32,
            top.center().x(),
            a.center().midpoint(b.center()).x()
        ));
        assert!(a.center().x() < b.center().x());
    }

    #[test]
    fn test_ranks_grow_downwards() {
        let design = Design::new([Instance::new("top", "TOP")
            .with_child(Instance::new("mid", "MID").with_child(Instance::new("leaf", "LEAF")))]);
        let layout = layout_of(&design);

        let top = layout.bounds(Id::new("top_TOP")).unwrap();
        let mid = layout.bounds(Id::new("top_TOP::mid_MID")).unwrap();
        let leaf = layout.bounds(Id::new("top_TOP::mid_MID::leaf_LEAF")).unwrap();

        assert!(top.center().y() < mid.center().y());
        assert!(mid.center().y() < leaf.center().y());
    }

    #[test]
    fn test_nodes_do_not_overlap() {
        let design = Design::new([
            Instance::new("a", "A").with_children([
                Instance::new("a1", "A1").with_child(Instance::new("x", "X")),
                Instance::new("a2", "A2"),
            ]),
            Instance::new("b", "B").with_child(Instance::new("b1", "B1")),
        ]);
        let layout = layout_of(&design);
        let boxes: Vec<Bounds> = layout.iter().map(|(_, bounds)| bounds).collect();

        for (i, first) in boxes.iter().enumerate() {
            for second in &boxes[i + 1..] {
                assert!(first.overlap(second).is_none());
            }
        }
    }

    #[test]
    fn test_left_to_right_ranks_grow_rightwards() {
        let design = Design::new([Instance::new("top", "TOP")
            .with_children([Instance::new("a", "A"), Instance::new("b", "B")])]);
        let elements = flatten(Some(&design));
        let graph = ElementGraph::from_elements(&elements).unwrap();
        let options = BreadthfirstOptions::default().with_rank_dir(RankDir::LeftToRight);
        let layout = Engine::new(options, Size::new(100.0, 50.0), 20.0)
            .calculate(&graph)
            .unwrap();

        let top = layout.bounds(Id::new("top_TOP")).unwrap();
        let a = layout.bounds(Id::new("top_TOP::a_A")).unwrap();
        let b = layout.bounds(Id::new("top_TOP::b_B")).unwrap();

        assert!(top.max_x() < a.min_x());
        assert!(approx_eq!(f32, a.center().x(), b.center().x()));
        assert!(a.overlap(&b).is_none());
        assert!(approx_eq!(f32, top.center().y(), a.center().midpoint(b.center()).y()));
    }

    #[test]
    fn test_layout_starts_at_padding() {
        let design = Design::new([Instance::new("only", "ONE")]);
        let layout = layout_of(&design);
        let bounds = layout.bounds(Id::new("only_ONE")).unwrap();

        assert!(approx_eq!(f32, bounds.min_x(), 30.0));
        assert!(approx_eq!(f32, bounds.min_y(), 30.0));
    }
}
