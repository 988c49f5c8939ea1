//! Compound force-directed layout engine for nested elements.
//!
//! Containment scopes are laid out innermost first. Within a scope the nodes
//! run through a damped force simulation (pairwise repulsion, springs along
//! edges, gravity towards the centroid), then overlaps are pushed apart and
//! components that edges split apart are packed into rows. The scope's bounding box,
//! plus padding, becomes the size of its container in the enclosing scope,
//! so every child ends up inside its parent's box.

use std::collections::HashMap;

use indexmap::IndexMap;
use log::{debug, trace};
use petgraph::{graph::NodeIndex, unionfind::UnionFind};
use rand::{Rng, SeedableRng, rngs::StdRng};

use hierview_core::geometry::{Bounds, Insets, Point, Size};

use crate::{
    error::ViewError,
    layout::{ElementLayout, FcoseOptions, LayoutEngine},
    structure::ElementGraph,
};

/// Upper bound on overlap-removal sweeps per scope.
const MAX_OVERLAP_PASSES: usize = 64;

/// Force layout engine configured from [`FcoseOptions`].
pub struct Engine {
    options: FcoseOptions,
    node_size: Size,
    padding: Insets,
    damping_factor: f32,
}

impl Engine {
    pub fn new(options: FcoseOptions, node_size: Size, padding: Insets) -> Self {
        Self {
            options,
            node_size,
            padding,
            damping_factor: 0.85,
        }
    }

    fn rng(&self) -> StdRng {
        match self.options.seed() {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        }
    }

    /// Initial centers on a grid, jittered when `randomize` is set.
    fn initialize_positions(&self, sizes: &[Size], rng: &mut StdRng) -> Vec<Point> {
        let grid_size = (sizes.len() as f32).sqrt().ceil().max(1.0) as usize;
        let largest = sizes
            .iter()
            .fold(Size::default(), |acc, size| acc.max(*size));
        let cell_size = largest.width().max(largest.height()) + self.options.node_separation();
        let jitter = cell_size / 4.0;

        (0..sizes.len())
            .map(|i| {
                let row = i / grid_size;
                let col = i % grid_size;
                let base = Point::new(col as f32 * cell_size, row as f32 * cell_size);

                if self.options.randomize() && jitter > 0.0 {
                    base.add_point(Point::new(
                        rng.random_range(-jitter..jitter),
                        rng.random_range(-jitter..jitter),
                    ))
                } else {
                    base
                }
            })
            .collect()
    }

    /// Runs the damped simulation for `num_iter` steps.
    ///
    /// Per-step displacement is capped by a temperature that cools linearly
    /// to zero, so the simulation always settles.
    fn run_force_simulation(
        &self,
        centers: &mut [Point],
        sizes: &[Size],
        relations: &[(usize, usize)],
    ) {
        let count = centers.len();
        if count < 2 {
            return;
        }

        let iterations = self.options.num_iter() as usize;
        let repulsion = self.options.node_repulsion();
        let separation = self.options.node_separation();
        let ideal_length = self.options.ideal_edge_length();
        let elasticity = self.options.edge_elasticity();
        let gravity = self.options.gravity();

        let mut velocities = vec![Point::default(); count];

        for step in 0..iterations {
            let temperature = ideal_length.max(1.0) * (1.0 - step as f32 / iterations as f32);
            let mut forces = vec![Point::default(); count];

            // Repulsion between every pair
            for i in 0..count {
                for j in (i + 1)..count {
                    let delta = centers[i].sub_point(centers[j]);
                    let direction = if delta.hypot() > f32::EPSILON {
                        delta.scale(1.0 / delta.hypot())
                    } else {
                        // Coincident nodes: split them along X.
                        Point::new(1.0, 0.0)
                    };
                    let distance = delta.hypot().max(1.0);

                    let min_dist = (sizes[i].width()
                        + sizes[j].width()
                        + sizes[i].height()
                        + sizes[j].height())
                        / 4.0
                        + separation;
                    let force = if distance < min_dist {
                        repulsion * (min_dist / distance).powi(2) / min_dist
                    } else {
                        repulsion / distance
                    };

                    forces[i] = forces[i].add_point(direction.scale(force));
                    forces[j] = forces[j].sub_point(direction.scale(force));
                }
            }

            // Springs along edges
            for &(source, target) in relations {
                let delta = centers[target].sub_point(centers[source]);
                let distance = delta.hypot().max(1.0);
                let pull = delta.scale(elasticity * (distance - ideal_length) / distance);
                forces[source] = forces[source].add_point(pull);
                forces[target] = forces[target].sub_point(pull);
            }

            // Gravity towards the centroid
            let centroid = centers
                .iter()
                .fold(Point::default(), |acc, center| acc.add_point(*center))
                .scale(1.0 / count as f32);
            for (force, center) in forces.iter_mut().zip(centers.iter()) {
                *force = force.sub_point(center.sub_point(centroid).scale(gravity));
            }

            for ((center, velocity), force) in
                centers.iter_mut().zip(velocities.iter_mut()).zip(&forces)
            {
                let mut next = velocity.add_point(*force).scale(self.damping_factor);
                let speed = next.hypot();
                if speed > temperature {
                    next = next.scale(temperature / speed);
                }
                *velocity = next;
                *center = center.add_point(next);
            }
        }
    }

    /// Pushes overlapping boxes apart until at least `node_separation` lies
    /// between every pair, or the pass budget runs out.
    fn remove_overlaps(&self, centers: &mut [Point], sizes: &[Size]) {
        let margin = Insets::uniform(self.options.node_separation() / 2.0);

        for pass in 0..MAX_OVERLAP_PASSES {
            let mut moved = false;
            for i in 0..centers.len() {
                for j in (i + 1)..centers.len() {
                    let first = Bounds::new_from_center(centers[i], sizes[i]).add_padding(margin);
                    let second = Bounds::new_from_center(centers[j], sizes[j]).add_padding(margin);
                    let Some((dx, dy)) = first.overlap(&second) else {
                        continue;
                    };

                    moved = true;
                    let shift = if dx <= dy {
                        let sign = if centers[i].x() <= centers[j].x() { 1.0 } else { -1.0 };
                        Point::new(sign * dx / 2.0, 0.0)
                    } else {
                        let sign = if centers[i].y() <= centers[j].y() { 1.0 } else { -1.0 };
                        Point::new(0.0, sign * dy / 2.0)
                    };
                    centers[i] = centers[i].sub_point(shift);
                    centers[j] = centers[j].add_point(shift);
                }
            }

            if !moved {
                trace!(passes = pass; "Overlaps resolved");
                return;
            }
        }

        debug!("Overlap removal stopped at the pass limit");
    }

    /// Packs edge-connected components into rows, left to right.
    ///
    /// Without edges the whole scope is one component and keeps its relaxed
    /// shape. Each component moves as a unit.
    fn pack_components(
        &self,
        centers: &mut [Point],
        sizes: &[Size],
        relations: &[(usize, usize)],
    ) {
        if relations.is_empty() {
            return;
        }

        let mut components = UnionFind::<usize>::new(centers.len());
        for &(source, target) in relations {
            components.union(source, target);
        }

        // Group members by component, in order of first appearance.
        let mut groups: IndexMap<usize, Vec<usize>> = IndexMap::new();
        for (node, label) in components.into_labeling().into_iter().enumerate() {
            groups.entry(label).or_default().push(node);
        }
        if groups.len() < 2 {
            return;
        }

        let gap = self.options.node_separation();
        let group_bounds: Vec<Bounds> = groups
            .values()
            .filter_map(|members| {
                members
                    .iter()
                    .map(|&node| Bounds::new_from_center(centers[node], sizes[node]))
                    .reduce(|acc, bounds| acc.merge(&bounds))
            })
            .collect();

        let area: f32 = group_bounds
            .iter()
            .map(|bounds| (bounds.width() + gap) * (bounds.height() + gap))
            .sum();
        let widest = group_bounds
            .iter()
            .map(|bounds| bounds.width())
            .fold(0.0_f32, f32::max);
        let row_width = area.sqrt().max(widest);

        let mut cursor = Point::default();
        let mut row_height = 0.0_f32;
        for (members, bounds) in groups.values().zip(&group_bounds) {
            if cursor.x() > 0.0 && cursor.x() + bounds.width() > row_width {
                cursor = Point::new(0.0, cursor.y() + row_height + gap);
                row_height = 0.0;
            }

            let offset = cursor.sub_point(bounds.min_point());
            for &node in members {
                centers[node] = centers[node].add_point(offset);
            }

            cursor = Point::new(cursor.x() + bounds.width() + gap, cursor.y());
            row_height = row_height.max(bounds.height());
        }
    }
}

impl LayoutEngine for Engine {
    fn calculate(&self, graph: &ElementGraph<'_>) -> Result<ElementLayout, ViewError> {
        let mut rng = self.rng();
        let mut sizes: HashMap<NodeIndex, Size> = HashMap::new();
        // Top-left corner of each node relative to its scope's content box.
        let mut local: HashMap<NodeIndex, Point> = HashMap::with_capacity(graph.node_count());

        for scope in graph.containment_scopes() {
            debug!(
                scope_node_count = scope.nodes_count();
                "Processing containment scope with force layout"
            );

            let nodes: Vec<NodeIndex> = scope.node_indices().collect();
            let node_sizes: Vec<Size> = nodes
                .iter()
                .map(|idx| sizes.get(idx).copied().unwrap_or(self.node_size))
                .collect();
            let position: HashMap<NodeIndex, usize> = nodes
                .iter()
                .enumerate()
                .map(|(position, idx)| (*idx, position))
                .collect();
            let relations: Vec<(usize, usize)> = graph
                .scope_relations(scope)
                .into_iter()
                .filter_map(|(source, target)| {
                    Some((*position.get(&source)?, *position.get(&target)?))
                })
                .collect();

            let mut centers = self.initialize_positions(&node_sizes, &mut rng);
            self.run_force_simulation(&mut centers, &node_sizes, &relations);
            self.remove_overlaps(&mut centers, &node_sizes);
            if self.options.pack_components() {
                self.pack_components(&mut centers, &node_sizes, &relations);
            }

            let boxes: Vec<Bounds> = centers
                .iter()
                .zip(&node_sizes)
                .map(|(center, size)| Bounds::new_from_center(*center, *size))
                .collect();
            let content = boxes
                .iter()
                .copied()
                .reduce(|acc, bounds| acc.merge(&bounds))
                .unwrap_or_default();

            for (idx, bounds) in nodes.iter().zip(&boxes) {
                local.insert(*idx, bounds.min_point().sub_point(content.min_point()));
            }

            if let Some(container) = scope.container() {
                let size = content
                    .to_size()
                    .add_padding(self.padding)
                    .max(self.node_size);
                trace!(
                    container = graph.node(container).id().to_string(),
                    width = size.width(),
                    height = size.height();
                    "Sized container"
                );
                sizes.insert(container, size);
            }
        }

        // Resolve absolute corners, outermost scope first.
        let mut absolute: HashMap<NodeIndex, Point> = HashMap::with_capacity(graph.node_count());
        for scope in graph.containment_scopes().iter().rev() {
            let origin = match scope.container() {
                Some(container) => absolute
                    .get(&container)
                    .copied()
                    .ok_or_else(|| {
                        ViewError::Layout(format!(
                            "container `{}` was not placed before its children",
                            graph.node(container).id()
                        ))
                    })?
                    .add_point(Point::new(self.padding.left(), self.padding.top())),
                None => Point::new(self.options.padding(), self.options.padding()),
            };

            for idx in scope.node_indices() {
                let offset = local.get(&idx).copied().unwrap_or_default();
                absolute.insert(idx, origin.add_point(offset));
            }
        }

        let mut nodes = IndexMap::with_capacity(graph.node_count());
        for idx in graph.node_indices() {
            let Some(top_left) = absolute.get(&idx).copied() else {
                return Err(ViewError::Layout(format!(
                    "node `{}` was not placed",
                    graph.node(idx).id()
                )));
            };
            let size = sizes.get(&idx).copied().unwrap_or(self.node_size);
            nodes.insert(
                graph.node(idx).id(),
                Bounds::new_from_top_left(top_left, size),
            );
        }

        debug!(node_count = nodes.len(); "Force layout calculated");
        Ok(ElementLayout::new(nodes))
    }
}

#[cfg(test)]
mod tests {
    use hierview_core::{
        design::{Design, Instance},
        identifier::Id,
    };

    use super::*;
    use crate::transform::{flatten, nest};

    fn engine(options: FcoseOptions) -> Engine {
        Engine::new(options, Size::new(100.0, 40.0), Insets::uniform(20.0))
    }

    fn fast_options() -> FcoseOptions {
        FcoseOptions::default().with_seed(7).with_num_iter(200)
    }

    fn soc() -> Design {
        Design::new([
            Instance::new("cpu0", "CPU").with_children([
                Instance::new("alu0", "ALU").with_children([
                    Instance::new("add0", "ADDER"),
                    Instance::new("mul0", "MULTIPLIER"),
                ]),
                Instance::new("cu0", "CONTROL").with_child(Instance::new("dec0", "DECODER")),
                Instance::new("rf0", "REGFILE"),
            ]),
            Instance::new("dma0", "DMA"),
        ])
    }

    fn layout_of(design: &Design, options: FcoseOptions) -> ElementLayout {
        let elements = nest(Some(design));
        let graph = ElementGraph::from_elements(&elements).unwrap();
        engine(options).calculate(&graph).unwrap()
    }

    #[test]
    fn test_children_inside_parents() {
        let elements = nest(Some(&soc()));
        let layout = layout_of(&soc(), fast_options());

        for node in elements.iter().filter_map(|element| element.as_node()) {
            let Some(parent) = node.parent() else {
                continue;
            };
            let child_bounds = layout.bounds(node.id()).unwrap();
            let parent_bounds = layout.bounds(parent).unwrap();
            assert!(
                parent_bounds.contains(&child_bounds),
                "{} escapes {parent}",
                node.id()
            );
        }
    }

    #[test]
    fn test_siblings_do_not_overlap() {
        let layout = layout_of(&soc(), fast_options().with_pack_components(false));
        let siblings = [
            "cpu0_CPU::alu0_ALU",
            "cpu0_CPU::cu0_CONTROL",
            "cpu0_CPU::rf0_REGFILE",
        ];

        for (i, first) in siblings.iter().enumerate() {
            for second in &siblings[i + 1..] {
                let a = layout.bounds(Id::new(first)).unwrap();
                let b = layout.bounds(Id::new(second)).unwrap();
                assert!(a.overlap(&b).is_none(), "{first} overlaps {second}");
            }
        }
    }

    #[test]
    fn test_same_seed_same_layout() {
        let first = layout_of(&soc(), fast_options());
        let second = layout_of(&soc(), fast_options());

        let first: Vec<(Id, Bounds)> = first.iter().collect();
        let second: Vec<(Id, Bounds)> = second.iter().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_grid_start_without_randomize() {
        let options = fast_options().with_randomize(false);
        let layout = layout_of(&soc(), options);
        assert_eq!(layout.len(), soc().instance_count());
    }

    #[test]
    fn test_container_grows_with_children() {
        let layout = layout_of(&soc(), fast_options());
        let cpu = layout.bounds(Id::new("cpu0_CPU")).unwrap();
        let dma = layout.bounds(Id::new("dma0_DMA")).unwrap();

        assert!(cpu.width() > dma.width());
        assert!(cpu.height() > dma.height());
    }

    fn six_children() -> Design {
        Design::new([Instance::new("top", "TOP").with_children(
            (0..6).map(|i| Instance::new(format!("c{i}"), "LEAF")),
        )])
    }

    fn boxes(layout: &ElementLayout) -> Vec<(Id, Bounds)> {
        layout.iter().collect()
    }

    #[test]
    fn test_simulation_shapes_packed_layout() {
        let options = FcoseOptions::default().with_seed(1);
        assert!(options.pack_components());

        let settled = layout_of(&six_children(), options.clone().with_num_iter(300));
        let unrelaxed = layout_of(&six_children(), options.clone().with_num_iter(0));
        let reseeded = layout_of(&six_children(), options.with_seed(2).with_num_iter(300));

        assert_ne!(boxes(&settled), boxes(&unrelaxed));
        assert_ne!(boxes(&settled), boxes(&reseeded));
    }

    #[test]
    fn test_edge_components_are_packed_apart() {
        let design = Design::new([
            Instance::new("a", "A").with_child(Instance::new("a1", "A1")),
            Instance::new("b", "B").with_child(Instance::new("b1", "B1")),
        ]);
        let elements = flatten(Some(&design));
        let graph = ElementGraph::from_elements(&elements).unwrap();
        let layout = engine(fast_options()).calculate(&graph).unwrap();

        let component = |root: &str, child: &str| {
            layout
                .bounds(Id::new(root))
                .unwrap()
                .merge(&layout.bounds(Id::new(child)).unwrap())
        };
        let first = component("a_A", "a_A::a1_A1");
        let second = component("b_B", "b_B::b1_B1");
        assert!(first.overlap(&second).is_none());
    }

    #[test]
    fn test_layout_starts_at_padding() {
        let layout = layout_of(&soc(), fast_options());
        let content = layout.content_bounds();

        assert!(content.min_x() >= 40.0 - f32::EPSILON);
        assert!(content.min_y() >= 40.0 - f32::EPSILON);
    }
}
