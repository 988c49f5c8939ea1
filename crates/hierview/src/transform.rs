//! Design-to-graph transformers.
//!
//! Both transformers walk the design in pre-order (parents before children,
//! siblings in input order) and return a freshly built element list:
//!
//! - [`flatten`] produces the tree view: one node per instance plus one
//!   `instantiates` edge from every non-top instance's parent.
//! - [`nest`] produces the containment view: one node per instance carrying
//!   its enclosing node as `parent`, and no edges.
//!
//! Traversal uses an explicit stack, so the depth of a design is bounded
//! only by memory.

use log::debug;

use hierview_core::{
    design::{Design, Instance},
    identifier::Id,
};

use crate::{
    element::{EdgeElement, GraphElement, NodeElement},
    resolve::resolve_sibling_ids,
};

/// Signature shared by both transformers.
pub type Transform = fn(Option<&Design>) -> Vec<GraphElement>;

/// One instance reached during a pre-order walk.
#[derive(Debug, Clone, Copy)]
pub struct Visit<'d> {
    instance: &'d Instance,
    id: Id,
    parent: Option<Id>,
    depth: usize,
}

impl<'d> Visit<'d> {
    pub fn instance(&self) -> &'d Instance {
        self.instance
    }

    pub fn id(&self) -> Id {
        self.id
    }

    /// Id of the enclosing instance, `None` for top-level instances.
    pub fn parent(&self) -> Option<Id> {
        self.parent
    }

    /// Zero for top-level instances.
    pub fn depth(&self) -> usize {
        self.depth
    }
}

/// Walks `design` in pre-order and resolves every instance's id.
pub fn pre_order(design: &Design) -> Vec<Visit<'_>> {
    let mut visits = Vec::with_capacity(design.instance_count());

    let top_ids = resolve_sibling_ids(None, design.top_instances());
    let mut stack: Vec<Visit<'_>> = design
        .top_instances()
        .iter()
        .zip(top_ids)
        .rev()
        .map(|(instance, id)| Visit {
            instance,
            id,
            parent: None,
            depth: 0,
        })
        .collect();

    while let Some(visit) = stack.pop() {
        let children = visit.instance.children();
        let child_ids = resolve_sibling_ids(Some(visit.id), children);
        stack.extend(
            children
                .iter()
                .zip(child_ids)
                .rev()
                .map(|(instance, id)| Visit {
                    instance,
                    id,
                    parent: Some(visit.id),
                    depth: visit.depth + 1,
                }),
        );
        visits.push(visit);
    }

    visits
}

/// Builds the tree-view element list.
///
/// Each node is immediately followed by the edge from its parent, if any.
/// `None` and empty designs produce an empty list.
///
/// # Examples
///
/// ```
/// use hierview::transform::flatten;
/// use hierview_core::design::{Design, Instance};
///
/// let design = Design::new([Instance::new("cpu0", "CPU").with_child(Instance::new("alu0", "ALU"))]);
/// assert_eq!(flatten(Some(&design)).len(), 3);
/// assert!(flatten(None).is_empty());
/// ```
pub fn flatten(design: Option<&Design>) -> Vec<GraphElement> {
    let Some(design) = design else {
        return Vec::new();
    };

    let elements: Vec<GraphElement> = pre_order(design)
        .into_iter()
        .flat_map(|visit| {
            let node = GraphElement::Node(NodeElement::from_instance(
                visit.id,
                visit.instance,
                None,
            ));
            let edge = visit
                .parent
                .map(|parent| GraphElement::Edge(EdgeElement::instantiates(parent, visit.id)));
            std::iter::once(node).chain(edge)
        })
        .collect();

    debug!(element_count = elements.len(); "Flattened design into tree elements");
    elements
}

/// Builds the containment-view element list.
///
/// Every node carries its enclosing instance as `parent`; no edges are
/// produced. `None` and empty designs produce an empty list.
pub fn nest(design: Option<&Design>) -> Vec<GraphElement> {
    let Some(design) = design else {
        return Vec::new();
    };

    let elements: Vec<GraphElement> = pre_order(design)
        .into_iter()
        .map(|visit| {
            GraphElement::Node(NodeElement::from_instance(
                visit.id,
                visit.instance,
                visit.parent,
            ))
        })
        .collect();

    debug!(element_count = elements.len(); "Nested design into containment elements");
    elements
}
