//! Graph view of a transformed element list.
//!
//! [`ElementGraph`] indexes the nodes of an element list in a petgraph
//! [`DiGraph`], with one graph edge per `instantiates` element, and groups the
//! nodes into [`ContainmentScope`]s following their `parent` references. The
//! layout engines work on this structure rather than on raw elements.

use std::collections::HashMap;

use log::{debug, trace};
use petgraph::{
    Direction,
    graph::{DiGraph, EdgeIndex, NodeIndex},
    visit::EdgeRef,
};

use hierview_core::identifier::Id;

use crate::{
    element::{EdgeElement, GraphElement, NodeElement},
    error::ViewError,
};

/// Nodes that share the same enclosing node.
///
/// The root scope has no container and holds the top-level nodes.
#[derive(Debug)]
pub struct ContainmentScope {
    container: Option<NodeIndex>,
    nodes: Vec<NodeIndex>,
}

impl ContainmentScope {
    fn new(container: Option<NodeIndex>) -> Self {
        Self {
            container,
            nodes: Vec::new(),
        }
    }

    /// Returns the enclosing node, or `None` for the root scope.
    pub fn container(&self) -> Option<NodeIndex> {
        self.container
    }

    /// Returns the nodes of this scope in element order.
    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.nodes.iter().copied()
    }

    pub fn nodes_count(&self) -> usize {
        self.nodes.len()
    }
}

/// Indexed graph over the elements of a render plan.
#[derive(Debug)]
pub struct ElementGraph<'a> {
    graph: DiGraph<&'a NodeElement, &'a EdgeElement>,
    node_ids: HashMap<Id, NodeIndex>,
    // Innermost scopes first; the root scope is last.
    scopes: Vec<ContainmentScope>,
}

impl<'a> ElementGraph<'a> {
    /// Builds the graph for `elements`.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::Layout`] if a node names a parent that was not
    /// declared before it, or an edge references an unknown node.
    pub fn from_elements(elements: &'a [GraphElement]) -> Result<Self, ViewError> {
        let mut graph: DiGraph<&'a NodeElement, &'a EdgeElement> = DiGraph::new();
        let mut node_ids: HashMap<Id, NodeIndex> = HashMap::new();
        let mut scope_index: HashMap<Option<NodeIndex>, usize> = HashMap::new();
        let mut scopes: Vec<ContainmentScope> = Vec::new();

        for element in elements {
            match element {
                GraphElement::Node(node) => {
                    let container = node
                        .parent()
                        .map(|parent| {
                            node_ids.get(&parent).copied().ok_or_else(|| {
                                ViewError::Layout(format!(
                                    "node `{}` references parent `{parent}` before it is declared",
                                    node.id()
                                ))
                            })
                        })
                        .transpose()?;

                    let idx = graph.add_node(node);
                    node_ids.insert(node.id(), idx);

                    let scope = *scope_index.entry(container).or_insert_with(|| {
                        scopes.push(ContainmentScope::new(container));
                        scopes.len() - 1
                    });
                    scopes[scope].nodes.push(idx);
                }
                GraphElement::Edge(edge) => {
                    let endpoint = |id: Id| {
                        node_ids.get(&id).copied().ok_or_else(|| {
                            ViewError::Layout(format!("edge references unknown node `{id}`"))
                        })
                    };
                    let source = endpoint(edge.source())?;
                    let target = endpoint(edge.target())?;
                    graph.add_edge(source, target, edge);
                }
            }
        }

        // Scopes were opened in pre-order of their containers, so reversing
        // puts every scope before the scope that encloses it.
        scopes.reverse();

        debug!(
            node_count = graph.node_count(),
            edge_count = graph.edge_count(),
            scope_count = scopes.len();
            "Built element graph"
        );
        trace!(scopes:?; "Containment scopes");

        Ok(Self {
            graph,
            node_ids,
            scopes,
        })
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Returns all node indices in element order.
    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> {
        self.graph.node_indices()
    }

    /// Returns the node stored at `idx`.
    pub fn node(&self, idx: NodeIndex) -> &'a NodeElement {
        self.graph[idx]
    }

    /// Looks up the index of the node with `id`.
    pub fn index_of(&self, id: Id) -> Option<NodeIndex> {
        self.node_ids.get(&id).copied()
    }

    /// Nodes without incoming edges, in element order.
    pub fn roots(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices().filter(|&idx| {
            self.graph
                .neighbors_directed(idx, Direction::Incoming)
                .next()
                .is_none()
        })
    }

    /// Edge successors of `idx` in the order their edges were added.
    pub fn successors(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut edges: Vec<(EdgeIndex, NodeIndex)> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|edge| (edge.id(), edge.target()))
            .collect();
        edges.sort_by_key(|(edge, _)| *edge);
        edges.into_iter().map(|(_, target)| target).collect()
    }

    /// Returns the containment scopes, innermost first and the root last.
    pub fn containment_scopes(&self) -> &[ContainmentScope] {
        &self.scopes
    }

    /// Edges whose endpoints both belong to `scope`.
    pub fn scope_relations(&self, scope: &ContainmentScope) -> Vec<(NodeIndex, NodeIndex)> {
        self.graph
            .edge_references()
            .filter(|edge| {
                scope.nodes.contains(&edge.source()) && scope.nodes.contains(&edge.target())
            })
            .map(|edge| (edge.source(), edge.target()))
            .collect()
    }
}
