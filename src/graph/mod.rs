//! Directed graph model consumed by the coverage engines
//!
//! Nodes are opaque identifier strings interned into a dense table, so the
//! engines work on [`NodeId`] indices and only translate back to names when a
//! result leaves the crate. Out-neighbors keep their declaration order and
//! duplicate edges are preserved (multigraph semantics).
//!
//! A [`Graph`] can only be obtained from [`GraphBuilder::build`] (or the text
//! parser built on top of it), which guarantees two invariants the engines rely
//! on:
//!
//! 1. every node that appears as a neighbor is itself a node of the graph;
//! 2. the graph holds at least one node.

pub mod parse;

pub use parse::{parse_graph, to_text};

use crate::error::CoverageError;
use petgraph::algo::{is_cyclic_directed, tarjan_scc};
use petgraph::graph::DiGraph;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Index of a node in its owning [`Graph`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Adjacency-list graph over interned node identifiers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Graph {
    names: Vec<String>,
    lookup: HashMap<String, NodeId>,
    adjacency: Vec<Vec<NodeId>>,
}

impl Graph {
    /// Number of distinct nodes
    pub fn node_count(&self) -> usize {
        self.names.len()
    }

    /// Number of edges, counting duplicates
    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum()
    }

    /// Node ids in declaration order
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.names.len()).map(NodeId)
    }

    /// Identifier string of a node
    ///
    /// Panics if `id` was not produced by this graph.
    pub fn name(&self, id: NodeId) -> &str {
        &self.names[id.0]
    }

    /// Look up a node by identifier
    pub fn id(&self, name: &str) -> Option<NodeId> {
        self.lookup.get(name).copied()
    }

    /// Out-neighbors of a node in declaration order, duplicates included
    pub fn neighbors(&self, id: NodeId) -> &[NodeId] {
        &self.adjacency[id.0]
    }

    /// Out-degree of a node, counting duplicate edges
    pub fn out_degree(&self, id: NodeId) -> usize {
        self.adjacency[id.0].len()
    }

    /// Every edge as `(from, to)`, grouped by source in declaration order
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.adjacency
            .iter()
            .enumerate()
            .flat_map(|(from, targets)| targets.iter().map(move |&to| (NodeId(from), to)))
    }

    /// Translate a sequence of ids into identifier strings
    pub fn names_of(&self, ids: &[NodeId]) -> Vec<String> {
        ids.iter().map(|&id| self.name(id).to_string()).collect()
    }

    /// Convert to a petgraph `DiGraph` with node weights set to identifiers
    ///
    /// Node indices in the result match [`NodeId::index`].
    pub fn to_petgraph(&self) -> DiGraph<String, ()> {
        let mut g = DiGraph::with_capacity(self.node_count(), self.edge_count());
        let indices: Vec<_> = self.names.iter().map(|n| g.add_node(n.clone())).collect();
        for (from, to) in self.edges() {
            g.add_edge(indices[from.0], indices[to.0], ());
        }
        g
    }

    /// Structural statistics for reporting
    pub fn summary(&self) -> GraphSummary {
        let pg = self.to_petgraph();

        let self_loops = self.edges().filter(|(from, to)| from == to).count();

        // A component is cyclic when it has more than one node or a self-loop
        let cyclic_components = tarjan_scc(&pg)
            .into_iter()
            .filter(|scc| {
                scc.len() > 1
                    || scc
                        .first()
                        .map(|n| self.adjacency[n.index()].contains(&NodeId(n.index())))
                        .unwrap_or(false)
            })
            .count();

        let mut has_incoming = vec![false; self.node_count()];
        for (_, to) in self.edges() {
            has_incoming[to.0] = true;
        }

        GraphSummary {
            nodes: self.node_count(),
            edges: self.edge_count(),
            sources: has_incoming.iter().filter(|&&incoming| !incoming).count(),
            sinks: self.adjacency.iter().filter(|targets| targets.is_empty()).count(),
            self_loops,
            cyclic_components,
            is_cyclic: is_cyclic_directed(&pg),
        }
    }
}

/// High-level statistics about a graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSummary {
    pub nodes: usize,
    pub edges: usize,
    /// Nodes without incoming edges
    pub sources: usize,
    /// Nodes without outgoing edges
    pub sinks: usize,
    pub self_loops: usize,
    /// Strongly connected components that contain a cycle
    pub cyclic_components: usize,
    pub is_cyclic: bool,
}

/// Incremental constructor for [`Graph`]
///
/// Declaring an edge declares both endpoints, and redeclaring a node keeps its
/// existing neighbor list, so the neighbor invariant cannot be broken.
#[derive(Debug, Default, Clone)]
pub struct GraphBuilder {
    names: Vec<String>,
    lookup: HashMap<String, NodeId>,
    adjacency: Vec<Vec<NodeId>>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a node, returning its id (existing id if already declared)
    pub fn add_node(&mut self, name: &str) -> NodeId {
        if let Some(&id) = self.lookup.get(name) {
            return id;
        }
        let id = NodeId(self.names.len());
        self.names.push(name.to_string());
        self.lookup.insert(name.to_string(), id);
        self.adjacency.push(Vec::new());
        id
    }

    /// Append an edge `from -> to`, declaring either endpoint if needed
    pub fn add_edge(&mut self, from: &str, to: &str) -> &mut Self {
        let from = self.add_node(from);
        let to = self.add_node(to);
        self.adjacency[from.0].push(to);
        self
    }

    pub fn node_count(&self) -> usize {
        self.names.len()
    }

    /// Finish construction
    ///
    /// Fails with [`CoverageError::MalformedInput`] when no node was declared.
    pub fn build(self) -> Result<Graph, CoverageError> {
        if self.names.is_empty() {
            return Err(CoverageError::malformed("graph has no nodes"));
        }
        Ok(Graph {
            names: self.names,
            lookup: self.lookup,
            adjacency: self.adjacency,
        })
    }
}

/// Build a graph from `(node, neighbors)` pairs
///
/// Convenience for callers that already hold an adjacency mapping.
pub fn from_adjacency<'a, I, N>(entries: I) -> Result<Graph, CoverageError>
where
    I: IntoIterator<Item = (&'a str, N)>,
    N: IntoIterator<Item = &'a str>,
{
    let mut builder = GraphBuilder::new();
    for (node, neighbors) in entries {
        builder.add_node(node);
        for neighbor in neighbors {
            builder.add_edge(node, neighbor);
        }
    }
    builder.build()
}
