//! Line-oriented text format for graphs
//!
//! Each non-blank line that does not start with `#` is either
//!
//! - `node`: declares a node (possibly without edges), or
//! - `node nb1 nb2 ...`: appends an edge from `node` to each neighbor.
//!
//! Tokens are separated by the space character. A node may head several lines;
//! its neighbor lists are concatenated. Neighbors that were never declared
//! become nodes with no outgoing edges.

use super::{Graph, GraphBuilder, NodeId};
use crate::error::CoverageError;
use std::fmt::Write;

/// Comment marker at the start of a line
pub const COMMENT_PREFIX: char = '#';

/// Token separator inside a data line
pub const TOKEN_SEPARATOR: char = ' ';

/// Parse graph text into a [`Graph`]
///
/// # Errors
///
/// Returns [`CoverageError::MalformedInput`] when the text holds no data
/// lines (empty, whitespace-only or comment-only input), or when a data line
/// yields no token.
pub fn parse_graph(input: &str) -> Result<Graph, CoverageError> {
    let mut builder = GraphBuilder::new();

    for (num, line) in input.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with(COMMENT_PREFIX) {
            continue;
        }

        // Repeated spaces produce empty tokens, which are not identifiers
        let mut tokens = line.split(TOKEN_SEPARATOR).filter(|t| !t.is_empty());

        let node = tokens
            .next()
            .ok_or_else(|| CoverageError::malformed_line(num + 1, line))?;
        builder.add_node(node);

        for neighbor in tokens {
            builder.add_edge(node, neighbor);
        }
    }

    if builder.node_count() == 0 {
        return Err(CoverageError::malformed("no nodes or edges found"));
    }

    tracing::debug!(nodes = builder.node_count(), "parsed graph");
    builder.build()
}

/// Serialize a graph back into the line format
///
/// Each node gets one line with all of its neighbors, in declaration order.
/// When a line would introduce nodes in a different order than the graph
/// declares them, the missing nodes are declared first so that parsing the
/// output reproduces the same graph. Names starting with `#` would read back
/// as comments on a line of their own; they are declared through the edge
/// that introduced them instead, splitting that node's line where needed.
pub fn to_text(graph: &Graph) -> String {
    let mut writer = TextWriter {
        graph,
        out: String::new(),
        declared: 0,
        cursor: vec![0; graph.node_count()],
    };

    for node in graph.nodes() {
        writer.emit(node, graph.neighbors(node).len());
    }

    writer.out
}

/// Serializer state
///
/// `declared` counts the nodes the written text introduces so far and
/// `cursor[n]` how many of node `n`'s neighbors have been written.
struct TextWriter<'g> {
    graph: &'g Graph,
    out: String,
    declared: usize,
    cursor: Vec<usize>,
}

impl TextWriter<'_> {
    /// Write the neighbors of `node` below position `upto`
    fn emit(&mut self, node: NodeId, upto: usize) {
        let graph = self.graph;
        let neighbors = graph.neighbors(node);

        self.declare_until(node.index());
        let mut fresh = node.index() == self.declared;
        if fresh {
            self.declared += 1;
        }

        let mut line = vec![node];
        while self.cursor[node.index()] < upto {
            let next = neighbors[self.cursor[node.index()]];
            if next.index() > self.declared {
                self.flush(&mut line, fresh);
                fresh = false;
                self.declare_until(next.index());
                // Declaring may have written part of this node's list
                continue;
            }
            if next.index() == self.declared {
                self.declared += 1;
            }
            line.push(next);
            self.cursor[node.index()] += 1;
        }

        self.flush(&mut line, fresh);
    }

    /// Declare every node below index `target`
    fn declare_until(&mut self, target: usize) {
        let graph = self.graph;
        while self.declared < target {
            let id = NodeId(self.declared);
            let name = graph.name(id);
            match self.introducer(id) {
                Some((from, position)) if name.starts_with(COMMENT_PREFIX) => self.emit(from, position + 1),
                _ => {
                    writeln!(self.out, "{}", name).ok();
                    self.declared += 1;
                }
            }
        }
    }

    /// Unwritten edge that can declare `id` without skipping ahead
    fn introducer(&self, id: NodeId) -> Option<(NodeId, usize)> {
        (0..id.index()).map(NodeId).find_map(|from| {
            let pending = &self.graph.neighbors(from)[self.cursor[from.index()]..];
            let offset = pending.iter().position(|&n| n == id)?;
            pending[..offset]
                .iter()
                .all(|n| n.index() < id.index())
                .then_some((from, self.cursor[from.index()] + offset))
        })
    }

    /// Write the pending line if it carries edges or declares its head
    fn flush(&mut self, line: &mut Vec<NodeId>, fresh: bool) {
        let graph = self.graph;
        if line.len() > 1 || fresh {
            let names: Vec<&str> = line.iter().map(|&id| graph.name(id)).collect();
            writeln!(self.out, "{}", names.join(" ")).ok();
        }
        line.truncate(1);
    }
}
