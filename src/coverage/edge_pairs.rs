//! Edge-pair enumeration
//!
//! An edge-pair is a walk `n -> m -> k` of two edges. The engine keeps a queue
//! of nodes in declaration order and drains one node per round, recording one
//! pair per combination of edges (parallel edges yield repeated pairs).

use super::observer::{Event, Observer};
use super::prime::Walk;
use super::{Criterion, CoverageLimits};
use crate::error::CoverageError;
use crate::graph::{Graph, NodeId};
use std::collections::VecDeque;

/// Phase of an edge-pair computation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgePairPhase {
    /// Queue not yet filled
    Queued,
    Draining,
    Done,
}

/// Steppable edge-pair engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgePairEngine {
    phase: EdgePairPhase,
    remaining: VecDeque<NodeId>,
    pairs: Vec<Walk>,
}

impl Default for EdgePairEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl EdgePairEngine {
    pub fn new() -> Self {
        Self {
            phase: EdgePairPhase::Queued,
            remaining: VecDeque::new(),
            pairs: Vec::new(),
        }
    }

    pub fn phase(&self) -> EdgePairPhase {
        self.phase
    }

    pub fn is_terminal(&self) -> bool {
        self.phase == EdgePairPhase::Done
    }

    /// Nodes not yet processed
    pub fn remaining(&self) -> &VecDeque<NodeId> {
        &self.remaining
    }

    /// Pairs recorded so far
    pub fn paths(&self) -> &[Walk] {
        &self.pairs
    }

    pub(crate) fn into_paths(self) -> Vec<Walk> {
        self.pairs
    }

    /// Process the next queued node
    pub fn step(
        &mut self,
        graph: &Graph,
        limits: &CoverageLimits,
        round: &mut usize,
        observer: &mut dyn Observer,
    ) -> Result<(), CoverageError> {
        if self.phase == EdgePairPhase::Done {
            return Ok(());
        }

        let next = *round + 1;
        limits.check_round(next, Criterion::EdgePairs)?;

        if self.phase == EdgePairPhase::Queued {
            self.remaining = graph.nodes().collect();
            self.phase = EdgePairPhase::Draining;
        }
        *round = next;

        observer.observe(
            graph,
            &Event::RoundStarted {
                criterion: Criterion::EdgePairs,
                round: next,
            },
        );

        if let Some(node) = self.remaining.pop_front() {
            for &middle in graph.neighbors(node) {
                for &end in graph.neighbors(middle) {
                    let pair = vec![node, middle, end];
                    observer.observe(graph, &Event::PairAdded { pair: &pair });
                    self.pairs.push(pair);
                }
            }
        }

        let done = self.remaining.is_empty();
        if done {
            self.phase = EdgePairPhase::Done;
            tracing::info!(pairs = self.pairs.len(), rounds = next, "edge pairs drained");
        }

        tracing::debug!(round = next, pairs = self.pairs.len(), "edge pair round");
        observer.observe(
            graph,
            &Event::RoundFinished {
                criterion: Criterion::EdgePairs,
                round: next,
                paths: self.pairs.len(),
                done,
            },
        );
        Ok(())
    }
}
