//! Prime path computation
//!
//! A prime path is a simple walk (no repeated node, except that the last node
//! may equal the first to close a cycle) that is not a contiguous sub-path of
//! any other simple walk.
//!
//! # Algorithm
//!
//! The engine moves through four phases:
//!
//! 1. **Seed**: one single-node path per graph node, in declaration order.
//! 2. **Growing**: each round visits the paths that existed when the round
//!    started (indices `0..len` fixed up front) and extends every live path
//!    by one edge:
//!    - a path that already repeats a node is frozen and skipped;
//!    - a neighbor already on the path is rejected, unless it is the path's
//!      first node (closing a cycle);
//!    - the first accepted neighbor extends the path in place, every further
//!      accepted neighbor forks a copy of the pre-round path that is appended
//!      to the set and first visited in the next round.
//! 3. **Converged**: a round made no extension and no fork.
//! 4. **Reduced**: every path contained contiguously in another path is
//!    dropped (identical paths collapse to one) and the survivors are sorted
//!    by length, then lexicographically by node identifier.

use super::observer::{Event, Observer};
use super::{Criterion, CoverageLimits};
use crate::error::CoverageError;
use crate::graph::{Graph, NodeId};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::mem;

/// Working path inside an engine
pub type Walk = Vec<NodeId>;

/// Phase of a prime path computation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimePhase {
    Seed,
    Growing,
    Converged,
    Reduced,
}

/// Steppable prime path engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimePathEngine {
    phase: PrimePhase,
    paths: Vec<Walk>,
}

impl Default for PrimePathEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl PrimePathEngine {
    pub fn new() -> Self {
        Self {
            phase: PrimePhase::Seed,
            paths: Vec::new(),
        }
    }

    pub fn phase(&self) -> PrimePhase {
        self.phase
    }

    pub fn is_terminal(&self) -> bool {
        self.phase == PrimePhase::Reduced
    }

    /// Current working set (final, sorted set once reduced)
    pub fn paths(&self) -> &[Walk] {
        &self.paths
    }

    pub(crate) fn into_paths(self) -> Vec<Walk> {
        self.paths
    }

    /// Advance by one phase transition
    ///
    /// Seed and Growing run one growth round, counted against `limits`.
    /// Converged runs sub-path elimination. Reduced is left unchanged.
    pub fn step(
        &mut self,
        graph: &Graph,
        limits: &CoverageLimits,
        round: &mut usize,
        observer: &mut dyn Observer,
    ) -> Result<(), CoverageError> {
        match self.phase {
            PrimePhase::Reduced => Ok(()),
            PrimePhase::Converged => {
                let candidates = mem::take(&mut self.paths);
                self.paths = reduce(graph, candidates, observer);
                self.phase = PrimePhase::Reduced;
                tracing::info!(paths = self.paths.len(), rounds = *round, "prime paths reduced");
                Ok(())
            }
            PrimePhase::Seed | PrimePhase::Growing => {
                let next = *round + 1;
                limits.check_round(next, Criterion::PrimePaths)?;

                if self.phase == PrimePhase::Seed {
                    self.paths = seed(graph);
                    self.phase = PrimePhase::Growing;
                }
                *round = next;

                observer.observe(
                    graph,
                    &Event::RoundStarted {
                        criterion: Criterion::PrimePaths,
                        round: next,
                    },
                );

                let progressed = grow_round(graph, &mut self.paths, observer);
                if !progressed {
                    self.phase = PrimePhase::Converged;
                }

                tracing::debug!(round = next, paths = self.paths.len(), progressed, "prime path round");
                observer.observe(
                    graph,
                    &Event::RoundFinished {
                        criterion: Criterion::PrimePaths,
                        round: next,
                        paths: self.paths.len(),
                        done: !progressed,
                    },
                );
                Ok(())
            }
        }
    }
}

/// One single-node path per graph node
pub(crate) fn seed(graph: &Graph) -> Vec<Walk> {
    graph.nodes().map(|node| vec![node]).collect()
}

/// Whether any node occurs more than once
pub(crate) fn has_duplicate(path: &[NodeId]) -> bool {
    let mut seen = HashSet::with_capacity(path.len());
    !path.iter().all(|node| seen.insert(*node))
}

/// Run one growth round over `paths`, returning whether anything changed
///
/// Only paths present when the round starts are visited; forks are appended
/// after them.
pub(crate) fn grow_round(graph: &Graph, paths: &mut Vec<Walk>, observer: &mut dyn Observer) -> bool {
    let bound = paths.len();
    let mut progressed = false;

    for idx in 0..bound {
        if has_duplicate(&paths[idx]) {
            observer.observe(graph, &Event::SkippedDuplicate { path: &paths[idx] });
            continue;
        }

        let before = paths[idx].clone();
        let (first, last) = match (before.first(), before.last()) {
            (Some(&first), Some(&last)) => (first, last),
            _ => continue,
        };

        let mut extended = false;
        for &neighbor in graph.neighbors(last) {
            if neighbor != first && before.contains(&neighbor) {
                observer.observe(graph, &Event::RejectedCycle { path: &before, neighbor });
                continue;
            }

            if extended {
                let mut fork = before.clone();
                fork.push(neighbor);
                tracing::trace!(from = idx, to = paths.len(), "fork");
                observer.observe(graph, &Event::Forked { from: &before, to: &fork });
                paths.push(fork);
            } else {
                paths[idx].push(neighbor);
                extended = true;
                tracing::trace!(path = idx, "extend");
                observer.observe(graph, &Event::Extended { from: &before, to: &paths[idx] });
            }
            progressed = true;
        }
    }

    progressed
}

/// Whether `needle` occurs as a contiguous run inside `haystack`
///
/// An empty `needle` is contained in everything.
pub fn is_subpath<T: PartialEq>(needle: &[T], haystack: &[T]) -> bool {
    if needle.is_empty() {
        return true;
    }
    needle.len() <= haystack.len() && haystack.windows(needle.len()).any(|window| window == needle)
}

/// Drop sub-paths and sort the survivors
///
/// Candidates are ordered by length (stable) and each is compared only with
/// the ones after it, so among identical paths the last occurrence survives.
pub(crate) fn reduce(graph: &Graph, mut paths: Vec<Walk>, observer: &mut dyn Observer) -> Vec<Walk> {
    observer.observe(graph, &Event::ReductionStarted { candidates: paths.len() });

    paths.sort_by_key(Vec::len);

    let mut keep = vec![true; paths.len()];
    for i in 0..paths.len() {
        if let Some(j) = (i + 1..paths.len()).find(|&j| is_subpath(&paths[i], &paths[j])) {
            observer.observe(
                graph,
                &Event::DroppedSubPath {
                    path: &paths[i],
                    container: &paths[j],
                },
            );
            keep[i] = false;
        }
    }

    let mut primes: Vec<Walk> = paths
        .into_iter()
        .zip(keep)
        .filter_map(|(path, kept)| kept.then_some(path))
        .collect();
    primes.sort_by(|a, b| compare_paths(graph, a, b));

    observer.observe(graph, &Event::Reduced { paths: primes.len() });
    primes
}

/// Order by length, then lexicographically by node identifier
pub(crate) fn compare_paths(graph: &Graph, a: &[NodeId], b: &[NodeId]) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| {
        a.iter()
            .map(|&id| graph.name(id))
            .cmp(b.iter().map(|&id| graph.name(id)))
    })
}
