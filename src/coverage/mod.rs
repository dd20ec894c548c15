//! Structural coverage requirements: prime paths and edge-pairs
//!
//! Both criteria are computed by round-based engines driven through a
//! [`ComputationState`]. Callers that only want the final answer use
//! [`compute_prime_paths`] or [`compute_edge_pairs`]; callers that want to
//! report progress step the state themselves or pass an [`Observer`] to
//! [`run_to_completion`].

pub mod driver;
pub mod edge_pairs;
pub mod observer;
pub mod prime;

pub use driver::{ComputationState, EngineState};
pub use edge_pairs::{EdgePairEngine, EdgePairPhase};
pub use observer::{Event, Narrative, NoopObserver, Observer, ProgressReporter};
pub use prime::{is_subpath, PrimePathEngine, PrimePhase};

use crate::error::CoverageError;
use crate::graph::{Graph, NodeId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Coverage criterion computed by an engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    PrimePaths,
    EdgePairs,
}

impl Criterion {
    /// Plural noun used in progress and summary messages
    pub fn noun(&self) -> &'static str {
        match self {
            Criterion::PrimePaths => "prime paths",
            Criterion::EdgePairs => "edge pairs",
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.noun())
    }
}

/// Default round cap for both engines
pub const DEFAULT_MAX_ITERATIONS: usize = 100;

/// Configurable bounds on a computation
///
/// The round cap is a deterministic fuse against inputs that keep the engine
/// growing. Round `k` (1-based) fails when `k >= max_iterations`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageLimits {
    /// Round cap, `None` disables it
    pub max_iterations: Option<usize>,
}

impl Default for CoverageLimits {
    fn default() -> Self {
        Self {
            max_iterations: Some(DEFAULT_MAX_ITERATIONS),
        }
    }
}

impl CoverageLimits {
    /// Create limits with a custom round cap
    pub fn new(max_iterations: usize) -> Self {
        Self {
            max_iterations: Some(max_iterations),
        }
    }

    /// Limits without a round cap
    pub fn unbounded() -> Self {
        Self {
            max_iterations: None,
        }
    }

    /// Builder form of [`CoverageLimits::new`]
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }

    /// Fail if `round` is not allowed to run
    pub(crate) fn check_round(&self, round: usize, criterion: Criterion) -> Result<(), CoverageError> {
        match self.max_iterations {
            Some(limit) if round >= limit => {
                tracing::warn!(%criterion, round, limit, "iteration limit reached");
                Err(CoverageError::IterationLimitExceeded { criterion, limit })
            }
            _ => Ok(()),
        }
    }
}

/// A finished coverage requirement: a walk through the graph
///
/// Identified by a BLAKE3 hash of its node sequence so that results can be
/// compared across runs and tools.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Path {
    /// Unique identifier (BLAKE3 hash of node sequence)
    pub path_id: String,
    /// Node identifiers in walk order
    pub nodes: Vec<String>,
}

impl Path {
    /// Create a path from a node sequence
    pub fn new(nodes: Vec<String>) -> Self {
        let path_id = hash_path(&nodes);
        Self { path_id, nodes }
    }

    pub(crate) fn from_ids(graph: &Graph, ids: &[NodeId]) -> Self {
        Self::new(graph.names_of(ids))
    }

    /// Number of nodes in the path
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(String::as_str)
    }

    pub fn contains(&self, node: &str) -> bool {
        self.nodes.iter().any(|n| n == node)
    }

    pub fn first(&self) -> Option<&str> {
        self.nodes.first().map(String::as_str)
    }

    pub fn last(&self) -> Option<&str> {
        self.nodes.last().map(String::as_str)
    }

    /// Consecutive `(from, to)` pairs along the path
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.nodes
            .windows(2)
            .map(|pair| (pair[0].as_str(), pair[1].as_str()))
    }

    /// Whether the walk returns to its starting node
    pub fn is_cycle(&self) -> bool {
        self.nodes.len() > 1 && self.nodes.first() == self.nodes.last()
    }
}

/// Compute BLAKE3 hash of a node sequence
///
/// The hash includes the sequence length and each identifier's byte length,
/// so sequences whose concatenations coincide still hash differently.
pub fn hash_path(nodes: &[String]) -> String {
    let mut hasher = blake3::Hasher::new();

    hasher.update(&(nodes.len() as u64).to_le_bytes());

    for node in nodes {
        hasher.update(&(node.len() as u64).to_le_bytes());
        hasher.update(node.as_bytes());
    }

    hasher.finalize().to_hex().to_string()
}

/// Compute prime paths of a graph
///
/// # Errors
///
/// Returns [`CoverageError::IterationLimitExceeded`] if growth has not
/// converged when the round cap is reached.
///
/// # Examples
///
/// ```rust
/// use pathcov::coverage::{compute_prime_paths, CoverageLimits};
/// use pathcov::graph::parse_graph;
///
/// let graph = parse_graph("a b\na c").unwrap();
/// let paths = compute_prime_paths(&graph, &CoverageLimits::default()).unwrap();
/// assert_eq!(paths.len(), 2);
/// ```
pub fn compute_prime_paths(graph: &Graph, limits: &CoverageLimits) -> Result<Vec<Path>, CoverageError> {
    run_to_completion(graph, Criterion::PrimePaths, limits, &mut NoopObserver)
}

/// Compute edge-pairs of a graph
///
/// Every `n -> m -> k` walk is returned once per combination of parallel
/// edges; no deduplication is performed.
///
/// # Errors
///
/// Returns [`CoverageError::IterationLimitExceeded`] if the node queue is not
/// drained when the round cap is reached.
pub fn compute_edge_pairs(graph: &Graph, limits: &CoverageLimits) -> Result<Vec<Path>, CoverageError> {
    run_to_completion(graph, Criterion::EdgePairs, limits, &mut NoopObserver)
}

/// Step a fresh computation until it is terminal
pub fn run_to_completion(
    graph: &Graph,
    criterion: Criterion,
    limits: &CoverageLimits,
    observer: &mut dyn Observer,
) -> Result<Vec<Path>, CoverageError> {
    let mut state = ComputationState::new(graph, criterion, *limits);
    while !state.is_terminal() {
        state.step(observer)?;
    }
    Ok(state.into_paths())
}

/// Graph edges that no path traverses
///
/// Edges are reported once each, in graph declaration order.
pub fn uncovered_edges(graph: &Graph, paths: &[Path]) -> Vec<(String, String)> {
    let covered: HashSet<(&str, &str)> = paths.iter().flat_map(|p| p.edges()).collect();
    let mut seen = HashSet::new();

    graph
        .edges()
        .map(|(from, to)| (graph.name(from), graph.name(to)))
        .filter(|edge| !covered.contains(edge) && seen.insert(*edge))
        .map(|(from, to)| (from.to_string(), to.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::parse_graph;

    fn nodes(paths: &[Path]) -> Vec<Vec<&str>> {
        paths.iter().map(|p| p.iter().collect()).collect()
    }

    #[test]
    fn test_hash_path_deterministic() {
        let nodes = vec!["a".to_string(), "b".to_string()];
        assert_eq!(hash_path(&nodes), hash_path(&nodes));
    }

    #[test]
    fn test_hash_path_separator_collision() {
        let joined = vec!["a b".to_string()];
        let split = vec!["a".to_string(), "b".to_string()];
        assert_ne!(hash_path(&joined), hash_path(&split));

        let left = vec!["ab".to_string(), "c".to_string()];
        let right = vec!["a".to_string(), "bc".to_string()];
        assert_ne!(hash_path(&left), hash_path(&right));
    }

    #[test]
    fn test_path_accessors() {
        let path = Path::new(vec!["a".into(), "b".into(), "a".into()]);

        assert_eq!(path.len(), 3);
        assert!(!path.is_empty());
        assert!(path.contains("b"));
        assert!(!path.contains("c"));
        assert_eq!(path.first(), Some("a"));
        assert_eq!(path.last(), Some("a"));
        assert!(path.is_cycle());
        assert_eq!(path.edges().collect::<Vec<_>>(), vec![("a", "b"), ("b", "a")]);
    }

    #[test]
    fn test_single_node_path_is_not_cycle() {
        assert!(!Path::new(vec!["a".into()]).is_cycle());
    }

    #[test]
    fn test_limits_default() {
        assert_eq!(CoverageLimits::default().max_iterations, Some(100));
        assert_eq!(CoverageLimits::unbounded().max_iterations, None);
        assert_eq!(CoverageLimits::unbounded().with_max_iterations(7).max_iterations, Some(7));
        assert_eq!(CoverageLimits::new(3), CoverageLimits::default().with_max_iterations(3));
    }

    #[test]
    fn test_limits_check_round() {
        let limits = CoverageLimits::new(3);
        assert!(limits.check_round(2, Criterion::PrimePaths).is_ok());
        assert!(limits.check_round(3, Criterion::PrimePaths).unwrap_err().is_iteration_limit());
        assert!(CoverageLimits::unbounded().check_round(1_000_000, Criterion::EdgePairs).is_ok());
    }

    #[test]
    fn test_criterion_display() {
        assert_eq!(Criterion::PrimePaths.to_string(), "prime paths");
        assert_eq!(Criterion::EdgePairs.to_string(), "edge pairs");
    }

    #[test]
    fn test_compute_prime_paths_branch() {
        let graph = parse_graph("a b\na c").unwrap();
        let paths = compute_prime_paths(&graph, &CoverageLimits::default()).unwrap();

        assert_eq!(nodes(&paths), vec![vec!["a", "b"], vec!["a", "c"]]);
    }

    #[test]
    fn test_compute_edge_pairs_scenario() {
        let graph = parse_graph("a b\nb c\nb d").unwrap();
        let paths = compute_edge_pairs(&graph, &CoverageLimits::default()).unwrap();

        assert_eq!(nodes(&paths), vec![vec!["a", "b", "c"], vec!["a", "b", "d"]]);
    }

    #[test]
    fn test_uncovered_edges_all_covered() {
        let graph = parse_graph("a b\nb c\nc a").unwrap();
        let paths = compute_prime_paths(&graph, &CoverageLimits::default()).unwrap();

        assert!(uncovered_edges(&graph, &paths).is_empty());
    }

    #[test]
    fn test_uncovered_edges_reports_missing() {
        let graph = parse_graph("a b\nb c\nb c").unwrap();
        let paths = vec![Path::new(vec!["a".into(), "b".into()])];

        assert_eq!(
            uncovered_edges(&graph, &paths),
            vec![("b".to_string(), "c".to_string())]
        );
    }
}
