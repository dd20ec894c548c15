//! Re-entrant computation state for round-by-round driving
//!
//! A [`ComputationState`] owns everything one computation needs except the
//! graph, which it borrows read-only. Each call to
//! [`step`](ComputationState::step) advances exactly one round (or, for prime
//! paths, the final reduction pass) and returns control to the caller, who
//! decides whether and when to continue. Once terminal, further steps leave
//! the state unchanged.

use super::edge_pairs::{EdgePairEngine, EdgePairPhase};
use super::observer::Observer;
use super::prime::{PrimePathEngine, PrimePhase};
use super::{Criterion, CoverageLimits, Path};
use crate::error::CoverageError;
use crate::graph::Graph;

/// Engine-specific part of a computation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineState {
    PrimePaths(PrimePathEngine),
    EdgePairs(EdgePairEngine),
}

impl EngineState {
    fn new(criterion: Criterion) -> Self {
        match criterion {
            Criterion::PrimePaths => EngineState::PrimePaths(PrimePathEngine::new()),
            Criterion::EdgePairs => EngineState::EdgePairs(EdgePairEngine::new()),
        }
    }
}

/// One computation over one graph
#[derive(Debug, Clone)]
pub struct ComputationState<'g> {
    graph: &'g Graph,
    limits: CoverageLimits,
    round: usize,
    engine: EngineState,
}

impl<'g> ComputationState<'g> {
    pub fn new(graph: &'g Graph, criterion: Criterion, limits: CoverageLimits) -> Self {
        Self {
            graph,
            limits,
            round: 0,
            engine: EngineState::new(criterion),
        }
    }

    /// Start a prime path computation with default limits
    pub fn prime_paths(graph: &'g Graph) -> Self {
        Self::new(graph, Criterion::PrimePaths, CoverageLimits::default())
    }

    /// Start an edge-pair computation with default limits
    pub fn edge_pairs(graph: &'g Graph) -> Self {
        Self::new(graph, Criterion::EdgePairs, CoverageLimits::default())
    }

    pub fn graph(&self) -> &'g Graph {
        self.graph
    }

    pub fn criterion(&self) -> Criterion {
        match self.engine {
            EngineState::PrimePaths(_) => Criterion::PrimePaths,
            EngineState::EdgePairs(_) => Criterion::EdgePairs,
        }
    }

    pub fn limits(&self) -> &CoverageLimits {
        &self.limits
    }

    /// Rounds completed so far
    pub fn round(&self) -> usize {
        self.round
    }

    pub fn engine(&self) -> &EngineState {
        &self.engine
    }

    pub fn is_terminal(&self) -> bool {
        match &self.engine {
            EngineState::PrimePaths(engine) => engine.is_terminal(),
            EngineState::EdgePairs(engine) => engine.is_terminal(),
        }
    }

    /// Advance one round
    ///
    /// # Errors
    ///
    /// Returns [`CoverageError::IterationLimitExceeded`] when the next round
    /// would reach the cap. The state is left as it was before the call.
    pub fn step(&mut self, observer: &mut dyn Observer) -> Result<(), CoverageError> {
        match &mut self.engine {
            EngineState::PrimePaths(engine) => engine.step(self.graph, &self.limits, &mut self.round, observer),
            EngineState::EdgePairs(engine) => engine.step(self.graph, &self.limits, &mut self.round, observer),
        }
    }

    /// Number of paths in the current working set
    pub fn path_count(&self) -> usize {
        match &self.engine {
            EngineState::PrimePaths(engine) => engine.paths().len(),
            EngineState::EdgePairs(engine) => engine.paths().len(),
        }
    }

    /// Snapshot of the current working set
    ///
    /// Before a prime path computation is reduced this includes sub-paths and
    /// frozen cyclic candidates.
    pub fn paths(&self) -> Vec<Path> {
        let walks = match &self.engine {
            EngineState::PrimePaths(engine) => engine.paths(),
            EngineState::EdgePairs(engine) => engine.paths(),
        };
        walks.iter().map(|w| Path::from_ids(self.graph, w)).collect()
    }

    /// Consume the state, returning its paths
    pub fn into_paths(self) -> Vec<Path> {
        let graph = self.graph;
        let walks = match self.engine {
            EngineState::PrimePaths(engine) => engine.into_paths(),
            EngineState::EdgePairs(engine) => engine.into_paths(),
        };
        walks.iter().map(|w| Path::from_ids(graph, w)).collect()
    }

    /// Human-readable status of the computation
    pub fn progress(&self) -> String {
        let criterion = self.criterion();
        match &self.engine {
            EngineState::PrimePaths(engine) if engine.phase() == PrimePhase::Converged => {
                format!("Converged after {} rounds: {} candidate paths.", self.round, self.path_count())
            }
            EngineState::EdgePairs(engine) if engine.phase() == EdgePairPhase::Queued => "Not started.".to_string(),
            EngineState::PrimePaths(engine) if engine.phase() == PrimePhase::Seed => "Not started.".to_string(),
            _ if self.is_terminal() => format!("Done: {} {}.", self.path_count(), criterion),
            _ => format!("Iteration {}: found {} {}.", self.round, self.path_count(), criterion),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coverage::{NoopObserver, ProgressReporter};
    use crate::graph::parse_graph;

    #[test]
    fn test_initial_state() {
        let g = parse_graph("a b").unwrap();
        let state = ComputationState::prime_paths(&g);

        assert_eq!(state.criterion(), Criterion::PrimePaths);
        assert_eq!(state.round(), 0);
        assert!(!state.is_terminal());
        assert_eq!(state.path_count(), 0);
        assert_eq!(state.progress(), "Not started.");
        assert_eq!(state.limits(), &CoverageLimits::default());
        assert!(std::ptr::eq(state.graph(), &g));
    }

    #[test]
    fn test_prime_progress_messages() {
        let g = parse_graph("a b\nb c\nc a").unwrap();
        let mut state = ComputationState::prime_paths(&g);

        state.step(&mut NoopObserver).unwrap();
        assert_eq!(state.progress(), "Iteration 1: found 3 prime paths.");

        while !matches!(state.engine(), EngineState::PrimePaths(e) if e.phase() == PrimePhase::Converged) {
            state.step(&mut NoopObserver).unwrap();
        }
        assert_eq!(state.round(), 4);
        assert_eq!(state.progress(), "Converged after 4 rounds: 3 candidate paths.");

        state.step(&mut NoopObserver).unwrap();
        assert!(state.is_terminal());
        assert_eq!(state.progress(), "Done: 3 prime paths.");
    }

    #[test]
    fn test_step_is_idempotent_once_terminal() {
        let g = parse_graph("a b\nb c").unwrap();
        let mut state = ComputationState::edge_pairs(&g);
        while !state.is_terminal() {
            state.step(&mut NoopObserver).unwrap();
        }

        let round = state.round();
        let engine = state.engine().clone();
        state.step(&mut NoopObserver).unwrap();
        state.step(&mut NoopObserver).unwrap();

        assert_eq!(state.round(), round);
        assert_eq!(state.engine(), &engine);
    }

    #[test]
    fn test_failed_step_leaves_state() {
        let g = parse_graph("a b\nb c\nc a").unwrap();
        let mut state = ComputationState::new(&g, Criterion::PrimePaths, CoverageLimits::new(2));

        state.step(&mut NoopObserver).unwrap();
        let snapshot = state.engine().clone();

        assert!(state.step(&mut NoopObserver).unwrap_err().is_iteration_limit());
        assert_eq!(state.round(), 1);
        assert_eq!(state.engine(), &snapshot);
    }

    #[test]
    fn test_working_set_snapshot_includes_candidates() {
        let g = parse_graph("a b").unwrap();
        let mut state = ComputationState::prime_paths(&g);
        state.step(&mut NoopObserver).unwrap();

        let snapshot: Vec<Vec<String>> = state.paths().into_iter().map(|p| p.nodes).collect();
        assert_eq!(snapshot, vec![vec!["a", "b"], vec!["b"]]);

        while !state.is_terminal() {
            state.step(&mut NoopObserver).unwrap();
        }
        let primes: Vec<Vec<String>> = state.into_paths().into_iter().map(|p| p.nodes).collect();
        assert_eq!(primes, vec![vec!["a", "b"]]);
    }

    #[test]
    fn test_progress_reporter_over_full_run() {
        let g = parse_graph("a b\na c").unwrap();
        let mut reporter = ProgressReporter::new();
        let mut state = ComputationState::prime_paths(&g);
        while !state.is_terminal() {
            state.step(&mut reporter).unwrap();
        }

        assert_eq!(
            reporter.lines(),
            &[
                "Iteration 1: found 4 prime paths.".to_string(),
                "Finished computing potential prime paths.".to_string(),
                "Removing sub-paths...".to_string(),
                "Finished removing sub-paths.".to_string(),
            ]
        );
    }

    #[test]
    fn test_edge_pair_progress_messages() {
        let g = parse_graph("a b\nb c\nb d").unwrap();
        let mut reporter = ProgressReporter::new();
        let mut state = ComputationState::edge_pairs(&g);
        while !state.is_terminal() {
            state.step(&mut reporter).unwrap();
        }

        assert_eq!(
            reporter.lines(),
            &[
                "Iteration 1: found 2 edge pairs.".to_string(),
                "Iteration 2: found 2 edge pairs.".to_string(),
                "Iteration 3: found 2 edge pairs.".to_string(),
                "Finished computing edge pairs.".to_string(),
            ]
        );
        assert_eq!(state.progress(), "Done: 2 edge pairs.");
    }
}
