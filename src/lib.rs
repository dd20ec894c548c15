// Pathcov: structural coverage requirements for directed graphs
//
// Computes prime paths and edge-pairs over control-flow or state-transition
// graphs for model-based and structural test design.

pub mod cli;
pub mod coverage;
pub mod error;
pub mod graph;
pub mod output;

pub use coverage::{compute_edge_pairs, compute_prime_paths, ComputationState, Criterion, CoverageLimits, Path};
pub use error::CoverageError;
pub use graph::{parse_graph, Graph, GraphBuilder};
