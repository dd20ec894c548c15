//! Error types for graph parsing and coverage computation

use crate::coverage::Criterion;
use thiserror::Error;

/// Errors surfaced by the parser and the coverage engines
///
/// Both variants are terminal for the computation that raised them: there is
/// no partial result and nothing is retried internally.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoverageError {
    /// Input text does not describe a usable graph
    #[error("{}", describe_malformed(.line, .reason))]
    MalformedInput {
        /// 1-based line number, when a specific line is at fault
        line: Option<usize>,
        reason: String,
    },

    /// The round cap was reached before the engine finished
    #[error("Maximum iterations reached: {criterion} did not finish within {limit} rounds")]
    IterationLimitExceeded { criterion: Criterion, limit: usize },
}

impl CoverageError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            line: None,
            reason: reason.into(),
        }
    }

    pub fn malformed_line(line: usize, reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            line: Some(line),
            reason: reason.into(),
        }
    }

    pub fn is_malformed_input(&self) -> bool {
        matches!(self, Self::MalformedInput { .. })
    }

    pub fn is_iteration_limit(&self) -> bool {
        matches!(self, Self::IterationLimitExceeded { .. })
    }
}

fn describe_malformed(line: &Option<usize>, reason: &str) -> String {
    match line {
        Some(num) => format!("Invalid input format at line {}: {}", num, reason),
        None => format!("Invalid input: {}", reason),
    }
}
