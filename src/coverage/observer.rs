//! Reporting hooks for the coverage engines
//!
//! Engines emit an [`Event`] for every decision they make. Observers turn
//! those into progress lines, a step-by-step narrative, or nothing at all.
//! Events never influence the computation.

use super::Criterion;
use crate::graph::{Graph, NodeId};
use std::fmt::Write;

/// A single engine decision or round boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event<'a> {
    /// A round is about to run
    RoundStarted { criterion: Criterion, round: usize },
    /// A path was extended in place
    Extended { from: &'a [NodeId], to: &'a [NodeId] },
    /// A new path was split off a branching path
    Forked { from: &'a [NodeId], to: &'a [NodeId] },
    /// A path with a repeated node is frozen and left untouched
    SkippedDuplicate { path: &'a [NodeId] },
    /// Extending by `neighbor` would close a cycle not at the path's start
    RejectedCycle { path: &'a [NodeId], neighbor: NodeId },
    /// An edge-pair was recorded
    PairAdded { pair: &'a [NodeId] },
    /// A round completed; `done` is set when it finished the computation
    RoundFinished {
        criterion: Criterion,
        round: usize,
        paths: usize,
        done: bool,
    },
    /// Sub-path elimination is about to run
    ReductionStarted { candidates: usize },
    /// A path was removed because `container` holds it contiguously
    DroppedSubPath { path: &'a [NodeId], container: &'a [NodeId] },
    /// Sub-path elimination finished
    Reduced { paths: usize },
}

/// Receiver of engine events
pub trait Observer {
    fn observe(&mut self, graph: &Graph, event: &Event<'_>);
}

/// Observer that ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl Observer for NoopObserver {
    fn observe(&mut self, _graph: &Graph, _event: &Event<'_>) {}
}

impl<O: Observer> Observer for Option<O> {
    fn observe(&mut self, graph: &Graph, event: &Event<'_>) {
        if let Some(inner) = self {
            inner.observe(graph, event);
        }
    }
}

/// Both observers see every event, left first
impl<A: Observer, B: Observer> Observer for (A, B) {
    fn observe(&mut self, graph: &Graph, event: &Event<'_>) {
        self.0.observe(graph, event);
        self.1.observe(graph, event);
    }
}

/// Per-round progress messages
///
/// Collects one line per round (`Iteration 3: found 7 prime paths.`) plus
/// the completion messages, and optionally forwards each line to a sink as
/// it is produced.
#[derive(Default)]
pub struct ProgressReporter<'s> {
    lines: Vec<String>,
    sink: Option<Box<dyn FnMut(&str) + 's>>,
}

impl<'s> ProgressReporter<'s> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forward every line to `sink` as well as collecting it
    pub fn with_sink(sink: impl FnMut(&str) + 's) -> Self {
        Self {
            lines: Vec::new(),
            sink: Some(Box::new(sink)),
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    fn emit(&mut self, line: String) {
        if let Some(sink) = self.sink.as_mut() {
            sink(&line);
        }
        self.lines.push(line);
    }
}

impl Observer for ProgressReporter<'_> {
    fn observe(&mut self, _graph: &Graph, event: &Event<'_>) {
        match *event {
            Event::RoundFinished {
                criterion,
                round,
                paths,
                done,
            } => {
                if done {
                    let line = match criterion {
                        Criterion::PrimePaths => "Finished computing potential prime paths.".to_string(),
                        Criterion::EdgePairs => "Finished computing edge pairs.".to_string(),
                    };
                    self.emit(line);
                } else {
                    self.emit(format!("Iteration {}: found {} {}.", round, paths, criterion));
                }
            }
            Event::ReductionStarted { .. } => self.emit("Removing sub-paths...".to_string()),
            Event::Reduced { .. } => self.emit("Finished removing sub-paths.".to_string()),
            _ => {}
        }
    }
}

/// Step-by-step account of every engine decision
///
/// ```text
/// Iteration 1:
/// | [a] ──▶ [a, b]
/// |     └─▶ [a, c]
/// ```
#[derive(Debug, Default, Clone)]
pub struct Narrative {
    text: String,
}

impl Narrative {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

impl Observer for Narrative {
    fn observe(&mut self, graph: &Graph, event: &Event<'_>) {
        let out = &mut self.text;
        match *event {
            Event::RoundStarted { round, .. } => {
                writeln!(out, "Iteration {}:", round).ok();
            }
            Event::Extended { from, to } => {
                writeln!(out, "| {} ──▶ {}", render(graph, from), render(graph, to)).ok();
            }
            Event::Forked { from, to } => {
                let indent = " ".repeat(render(graph, from).chars().count());
                writeln!(out, "| {} └─▶ {}", indent, render(graph, to)).ok();
            }
            Event::SkippedDuplicate { path } => {
                writeln!(out, "| {} contains duplicate nodes, skipped.", render(graph, path)).ok();
            }
            Event::RejectedCycle { path, neighbor } => {
                writeln!(
                    out,
                    "| {} + {} creates a cycle, skipped.",
                    render(graph, path),
                    graph.name(neighbor)
                )
                .ok();
            }
            Event::PairAdded { pair } => {
                writeln!(out, "| {}", render(graph, pair)).ok();
            }
            Event::RoundFinished { done, .. } => {
                out.push('\n');
                if done {
                    out.push_str("Done.\n\n");
                }
            }
            Event::ReductionStarted { .. } => {
                out.push_str("Removing sub-paths...\n");
            }
            Event::DroppedSubPath { path, container } => {
                writeln!(out, "| {} ──▶ {}", render(graph, path), render(graph, container)).ok();
            }
            Event::Reduced { .. } => {
                out.push_str("\nDone.\n");
            }
        }
    }
}

/// Render a node sequence as `[a, b, c]`
pub fn render(graph: &Graph, ids: &[NodeId]) -> String {
    let names: Vec<&str> = ids.iter().map(|&id| graph.name(id)).collect();
    format!("[{}]", names.join(", "))
}
